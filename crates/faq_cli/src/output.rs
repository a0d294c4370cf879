use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use faq_core::{EvalSummary, FaqEntry, MatcherStats, Response, ScoredMatch};
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Serialize)]
struct JsonAnswer<'a> {
    question: &'a str,
    #[serde(flatten)]
    response: &'a Response,
    answered_at: DateTime<Utc>,
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn print_response(
    out: &mut impl Write,
    format: OutputFormat,
    question: &str,
    response: &Response,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(
            out,
            &JsonAnswer {
                question,
                response,
                answered_at: Utc::now(),
            },
        );
    }

    writeln!(out, "{}", response.answer)?;
    write!(
        out,
        "confidence: {:.2} ({})",
        response.confidence, response.confidence_level
    )?;
    match (&response.faq_id, &response.category) {
        (Some(id), Some(category)) => writeln!(out, " | faq {id} | {category}")?,
        _ => writeln!(out)?,
    }

    if !response.alternatives.is_empty() {
        writeln!(out, "related:")?;
        for question in &response.alternatives {
            writeln!(out, "  - {question}")?;
        }
    }
    if !response.suggestions.is_empty() {
        writeln!(out, "you could ask:")?;
        for question in &response.suggestions {
            writeln!(out, "  - {question}")?;
        }
    }
    Ok(())
}

pub fn print_matches(
    out: &mut impl Write,
    format: OutputFormat,
    matches: &[ScoredMatch<'_>],
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(out, &matches);
    }

    if matches.is_empty() {
        writeln!(out, "no similar questions")?;
    }
    for m in matches {
        writeln!(out, "{:.4}  [{}] {}", m.score, m.entry.id, m.entry.question)?;
    }
    Ok(())
}

pub fn print_entries(out: &mut impl Write, format: OutputFormat, entries: &[&FaqEntry]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(out, &entries);
    }

    if entries.is_empty() {
        writeln!(out, "no matching faqs")?;
    }
    for entry in entries {
        writeln!(out, "[{}] ({}) {}", entry.id, entry.category, entry.question)?;
    }
    Ok(())
}

pub fn print_stats(out: &mut impl Write, format: OutputFormat, stats: &MatcherStats) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(out, stats);
    }

    writeln!(out, "domain: {}", stats.domain.as_deref().unwrap_or("unknown"))?;
    writeln!(
        out,
        "last updated: {}",
        stats.last_updated.as_deref().unwrap_or("unknown")
    )?;
    writeln!(out, "faqs: {}", stats.total_faqs)?;
    writeln!(out, "vocabulary: {}", stats.vocabulary_size)?;
    writeln!(out, "categories:")?;
    for (label, count) in &stats.categories {
        writeln!(out, "  {label}: {count}")?;
    }
    Ok(())
}

pub fn print_eval(
    out: &mut impl Write,
    format: OutputFormat,
    summary: &EvalSummary,
    required: f64,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(out, summary);
    }

    writeln!(
        out,
        "total={} passed={} failed={} pass_rate={:.4} required={:.4} meets_threshold={}",
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate,
        required,
        summary.meets(required)
    )?;
    for o in &summary.outcomes {
        writeln!(
            out,
            "case={} passed={} matched={} faq_id={} score={:.4} latency={:.3}ms",
            o.case_id,
            o.passed,
            o.matched,
            o.actual_faq_id.as_deref().unwrap_or("null"),
            o.score,
            o.latency_ms
        )?;
    }
    Ok(())
}
