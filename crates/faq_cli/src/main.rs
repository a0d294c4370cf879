mod cli;
mod output;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use faq_core::{
    Category, Matcher, Responder, Settings, checked_threshold, evaluate_cases, load_cases,
    load_corpus,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(faqs) = &cli.faqs {
        settings.faq_path = faqs.clone();
    }
    if let Some(threshold) = cli.threshold() {
        settings.matcher.threshold = checked_threshold(threshold)?;
    }
    Ok(settings)
}

fn build_responder(settings: &Settings) -> Result<Responder> {
    let corpus = load_corpus(&settings.faq_path)
        .with_context(|| format!("load faqs from {}", settings.faq_path.display()))?;
    let matcher =
        Matcher::load_with_config(corpus, settings.matcher.clone()).context("fit faq matcher")?;
    Ok(Responder::new(matcher, settings.responder.clone()))
}

fn chat(out: &mut impl Write, responder: &Responder, cli: &Cli) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();

    if interactive {
        writeln!(out, "Ask about the restaurant. Type 'quit' to leave.")?;
    }

    let mut answered = 0usize;
    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("read question")? == 0 {
            break;
        }
        let question = line.trim();
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let response = responder.respond(question);
        output::print_response(out, cli.output, question, &response)?;
        answered += 1;
    }

    info!(answered, "chat session ended");
    Ok(())
}

/// Returns `Ok(false)` when the run completed but the result is a failure
/// the caller should see in the exit status.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing();

    let settings = load_settings(&cli)?;
    let responder = build_responder(&settings)?;
    let matcher = responder.matcher();
    let mut out = io::stdout().lock();

    match &cli.command {
        Commands::Ask { question, .. } => {
            let question = question.join(" ");
            let response = responder.respond(&question);
            output::print_response(&mut out, cli.output, &question, &response)?;
        }
        Commands::Chat { .. } => chat(&mut out, &responder, &cli)?,
        Commands::Similar { id, top } => {
            let (index, _) = matcher
                .find_by_id(id)
                .with_context(|| format!("no faq with id {id}"))?;
            output::print_matches(&mut out, cli.output, &matcher.similar_to(index, *top))?;
        }
        Commands::List { category } => {
            let entries: Vec<_> = match category {
                Some(label) => matcher.by_category(&Category::parse(label), usize::MAX),
                None => matcher.entries().iter().collect(),
            };
            output::print_entries(&mut out, cli.output, &entries)?;
        }
        Commands::Search { keywords, max } => {
            let keywords: Vec<&str> = keywords.iter().map(String::as_str).collect();
            output::print_entries(&mut out, cli.output, &matcher.search_keywords(&keywords, *max))?;
        }
        Commands::Stats => {
            output::print_stats(&mut out, cli.output, &matcher.stats())?;
        }
        Commands::Eval {
            cases,
            min_pass_rate,
            ..
        } => {
            let cases = load_cases(cases)
                .with_context(|| format!("load eval cases from {}", cases.display()))?;
            let summary = evaluate_cases(matcher, &cases, settings.matcher.threshold);
            output::print_eval(&mut out, cli.output, &summary, *min_pass_rate)?;
            return Ok(summary.meets(*min_pass_rate));
        }
    }

    Ok(true)
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
