use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::matcher::Matcher;

pub const DEFAULT_REQUIRED_PASS_RATE: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub case_id: String,
    pub question: String,
    pub expect_match: bool,
    #[serde(default)]
    pub expected_faq_id: Option<String>,
    #[serde(default)]
    pub min_similarity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOutcome {
    pub case_id: String,
    pub passed: bool,
    pub matched: bool,
    pub actual_faq_id: Option<String>,
    pub score: f64,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub outcomes: Vec<EvalOutcome>,
}

impl EvalSummary {
    pub fn meets(&self, required_pass_rate: f64) -> bool {
        self.pass_rate >= required_pass_rate
    }
}

impl EvalCase {
    pub fn is_satisfied_by(&self, matched: bool, faq_id: Option<&str>, score: f64) -> bool {
        if self.expect_match != matched {
            return false;
        }

        if let Some(expected) = self.expected_faq_id.as_deref() {
            if faq_id != Some(expected) {
                return false;
            }
        }

        if let Some(min_sim) = self.min_similarity {
            if score < min_sim {
                return false;
            }
        }

        true
    }
}

pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::parse(path, e))
}

pub fn evaluate_cases(matcher: &Matcher, cases: &[EvalCase], threshold: f64) -> EvalSummary {
    let mut outcomes = Vec::with_capacity(cases.len());

    for case in cases {
        let start = Instant::now();
        let result = matcher.query_with_threshold(&case.question, threshold);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let faq_id = result.entry.map(|e| e.id.clone());
        outcomes.push(EvalOutcome {
            case_id: case.case_id.clone(),
            passed: case.is_satisfied_by(result.matched, faq_id.as_deref(), result.score),
            matched: result.matched,
            actual_faq_id: faq_id,
            score: result.score,
            latency_ms,
        });
    }

    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = total.saturating_sub(passed);
    let pass_rate = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    };

    EvalSummary {
        total,
        passed,
        failed,
        pass_rate,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Corpus, FaqEntry};

    fn matcher() -> Matcher {
        let entry = |id: &str, question: &str| FaqEntry {
            id: id.to_string(),
            question: question.to_string(),
            answer: format!("answer-{id}"),
            category: Category::General,
            keywords: Vec::new(),
        };
        Matcher::load(Corpus::new(vec![
            entry("hours", "What time do you open?"),
            entry("delivery", "Do you deliver?"),
        ]))
        .expect("load")
    }

    fn case(id: &str, question: &str, expect_match: bool, faq: Option<&str>) -> EvalCase {
        EvalCase {
            case_id: id.to_string(),
            question: question.to_string(),
            expect_match,
            expected_faq_id: faq.map(str::to_string),
            min_similarity: None,
        }
    }

    #[test]
    fn summary_counts_passes_and_failures() {
        let cases = vec![
            case("c1", "when do you open", true, Some("hours")),
            case("c2", "asdkjqwe random nonsense", false, None),
            case("c3", "do you deliver", true, Some("hours")),
        ];
        let summary = evaluate_cases(&matcher(), &cases, 0.3);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.outcomes[2].passed);
        assert_eq!(summary.outcomes[2].actual_faq_id.as_deref(), Some("delivery"));
        assert!(summary.meets(0.6));
        assert!(!summary.meets(0.9));
    }

    #[test]
    fn min_similarity_is_enforced() {
        let mut strict = case("c1", "when do you open", true, None);
        strict.min_similarity = Some(0.99);
        let summary = evaluate_cases(&matcher(), &[strict], 0.3);
        assert_eq!(summary.passed, 0);
    }

    #[test]
    fn empty_case_list_has_zero_pass_rate() {
        let summary = evaluate_cases(&matcher(), &[], 0.3);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn cases_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        std::io::Write::write_all(
            &mut file,
            br#"[{"case_id": "c1", "question": "do you deliver", "expect_match": true, "expected_faq_id": "delivery"}]"#,
        )
        .expect("write");
        let cases = load_cases(file.path()).expect("load");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected_faq_id.as_deref(), Some("delivery"));
        assert_eq!(cases[0].min_similarity, None);
    }
}
