use std::fmt;

use serde::Serialize;

use crate::config::ResponderConfig;
use crate::matcher::Matcher;
use crate::model::Category;

pub const EMPTY_INPUT_ANSWER: &str = "Please ask me a question about our restaurant!";

pub const FALLBACK_ANSWERS: [&str; 5] = [
    "I'm sorry, I couldn't find a specific answer to your question. Could you try rephrasing it?",
    "I don't have information about that specific topic. Is there something else I can help you with?",
    "That's a great question! Unfortunately, I don't have that information in my knowledge base.",
    "I'm not sure about that. Could you try asking in a different way or check our menu/contact us directly?",
    "I couldn't find a matching answer. Feel free to contact our restaurant directly for specific inquiries!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            ConfidenceLevel::High
        } else if score >= 0.3 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub answer: String,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub found_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Response {
    fn unanswered(answer: &str, score: f64, suggestions: Vec<String>) -> Self {
        Self {
            answer: answer.to_string(),
            confidence: score,
            confidence_level: ConfidenceLevel::from_score(score),
            found_match: false,
            faq_id: None,
            matched_question: None,
            category: None,
            alternatives: Vec::new(),
            suggestions,
        }
    }
}

/// Turns match results into customer-facing replies.
#[derive(Debug, Clone)]
pub struct Responder {
    matcher: Matcher,
    config: ResponderConfig,
}

impl Responder {
    pub fn new(matcher: Matcher, config: ResponderConfig) -> Self {
        Self { matcher, config }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn respond(&self, input: &str) -> Response {
        self.respond_with_threshold(input, self.matcher.config().threshold)
    }

    pub fn respond_with_threshold(&self, input: &str, threshold: f64) -> Response {
        if input.trim().is_empty() {
            return Response::unanswered(EMPTY_INPUT_ANSWER, 0.0, Vec::new());
        }

        let result = self.matcher.query_with_threshold(input, threshold);
        let (Some(entry), Some(index)) = (result.entry, result.index) else {
            return Response::unanswered(
                fallback_answer(input),
                result.score,
                self.popular_questions(self.config.suggestions),
            );
        };

        let alternatives = self
            .matcher
            .top_matches(input, self.config.alternatives + 1, threshold)
            .into_iter()
            .filter(|m| m.index != index)
            .take(self.config.alternatives)
            .map(|m| m.entry.question.clone())
            .collect();

        Response {
            answer: entry.answer.clone(),
            confidence: result.score,
            confidence_level: ConfidenceLevel::from_score(result.score),
            found_match: true,
            faq_id: Some(entry.id.clone()),
            matched_question: Some(entry.question.clone()),
            category: Some(entry.category.clone()),
            alternatives,
            suggestions: Vec::new(),
        }
    }

    /// Weighted categories go first, one question each per round until their
    /// weight is spent. Any slots left are filled round-robin over every
    /// category in the order it first appears in the corpus.
    pub fn popular_questions(&self, count: usize) -> Vec<String> {
        let mut buckets: Vec<(&Category, Vec<&str>)> = Vec::new();
        for entry in self.matcher.entries() {
            match buckets.iter_mut().find(|(c, _)| *c == &entry.category) {
                Some((_, questions)) => questions.push(entry.question.as_str()),
                None => buckets.push((&entry.category, vec![entry.question.as_str()])),
            }
        }

        let weighted: Vec<(&[&str], usize)> = self
            .config
            .popular
            .iter()
            .filter_map(|p| {
                buckets
                    .iter()
                    .find(|(c, _)| *c == &p.category)
                    .map(|(_, questions)| (questions.as_slice(), p.weight))
            })
            .collect();
        let everything: Vec<(&[&str], usize)> = buckets
            .iter()
            .map(|(_, questions)| (questions.as_slice(), questions.len()))
            .collect();

        let mut picked = Vec::with_capacity(count);
        take_rounds(&mut picked, count, &weighted);
        take_rounds(&mut picked, count, &everything);
        picked.into_iter().map(str::to_string).collect()
    }
}

/// One question per bucket per round, up to each bucket's limit. Questions
/// already picked are skipped.
fn take_rounds<'a>(picked: &mut Vec<&'a str>, count: usize, buckets: &[(&[&'a str], usize)]) {
    let rounds = buckets.iter().map(|(_, limit)| *limit).max().unwrap_or(0);
    for round in 0..rounds {
        for (questions, limit) in buckets {
            if picked.len() >= count {
                return;
            }
            if round >= *limit {
                continue;
            }
            if let Some(question) = questions.get(round).filter(|q| !picked.contains(*q)) {
                picked.push(*question);
            }
        }
    }
}

/// Same input, same fallback: FNV-1a over the trimmed, lowercased text.
pub fn fallback_answer(input: &str) -> &'static str {
    let mut h: u64 = 1469598103934665603;
    for b in input.trim().to_lowercase().as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    FALLBACK_ANSWERS[(h % FALLBACK_ANSWERS.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryWeight;
    use crate::model::{Corpus, FaqEntry};

    fn entry(id: &str, question: &str, category: Category) -> FaqEntry {
        FaqEntry {
            id: id.to_string(),
            question: question.to_string(),
            answer: format!("answer-{id}"),
            category,
            keywords: Vec::new(),
        }
    }

    fn responder() -> Responder {
        let matcher = Matcher::load(Corpus::new(vec![
            entry("1", "What are your opening hours?", Category::Hours),
            entry("2", "Are you open on holidays?", Category::Hours),
            entry("3", "Do you have vegetarian options?", Category::Menu),
            entry("4", "Do you have vegan options?", Category::Menu),
            entry("5", "Do you offer delivery?", Category::Delivery),
        ]))
        .expect("load");
        Responder::new(matcher, ResponderConfig::default())
    }

    #[test]
    fn blank_input_asks_for_a_question() {
        let response = responder().respond("   ");
        assert_eq!(response.answer, EMPTY_INPUT_ANSWER);
        assert!(!response.found_match);
        assert_eq!(response.confidence, 0.0);
        assert!(response.suggestions.is_empty());
    }

    #[test]
    fn match_carries_answer_and_alternatives() {
        // Vegan shares only "option", which scores below the default bar.
        let response = responder().respond_with_threshold("vegetarian options please", 0.2);
        assert!(response.found_match);
        assert_eq!(response.answer, "answer-3");
        assert_eq!(response.faq_id.as_deref(), Some("3"));
        assert_eq!(response.category, Some(Category::Menu));
        assert_eq!(response.alternatives, vec!["Do you have vegan options?"]);
    }

    #[test]
    fn miss_gives_deterministic_fallback_and_suggestions() {
        let bot = responder();
        let first = bot.respond("asdkjqwe random nonsense");
        let second = bot.respond("asdkjqwe random nonsense");
        assert!(!first.found_match);
        assert!(FALLBACK_ANSWERS.contains(&first.answer.as_str()));
        assert_eq!(first, second);
        assert_eq!(first.confidence_level, ConfidenceLevel::Low);
        assert_eq!(
            first.suggestions,
            vec![
                "What are your opening hours?",
                "Do you have vegetarian options?",
                "Do you offer delivery?",
            ]
        );
    }

    #[test]
    fn popular_questions_follow_category_weights() {
        let config = ResponderConfig {
            popular: vec![
                CategoryWeight {
                    category: Category::Menu,
                    weight: 1,
                },
                CategoryWeight {
                    category: Category::Hours,
                    weight: 2,
                },
            ],
            ..ResponderConfig::default()
        };
        let bot = Responder::new(responder().matcher().clone(), config);
        assert_eq!(
            bot.popular_questions(5),
            vec![
                "Do you have vegetarian options?",
                "What are your opening hours?",
                "Are you open on holidays?",
                "Do you offer delivery?",
                "Do you have vegan options?",
            ]
        );
        assert!(bot.popular_questions(0).is_empty());
    }

    #[test]
    fn popular_questions_cycle_through_categories() {
        let questions = responder().popular_questions(5);
        assert_eq!(
            questions,
            vec![
                "What are your opening hours?",
                "Do you have vegetarian options?",
                "Do you offer delivery?",
                "Are you open on holidays?",
                "Do you have vegan options?",
            ]
        );
        assert_eq!(responder().popular_questions(50).len(), 5);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.6), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.45), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.1), ConfidenceLevel::Low);
    }
}
