use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};

/// Topic label attached to every FAQ entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Hours,
    Menu,
    Delivery,
    Reservations,
    Payment,
    Specials,
    #[default]
    General,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Hours => "hours",
            Category::Menu => "menu",
            Category::Delivery => "delivery",
            Category::Reservations => "reservations",
            Category::Payment => "payment",
            Category::Specials => "specials",
            Category::General => "general",
            Category::Other(label) => label,
        }
    }

    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "hours" => Category::Hours,
            "menu" => Category::Menu,
            "delivery" => Category::Delivery,
            "reservations" => Category::Reservations,
            "payment" => Category::Payment,
            "specials" => Category::Specials,
            "general" | "" => Category::General,
            _ => Category::Other(label),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::parse(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

/// A record as it appears in a data file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFaqRecord {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

/// Ids show up as numbers in hand-written JSON and as strings everywhere else.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(ConfigError::MissingField { index, field }),
    }
}

impl RawFaqRecord {
    pub fn into_entry(self, index: usize) -> Result<FaqEntry> {
        let question = required(self.question, index, "question")?;
        let answer = required(self.answer, index, "answer")?;
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| (index + 1).to_string());

        Ok(FaqEntry {
            id,
            question,
            answer,
            category: self.category.as_deref().map(Category::parse).unwrap_or_default(),
            keywords: self
                .keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        })
    }
}

/// The loaded FAQ set. Positions are stable for the life of the process and
/// double as the row index into the fitted vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub entries: Vec<FaqEntry>,
    #[serde(default)]
    pub metadata: CorpusMetadata,
}

impl Corpus {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self {
            entries,
            metadata: CorpusMetadata::default(),
        }
    }

    /// Validates every record. One bad record fails the whole load.
    pub fn from_records(records: Vec<RawFaqRecord>, metadata: CorpusMetadata) -> Result<Self> {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_entry(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries, metadata })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryResult<'a> {
    pub entry: Option<&'a FaqEntry>,
    pub index: Option<usize>,
    pub score: f64,
    pub matched: bool,
}

impl<'a> QueryResult<'a> {
    pub(crate) fn hit(index: usize, entry: &'a FaqEntry, score: f64) -> Self {
        Self {
            entry: Some(entry),
            index: Some(index),
            score,
            matched: true,
        }
    }

    pub(crate) fn miss(score: f64) -> Self {
        Self {
            entry: None,
            index: None,
            score,
            matched: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMatch<'a> {
    pub index: usize,
    pub entry: &'a FaqEntry,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: Option<&str>, answer: Option<&str>) -> RawFaqRecord {
        RawFaqRecord {
            question: question.map(str::to_string),
            answer: answer.map(str::to_string),
            ..RawFaqRecord::default()
        }
    }

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!(Category::parse("Hours"), Category::Hours);
        assert_eq!(Category::parse(" DELIVERY "), Category::Delivery);
        assert_eq!(Category::parse(""), Category::General);
        assert_eq!(
            Category::parse("Parking"),
            Category::Other("parking".to_string())
        );
        assert_eq!(Category::Other("parking".into()).to_string(), "parking");
    }

    #[test]
    fn missing_id_falls_back_to_position() {
        let entry = record(Some("Do you deliver?"), Some("Yes."))
            .into_entry(4)
            .expect("valid");
        assert_eq!(entry.id, "5");
        assert_eq!(entry.category, Category::General);
    }

    #[test]
    fn blank_answer_is_rejected() {
        let err = record(Some("Do you deliver?"), Some("   "))
            .into_entry(0)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                index: 0,
                field: "answer"
            }
        ));
    }

    #[test]
    fn one_bad_record_fails_the_corpus() {
        let records = vec![
            record(Some("What time do you open?"), Some("9am.")),
            record(None, Some("orphan answer")),
        ];
        let err = Corpus::from_records(records, CorpusMetadata::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                index: 1,
                field: "question"
            }
        ));
    }

    #[test]
    fn numeric_ids_deserialize_as_strings() {
        let raw: RawFaqRecord =
            serde_json::from_str(r#"{"id": 7, "question": "q", "answer": "a"}"#).expect("json");
        assert_eq!(raw.id.as_deref(), Some("7"));
    }
}
