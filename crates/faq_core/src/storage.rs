use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::model::{Corpus, CorpusMetadata, FaqEntry, RawFaqRecord};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCorpus {
    Document {
        faqs: Vec<RawFaqRecord>,
        #[serde(default)]
        metadata: CorpusMetadata,
    },
    Records(Vec<RawFaqRecord>),
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
}

impl From<CsvRecord> for RawFaqRecord {
    fn from(record: CsvRecord) -> Self {
        RawFaqRecord {
            id: record.id,
            question: record.question,
            answer: record.answer,
            category: record.category,
            keywords: record
                .keywords
                .map(|k| k.split(';').map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// Reads a corpus, picking the parser from the file extension.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let corpus = match ext.as_str() {
        "json" => load_corpus_json(path)?,
        "jsonl" => load_corpus_jsonl(path)?,
        "csv" => load_corpus_csv(path)?,
        other => {
            return Err(ConfigError::UnsupportedFormat(format!(
                "{}: expected .json, .jsonl or .csv, got '.{other}'",
                path.display()
            )));
        }
    };

    info!(path = %path.display(), faqs = corpus.len(), "loaded faq corpus");
    Ok(corpus)
}

pub fn load_corpus_json(path: &Path) -> Result<Corpus> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    let parsed: JsonCorpus = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ConfigError::parse(path, e))?;

    match parsed {
        JsonCorpus::Document { faqs, metadata } => Corpus::from_records(faqs, metadata),
        JsonCorpus::Records(records) => Corpus::from_records(records, CorpusMetadata::default()),
    }
}

pub fn load_corpus_jsonl(path: &Path) -> Result<Corpus> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ConfigError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RawFaqRecord = serde_json::from_str(&line)
            .map_err(|e| ConfigError::parse(path, format!("line {}: {e}", line_no + 1)))?;
        records.push(record);
    }

    Corpus::from_records(records, CorpusMetadata::default())
}

pub fn load_corpus_csv(path: &Path) -> Result<Corpus> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let records = reader
        .deserialize::<CsvRecord>()
        .map(|row| row.map(RawFaqRecord::from).map_err(|e| csv_error(path, e)))
        .collect::<Result<Vec<_>>>()?;

    Corpus::from_records(records, CorpusMetadata::default())
}

fn csv_error(path: &Path, err: csv::Error) -> ConfigError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ConfigError::io(path, e),
        other => ConfigError::parse(path, format!("{other:?}")),
    }
}

/// Writes validated entries one JSON object per line.
pub fn save_entries_jsonl(path: &Path, entries: &[FaqEntry]) -> Result<()> {
    let file = File::create(path).map_err(|e| ConfigError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        let line = serde_json::to_string(entry).map_err(|e| ConfigError::parse(path, e))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| ConfigError::io(path, e))?;
    }

    writer.flush().map_err(|e| ConfigError::io(path, e))
}
