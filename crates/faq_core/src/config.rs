use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::model::Category;

pub const DEFAULT_THRESHOLD: f64 = 0.3;
pub const DEFAULT_NGRAM_MAX: usize = 2;
pub const DEFAULT_FAQ_PATH: &str = "data/restaurant_faqs.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Raw count scaled by smoothed inverse document frequency.
    #[default]
    TfIdf,
    /// Raw count only.
    TermFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub threshold: f64,
    pub weighting: Weighting,
    pub ngram_max: usize,
    pub remove_stop_words: bool,
    pub lemmatize: bool,
    pub extra_stop_words: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            weighting: Weighting::TfIdf,
            ngram_max: DEFAULT_NGRAM_MAX,
            remove_stop_words: true,
            lemmatize: true,
            extra_stop_words: Vec::new(),
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.ngram_max == 0 {
            return Err(ConfigError::InvalidSetting(
                "ngram_max must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::InvalidSetting(format!(
            "threshold must be within [0, 1], got {threshold}"
        )));
    }
    Ok(())
}

/// Rejects a threshold before it reaches a query.
pub fn checked_threshold(threshold: f64) -> Result<f64> {
    validate_threshold(threshold)?;
    Ok(threshold)
}

/// How many suggestion slots one category may take per listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub category: Category,
    pub weight: usize,
}

impl CategoryWeight {
    fn new(category: Category, weight: usize) -> Self {
        Self { category, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Other matching questions shown next to an answer.
    pub alternatives: usize,
    /// Questions offered when nothing matched.
    pub suggestions: usize,
    /// Categories suggestions are drawn from first, in priority order.
    pub popular: Vec<CategoryWeight>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            alternatives: 2,
            suggestions: 3,
            popular: vec![
                CategoryWeight::new(Category::Hours, 3),
                CategoryWeight::new(Category::Menu, 3),
                CategoryWeight::new(Category::Delivery, 2),
                CategoryWeight::new(Category::Reservations, 2),
                CategoryWeight::new(Category::Payment, 1),
                CategoryWeight::new(Category::Specials, 2),
            ],
        }
    }
}

/// Top-level settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub faq_path: PathBuf,
    pub matcher: MatcherConfig,
    pub responder: ResponderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            faq_path: PathBuf::from(DEFAULT_FAQ_PATH),
            matcher: MatcherConfig::default(),
            responder: ResponderConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings = Self::from_toml_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
        settings.matcher.validate()?;
        Ok(settings)
    }
}
