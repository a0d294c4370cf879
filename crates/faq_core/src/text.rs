//! Text normalisation shared by model fitting and querying.
//!
//! Both sides of a comparison must go through the same [`Analyzer`], otherwise
//! query vectors land in a different space from the fitted questions.

use std::collections::HashSet;

use crate::config::MatcherConfig;

/// NLTK's English stop-word list plus the apostrophe-free spellings that
/// appear once `'` is stripped from contractions.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "arent", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "couldn", "couldnt", "d", "did", "didn", "didnt", "do",
    "does", "doesn", "doesnt", "doing", "don", "dont", "down", "during", "each", "few", "for",
    "from", "further", "had", "hadn", "hadnt", "has", "hasn", "hasnt", "have", "haven", "havent",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if",
    "im", "in", "into", "is", "isn", "isnt", "it", "its", "itself", "ive", "just", "ll", "m", "ma",
    "me", "mightn", "mightnt", "more", "most", "mustn", "mustnt", "my", "myself", "needn",
    "neednt", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan", "shant", "she",
    "shes", "should", "shouldn", "shouldnt", "shouldve", "so", "some", "such", "t", "than",
    "that", "thatll", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "ve", "very", "was",
    "wasn", "wasnt", "we", "were", "weren", "werent", "what", "whats", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "wont", "wouldn", "wouldnt", "y", "you",
    "youd", "youll", "your", "youre", "yours", "yourself", "yourselves", "youve",
];

#[derive(Debug, Clone)]
pub struct Analyzer {
    stop_words: Option<HashSet<String>>,
    lemmatize: bool,
    ngram_max: usize,
}

impl Analyzer {
    pub fn new(config: &MatcherConfig) -> Self {
        let stop_words = config.remove_stop_words.then(|| {
            STOP_WORDS
                .iter()
                .map(|w| w.to_string())
                .chain(config.extra_stop_words.iter().map(|w| w.to_lowercase()))
                .collect()
        });

        Self {
            stop_words,
            lemmatize: config.lemmatize,
            ngram_max: config.ngram_max.max(1),
        }
    }

    /// Lowercased, cleaned, filtered and lemmatised word tokens.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut tokens = Vec::new();

        for word in lowered.split_whitespace() {
            if is_url(word) || word.contains('@') {
                continue;
            }
            let word: String = word.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect();

            for token in word.split(|c: char| !c.is_alphanumeric()) {
                if token.chars().count() <= 1 {
                    continue;
                }
                if self
                    .stop_words
                    .as_ref()
                    .is_some_and(|stop| stop.contains(token))
                {
                    continue;
                }
                tokens.push(if self.lemmatize {
                    lemmatize(token)
                } else {
                    token.to_string()
                });
            }
        }

        tokens
    }

    /// Tokens followed by every word n-gram up to the configured length.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = tokens.clone();

        for n in 2..=self.ngram_max {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }

        terms
    }
}

fn is_url(word: &str) -> bool {
    word.starts_with("http") || word.starts_with("www")
}

/// Suffix rules only; good enough to fold plurals for short FAQ questions.
pub fn lemmatize(token: &str) -> String {
    let len = token.chars().count();
    if !token.is_ascii() {
        return token.to_string();
    }
    if len > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    if token.ends_with("sses") {
        return token[..token.len() - 2].to_string();
    }
    if len > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("ous")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
