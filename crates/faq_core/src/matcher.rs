use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::MatcherConfig;
use crate::error::{ConfigError, Result};
use crate::model::{Category, Corpus, FaqEntry, QueryResult, ScoredMatch};
use crate::text::Analyzer;
use crate::vectorize::{SparseVector, TfIdfModel, cosine_similarity};

/// Fitted question index. Immutable once loaded, so a shared reference can be
/// queried from any number of threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    corpus: Corpus,
    config: MatcherConfig,
    analyzer: Analyzer,
    model: TfIdfModel,
    vectors: Vec<SparseVector>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatcherStats {
    pub total_faqs: usize,
    pub vocabulary_size: usize,
    pub categories: BTreeMap<String, usize>,
    pub most_common_category: Option<(String, usize)>,
    pub domain: Option<String>,
    pub last_updated: Option<String>,
}

impl Matcher {
    pub fn load(corpus: Corpus) -> Result<Self> {
        Self::load_with_config(corpus, MatcherConfig::default())
    }

    pub fn load_with_config(corpus: Corpus, config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        if corpus.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }

        let analyzer = Analyzer::new(&config);
        let documents: Vec<Vec<String>> = corpus
            .entries
            .iter()
            .map(|entry| analyzer.terms(&entry.question))
            .collect();

        for (index, terms) in documents.iter().enumerate() {
            if terms.is_empty() {
                return Err(ConfigError::NoIndexableTerms {
                    index,
                    question: corpus.entries[index].question.clone(),
                });
            }
        }

        let model = TfIdfModel::fit(&documents, config.weighting);
        let vectors: Vec<SparseVector> = documents.iter().map(|d| model.transform(d)).collect();

        // A later copy of an earlier question could never win a tie.
        for (index, vector) in vectors.iter().enumerate() {
            if let Some(first) = vectors[..index]
                .iter()
                .position(|earlier| cosine_similarity(earlier, vector) >= 1.0)
            {
                return Err(ConfigError::DuplicateQuestion { index, first });
            }
        }

        info!(
            faqs = corpus.len(),
            vocabulary = model.dimension(),
            weighting = ?config.weighting,
            "fitted faq matcher"
        );

        Ok(Self {
            corpus,
            config,
            analyzer,
            model,
            vectors,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.corpus.entries
    }

    pub fn entry(&self, index: usize) -> Option<&FaqEntry> {
        self.corpus.entries.get(index)
    }

    pub fn find_by_id(&self, id: &str) -> Option<(usize, &FaqEntry)> {
        self.corpus
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.model.dimension()
    }

    pub fn query(&self, text: &str) -> QueryResult<'_> {
        self.query_with_threshold(text, self.config.threshold)
    }

    /// Best entry by cosine similarity. Ties go to the lowest index. A query
    /// with no known terms is a miss with score 0, never an error.
    pub fn query_with_threshold(&self, text: &str, threshold: f64) -> QueryResult<'_> {
        let query = self.vectorize(text);
        if query.is_empty() {
            debug!(query = text, "query has no known terms");
            return QueryResult::miss(0.0);
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, score) in self.scores(&query) {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) if score >= threshold && score > 0.0 => {
                debug!(query = text, index, score, "faq match");
                QueryResult::hit(index, &self.corpus.entries[index], score)
            }
            Some((_, score)) => {
                debug!(query = text, score, threshold, "best score below threshold");
                QueryResult::miss(score)
            }
            None => QueryResult::miss(0.0),
        }
    }

    /// Up to `k` entries scoring at least `threshold`, best first.
    pub fn top_matches(&self, text: &str, k: usize, threshold: f64) -> Vec<ScoredMatch<'_>> {
        let query = self.vectorize(text);
        if query.is_empty() {
            return Vec::new();
        }
        self.rank(self.scores(&query), k, threshold)
    }

    /// Entries whose questions resemble the question at `index`. The entry
    /// itself is never part of the result.
    pub fn similar_to(&self, index: usize, k: usize) -> Vec<ScoredMatch<'_>> {
        let Some(vector) = self.vectors.get(index) else {
            return Vec::new();
        };
        let scores = self.scores(vector).filter(|(i, _)| *i != index);
        self.rank(scores, k, 0.0)
    }

    pub fn by_category(&self, category: &Category, max: usize) -> Vec<&FaqEntry> {
        self.corpus
            .entries
            .iter()
            .filter(|entry| &entry.category == category)
            .take(max)
            .collect()
    }

    /// Distinct categories in alphabetical order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for entry in &self.corpus.entries {
            if !categories.contains(&entry.category) {
                categories.push(entry.category.clone());
            }
        }
        categories.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        categories
    }

    pub fn search_keywords(&self, keywords: &[&str], max: usize) -> Vec<&FaqEntry> {
        let wanted: Vec<String> = keywords.iter().map(|k| k.trim().to_lowercase()).collect();
        self.corpus
            .entries
            .iter()
            .filter(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| wanted.contains(&k.to_lowercase()))
            })
            .take(max)
            .collect()
    }

    pub fn stats(&self) -> MatcherStats {
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &self.corpus.entries {
            *categories.entry(entry.category.to_string()).or_insert(0) += 1;
        }

        // Highest count wins; equal counts resolve alphabetically.
        let most_common_category = categories
            .iter()
            .fold(None::<(&String, usize)>, |best, (label, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, count)| (label.clone(), count));

        MatcherStats {
            total_faqs: self.corpus.len(),
            vocabulary_size: self.model.dimension(),
            categories,
            most_common_category,
            domain: self.corpus.metadata.domain.clone(),
            last_updated: self.corpus.metadata.last_updated.map(|d| d.to_string()),
        }
    }

    fn vectorize(&self, text: &str) -> SparseVector {
        self.model.transform(&self.analyzer.terms(text))
    }

    fn scores<'s>(&'s self, query: &'s SparseVector) -> impl Iterator<Item = (usize, f64)> + 's {
        self.vectors
            .iter()
            .enumerate()
            .map(move |(index, vector)| (index, cosine_similarity(query, vector)))
    }

    fn rank(
        &self,
        scores: impl Iterator<Item = (usize, f64)>,
        k: usize,
        threshold: f64,
    ) -> Vec<ScoredMatch<'_>> {
        let mut scored: Vec<(usize, f64)> = scores
            .filter(|(_, score)| *score > 0.0 && *score >= threshold)
            .collect();

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(k)
            .map(|(index, score)| ScoredMatch {
                index,
                entry: &self.corpus.entries[index],
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weighting;

    fn entry(id: &str, question: &str, answer: &str, category: Category) -> FaqEntry {
        FaqEntry {
            id: id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            category,
            keywords: Vec::new(),
        }
    }

    fn restaurant() -> Matcher {
        let mut delivery = entry(
            "2",
            "Do you offer delivery service?",
            "Yes, within 5 miles.",
            Category::Delivery,
        );
        delivery.keywords = vec!["Delivery".into(), "order".into()];
        Matcher::load(Corpus::new(vec![
            entry(
                "1",
                "What are your restaurant hours?",
                "11am to 10pm.",
                Category::Hours,
            ),
            delivery,
            entry(
                "3",
                "Do you have vegetarian options?",
                "Plenty.",
                Category::Menu,
            ),
            entry(
                "4",
                "Do you have gluten-free options?",
                "Ask your server.",
                Category::Menu,
            ),
            entry(
                "5",
                "Can I order takeout?",
                "Call ahead.",
                Category::Delivery,
            ),
        ]))
        .expect("load")
    }

    #[test]
    fn empty_corpus_is_a_config_error() {
        let err = Matcher::load(Corpus::default()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCorpus));
    }

    #[test]
    fn stop_word_only_question_is_rejected() {
        let err = Matcher::load(Corpus::new(vec![entry(
            "1",
            "Who are you?",
            "A restaurant.",
            Category::General,
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoIndexableTerms { index: 0, .. }));
    }

    #[test]
    fn normalised_duplicates_are_rejected() {
        let err = Matcher::load(Corpus::new(vec![
            entry("1", "Do you offer delivery?", "Yes.", Category::Delivery),
            entry("2", "Do you offer deliveries?", "Still yes.", Category::Delivery),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateQuestion { index: 1, first: 0 }
        ));
    }

    #[test]
    fn single_entry_corpus_matches_itself() {
        let matcher = Matcher::load(Corpus::new(vec![entry(
            "1",
            "Do you deliver?",
            "Yes.",
            Category::Delivery,
        )]))
        .expect("load");
        let result = matcher.query_with_threshold("Do you deliver?", 1.0);
        assert!(result.matched);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn query_picks_the_closest_question() {
        let matcher = restaurant();
        let result = matcher.query("any vegetarian dishes?");
        assert!(result.matched);
        assert_eq!(result.entry.map(|e| e.id.as_str()), Some("3"));
        assert_eq!(result.index, Some(2));
    }

    #[test]
    fn below_threshold_reports_best_score_without_entry() {
        let matcher = restaurant();
        let result = matcher.query_with_threshold("vegetarian pizza ideas tonight", 0.99);
        assert!(!result.matched);
        assert!(result.entry.is_none());
        assert!(result.score > 0.0);
    }

    #[test]
    fn ties_go_to_the_first_entry() {
        let matcher = Matcher::load(Corpus::new(vec![
            entry("1", "Do you deliver pizza?", "Yes.", Category::Delivery),
            entry("2", "Do you deliver pasta?", "Also yes.", Category::Delivery),
        ]))
        .expect("load");
        let result = matcher.query_with_threshold("deliver", 0.0);
        assert_eq!(result.index, Some(0));

        let ranked = matcher.top_matches("deliver", 2, 0.0);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].index, 0);
    }

    #[test]
    fn top_matches_are_sorted_and_bounded() {
        let matcher = restaurant();
        let matches = matcher.top_matches("gluten free vegetarian options", 3, 0.0);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].score >= matches[1].score);
        assert!(matches.iter().all(|m| m.score > 0.0 && m.score <= 1.0));
    }

    #[test]
    fn similar_to_excludes_self() {
        let matcher = restaurant();
        let similar = matcher.similar_to(2, 5);
        assert_eq!(similar.first().map(|m| m.index), Some(3));
        assert!(similar.iter().all(|m| m.index != 2));
        assert!(matcher.similar_to(99, 5).is_empty());
    }

    #[test]
    fn category_and_keyword_lookups() {
        let matcher = restaurant();
        let menu = matcher.by_category(&Category::Menu, 5);
        assert_eq!(menu.len(), 2);
        assert_eq!(matcher.by_category(&Category::Menu, 1).len(), 1);

        assert_eq!(
            matcher.categories(),
            vec![Category::Delivery, Category::Hours, Category::Menu]
        );

        let hits = matcher.search_keywords(&["DELIVERY"], 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
    }

    #[test]
    fn stats_count_categories() {
        let stats = restaurant().stats();
        assert_eq!(stats.total_faqs, 5);
        assert_eq!(stats.categories.get("menu"), Some(&2));
        assert_eq!(
            stats.most_common_category,
            Some(("delivery".to_string(), 2))
        );
        assert!(stats.vocabulary_size > 0);
    }

    #[test]
    fn invalid_config_fails_load() {
        let config = MatcherConfig {
            threshold: -0.1,
            ..MatcherConfig::default()
        };
        let corpus = Corpus::new(vec![entry("1", "Do you deliver?", "Yes.", Category::Delivery)]);
        assert!(Matcher::load_with_config(corpus, config).is_err());
    }

    #[test]
    fn term_frequency_weighting_still_matches() {
        let config = MatcherConfig {
            weighting: Weighting::TermFrequency,
            ..MatcherConfig::default()
        };
        let corpus = Corpus::new(vec![
            entry("1", "What time do you open?", "9am.", Category::Hours),
            entry("2", "Do you deliver?", "Yes.", Category::Delivery),
        ]);
        let matcher = Matcher::load_with_config(corpus, config).expect("load");
        assert_eq!(matcher.query("when do you open").index, Some(0));
    }
}
