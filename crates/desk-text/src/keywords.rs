//! Keyword matching and frequency statistics
//!
//! `KeywordScanner` pre-compiles a keyword list into an Aho-Corasick
//! automaton for O(n) multi-keyword matching over the normalized token
//! stream. `KeywordMatcher` adds term-frequency and TF-IDF extraction.

use crate::normalizer::Normalizer;
use aho_corasick::AhoCorasick;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Pre-compiled keyword set for multi-keyword matching
///
/// Keywords are normalized through the same pipeline as incoming text, so a
/// rule written as "caído" matches "caido", "Caído" and other inflections
/// that share the stem. Multi-word keywords match as contiguous token runs.
pub struct KeywordScanner {
    /// Automaton over space-padded normalized phrases; `None` when no
    /// keyword survived normalization
    automaton: Option<AhoCorasick>,
    /// Original keyword per automaton pattern
    keyword_ids: Vec<usize>,
    /// Keywords as given, order preserved
    keywords: Vec<String>,
}

impl KeywordScanner {
    /// Build a scanner from a keyword list
    pub fn build(normalizer: &Normalizer, keywords: &[String]) -> Self {
        let mut patterns = Vec::new();
        let mut keyword_ids = Vec::new();

        for (idx, keyword) in keywords.iter().enumerate() {
            let phrase = normalizer.normalize(keyword).join(" ");
            if phrase.is_empty() {
                tracing::debug!(keyword = %keyword, "keyword normalizes to nothing, skipped");
                continue;
            }
            patterns.push(format!(" {phrase} "));
            keyword_ids.push(idx);
        }

        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&patterns).expect("failed to build keyword automaton"))
        };

        Self {
            automaton,
            keyword_ids,
            keywords: keywords.to_vec(),
        }
    }

    /// Keywords whose normalized form occurs in `tokens`, in list order
    pub fn matched(&self, tokens: &[String]) -> Vec<String> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        if tokens.is_empty() {
            return Vec::new();
        }

        let haystack = format!(" {} ", tokens.join(" "));
        let mut hits: HashSet<usize> = HashSet::new();
        for m in automaton.find_overlapping_iter(&haystack) {
            hits.insert(self.keyword_ids[m.pattern().as_usize()]);
        }

        let mut indices: Vec<usize> = hits.into_iter().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|i| self.keywords[i].clone())
            .collect()
    }

}

/// Keyword statistics over normalized ticket text
#[derive(Clone)]
pub struct KeywordMatcher {
    normalizer: Arc<Normalizer>,
}

impl KeywordMatcher {
    /// Create a matcher sharing the engine's normalizer
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self { normalizer }
    }

    /// Subset of `keywords` present in `text`, order preserved from the list
    pub fn matched_keywords(&self, text: &str, keywords: &[String]) -> Vec<String> {
        let tokens = self.normalizer.normalize(text);
        KeywordScanner::build(&self.normalizer, keywords).matched(&tokens)
    }

    /// Occurrences of each normalized token in `text`
    pub fn term_frequency(&self, text: &str) -> HashMap<String, usize> {
        let mut freq = HashMap::new();
        for token in self.normalizer.normalize(text) {
            *freq.entry(token).or_insert(0) += 1;
        }
        freq
    }

    /// The `n` most frequent normalized tokens, count then lexicographic
    pub fn top_keywords(&self, text: &str, n: usize) -> Vec<String> {
        let mut entries: Vec<(String, usize)> = self.term_frequency(text).into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.into_iter().take(n).map(|(t, _)| t).collect()
    }

    /// TF-IDF of each token of `text` against `corpus`
    ///
    /// tf(token) / token_count × ln(|corpus| / (1 + docs containing token)).
    /// An empty corpus yields an empty map.
    pub fn tf_idf(&self, text: &str, corpus: &[String]) -> HashMap<String, f64> {
        if corpus.is_empty() {
            return HashMap::new();
        }

        let tokens = self.normalizer.normalize(text);
        if tokens.is_empty() {
            return HashMap::new();
        }
        let token_count = tokens.len() as f64;

        let doc_sets: Vec<HashSet<String>> = corpus
            .iter()
            .map(|doc| self.normalizer.normalize(doc).into_iter().collect())
            .collect();
        let corpus_len = doc_sets.len() as f64;

        let mut tf = HashMap::new();
        for token in &tokens {
            *tf.entry(token.clone()).or_insert(0usize) += 1;
        }

        tf.into_iter()
            .map(|(token, count)| {
                let docs_with = doc_sets.iter().filter(|s| s.contains(&token)).count() as f64;
                let idf = (corpus_len / (1.0 + docs_with)).ln();
                let score = (count as f64 / token_count) * idf;
                (token, score)
            })
            .collect()
    }
}
