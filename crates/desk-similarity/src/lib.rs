//! OpenDesk Similarity - near-duplicate detection
//!
//! Blends three symmetric primitives over normalized ticket text:
//! frequency-vector cosine, token-set Jaccard and normalized Levenshtein.
//! The engine ranks candidates and stays cutoff-agnostic; callers apply
//! their own threshold.

#![warn(missing_docs)]

use desk_common::TicketId;
use desk_text::Normalizer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Weight of the cosine component in the blended score
const COSINE_WEIGHT: f64 = 0.5;
/// Weight of the Jaccard component
const JACCARD_WEIGHT: f64 = 0.3;
/// Weight of the Levenshtein component
const LEVENSHTEIN_WEIGHT: f64 = 0.2;

/// Per-component breakdown of a similarity score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    /// Frequency-vector cosine in [0,1]
    pub cosine: f64,
    /// Token-set Jaccard in [0,1]
    pub jaccard: f64,
    /// Normalized Levenshtein ratio in [0,1]
    pub levenshtein: f64,
    /// 0.5·cosine + 0.3·jaccard + 0.2·levenshtein
    pub combined: f64,
}

/// A ranked duplicate candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    /// Candidate ticket id
    pub ticket: TicketId,
    /// Blended similarity in [0,1]
    pub score: f64,
    /// Component scores, kept for explainability
    pub breakdown: SimilarityBreakdown,
}

/// Computes blended similarity between two ticket texts
#[derive(Clone)]
pub struct SimilarityEngine {
    normalizer: Arc<Normalizer>,
}

impl SimilarityEngine {
    /// Create an engine sharing the triage normalizer
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self { normalizer }
    }

    /// Frequency-vector cosine over the union vocabulary; 0.0 when either
    /// side has no tokens
    pub fn cosine(&self, a: &str, b: &str) -> f64 {
        let na = self.normalizer.normalize(a);
        let nb = self.normalizer.normalize(b);
        let fa = frequencies(&na);
        let fb = frequencies(&nb);
        cosine_of(&fa, &fb)
    }

    /// Token-set Jaccard; 0.0 for two empty sets by convention
    pub fn jaccard(&self, a: &str, b: &str) -> f64 {
        let sa: HashSet<String> = self.normalizer.normalize(a).into_iter().collect();
        let sb: HashSet<String> = self.normalizer.normalize(b).into_iter().collect();
        jaccard_of(&sa, &sb)
    }

    /// Normalized Levenshtein ratio over the cleaned (unstemmed) text;
    /// 1.0 when both strings are empty
    pub fn levenshtein_ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(&self.normalizer.clean(a), &self.normalizer.clean(b))
    }

    /// Blended similarity in [0,1]
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.breakdown(a, b).combined
    }

    /// Blended similarity with its per-component breakdown
    pub fn breakdown(&self, a: &str, b: &str) -> SimilarityBreakdown {
        let clean_a = self.normalizer.clean(a);
        let clean_b = self.normalizer.clean(b);

        // two blank texts are identical by convention
        if clean_a.is_empty() && clean_b.is_empty() {
            return SimilarityBreakdown {
                cosine: 1.0,
                jaccard: 1.0,
                levenshtein: 1.0,
                combined: 1.0,
            };
        }

        let cosine = self.cosine(a, b);
        let jaccard = self.jaccard(a, b);
        let levenshtein = strsim::normalized_levenshtein(&clean_a, &clean_b);
        let combined = COSINE_WEIGHT * cosine
            + JACCARD_WEIGHT * jaccard
            + LEVENSHTEIN_WEIGHT * levenshtein;

        SimilarityBreakdown {
            cosine,
            jaccard,
            levenshtein,
            combined,
        }
    }

    /// Rank candidate tickets by descending similarity to `text`.
    ///
    /// Ties resolve by ticket id so repeated runs over the same candidate
    /// set produce the same order. Cutoff-agnostic: callers filter.
    pub fn rank_candidates(
        &self,
        text: &str,
        candidates: &[(TicketId, String)],
    ) -> Vec<DuplicateCandidate> {
        let mut ranked: Vec<DuplicateCandidate> = candidates
            .iter()
            .map(|(id, body)| {
                let breakdown = self.breakdown(text, body);
                DuplicateCandidate {
                    ticket: *id,
                    score: breakdown.combined,
                    breakdown,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.ticket.cmp(&b.ticket))
        });
        ranked
    }
}

fn frequencies(tokens: &[String]) -> HashMap<&str, usize> {
    let mut freq = HashMap::new();
    for t in tokens {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }
    freq
}

fn cosine_of(fa: &HashMap<&str, usize>, fb: &HashMap<&str, usize>) -> f64 {
    if fa.is_empty() || fb.is_empty() {
        return 0.0;
    }

    let vocabulary: HashSet<&str> = fa.keys().chain(fb.keys()).copied().collect();
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in vocabulary {
        let x = *fa.get(term).unwrap_or(&0) as f64;
        let y = *fb.get(term).unwrap_or(&0) as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn jaccard_of(sa: &HashSet<String>, sb: &HashSet<String>) -> f64 {
    if sa.is_empty() && sb.is_empty() {
        return 0.0;
    }
    let intersection = sa.intersection(sb).count() as f64;
    let union = sa.union(sb).count() as f64;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimilarityEngine {
        SimilarityEngine::new(Arc::new(Normalizer::new()))
    }

    #[test]
    fn test_identical_text_scores_one() {
        let e = engine();
        let text = "la impresora del tercer piso no funciona";
        assert!((e.score(text, text) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pair_scores_one_by_convention() {
        let e = engine();
        assert!((e.score("", "") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let e = engine();
        let a = "no puedo entrar al correo desde ayer";
        let b = "el correo no abre en mi computadora";
        assert!((e.score(a, b) - e.score(b, a)).abs() < 1e-12);
        assert!((e.cosine(a, b) - e.cosine(b, a)).abs() < 1e-12);
        assert!((e.jaccard(a, b) - e.jaccard(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_texts_score_low() {
        let e = engine();
        let score = e.score(
            "impresora dañada en contabilidad",
            "vpn rechaza certificado remoto",
        );
        assert!(score < 0.3);
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let e = engine();
        for (a, b) in [
            ("", "algo"),
            ("texto corto", "otro texto distinto"),
            ("misma cosa", "misma cosa"),
        ] {
            let s = e.score(a, b);
            assert!((0.0..=1.0).contains(&s), "{s} out of range");
        }
    }

    #[test]
    fn test_near_duplicates_rank_first() {
        let e = engine();
        let a = TicketId::new();
        let b = TicketId::new();
        let candidates = vec![
            (a, "servidor de correo caído para todos".to_string()),
            (b, "solicitud de monitor nuevo".to_string()),
        ];
        let ranked = e.rank_candidates("correo caído, nadie puede enviar", &candidates);
        assert_eq!(ranked[0].ticket, a);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_rank_is_deterministic_on_ties() {
        let e = engine();
        let mut ids = vec![TicketId::new(), TicketId::new(), TicketId::new()];
        ids.sort();
        let candidates: Vec<(TicketId, String)> = ids
            .iter()
            .map(|id| (*id, "mismo texto idéntico".to_string()))
            .collect();
        let ranked = e.rank_candidates("mismo texto idéntico", &candidates);
        let order: Vec<TicketId> = ranked.iter().map(|c| c.ticket).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_breakdown_components_in_range() {
        let e = engine();
        let b = e.breakdown("acceso a carpeta", "no tengo acceso a la carpeta compartida");
        for v in [b.cosine, b.jaccard, b.levenshtein, b.combined] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(b.combined > 0.0);
    }
}
