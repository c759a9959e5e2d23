//! Single-dimension classifier
//!
//! Scores every class of a rule table as `weight × matched_keywords` and
//! picks the maximum. Deterministic by construction: equal scores resolve
//! to the class listed first in the table, never to iteration accidents.

use crate::rules::{ClassRule, DimensionRules};
use desk_text::{KeywordScanner, Normalizer};
use serde::{Deserialize, Serialize};

/// Outcome of classifying one dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionOutcome {
    /// Winning class id (level for urgency/impact)
    pub id: u32,
    /// Winning class label
    pub label: String,
    /// Confidence 0..=100
    pub confidence: u8,
    /// Keywords that justified the winner, in rule order
    pub matched: Vec<String>,
}

struct CompiledClass {
    rule: ClassRule,
    scanner: KeywordScanner,
}

/// Classifier for one dimension, compiled from its rule table
pub struct DimensionClassifier {
    name: String,
    default_label: String,
    confidence_normalizer: u32,
    classes: Vec<CompiledClass>,
}

impl DimensionClassifier {
    /// Compile a rule table; keyword automatons are built once here
    pub fn new(normalizer: &Normalizer, rules: DimensionRules) -> Self {
        let classes = rules
            .classes
            .into_iter()
            .map(|rule| CompiledClass {
                scanner: KeywordScanner::build(normalizer, &rule.keywords),
                rule,
            })
            .collect();
        Self {
            name: rules.name,
            default_label: rules.default_label,
            confidence_normalizer: rules.confidence_normalizer.max(1),
            classes,
        }
    }

    /// Dimension name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify a normalized token sequence
    pub fn classify(&self, tokens: &[String]) -> DimensionOutcome {
        let mut winner: Option<(usize, u64, Vec<String>)> = None;
        let mut total_matches: u64 = 0;

        for (idx, class) in self.classes.iter().enumerate() {
            let matched = class.scanner.matched(tokens);
            let count = matched.len() as u64;
            total_matches += count;

            let score = u64::from(class.rule.weight) * count;
            if score == 0 {
                continue;
            }
            // strict comparison keeps the earlier class on ties
            if winner.as_ref().map_or(true, |(_, best, _)| score > *best) {
                winner = Some((idx, score, matched));
            }
        }

        match winner {
            Some((idx, _, matched)) => {
                let rule = &self.classes[idx].rule;
                let confidence =
                    (100 * total_matches / u64::from(self.confidence_normalizer)).min(100) as u8;
                DimensionOutcome {
                    id: rule.id,
                    label: rule.label.clone(),
                    confidence,
                    matched,
                }
            }
            None => self.default_outcome(),
        }
    }

    /// Outcome when nothing matched: the documented default, confidence 0
    fn default_outcome(&self) -> DimensionOutcome {
        let default = self
            .classes
            .iter()
            .find(|c| c.rule.label == self.default_label);
        match default {
            Some(c) => DimensionOutcome {
                id: c.rule.id,
                label: c.rule.label.clone(),
                confidence: 0,
                matched: Vec::new(),
            },
            None => {
                tracing::debug!(
                    dimension = %self.name,
                    default = %self.default_label,
                    "default class not present in table"
                );
                DimensionOutcome {
                    id: 0,
                    label: self.default_label.clone(),
                    confidence: 0,
                    matched: Vec::new(),
                }
            }
        }
    }
}
