//! OpenDesk Assign - technician selection
//!
//! Ranks eligible technicians for a ticket with a three-component score:
//! specialization, current load and 90-day performance. Every component
//! contributes a human-readable reason so an assignment can be audited.

#![warn(missing_docs)]

use desk_common::{CategoryId, TechnicianId, TechnicianProfile};
use serde::{Deserialize, Serialize};

/// Points for a technician specialized in the ticket's category
const SPECIALIST_POINTS: u32 = 40;
/// Points for a generalist (open specialties)
const GENERALIST_POINTS: u32 = 10;
/// Performance points when no 90-day history exists
const NO_HISTORY_POINTS: u32 = 15;

/// Proposed assignment for a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Chosen technician; `None` when nobody is eligible
    pub technician: Option<TechnicianId>,
    /// Total score of the chosen technician
    pub score: u32,
    /// Contributing reasons, for audit and explainability
    pub reasons: Vec<String>,
}

impl Assignment {
    /// The valid "nobody available" outcome
    pub fn unassigned() -> Self {
        Self {
            technician: None,
            score: 0,
            reasons: vec!["sin técnico disponible".into()],
        }
    }
}

/// A scored candidate, kept for retry-on-reserve-failure
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Candidate id
    pub technician: TechnicianId,
    /// Total score
    pub score: u32,
    /// Contributing reasons
    pub reasons: Vec<String>,
}

/// Scores and ranks technicians for a category
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentScorer;

impl AssignmentScorer {
    /// Create a scorer
    pub fn new() -> Self {
        Self
    }

    /// Eligibility: available, under capacity, covering the category
    pub fn eligible<'a>(
        &self,
        roster: &'a [TechnicianProfile],
        category: CategoryId,
    ) -> Vec<&'a TechnicianProfile> {
        roster
            .iter()
            .filter(|t| t.available && t.has_capacity() && t.covers(category))
            .collect()
    }

    /// Score one technician for a category
    pub fn score(&self, tech: &TechnicianProfile, category: CategoryId) -> (u32, Vec<String>) {
        let mut reasons = Vec::with_capacity(3);

        let specialization = if tech.is_specialist(category) {
            reasons.push("especialista en la categoría".into());
            SPECIALIST_POINTS
        } else {
            reasons.push("técnico generalista".into());
            GENERALIST_POINTS
        };

        let ratio = tech.load_ratio();
        let load = if ratio < 0.3 {
            30
        } else if ratio < 0.6 {
            20
        } else if ratio < 0.9 {
            10
        } else {
            5
        };
        reasons.push(format!(
            "carga actual {}/{} ({}%)",
            tech.current_load,
            tech.max_tickets,
            (ratio * 100.0).round() as u32
        ));

        let performance = match tech.performance.get(&category) {
            None => {
                reasons.push("sin historial reciente en la categoría".into());
                NO_HISTORY_POINTS
            }
            Some(window) => {
                let compliance = if window.sla_compliance_pct >= 90.0 {
                    15
                } else if window.sla_compliance_pct >= 70.0 {
                    10
                } else {
                    5
                };
                let satisfaction = if window.satisfaction_avg >= 4.5 {
                    15
                } else if window.satisfaction_avg >= 3.5 {
                    10
                } else {
                    5
                };
                reasons.push(format!(
                    "cumplimiento SLA {:.0}%, satisfacción {:.1} (90 días)",
                    window.sla_compliance_pct, window.satisfaction_avg
                ));
                compliance + satisfaction
            }
        };

        (specialization + load + performance, reasons)
    }

    /// Rank eligible technicians by descending score.
    ///
    /// Ties resolve by lowest technician id, so repeated runs over the same
    /// roster pick the same candidate regardless of roster order.
    pub fn rank(&self, roster: &[TechnicianProfile], category: CategoryId) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = self
            .eligible(roster, category)
            .into_iter()
            .map(|tech| {
                let (score, reasons) = self.score(tech, category);
                ScoredCandidate {
                    technician: tech.id,
                    score,
                    reasons,
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.technician.cmp(&b.technician))
        });
        ranked
    }

    /// Pick the best candidate, or the valid unassigned outcome
    pub fn select(&self, roster: &[TechnicianProfile], category: CategoryId) -> Assignment {
        match self.rank(roster, category).into_iter().next() {
            Some(best) => Assignment {
                technician: Some(best.technician),
                score: best.score,
                reasons: best.reasons,
            },
            None => {
                tracing::info!(%category, "no eligible technician for category");
                Assignment::unassigned()
            }
        }
    }
}
