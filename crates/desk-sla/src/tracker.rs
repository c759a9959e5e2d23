//! Per-ticket SLA tracking records
//!
//! A record is created once at ticket creation and updated exactly twice in
//! its lifetime: on first response and on resolution. Limits never change
//! after creation.

use crate::config::SlaMatrix;
use chrono::{DateTime, Duration, Utc};
use desk_common::{ImpactLevel, TicketId, UrgencyLevel};
use serde::{Deserialize, Serialize};

/// SLA deadlines and actuals for one ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaTracking {
    /// Tracked ticket
    pub ticket: TicketId,
    /// Clock start (ticket creation)
    pub started_at: DateTime<Utc>,
    /// First response due
    pub response_limit: DateTime<Utc>,
    /// Resolution due
    pub resolution_limit: DateTime<Utc>,
    /// Near-alert threshold for response (≤ response_limit)
    pub response_alert_at: DateTime<Utc>,
    /// Near-alert threshold for resolution (≤ resolution_limit)
    pub resolution_alert_at: DateTime<Utc>,
    /// Actual first response, once recorded
    pub responded_at: Option<DateTime<Utc>>,
    /// Actual resolution, once recorded
    pub resolved_at: Option<DateTime<Utc>>,
    /// Whether the response met its limit, once recorded
    pub response_compliant: Option<bool>,
    /// Whether the resolution met its limit, once recorded
    pub resolution_compliant: Option<bool>,
}

impl SlaTracking {
    /// Both timers have been satisfied or recorded
    pub fn is_settled(&self) -> bool {
        self.responded_at.is_some() && self.resolved_at.is_some()
    }
}

/// Derives tracking records from the SLA matrix
#[derive(Debug, Clone)]
pub struct SlaCalculator {
    matrix: SlaMatrix,
}

impl SlaCalculator {
    /// Create a calculator over a loaded matrix
    pub fn new(matrix: SlaMatrix) -> Self {
        Self { matrix }
    }

    /// The matrix in use
    pub fn matrix(&self) -> &SlaMatrix {
        &self.matrix
    }

    /// Compute deadlines for a ticket classified (urgency, impact) at `now`.
    ///
    /// A missing cell is a soft degradation: the ticket proceeds untracked
    /// and a data-quality warning is logged.
    pub fn compute(
        &self,
        ticket: TicketId,
        urgency: UrgencyLevel,
        impact: ImpactLevel,
        now: DateTime<Utc>,
    ) -> Option<SlaTracking> {
        let Some(target) = self.matrix.get(urgency, impact) else {
            tracing::warn!(
                %ticket,
                urgency = %urgency,
                impact = %impact,
                "no SLA configured for cell, ticket proceeds untracked"
            );
            return None;
        };

        let response_limit = now + Duration::minutes(target.response_minutes);
        let resolution_limit = now + Duration::minutes(target.resolution_minutes);
        // thresholds never precede the clock start
        let response_alert_at =
            (response_limit - Duration::minutes(target.alert_offset_response)).max(now);
        let resolution_alert_at =
            (resolution_limit - Duration::minutes(target.alert_offset_resolution)).max(now);

        Some(SlaTracking {
            ticket,
            started_at: now,
            response_limit,
            resolution_limit,
            response_alert_at,
            resolution_alert_at,
            responded_at: None,
            resolved_at: None,
            response_compliant: None,
            resolution_compliant: None,
        })
    }
}
