//! SLA configuration matrix
//!
//! Static data keyed by (urgency, impact). Loaded once at engine
//! construction; cells may be missing, in which case the affected tickets
//! proceed untracked.

use desk_common::{DeskError, DeskResult, ImpactLevel, UrgencyLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response and resolution targets for one urgency × impact cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlaTarget {
    /// Minutes until the first response is due
    pub response_minutes: i64,
    /// Minutes until resolution is due
    pub resolution_minutes: i64,
    /// Minutes before the response limit at which a near alert fires
    pub alert_offset_response: i64,
    /// Minutes before the resolution limit at which a near alert fires
    pub alert_offset_resolution: i64,
}

/// One configured cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlaMatrixEntry {
    /// Urgency level 1..=4
    pub urgency: u8,
    /// Impact level 1..=4
    pub impact: u8,
    /// Targets for this cell
    #[serde(flatten)]
    pub target: SlaTarget,
}

/// The urgency × impact SLA matrix
#[derive(Debug, Clone)]
pub struct SlaMatrix {
    cells: HashMap<(u8, u8), SlaTarget>,
}

impl SlaMatrix {
    /// Built-in matrix: four target tiers following the priority shape
    pub fn builtin() -> Self {
        // (response, resolution, offset_response, offset_resolution) in minutes
        const TIERS: [(i64, i64, i64, i64); 4] = [
            (30, 240, 10, 60),     // tier 1: drop everything
            (60, 480, 15, 60),     // tier 2
            (240, 1440, 30, 120),  // tier 3
            (480, 2880, 60, 240),  // tier 4
        ];
        // same shape as the priority matrix: rows urgency, columns impact
        const TIER_OF: [[usize; 4]; 4] = [
            [3, 3, 2, 2],
            [3, 2, 2, 1],
            [2, 2, 1, 0],
            [2, 1, 0, 0],
        ];

        let mut cells = HashMap::with_capacity(16);
        for (u, row) in TIER_OF.iter().enumerate() {
            for (i, tier) in row.iter().enumerate() {
                let (response, resolution, off_resp, off_reso) = TIERS[*tier];
                cells.insert(
                    (u as u8 + 1, i as u8 + 1),
                    SlaTarget {
                        response_minutes: response,
                        resolution_minutes: resolution,
                        alert_offset_response: off_resp,
                        alert_offset_resolution: off_reso,
                    },
                );
            }
        }
        Self { cells }
    }

    /// Build from configuration entries
    pub fn from_entries(entries: &[SlaMatrixEntry]) -> DeskResult<Self> {
        if entries.is_empty() {
            return Err(DeskError::Config("SLA matrix is entirely empty".into()));
        }
        let mut cells = HashMap::with_capacity(entries.len());
        for e in entries {
            if UrgencyLevel::from_level(e.urgency).is_none() {
                return Err(DeskError::InvalidLevel(e.urgency));
            }
            if ImpactLevel::from_level(e.impact).is_none() {
                return Err(DeskError::InvalidLevel(e.impact));
            }
            if e.target.response_minutes <= 0 || e.target.resolution_minutes <= 0 {
                return Err(DeskError::Config(format!(
                    "non-positive SLA minutes for cell ({}, {})",
                    e.urgency, e.impact
                )));
            }
            cells.insert((e.urgency, e.impact), e.target);
        }
        Ok(Self { cells })
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> DeskResult<Self> {
        let entries: Vec<SlaMatrixEntry> =
            serde_json::from_str(json).map_err(|e| DeskError::Config(e.to_string()))?;
        Self::from_entries(&entries)
    }

    /// Target for a cell, if configured
    pub fn get(&self, urgency: UrgencyLevel, impact: ImpactLevel) -> Option<SlaTarget> {
        self.cells.get(&(urgency.level(), impact.level())).copied()
    }

    /// Whether all 16 cells are configured
    pub fn is_complete(&self) -> bool {
        (1..=4u8).all(|u| (1..=4u8).all(|i| self.cells.contains_key(&(u, i))))
    }
}

impl Default for SlaMatrix {
    fn default() -> Self {
        Self::builtin()
    }
}
