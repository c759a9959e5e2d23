//! Urgency × impact → priority matrix
//!
//! A pure 16-entry lookup. A user-supplied partial table never fails a
//! classification: missing cells fall back to Medium and log a
//! data-quality warning.

use crate::rules::MatrixEntry;
use desk_common::{DeskError, DeskResult, ImpactLevel, PriorityLevel, UrgencyLevel};
use std::collections::HashMap;

/// Priority lookup table keyed by (urgency level, impact level)
#[derive(Debug, Clone)]
pub struct PriorityMatrix {
    cells: HashMap<(u8, u8), PriorityLevel>,
}

impl PriorityMatrix {
    /// The complete built-in table
    pub fn builtin() -> Self {
        // rows: urgency 1..=4, columns: impact 1..=4
        const TABLE: [[u8; 4]; 4] = [
            [4, 4, 3, 3], // urgency Low
            [4, 3, 3, 2], // urgency Medium
            [3, 3, 2, 1], // urgency High
            [3, 2, 1, 1], // urgency Critical
        ];

        let mut cells = HashMap::with_capacity(16);
        for (u, row) in TABLE.iter().enumerate() {
            for (i, p) in row.iter().enumerate() {
                let priority = PriorityLevel::from_level(*p)
                    .expect("builtin priority table holds levels 1..=4");
                cells.insert((u as u8 + 1, i as u8 + 1), priority);
            }
        }
        Self { cells }
    }

    /// Build from configuration entries, rejecting out-of-range levels
    pub fn from_entries(entries: &[MatrixEntry]) -> DeskResult<Self> {
        let mut cells = HashMap::with_capacity(entries.len());
        for e in entries {
            if UrgencyLevel::from_level(e.urgency).is_none() {
                return Err(DeskError::InvalidLevel(e.urgency));
            }
            if ImpactLevel::from_level(e.impact).is_none() {
                return Err(DeskError::InvalidLevel(e.impact));
            }
            let priority =
                PriorityLevel::from_level(e.priority).ok_or(DeskError::InvalidLevel(e.priority))?;
            cells.insert((e.urgency, e.impact), priority);
        }
        if cells.is_empty() {
            return Err(DeskError::Config("priority matrix is empty".into()));
        }
        Ok(Self { cells })
    }

    /// Whether all 16 combinations are defined
    pub fn is_complete(&self) -> bool {
        (1..=4u8).all(|u| (1..=4u8).all(|i| self.cells.contains_key(&(u, i))))
    }

    /// Resolve a priority; a missing cell degrades to Medium with a warning
    pub fn resolve(&self, urgency: UrgencyLevel, impact: ImpactLevel) -> PriorityLevel {
        match self.cells.get(&(urgency.level(), impact.level())) {
            Some(p) => *p,
            None => {
                tracing::warn!(
                    urgency = %urgency,
                    impact = %impact,
                    "priority matrix has no entry for this cell, using MEDIA"
                );
                PriorityLevel::Medium
            }
        }
    }
}

impl Default for PriorityMatrix {
    fn default() -> Self {
        Self::builtin()
    }
}
