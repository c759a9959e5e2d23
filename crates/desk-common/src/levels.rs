//! Urgency, impact and priority levels
//!
//! All three scales are 1..=4. Urgency and impact grow with severity
//! (Low=1 .. Critical=4); priority shrinks (P1=1 is the most urgent).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency of a ticket as perceived by the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    /// Can wait indefinitely
    Low = 1,
    /// Normal queue
    Medium = 2,
    /// Needs attention soon
    High = 3,
    /// Work is stopped
    Critical = 4,
}

/// Breadth of the disruption caused by a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    /// A single user
    Low = 1,
    /// A few users
    Medium = 2,
    /// A team or department
    High = 3,
    /// The whole organization
    Critical = 4,
}

/// Resolution priority derived from urgency and impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    /// Drop everything
    Critical = 1,
    /// Ahead of the normal queue
    High = 2,
    /// Normal queue
    Medium = 3,
    /// Whenever capacity allows
    Low = 4,
}

impl UrgencyLevel {
    /// Numeric level (1..=4)
    pub const fn level(&self) -> u8 {
        *self as u8
    }

    /// Parse a numeric level
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Spanish label as stored by the ticket platform
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "BAJA",
            Self::Medium => "MEDIA",
            Self::High => "ALTA",
            Self::Critical => "CRITICA",
        }
    }
}

impl ImpactLevel {
    /// Numeric level (1..=4)
    pub const fn level(&self) -> u8 {
        *self as u8
    }

    /// Parse a numeric level
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Spanish label as stored by the ticket platform
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "BAJO",
            Self::Medium => "MEDIO",
            Self::High => "ALTO",
            Self::Critical => "CRITICO",
        }
    }
}

impl PriorityLevel {
    /// Numeric level (1..=4, 1 is the most urgent)
    pub const fn level(&self) -> u8 {
        *self as u8
    }

    /// Parse a numeric level
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Critical),
            2 => Some(Self::High),
            3 => Some(Self::Medium),
            4 => Some(Self::Low),
            _ => None,
        }
    }

    /// Spanish label as stored by the ticket platform
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICA",
            Self::High => "ALTA",
            Self::Medium => "MEDIA",
            Self::Low => "BAJA",
        }
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for ImpactLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.level())
    }
}
