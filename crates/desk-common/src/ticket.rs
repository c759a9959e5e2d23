//! Ticket and technician read-models
//!
//! Tickets are owned by the persistence collaborator; the triage core only
//! reads and proposes the classification-relevant fields through these
//! snapshots.

use crate::levels::{ImpactLevel, PriorityLevel, UrgencyLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Ticket identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing id
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying uuid
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Technician identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TechnicianId(Uuid);

impl TechnicianId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing id
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying uuid
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TechnicianId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TechnicianId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category identifier as assigned by the rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat-{}", self.0)
    }
}

/// Ticket type as classified at intake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    /// Something is broken
    Incidente,
    /// Request for something new
    Solicitud,
    /// Question, nothing broken
    #[default]
    Consulta,
    /// Recurring incident with an unknown root cause
    Problema,
}

impl TicketType {
    /// Spanish label as stored by the ticket platform
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Incidente => "INCIDENTE",
            Self::Solicitud => "SOLICITUD",
            Self::Consulta => "CONSULTA",
            Self::Problema => "PROBLEMA",
        }
    }

    /// Parse a platform label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "INCIDENTE" => Some(Self::Incidente),
            "SOLICITUD" => Some(Self::Solicitud),
            "CONSULTA" => Some(Self::Consulta),
            "PROBLEMA" => Some(Self::Problema),
            _ => None,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Created, not yet assigned
    #[default]
    Nuevo,
    /// Assigned to a technician
    Asignado,
    /// Being worked on
    EnProceso,
    /// Waiting on the requester or a third party
    EnEspera,
    /// Solved, pending confirmation
    Resuelto,
    /// Closed
    Cerrado,
}

impl TicketStatus {
    /// Terminal states stop SLA monitoring
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resuelto | Self::Cerrado)
    }
}

/// Read-model of a ticket as consumed by the triage core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSnapshot {
    /// Ticket id
    pub id: TicketId,
    /// Raw title
    pub title: String,
    /// Raw description
    pub description: String,
    /// Classified category
    pub category: CategoryId,
    /// Classified type
    pub ticket_type: TicketType,
    /// Classified urgency
    pub urgency: UrgencyLevel,
    /// Classified impact
    pub impact: ImpactLevel,
    /// Derived priority
    pub priority: PriorityLevel,
    /// Assigned technician, if any
    pub assignee: Option<TechnicianId>,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// First public response time
    pub first_response_at: Option<DateTime<Utc>>,
    /// Resolution time
    pub resolved_at: Option<DateTime<Utc>>,
}

/// 90-day performance aggregate for one technician in one category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceWindow {
    /// Percentage of tickets resolved within SLA (0..=100)
    pub sla_compliance_pct: f64,
    /// Average satisfaction rating (1..=5)
    pub satisfaction_avg: f64,
}

/// Technician as seen by the assignment scorer
///
/// Load is mutated externally by the ticket lifecycle; the core only reads
/// it, except when proposing an assignment through the directory's
/// conditional reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianProfile {
    /// Technician id
    pub id: TechnicianId,
    /// Display name
    pub name: String,
    /// Categories this technician specializes in; empty means open to all
    pub specialties: Vec<CategoryId>,
    /// Tickets currently assigned
    pub current_load: u32,
    /// Assignment capacity
    pub max_tickets: u32,
    /// Whether the technician is taking new tickets
    pub available: bool,
    /// 90-day aggregates keyed by category
    #[serde(default)]
    pub performance: HashMap<CategoryId, PerformanceWindow>,
}

impl TechnicianProfile {
    /// Load as a fraction of capacity; 1.0 when capacity is zero
    pub fn load_ratio(&self) -> f64 {
        if self.max_tickets == 0 {
            return 1.0;
        }
        f64::from(self.current_load) / f64::from(self.max_tickets)
    }

    /// Whether another ticket fits
    pub const fn has_capacity(&self) -> bool {
        self.current_load < self.max_tickets
    }

    /// Whether the technician covers the category (empty specialties = open)
    pub fn covers(&self, category: CategoryId) -> bool {
        self.specialties.is_empty() || self.specialties.contains(&category)
    }

    /// Whether the technician specializes in the category
    pub fn is_specialist(&self, category: CategoryId) -> bool {
        self.specialties.contains(&category)
    }
}
