//! Collaborator traits and in-memory implementations
//!
//! The roster and the notifier are external systems; the engine talks to
//! them through these traits. `StaticDirectory` is the in-memory roster
//! used by tests and demos, and the reference for the capacity rule: the
//! load increment is a conditional update under the entry lock, so two
//! concurrent assignments cannot push a technician past capacity.

use async_trait::async_trait;
use dashmap::DashMap;
use desk_common::{CategoryId, DeskResult, TechnicianId, TechnicianProfile};
use desk_sla::AlertEvent;

/// Roster query and load reservation, backed by the ticket platform
#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    /// Candidates for a category, pre-filtered to available technicians
    async fn roster(&self, category: CategoryId) -> DeskResult<Vec<TechnicianProfile>>;

    /// Atomically claim one slot of the technician's capacity.
    ///
    /// Returns `false` when the technician is already at capacity; the
    /// caller then falls back to the next candidate. SQL-backed
    /// implementations are expected to issue a conditional update
    /// (`UPDATE ... SET carga = carga + 1 WHERE carga < max`).
    async fn reserve(&self, technician: TechnicianId) -> DeskResult<bool>;
}

/// Outbound alert delivery, backed by the notification platform
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Forward a batch of escalation alerts
    async fn deliver(&self, events: &[AlertEvent]) -> DeskResult<()>;
}

/// In-memory roster for tests and demos
#[derive(Default)]
pub struct StaticDirectory {
    technicians: DashMap<TechnicianId, TechnicianProfile>,
}

impl StaticDirectory {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a technician
    pub fn insert(&self, profile: TechnicianProfile) {
        self.technicians.insert(profile.id, profile);
    }

    /// Current profile for a technician
    pub fn get(&self, id: TechnicianId) -> Option<TechnicianProfile> {
        self.technicians.get(&id).map(|t| t.value().clone())
    }

    /// Release one slot (ticket closed or reassigned)
    pub fn release(&self, id: TechnicianId) {
        if let Some(mut t) = self.technicians.get_mut(&id) {
            t.current_load = t.current_load.saturating_sub(1);
        }
    }
}

#[async_trait]
impl TechnicianDirectory for StaticDirectory {
    async fn roster(&self, category: CategoryId) -> DeskResult<Vec<TechnicianProfile>> {
        Ok(self
            .technicians
            .iter()
            .filter(|t| t.available && t.covers(category))
            .map(|t| t.value().clone())
            .collect())
    }

    async fn reserve(&self, technician: TechnicianId) -> DeskResult<bool> {
        // the entry lock makes read-check-increment atomic
        match self.technicians.get_mut(&technician) {
            Some(mut t) if t.current_load < t.max_tickets => {
                t.current_load += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Alert sink that only logs; the default when no notifier is wired
#[derive(Default)]
pub struct TracingSink;

#[async_trait]
impl AlertSink for TracingSink {
    async fn deliver(&self, events: &[AlertEvent]) -> DeskResult<()> {
        for e in events {
            tracing::warn!(
                ticket = %e.ticket,
                alert = e.alert_type.label(),
                due = %e.due_at,
                "SLA alert"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(load: u32, max: u32) -> TechnicianProfile {
        TechnicianProfile {
            id: TechnicianId::new(),
            name: "Luis".into(),
            specialties: vec![CategoryId(1)],
            current_load: load,
            max_tickets: max,
            available: true,
            performance: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_reserve_respects_capacity() {
        let dir = StaticDirectory::new();
        let t = profile(1, 2);
        let id = t.id;
        dir.insert(t);

        assert!(dir.reserve(id).await.unwrap());
        assert!(!dir.reserve(id).await.unwrap());
        assert_eq!(dir.get(id).unwrap().current_load, 2);
    }

    #[tokio::test]
    async fn test_reserve_unknown_technician_fails_soft() {
        let dir = StaticDirectory::new();
        assert!(!dir.reserve(TechnicianId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_floors_at_zero() {
        let dir = StaticDirectory::new();
        let t = profile(0, 2);
        let id = t.id;
        dir.insert(t);
        dir.release(id);
        assert_eq!(dir.get(id).unwrap().current_load, 0);
    }

    #[tokio::test]
    async fn test_roster_filters_category() {
        let dir = StaticDirectory::new();
        dir.insert(profile(0, 2)); // specialty cat 1
        let mut other = profile(0, 2);
        other.specialties = vec![CategoryId(9)];
        dir.insert(other);

        let roster = dir.roster(CategoryId(1)).await.unwrap();
        assert_eq!(roster.len(), 1);
    }
}
