//! SLA escalation monitor
//!
//! Tracks per-ticket response and resolution timers independently: a
//! ticket can breach resolution even when its response was on time. The
//! periodic scan emits at most one alert per (ticket, type) inside the
//! type's dedup window and is run-exclusive: an overlapping trigger
//! degrades to a skipped run.

use crate::tracker::SlaTracking;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use desk_common::TicketId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Escalation alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Response threshold crossed, limit not yet reached
    ResponseNear,
    /// Resolution threshold crossed, limit not yet reached
    ResolutionNear,
    /// Response limit passed without a first response
    ResponseBreached,
    /// Resolution limit passed without a resolution
    ResolutionBreached,
}

impl AlertType {
    /// Window during which a repeated alert of this type is suppressed
    pub fn dedup_window(&self) -> Duration {
        match self {
            Self::ResponseNear | Self::ResolutionNear => Duration::hours(2),
            Self::ResponseBreached | Self::ResolutionBreached => Duration::hours(4),
        }
    }

    /// Platform label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ResponseNear => "RESPUESTA_POR_VENCER",
            Self::ResolutionNear => "RESOLUCION_POR_VENCER",
            Self::ResponseBreached => "RESPUESTA_VENCIDA",
            Self::ResolutionBreached => "RESOLUCION_VENCIDA",
        }
    }
}

/// Alert emitted by a scan, forwarded to the notifier collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Affected ticket
    pub ticket: TicketId,
    /// Alert kind
    pub alert_type: AlertType,
    /// Scan time that produced the alert
    pub raised_at: DateTime<Utc>,
    /// The deadline or threshold that triggered it
    pub due_at: DateTime<Utc>,
}

/// Persisted record used purely for deduplication
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Affected ticket
    pub ticket: TicketId,
    /// Alert kind
    pub alert_type: AlertType,
    /// When the last alert of this kind was emitted
    pub raised_at: DateTime<Utc>,
}

/// Lock-free monitor counters
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Completed scans
    pub scans_run: AtomicU64,
    /// Scans skipped because another was in progress
    pub scans_skipped: AtomicU64,
    /// Alerts emitted
    pub alerts_emitted: AtomicU64,
    /// Alerts suppressed by deduplication
    pub alerts_suppressed: AtomicU64,
}

/// Tracks SLA records and raises deduplicated escalation alerts
pub struct SlaMonitor {
    tracked: DashMap<TicketId, SlaTracking>,
    records: DashMap<(TicketId, AlertType), AlertRecord>,
    scanning: AtomicBool,
    stats: ScanStats,
}

impl SlaMonitor {
    /// Create an empty monitor
    pub fn new() -> Self {
        Self {
            tracked: DashMap::new(),
            records: DashMap::new(),
            scanning: AtomicBool::new(false),
            stats: ScanStats::default(),
        }
    }

    /// Start tracking a ticket
    pub fn track(&self, tracking: SlaTracking) {
        self.tracked.insert(tracking.ticket, tracking);
    }

    /// Stop tracking a ticket (closed without resolution, deleted, …)
    pub fn untrack(&self, ticket: TicketId) {
        self.tracked.remove(&ticket);
    }

    /// Current tracking record for a ticket
    pub fn tracking(&self, ticket: TicketId) -> Option<SlaTracking> {
        self.tracked.get(&ticket).map(|t| t.value().clone())
    }

    /// Number of tracked tickets
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Monitor counters
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Record the first response.
    ///
    /// Returns the compliance verdict, or `None` when the ticket is not
    /// tracked (a soft degradation, not an error). Idempotent: a second
    /// call keeps the first recorded time.
    pub fn record_first_response(&self, ticket: TicketId, now: DateTime<Utc>) -> Option<bool> {
        let mut entry = match self.tracked.get_mut(&ticket) {
            Some(e) => e,
            None => {
                tracing::debug!(%ticket, "first response on untracked ticket");
                return None;
            }
        };
        if let Some(compliant) = entry.response_compliant {
            return Some(compliant);
        }
        let compliant = now <= entry.response_limit;
        entry.responded_at = Some(now);
        entry.response_compliant = Some(compliant);
        Some(compliant)
    }

    /// Record the resolution. Same conventions as `record_first_response`.
    pub fn record_resolution(&self, ticket: TicketId, now: DateTime<Utc>) -> Option<bool> {
        let mut entry = match self.tracked.get_mut(&ticket) {
            Some(e) => e,
            None => {
                tracing::debug!(%ticket, "resolution on untracked ticket");
                return None;
            }
        };
        if let Some(compliant) = entry.resolution_compliant {
            return Some(compliant);
        }
        let compliant = now <= entry.resolution_limit;
        entry.resolved_at = Some(now);
        entry.resolution_compliant = Some(compliant);
        Some(compliant)
    }

    /// Last alert record for a (ticket, type) pair
    pub fn recent_alert(&self, ticket: TicketId, alert_type: AlertType) -> Option<AlertRecord> {
        self.records.get(&(ticket, alert_type)).map(|r| *r.value())
    }

    /// Run one scan at `now`.
    ///
    /// Run-exclusive: when another scan is in progress this returns empty
    /// and counts a skipped run. Events are sorted by (ticket, type) so a
    /// scan over the same state is reproducible.
    pub fn scan(&self, now: DateTime<Utc>) -> Vec<AlertEvent> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("SLA scan already in progress, skipping this run");
            self.stats.scans_skipped.fetch_add(1, Ordering::Relaxed);
            return Vec::new();
        }

        let mut events = Vec::new();
        for entry in self.tracked.iter() {
            let t = entry.value();

            if t.responded_at.is_none() {
                if now >= t.response_limit {
                    self.emit(&mut events, t.ticket, AlertType::ResponseBreached, now, t.response_limit);
                } else if now >= t.response_alert_at {
                    self.emit(&mut events, t.ticket, AlertType::ResponseNear, now, t.response_limit);
                }
            }

            if t.resolved_at.is_none() {
                if now >= t.resolution_limit {
                    self.emit(&mut events, t.ticket, AlertType::ResolutionBreached, now, t.resolution_limit);
                } else if now >= t.resolution_alert_at {
                    self.emit(&mut events, t.ticket, AlertType::ResolutionNear, now, t.resolution_limit);
                }
            }
        }

        events.sort_by_key(|e| (e.ticket, e.alert_type));
        self.stats.scans_run.fetch_add(1, Ordering::Relaxed);
        self.scanning.store(false, Ordering::Release);

        if !events.is_empty() {
            tracing::warn!(count = events.len(), "SLA escalation alerts raised");
        }
        events
    }

    /// Emit one alert unless a record of the same type sits inside its
    /// dedup window; writes the matching record on emission.
    fn emit(
        &self,
        events: &mut Vec<AlertEvent>,
        ticket: TicketId,
        alert_type: AlertType,
        now: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) {
        let key = (ticket, alert_type);
        if let Some(existing) = self.records.get(&key) {
            if now - existing.raised_at < alert_type.dedup_window() {
                self.stats.alerts_suppressed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        self.records.insert(
            key,
            AlertRecord {
                ticket,
                alert_type,
                raised_at: now,
            },
        );
        events.push(AlertEvent {
            ticket,
            alert_type,
            raised_at: now,
            due_at,
        });
        self.stats.alerts_emitted.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for SlaMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlaMatrix;
    use crate::tracker::SlaCalculator;
    use chrono::TimeZone;
    use desk_common::{ImpactLevel, UrgencyLevel};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    fn tracked_monitor() -> (SlaMonitor, TicketId) {
        // critical/critical builtin: response 30m (alert at 20m),
        // resolution 240m (alert at 180m)
        let calc = SlaCalculator::new(SlaMatrix::builtin());
        let id = TicketId::new();
        let t = calc
            .compute(id, UrgencyLevel::Critical, ImpactLevel::Critical, at(9, 0))
            .unwrap();
        let monitor = SlaMonitor::new();
        monitor.track(t);
        (monitor, id)
    }

    #[test]
    fn test_quiet_before_thresholds() {
        let (monitor, _) = tracked_monitor();
        assert!(monitor.scan(at(9, 5)).is_empty());
    }

    #[test]
    fn test_near_alert_then_dedup_within_window() {
        let (monitor, id) = tracked_monitor();

        let events = monitor.scan(at(9, 25));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ticket, id);
        assert_eq!(events[0].alert_type, AlertType::ResponseNear);

        // a record now backs the dedup decision
        let record = monitor.recent_alert(id, AlertType::ResponseNear).unwrap();
        assert_eq!(record.raised_at, at(9, 25));

        // same window: suppressed
        assert!(monitor.scan(at(9, 28)).is_empty());
        assert_eq!(monitor.stats().alerts_suppressed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_breach_supersedes_near() {
        let (monitor, id) = tracked_monitor();
        let events = monitor.scan(at(9, 45));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ticket, id);
        assert_eq!(events[0].alert_type, AlertType::ResponseBreached);
    }

    #[test]
    fn test_breach_reemitted_after_window() {
        let (monitor, _) = tracked_monitor();
        let first = monitor.scan(at(9, 45));
        assert_eq!(first[0].alert_type, AlertType::ResponseBreached);
        // inside the 4h breach window: quiet
        assert!(monitor.scan(at(12, 0)).iter().all(|e| e.alert_type != AlertType::ResponseBreached));
        // after the window: re-raised
        let later = monitor.scan(at(13, 50));
        assert!(later.iter().any(|e| e.alert_type == AlertType::ResponseBreached));
    }

    #[test]
    fn test_response_recorded_stops_response_alerts() {
        let (monitor, id) = tracked_monitor();
        assert_eq!(monitor.record_first_response(id, at(9, 10)), Some(true));
        // past the response limit, but responded: only resolution timers apply
        let events = monitor.scan(at(9, 45));
        assert!(events.iter().all(|e| {
            e.alert_type != AlertType::ResponseNear && e.alert_type != AlertType::ResponseBreached
        }));
    }

    #[test]
    fn test_resolution_can_breach_independently() {
        let (monitor, id) = tracked_monitor();
        assert_eq!(monitor.record_first_response(id, at(9, 10)), Some(true));
        // resolution limit is 13:00; scan at 13:30
        let events = monitor.scan(at(13, 30));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, AlertType::ResolutionBreached);
    }

    #[test]
    fn test_late_response_noncompliant() {
        let (monitor, id) = tracked_monitor();
        assert_eq!(monitor.record_first_response(id, at(10, 0)), Some(false));
        let t = monitor.tracking(id).unwrap();
        assert_eq!(t.response_compliant, Some(false));
        assert_eq!(t.responded_at, Some(at(10, 0)));
    }

    #[test]
    fn test_recording_is_idempotent() {
        let (monitor, id) = tracked_monitor();
        assert_eq!(monitor.record_first_response(id, at(9, 10)), Some(true));
        assert_eq!(monitor.record_first_response(id, at(11, 0)), Some(true));
        let t = monitor.tracking(id).unwrap();
        assert_eq!(t.responded_at, Some(at(9, 10)));
    }

    #[test]
    fn test_untracked_ticket_is_soft() {
        let monitor = SlaMonitor::new();
        assert!(monitor.record_first_response(TicketId::new(), at(9, 0)).is_none());
        assert!(monitor.record_resolution(TicketId::new(), at(9, 0)).is_none());
    }

    #[test]
    fn test_settled_ticket_raises_nothing() {
        let (monitor, id) = tracked_monitor();
        monitor.record_first_response(id, at(9, 10));
        monitor.record_resolution(id, at(10, 0));
        assert!(monitor.scan(at(20, 0)).is_empty());
    }

    #[test]
    fn test_concurrent_scans_are_exclusive() {
        let (monitor, _) = tracked_monitor();
        let when = at(9, 45);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    monitor.scan(when);
                });
            }
        });
        let run = monitor.stats().scans_run.load(Ordering::Relaxed);
        let skipped = monitor.stats().scans_skipped.load(Ordering::Relaxed);
        assert_eq!(run + skipped, 8);
        // dedup holds even under concurrency: one breach alert total
        assert_eq!(monitor.stats().alerts_emitted.load(Ordering::Relaxed), 1);
    }
}
