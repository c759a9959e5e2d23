//! The triage engine
//!
//! Construction wires every component once at process start; nothing in
//! here is a global. Classification, similarity and scoring are pure and
//! safe to call from many concurrent requests; the only shared mutable
//! state is the SLA monitor's tracking store and the roster's load counts,
//! both guarded at their own layer.

use crate::config::EngineConfig;
use crate::directory::{AlertSink, TechnicianDirectory};
use chrono::{DateTime, Utc};
use desk_assign::{Assignment, AssignmentScorer};
use desk_classify::{ClassificationOrchestrator, ClassificationResult, Validation};
use desk_common::{CategoryId, DeskResult, ImpactLevel, TicketId, TicketSnapshot, UrgencyLevel};
use desk_similarity::{DuplicateCandidate, SimilarityEngine};
use desk_sla::{AlertEvent, SlaCalculator, SlaMonitor, SlaTracking};
use desk_text::{KeywordMatcher, Normalizer};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Everything the intake path produced for one ticket
#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    /// The triaged ticket
    pub ticket: TicketId,
    /// Full classification
    pub classification: ClassificationResult,
    /// Review verdict
    pub validation: Validation,
    /// Proposed assignment (may be unassigned)
    pub assignment: Assignment,
    /// SLA tracking, when the matrix covers the classified cell
    pub sla: Option<SlaTracking>,
}

/// The triage engine facade
pub struct TriageEngine {
    matcher: KeywordMatcher,
    orchestrator: ClassificationOrchestrator,
    similarity: SimilarityEngine,
    scorer: AssignmentScorer,
    calculator: SlaCalculator,
    monitor: SlaMonitor,
    directory: Arc<dyn TechnicianDirectory>,
    sink: Arc<dyn AlertSink>,
}

impl TriageEngine {
    /// Build the engine from loaded configuration.
    ///
    /// Fails only when the configuration is unusable (no keyword rules at
    /// all, or an empty SLA matrix was supplied); everything else degrades
    /// at runtime instead.
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn TechnicianDirectory>,
        sink: Arc<dyn AlertSink>,
    ) -> DeskResult<Self> {
        let normalizer = Arc::new(Normalizer::new());
        let orchestrator =
            ClassificationOrchestrator::new(Arc::clone(&normalizer), config.rules)?;
        Ok(Self {
            matcher: KeywordMatcher::new(Arc::clone(&normalizer)),
            orchestrator,
            similarity: SimilarityEngine::new(normalizer),
            scorer: AssignmentScorer::new(),
            calculator: SlaCalculator::new(config.sla),
            monitor: SlaMonitor::new(),
            directory,
            sink,
        })
    }

    /// Classify raw title and description
    pub fn classify(&self, title: &str, description: &str) -> ClassificationResult {
        self.orchestrator.classify(title, description)
    }

    /// Apply the review policy to a classification
    pub fn validate_classification(&self, result: &ClassificationResult) -> Validation {
        self.orchestrator.validate(result)
    }

    /// Blended similarity between two texts, in [0,1]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.similarity.score(a, b)
    }

    /// Rank duplicate candidates for a ticket text; callers apply a cutoff
    pub fn find_duplicates(
        &self,
        text: &str,
        candidates: &[(TicketId, String)],
    ) -> Vec<DuplicateCandidate> {
        self.similarity.rank_candidates(text, candidates)
    }

    /// Top-N frequent normalized tokens of a text, as generic keywords
    pub fn extract_keywords(&self, text: &str, n: usize) -> Vec<String> {
        self.matcher.top_keywords(text, n)
    }

    /// TF-IDF scores of a text against a corpus of ticket texts
    pub fn keyword_scores(&self, text: &str, corpus: &[String]) -> HashMap<String, f64> {
        self.matcher.tf_idf(text, corpus)
    }

    /// Pick the best available technician for a category.
    ///
    /// Candidates are tried in score order; each is claimed through the
    /// directory's conditional reserve, so a technician that filled up
    /// between the roster read and the claim simply falls through to the
    /// next candidate. An empty roster yields the valid unassigned outcome.
    pub async fn suggest_technician(&self, category: CategoryId) -> DeskResult<Assignment> {
        let roster = self.directory.roster(category).await?;
        for candidate in self.scorer.rank(&roster, category) {
            if self.directory.reserve(candidate.technician).await? {
                return Ok(Assignment {
                    technician: Some(candidate.technician),
                    score: candidate.score,
                    reasons: candidate.reasons,
                });
            }
            tracing::debug!(
                technician = %candidate.technician,
                "candidate filled up during assignment, trying next"
            );
        }
        Ok(Assignment::unassigned())
    }

    /// Compute SLA deadlines for a ticket and start tracking them.
    ///
    /// `None` when the matrix has no cell for the classification; the
    /// ticket proceeds untracked.
    pub fn compute_sla(
        &self,
        ticket: TicketId,
        urgency: UrgencyLevel,
        impact: ImpactLevel,
        now: DateTime<Utc>,
    ) -> Option<SlaTracking> {
        let tracking = self.calculator.compute(ticket, urgency, impact, now)?;
        self.monitor.track(tracking.clone());
        Some(tracking)
    }

    /// Run one SLA scan and forward any alerts to the sink
    pub async fn run_sla_scan(&self, now: DateTime<Utc>) -> DeskResult<Vec<AlertEvent>> {
        let events = self.monitor.scan(now);
        if !events.is_empty() {
            self.sink.deliver(&events).await?;
        }
        Ok(events)
    }

    /// The SLA monitor, for response/resolution recording and stats
    pub fn monitor(&self) -> &SlaMonitor {
        &self.monitor
    }

    /// Reconcile SLA tracking after a ticket lifecycle change.
    ///
    /// Called by the persistence layer once it has written the ticket:
    /// records first-response and resolution times against the tracked
    /// limits, and drops tracking for tickets that reach a terminal status
    /// without a recorded resolution.
    pub fn sync_ticket(&self, ticket: &TicketSnapshot) {
        if let Some(responded) = ticket.first_response_at {
            self.monitor.record_first_response(ticket.id, responded);
        }
        if let Some(resolved) = ticket.resolved_at {
            self.monitor.record_resolution(ticket.id, resolved);
        } else if ticket.status.is_terminal() {
            self.monitor.untrack(ticket.id);
        }
    }

    /// Full intake path: classify, validate, assign, compute SLA
    pub async fn triage(
        &self,
        ticket: TicketId,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> DeskResult<TriageOutcome> {
        let classification = self.classify(title, description);
        let validation = self.validate_classification(&classification);
        let assignment = self
            .suggest_technician(classification.category_id())
            .await?;
        let sla = self.compute_sla(
            ticket,
            classification.urgency_level(),
            classification.impact_level(),
            now,
        );

        tracing::info!(
            %ticket,
            tipo = %classification.ticket_type.label,
            prioridad = %classification.priority,
            asignado = assignment.technician.is_some(),
            con_sla = sla.is_some(),
            revision = validation.requires_review,
            "ticket triaged"
        );

        Ok(TriageOutcome {
            ticket,
            classification,
            validation,
            assignment,
            sla,
        })
    }

    /// Periodic scan driver; runs until the shutdown signal flips.
    ///
    /// Overlap protection lives in the monitor itself, so a slow scan and
    /// an eager timer cannot run two scans at once.
    pub async fn run_sla_monitor(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_sla_scan(Utc::now()).await {
                        tracing::warn!(error = %e, "SLA alert delivery failed");
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("SLA monitor stopped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use desk_common::{
        ImpactLevel, PriorityLevel, TechnicianId, TechnicianProfile, TicketType, UrgencyLevel,
    };
    use desk_sla::AlertType;
    use std::sync::Mutex;

    /// Sink that collects everything it receives
    #[derive(Default)]
    struct CollectSink {
        events: Mutex<Vec<AlertEvent>>,
    }

    #[async_trait]
    impl AlertSink for CollectSink {
        async fn deliver(&self, events: &[AlertEvent]) -> DeskResult<()> {
            self.events.lock().unwrap().extend_from_slice(events);
            Ok(())
        }
    }

    const SOFTWARE: CategoryId = CategoryId(2);

    fn tech(load: u32, max: u32, specialties: Vec<CategoryId>) -> TechnicianProfile {
        TechnicianProfile {
            id: TechnicianId::new(),
            name: "Marta".into(),
            specialties,
            current_load: load,
            max_tickets: max,
            available: true,
            performance: Default::default(),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    fn engine_with(
        directory: Arc<StaticDirectory>,
        sink: Arc<CollectSink>,
    ) -> TriageEngine {
        TriageEngine::new(EngineConfig::builtin(), directory, sink).unwrap()
    }

    #[tokio::test]
    async fn test_outage_triage_end_to_end() {
        let directory = Arc::new(StaticDirectory::new());
        let specialist = tech(0, 5, vec![SOFTWARE]);
        let specialist_id = specialist.id;
        directory.insert(specialist);
        let engine = engine_with(Arc::clone(&directory), Arc::new(CollectSink::default()));

        let outcome = engine
            .triage(
                TicketId::new(),
                "Servidor caído en producción",
                "sistema completamente inaccesible para todos los usuarios",
                at(9, 0),
            )
            .await
            .unwrap();

        assert_eq!(outcome.classification.type_of(), TicketType::Incidente);
        assert_eq!(outcome.classification.urgency_level(), UrgencyLevel::Critical);
        assert_eq!(outcome.classification.impact_level(), ImpactLevel::Critical);
        assert_eq!(outcome.classification.priority, PriorityLevel::Critical);
        assert!(outcome.classification.overall_confidence > 60);
        assert!(outcome.validation.is_valid);

        assert_eq!(outcome.assignment.technician, Some(specialist_id));
        assert_eq!(directory.get(specialist_id).unwrap().current_load, 1);

        let sla = outcome.sla.unwrap();
        assert!(sla.response_alert_at <= sla.response_limit);
        assert_eq!(engine.monitor().tracked_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_assignment_never_oversubscribes() {
        let directory = Arc::new(StaticDirectory::new());
        let t = tech(0, 3, vec![SOFTWARE]);
        let id = t.id;
        directory.insert(t);
        let engine = Arc::new(engine_with(
            Arc::clone(&directory),
            Arc::new(CollectSink::default()),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.suggest_technician(SOFTWARE).await.unwrap()
            }));
        }

        let mut assigned = 0;
        for h in handles {
            if h.await.unwrap().technician.is_some() {
                assigned += 1;
            }
        }
        assert_eq!(assigned, 3);
        assert_eq!(directory.get(id).unwrap().current_load, 3);
    }

    #[tokio::test]
    async fn test_scan_dedup_through_engine() {
        let sink = Arc::new(CollectSink::default());
        let engine = engine_with(Arc::new(StaticDirectory::new()), Arc::clone(&sink));

        let ticket = TicketId::new();
        engine
            .compute_sla(ticket, UrgencyLevel::Critical, ImpactLevel::Critical, at(9, 0))
            .unwrap();

        // past the response threshold, twice inside the dedup window
        let first = engine.run_sla_scan(at(9, 25)).await.unwrap();
        let second = engine.run_sla_scan(at(9, 28)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].alert_type, AlertType::ResponseNear);
        assert!(second.is_empty());
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_ticket_reconciles_tracking() {
        let engine = engine_with(
            Arc::new(StaticDirectory::new()),
            Arc::new(CollectSink::default()),
        );
        let ticket = TicketId::new();
        engine
            .compute_sla(ticket, UrgencyLevel::Critical, ImpactLevel::Critical, at(9, 0))
            .unwrap();

        let snapshot = TicketSnapshot {
            id: ticket,
            title: "Servidor caído".into(),
            description: "producción inaccesible".into(),
            category: SOFTWARE,
            ticket_type: TicketType::Incidente,
            urgency: UrgencyLevel::Critical,
            impact: ImpactLevel::Critical,
            priority: PriorityLevel::Critical,
            assignee: None,
            status: desk_common::TicketStatus::EnProceso,
            created_at: at(9, 0),
            first_response_at: Some(at(9, 10)),
            resolved_at: None,
        };
        engine.sync_ticket(&snapshot);
        let tracking = engine.monitor().tracking(ticket).unwrap();
        assert_eq!(tracking.response_compliant, Some(true));

        // closed without resolution: tracking is dropped
        let closed = TicketSnapshot {
            status: desk_common::TicketStatus::Cerrado,
            ..snapshot
        };
        engine.sync_ticket(&closed);
        assert_eq!(engine.monitor().tracked_count(), 0);
    }

    #[tokio::test]
    async fn test_unassigned_when_roster_empty() {
        let engine = engine_with(
            Arc::new(StaticDirectory::new()),
            Arc::new(CollectSink::default()),
        );
        let a = engine.suggest_technician(SOFTWARE).await.unwrap();
        assert!(a.technician.is_none());
        assert_eq!(a.score, 0);
    }

    #[tokio::test]
    async fn test_similarity_and_duplicates() {
        let engine = engine_with(
            Arc::new(StaticDirectory::new()),
            Arc::new(CollectSink::default()),
        );
        assert!((engine.similarity("mismo texto", "mismo texto") - 1.0).abs() < 1e-9);

        let near = TicketId::new();
        let far = TicketId::new();
        let ranked = engine.find_duplicates(
            "no puedo entrar al correo",
            &[
                (near, "usuario no puede entrar al correo".to_string()),
                (far, "cambio de disco duro".to_string()),
            ],
        );
        assert_eq!(ranked[0].ticket, near);
        assert!(ranked[0].score > 0.3);
    }

    #[tokio::test]
    async fn test_extract_keywords() {
        let engine = engine_with(
            Arc::new(StaticDirectory::new()),
            Arc::new(CollectSink::default()),
        );
        let top = engine.extract_keywords("impresora impresora monitor", 1);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_empty_rules_are_fatal() {
        let mut config = EngineConfig::builtin();
        config.rules.tipo.classes.clear();
        config.rules.categoria.classes.clear();
        config.rules.urgencia.classes.clear();
        config.rules.impacto.classes.clear();
        let result = TriageEngine::new(
            config,
            Arc::new(StaticDirectory::new()),
            Arc::new(crate::directory::TracingSink),
        );
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_monitor_runs_and_stops() {
        let engine = Arc::new(engine_with(
            Arc::new(StaticDirectory::new()),
            Arc::new(CollectSink::default()),
        ));
        let (tx, rx) = watch::channel(false);

        let handle = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine.run_sla_monitor(Duration::from_secs(60), rx).await;
            })
        };

        // paused clock: sleeping advances time and fires the ticker
        tokio::time::sleep(Duration::from_secs(150)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let scans = engine
            .monitor()
            .stats()
            .scans_run
            .load(std::sync::atomic::Ordering::Relaxed);
        assert!(scans >= 2, "expected at least two scans, got {scans}");
    }
}
