//! Classification orchestrator
//!
//! Runs the four dimension classifiers over title + description, resolves
//! priority, aggregates confidence and applies the review policy. A low
//! confidence result is flagged for human audit, never rejected: triage
//! must not block ticket creation.

use crate::dimension::{DimensionClassifier, DimensionOutcome};
use crate::priority::PriorityMatrix;
use crate::rules::TriageRules;
use desk_common::{CategoryId, DeskResult, ImpactLevel, PriorityLevel, TicketType, UrgencyLevel};
use desk_text::Normalizer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Overall confidence below this marks the result invalid
const MIN_OVERALL_CONFIDENCE: u8 = 40;
/// Category confidence below this requests human review
const MIN_CATEGORY_CONFIDENCE: u8 = 50;

/// Complete classification of one ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Ticket type outcome
    pub ticket_type: DimensionOutcome,
    /// Category outcome
    pub category: DimensionOutcome,
    /// Urgency outcome (id is the level)
    pub urgency: DimensionOutcome,
    /// Impact outcome (id is the level)
    pub impact: DimensionOutcome,
    /// Priority derived from urgency × impact
    pub priority: PriorityLevel,
    /// Rounded mean of the four dimension confidences
    pub overall_confidence: u8,
    /// Downstream signal for manual audit; never blocks creation
    pub requires_review: bool,
}

impl ClassificationResult {
    /// Urgency as a typed level
    pub fn urgency_level(&self) -> UrgencyLevel {
        UrgencyLevel::from_level(self.urgency.id as u8).unwrap_or_default()
    }

    /// Impact as a typed level
    pub fn impact_level(&self) -> ImpactLevel {
        ImpactLevel::from_level(self.impact.id as u8).unwrap_or_default()
    }

    /// Ticket type as the platform enum
    pub fn type_of(&self) -> TicketType {
        TicketType::from_label(&self.ticket_type.label).unwrap_or_default()
    }

    /// Category id for assignment and duplicate lookup
    pub fn category_id(&self) -> CategoryId {
        CategoryId(self.category.id)
    }
}

/// Validity verdict for a classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    /// Whether the classification is trustworthy enough to auto-apply
    pub is_valid: bool,
    /// Whether a human should audit the result
    pub requires_review: bool,
    /// Human-readable explanation when flagged
    pub reason: Option<String>,
}

/// Runs the four classifiers and the priority matrix
pub struct ClassificationOrchestrator {
    normalizer: Arc<Normalizer>,
    tipo: DimensionClassifier,
    categoria: DimensionClassifier,
    urgencia: DimensionClassifier,
    impacto: DimensionClassifier,
    matrix: PriorityMatrix,
}

impl ClassificationOrchestrator {
    /// Compile all rule tables; fails only on unusable configuration
    pub fn new(normalizer: Arc<Normalizer>, rules: TriageRules) -> DeskResult<Self> {
        rules.validate()?;
        let matrix = if rules.priority_matrix.is_empty() {
            PriorityMatrix::builtin()
        } else {
            PriorityMatrix::from_entries(&rules.priority_matrix)?
        };
        Ok(Self {
            tipo: DimensionClassifier::new(&normalizer, rules.tipo),
            categoria: DimensionClassifier::new(&normalizer, rules.categoria),
            urgencia: DimensionClassifier::new(&normalizer, rules.urgencia),
            impacto: DimensionClassifier::new(&normalizer, rules.impacto),
            matrix,
            normalizer,
        })
    }

    /// Classify a ticket from its raw title and description
    pub fn classify(&self, title: &str, description: &str) -> ClassificationResult {
        let text = format!("{title} {description}");
        let tokens = self.normalizer.normalize(&text);

        let ticket_type = self.tipo.classify(&tokens);
        let category = self.categoria.classify(&tokens);
        let urgency = self.urgencia.classify(&tokens);
        let impact = self.impacto.classify(&tokens);

        let urgency_level = UrgencyLevel::from_level(urgency.id as u8).unwrap_or_default();
        let impact_level = ImpactLevel::from_level(impact.id as u8).unwrap_or_default();
        let priority = self.matrix.resolve(urgency_level, impact_level);

        let sum = u32::from(ticket_type.confidence)
            + u32::from(category.confidence)
            + u32::from(urgency.confidence)
            + u32::from(impact.confidence);
        let overall_confidence = ((sum as f64) / 4.0).round() as u8;

        let requires_review = overall_confidence < MIN_OVERALL_CONFIDENCE
            || category.confidence < MIN_CATEGORY_CONFIDENCE;

        tracing::debug!(
            tipo = %ticket_type.label,
            categoria = %category.label,
            urgencia = %urgency.label,
            impacto = %impact.label,
            prioridad = %priority,
            confianza = overall_confidence,
            "ticket classified"
        );

        ClassificationResult {
            ticket_type,
            category,
            urgency,
            impact,
            priority,
            overall_confidence,
            requires_review,
        }
    }

    /// Apply the review policy to a classification
    pub fn validate(&self, result: &ClassificationResult) -> Validation {
        if result.overall_confidence < MIN_OVERALL_CONFIDENCE {
            return Validation {
                is_valid: false,
                requires_review: true,
                reason: Some(format!(
                    "confianza global insuficiente ({} < {})",
                    result.overall_confidence, MIN_OVERALL_CONFIDENCE
                )),
            };
        }
        if result.category.confidence < MIN_CATEGORY_CONFIDENCE {
            return Validation {
                is_valid: true,
                requires_review: true,
                reason: Some(format!(
                    "confianza de categoría insuficiente ({} < {})",
                    result.category.confidence, MIN_CATEGORY_CONFIDENCE
                )),
            };
        }
        Validation {
            is_valid: true,
            requires_review: false,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> ClassificationOrchestrator {
        ClassificationOrchestrator::new(Arc::new(Normalizer::new()), TriageRules::builtin())
            .unwrap()
    }

    #[test]
    fn test_production_outage_is_critical_p1() {
        let o = orchestrator();
        let r = o.classify(
            "Servidor caído en producción",
            "sistema completamente inaccesible para todos los usuarios",
        );
        assert_eq!(r.type_of(), TicketType::Incidente);
        assert_eq!(r.urgency_level(), UrgencyLevel::Critical);
        assert_eq!(r.impact_level(), ImpactLevel::Critical);
        assert_eq!(r.priority, PriorityLevel::Critical);
        assert!(r.overall_confidence > 60);
    }

    #[test]
    fn test_access_question_routes_to_accesos() {
        let o = orchestrator();
        let r = o.classify(
            "¿Cómo solicito acceso a la carpeta compartida?",
            "quisiera saber el procedimiento",
        );
        assert!(matches!(
            r.type_of(),
            TicketType::Consulta | TicketType::Solicitud
        ));
        assert_eq!(r.category.label, "ACCESOS");
        assert!(r.urgency_level() <= UrgencyLevel::Medium);
    }

    #[test]
    fn test_empty_input_returns_defaults_without_panic() {
        let o = orchestrator();
        let r = o.classify("", "");
        assert_eq!(r.type_of(), TicketType::Consulta);
        assert_eq!(r.urgency_level(), UrgencyLevel::Medium);
        assert_eq!(r.impact_level(), ImpactLevel::Medium);
        assert_eq!(r.overall_confidence, 0);
        assert!(r.requires_review);
    }

    #[test]
    fn test_confidences_stay_in_range() {
        let o = orchestrator();
        for (t, d) in [
            ("", ""),
            ("error", "falla urgente en producción para todos"),
            ("hola", "gracias"),
        ] {
            let r = o.classify(t, d);
            for out in [&r.ticket_type, &r.category, &r.urgency, &r.impact] {
                assert!(out.confidence <= 100);
            }
            assert!(r.overall_confidence <= 100);
        }
    }

    #[test]
    fn test_validation_policy_tiers() {
        let o = orchestrator();

        let low = o.classify("", "");
        let v = o.validate(&low);
        assert!(!v.is_valid);
        assert!(v.requires_review);
        assert!(v.reason.is_some());

        let confident = o.classify(
            "Error urgente: impresora y monitor no funcionan",
            "la impresora dejó de funcionar hoy, falla crítica para varios usuarios del área completa",
        );
        let v = o.validate(&confident);
        assert!(v.is_valid);
    }

    #[test]
    fn test_review_never_blocks_classification() {
        let o = orchestrator();
        let r = o.classify("texto sin señal", "nada reconocible aquí");
        // still produces a complete, usable classification
        assert!(r.requires_review);
        assert_eq!(r.priority, PriorityLevel::Medium);
    }
}
