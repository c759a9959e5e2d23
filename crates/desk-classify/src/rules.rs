//! Rule tables for the dimension classifiers
//!
//! A dimension is a named list of classes, each backed by a weighted keyword
//! list. Class order in the table is the tie-break order: on equal scores
//! the class listed first wins, so tables list the more severe class first.
//!
//! The built-in tables mirror the Spanish helpdesk ruleset the platform
//! ships with; deployments can replace any of them via JSON.

use desk_common::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};

/// One candidate class of a dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRule {
    /// Class id; for urgency and impact this is the numeric level (1..=4)
    pub id: u32,
    /// Platform label (e.g. "INCIDENTE")
    pub label: String,
    /// Score multiplier; higher for more severe or more specific classes
    pub weight: u32,
    /// Trigger keywords and phrases
    pub keywords: Vec<String>,
}

/// Rule table for one classification dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionRules {
    /// Dimension name, used in logs
    pub name: String,
    /// Label returned when no keyword matches at all
    pub default_label: String,
    /// Total matches at which confidence saturates to 100
    pub confidence_normalizer: u32,
    /// Candidate classes in tie-break order
    pub classes: Vec<ClassRule>,
}

/// One cell of a user-supplied priority matrix
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatrixEntry {
    /// Urgency level 1..=4
    pub urgency: u8,
    /// Impact level 1..=4
    pub impact: u8,
    /// Resulting priority level 1..=4
    pub priority: u8,
}

/// The complete rule configuration for the triage engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRules {
    /// Ticket type rules
    pub tipo: DimensionRules,
    /// Category rules
    pub categoria: DimensionRules,
    /// Urgency rules
    pub urgencia: DimensionRules,
    /// Impact rules
    pub impacto: DimensionRules,
    /// Priority matrix override; empty means the built-in matrix
    #[serde(default)]
    pub priority_matrix: Vec<MatrixEntry>,
}

impl TriageRules {
    /// The shipped Spanish helpdesk ruleset
    pub fn builtin() -> Self {
        Self {
            tipo: builtin_tipo(),
            categoria: builtin_categoria(),
            urgencia: builtin_urgencia(),
            impacto: builtin_impacto(),
            priority_matrix: Vec::new(),
        }
    }

    /// Parse rules from JSON and validate them
    pub fn from_json(json: &str) -> DeskResult<Self> {
        let rules: Self =
            serde_json::from_str(json).map_err(|e| DeskError::RuleTable(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject configurations the engine cannot work with at all.
    ///
    /// A single empty dimension degrades to its default class at runtime;
    /// a ruleset with no keywords anywhere is a startup failure.
    pub fn validate(&self) -> DeskResult<()> {
        let dimensions = [&self.tipo, &self.categoria, &self.urgencia, &self.impacto];
        if dimensions.iter().all(|d| d.classes.is_empty()) {
            return Err(DeskError::Config(
                "keyword configuration is entirely empty".into(),
            ));
        }
        for dim in dimensions {
            if dim.classes.is_empty() {
                tracing::warn!(
                    dimension = %dim.name,
                    "no classes configured, dimension will always return its default"
                );
            }
        }
        Ok(())
    }
}

impl Default for TriageRules {
    fn default() -> Self {
        Self::builtin()
    }
}

fn class(id: u32, label: &str, weight: u32, keywords: &[&str]) -> ClassRule {
    ClassRule {
        id,
        label: label.to_string(),
        weight,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn builtin_tipo() -> DimensionRules {
    DimensionRules {
        name: "tipo".into(),
        default_label: "CONSULTA".into(),
        confidence_normalizer: 3,
        classes: vec![
            class(
                1,
                "INCIDENTE",
                3,
                &[
                    "error",
                    "falla",
                    "fallo",
                    "caído",
                    "no funciona",
                    "dejó de funcionar",
                    "roto",
                    "bloqueado",
                    "inaccesible",
                    "se apagó",
                    "pantalla azul",
                    "no responde",
                    "incidente",
                ],
            ),
            class(
                4,
                "PROBLEMA",
                3,
                &[
                    "recurrente",
                    "intermitente",
                    "vuelve a fallar",
                    "vuelve a ocurrir",
                    "cada vez que",
                    "constantemente",
                    "se repite",
                    "otra vez",
                    "sigue fallando",
                ],
            ),
            class(
                2,
                "SOLICITUD",
                2,
                &[
                    "solicito",
                    "solicitud",
                    "necesito",
                    "requiero",
                    "instalar",
                    "instalación",
                    "alta de usuario",
                    "nuevo equipo",
                    "habilitar",
                    "agregar",
                    "crear cuenta",
                ],
            ),
            class(
                3,
                "CONSULTA",
                1,
                &[
                    "cómo",
                    "consulta",
                    "duda",
                    "pregunta",
                    "procedimiento",
                    "quisiera saber",
                    "información",
                    "me gustaría saber",
                ],
            ),
        ],
    }
}

fn builtin_categoria() -> DimensionRules {
    DimensionRules {
        name: "categoria".into(),
        default_label: "SOPORTE_GENERAL".into(),
        confidence_normalizer: 3,
        classes: vec![
            class(
                1,
                "HARDWARE",
                2,
                &[
                    "impresora",
                    "monitor",
                    "teclado",
                    "mouse",
                    "ratón",
                    "disco",
                    "memoria",
                    "computadora",
                    "laptop",
                    "batería",
                    "cargador",
                    "pantalla",
                    "escáner",
                    "proyector",
                ],
            ),
            class(
                2,
                "SOFTWARE",
                2,
                &[
                    "aplicación",
                    "programa",
                    "software",
                    "sistema",
                    "licencia",
                    "actualización",
                    "versión",
                    "excel",
                    "word",
                    "office",
                    "erp",
                    "antivirus",
                ],
            ),
            class(
                3,
                "REDES",
                2,
                &[
                    "internet",
                    "red",
                    "wifi",
                    "conexión",
                    "vpn",
                    "servidor",
                    "dominio",
                    "dns",
                    "ip",
                    "sin conexión",
                    "intranet",
                    "firewall",
                ],
            ),
            class(
                4,
                "ACCESOS",
                2,
                &[
                    "acceso",
                    "accesos",
                    "contraseña",
                    "clave",
                    "usuario bloqueado",
                    "permiso",
                    "permisos",
                    "carpeta compartida",
                    "cuenta",
                    "iniciar sesión",
                    "login",
                    "desbloquear",
                    "restablecer",
                ],
            ),
            class(
                5,
                "CORREO",
                2,
                &[
                    "correo",
                    "email",
                    "outlook",
                    "bandeja",
                    "spam",
                    "adjuntos",
                    "enviar correos",
                    "buzón",
                    "lista de distribución",
                ],
            ),
            class(
                6,
                "SOPORTE_GENERAL",
                1,
                &["ayuda", "soporte", "asistencia", "apoyo", "otro"],
            ),
        ],
    }
}

fn builtin_urgencia() -> DimensionRules {
    DimensionRules {
        name: "urgencia".into(),
        default_label: "MEDIA".into(),
        confidence_normalizer: 2,
        classes: vec![
            class(
                4,
                "CRITICA",
                4,
                &[
                    "urgente",
                    "crítico",
                    "crítica",
                    "emergencia",
                    "inmediatamente",
                    "producción",
                    "caído",
                    "parado",
                    "no puedo trabajar",
                    "inaccesible",
                ],
            ),
            class(
                3,
                "ALTA",
                3,
                &[
                    "importante",
                    "pronto",
                    "hoy mismo",
                    "cuanto antes",
                    "afecta",
                    "bloqueado",
                    "rápido",
                    "hoy",
                ],
            ),
            class(
                2,
                "MEDIA",
                2,
                &["esta semana", "cuando pueda", "molesto", "normal"],
            ),
            class(
                1,
                "BAJA",
                1,
                &[
                    "sin prisa",
                    "cuando sea posible",
                    "no corre prisa",
                    "menor",
                    "sugerencia",
                ],
            ),
        ],
    }
}

fn builtin_impacto() -> DimensionRules {
    DimensionRules {
        name: "impacto".into(),
        default_label: "MEDIO".into(),
        confidence_normalizer: 2,
        classes: vec![
            class(
                4,
                "CRITICO",
                4,
                &[
                    "todos los usuarios",
                    "toda la empresa",
                    "toda la oficina",
                    "completamente inaccesible",
                    "nadie puede",
                    "producción",
                    "masivo",
                    "ningún usuario puede",
                ],
            ),
            class(
                3,
                "ALTO",
                3,
                &[
                    "varios usuarios",
                    "mi departamento",
                    "todo el equipo",
                    "área completa",
                    "la sucursal",
                ],
            ),
            class(
                2,
                "MEDIO",
                2,
                &["algunos usuarios", "algunos compañeros", "dos personas"],
            ),
            class(
                1,
                "BAJO",
                1,
                &[
                    "solo yo",
                    "una sola persona",
                    "nadie más afectado",
                    "únicamente",
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_are_valid() {
        assert!(TriageRules::builtin().validate().is_ok());
    }

    #[test]
    fn test_urgency_impact_ids_are_levels() {
        let rules = TriageRules::builtin();
        for dim in [&rules.urgencia, &rules.impacto] {
            for c in &dim.classes {
                assert!((1..=4).contains(&c.id), "{} id out of range", c.label);
            }
        }
    }

    #[test]
    fn test_empty_ruleset_rejected() {
        let mut rules = TriageRules::builtin();
        rules.tipo.classes.clear();
        rules.categoria.classes.clear();
        rules.urgencia.classes.clear();
        rules.impacto.classes.clear();
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_single_empty_dimension_allowed() {
        let mut rules = TriageRules::builtin();
        rules.urgencia.classes.clear();
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let rules = TriageRules::builtin();
        let json = serde_json::to_string(&rules).unwrap();
        let parsed = TriageRules::from_json(&json).unwrap();
        assert_eq!(parsed.tipo.classes.len(), rules.tipo.classes.len());
    }

    #[test]
    fn test_garbage_json_rejected() {
        assert!(TriageRules::from_json("{not json").is_err());
    }
}
