//! Engine configuration
//!
//! Bundles the keyword rule tables and the SLA matrix. Both load once at
//! engine construction and are immutable afterwards; a configuration the
//! engine cannot work with at all fails construction instead of degrading.

use desk_classify::TriageRules;
use desk_common::DeskResult;
use desk_sla::SlaMatrix;

/// Complete configuration for a `TriageEngine`
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Keyword rule tables for the four dimensions
    pub rules: TriageRules,
    /// Urgency × impact SLA matrix
    pub sla: SlaMatrix,
}

impl EngineConfig {
    /// The shipped ruleset and SLA matrix; usable with zero external files
    pub fn builtin() -> Self {
        Self {
            rules: TriageRules::builtin(),
            sla: SlaMatrix::builtin(),
        }
    }

    /// Load both tables from JSON documents
    pub fn from_json(rules_json: &str, sla_json: &str) -> DeskResult<Self> {
        Ok(Self {
            rules: TriageRules::from_json(rules_json)?,
            sla: SlaMatrix::from_json(sla_json)?,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_loads() {
        let cfg = EngineConfig::builtin();
        assert!(cfg.rules.validate().is_ok());
        assert!(cfg.sla.is_complete());
    }

    #[test]
    fn test_empty_sla_json_is_fatal() {
        let rules = serde_json::to_string(&TriageRules::builtin()).unwrap();
        assert!(EngineConfig::from_json(&rules, "[]").is_err());
    }
}
