//! Intake analysis: entity extraction, keyword classification, scenario detection.
//!
//! Everything here is synchronous and pure. [`TextAnalyzer`] is the seam the
//! pipeline selects analyzers through; the rule-based implementation lives
//! here and the remote one in `lexintake-remote`.

pub mod classifier;
mod error;
pub mod extract;
pub mod scenario;

use async_trait::async_trait;
use lexintake_core::AnalysisResult;
use lexintake_core::config::ClassifierConfig;

pub use classifier::{CaseClassification, CaseTypeClassifier, classify_case};
pub use error::AnalyzerError;
pub use extract::{EntityBag, EntityClass, extract_entities, extract_entities_opt};
pub use scenario::{ScenarioAnalyzer, analyze_intake_text_scenarios, detect_scenario};

/// Something that turns narrative text into an [`AnalysisResult`].
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Stable identifier recorded as the analysis source.
    fn name(&self) -> &'static str;

    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalyzerError>;
}

/// Always-available analyzer backed by [`ScenarioAnalyzer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer {
    scenarios: ScenarioAnalyzer,
}

impl RuleBasedAnalyzer {
    pub const NAME: &'static str = "rule_based";

    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            scenarios: ScenarioAnalyzer::new(CaseTypeClassifier::new(config)),
        }
    }

    /// Synchronous analysis; never fails.
    pub fn analyze_sync(&self, text: &str) -> AnalysisResult {
        self.scenarios.analyze(text)
    }
}

#[async_trait]
impl TextAnalyzer for RuleBasedAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalyzerError> {
        Ok(self.analyze_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rule_based_never_fails() {
        let analyzer = RuleBasedAnalyzer::default();
        for text in ["", "   ", "I slipped on water at Walmart", "asdf qwerty"] {
            assert!(analyzer.analyze(text).await.is_ok());
        }
    }

    #[tokio::test]
    async fn rule_based_through_trait_object() {
        let analyzer: Box<dyn TextAnalyzer> = Box::new(RuleBasedAnalyzer::new(&ClassifierConfig {
            no_match_confidence: 0.0,
        }));
        assert_eq!(analyzer.name(), "rule_based");
        let r = analyzer.analyze("nothing relevant here").await.unwrap();
        assert_eq!(r.category, "other");
        assert_eq!(r.confidence, Some(0.0));
    }

    #[test]
    fn error_kinds() {
        let err = AnalyzerError::Upstream {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.kind(), "upstream");
        assert_eq!(err.to_string(), "upstream returned 503: busy");
    }
}
