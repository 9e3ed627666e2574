//! Case-creation orchestrator.
//!
//! [`IntakePipeline`] is built once at start-up with an optional primary
//! analyzer injected. Every analysis either comes from the primary or, on any
//! error or when the deadline elapses, from the rule-based analyzer. The
//! resulting [`IntakePlan`] bundles everything a new case needs: actions,
//! letter drafts, email drafts, queued notices and deadlines.

mod output;
mod plan;

use std::time::Duration;

use chrono::{DateTime, Utc};
use lexintake_ai::{AnalyzerError, RuleBasedAnalyzer, TextAnalyzer};
use lexintake_core::{AnalysisResult, FirmProfile, IntakeConfig};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub use output::{sanitize_filename, write_letter_files, write_letters};
pub use plan::{ActionDraft, EmailDraft, IntakePlan, IntakeRequest, QueuedNotice};

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("intake narrative is empty")]
    EmptyNarrative,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An analysis and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Name of the analyzer that produced `result`.
    pub source: String,
    /// Why the primary analyzer was not used, when one was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

pub struct IntakePipeline {
    primary: Option<Box<dyn TextAnalyzer>>,
    fallback: RuleBasedAnalyzer,
    deadline: Duration,
    firm: FirmProfile,
    evidence_retention_days: i64,
}

impl IntakePipeline {
    /// Build from configuration. `primary` is consulted first when present.
    pub fn new(config: &IntakeConfig, primary: Option<Box<dyn TextAnalyzer>>) -> Self {
        if let Some(p) = &primary {
            info!(
                primary = p.name(),
                deadline_ms = config.analyzer_deadline.as_millis() as u64,
                "intake pipeline ready"
            );
        } else {
            info!("intake pipeline ready (rule-based only)");
        }
        Self {
            primary,
            fallback: RuleBasedAnalyzer::new(&config.classifier),
            deadline: config.analyzer_deadline,
            firm: config.firm.clone(),
            evidence_retention_days: config.evidence_retention_days,
        }
    }

    /// Rule-based only.
    pub fn rule_based(config: &IntakeConfig) -> Self {
        Self::new(config, None)
    }

    pub fn firm(&self) -> &FirmProfile {
        &self.firm
    }

    pub fn evidence_retention_days(&self) -> i64 {
        self.evidence_retention_days
    }

    /// Analyze a narrative. Never fails.
    pub async fn analyze(&self, text: &str) -> AnalysisOutcome {
        let mut fallback_reason = None;

        if let Some(primary) = &self.primary {
            let err = match tokio::time::timeout(self.deadline, primary.analyze(text)).await {
                Ok(Ok(result)) => {
                    info!(source = primary.name(), category = %result.category, "intake analysed");
                    return AnalysisOutcome {
                        result,
                        source: primary.name().to_string(),
                        fallback_reason: None,
                    };
                }
                Ok(Err(e)) => e,
                Err(_) => AnalyzerError::Timeout(self.deadline),
            };
            warn!(
                analyzer = primary.name(),
                kind = err.kind(),
                error = %err,
                "primary analyzer failed, using rule-based analysis"
            );
            fallback_reason = Some(err.to_string());
        }

        let result = self.fallback.analyze_sync(text);
        info!(source = RuleBasedAnalyzer::NAME, category = %result.category, "intake analysed");
        AnalysisOutcome {
            result,
            source: RuleBasedAnalyzer::NAME.to_string(),
            fallback_reason,
        }
    }

    /// Analyze a new intake and derive everything the case needs.
    pub async fn plan(
        &self,
        request: &IntakeRequest,
        now: DateTime<Utc>,
    ) -> Result<IntakePlan, IntakeError> {
        if request.text.trim().is_empty() {
            return Err(IntakeError::EmptyNarrative);
        }
        let outcome = self.analyze(&request.text).await;
        let plan = plan::build(
            outcome,
            request,
            &self.firm,
            self.evidence_retention_days,
            now,
        );
        info!(
            category = %plan.analysis.result.category,
            actions = plan.actions.len(),
            letters = plan.letters.len(),
            queued = plan.queued_notices.len(),
            deadlines = plan.deadlines.len(),
            "intake plan built"
        );
        Ok(plan)
    }
}
