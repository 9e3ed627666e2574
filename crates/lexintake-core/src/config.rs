//! Runtime configuration shared by the analyzers, the pipeline and the CLI.
//!
//! Values are plain data; the CLI fills them from flags and environment
//! variables and calls [`IntakeConfig::validate`] once at start-up.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deadlines::DEFAULT_EVIDENCE_RETENTION_DAYS;
use crate::letters::FirmProfile;

/// Confidence reported when no classifier keyword matches.
///
/// Kept at 0.5 ("uncertain") for compatibility with existing case data.
/// Set `ClassifierConfig::no_match_confidence` to 0.0 to report "no evidence".
pub const DEFAULT_NO_MATCH_CONFIDENCE: f32 = 0.5;

pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://api.assemblyai.com/lemur/v3/generate";
pub const DEFAULT_REMOTE_MODEL: &str = "lemur-3-sonar-large-32k-online";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which analyzer the pipeline tries first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    #[default]
    RuleBased,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub no_match_confidence: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            no_match_confidence: DEFAULT_NO_MATCH_CONFIDENCE,
        }
    }
}

/// Remote completion API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// Per-attempt HTTP timeout.
    pub request_timeout: Duration,
    /// Extra attempts after the first, on transport failure only.
    pub retries: u32,
    /// Cap on the exponential backoff between attempts.
    pub max_backoff: Duration,
    pub max_output_tokens: u32,
}

/// Delay before retry `attempt` (0-based): `2^attempt` seconds, capped.
pub fn backoff_delay(attempt: u32, cap: Duration) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(cap)
}

impl RemoteConfig {
    /// Longest a remote call can take when every attempt times out:
    /// `retries + 1` request timeouts plus the backoff between them.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.request_timeout.saturating_mul(self.retries.saturating_add(1));
        (0..self.retries)
            .map(|i| backoff_delay(i, self.max_backoff))
            .fold(attempts, Duration::saturating_add)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            model: DEFAULT_REMOTE_MODEL.to_string(),
            request_timeout: Duration::from_secs(20),
            retries: 2,
            max_backoff: Duration::from_secs(8),
            max_output_tokens: 800,
        }
    }
}

impl RemoteConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .field("retries", &self.retries)
            .field("max_backoff", &self.max_backoff)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

/// Top-level configuration for an intake pipeline.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub firm: FirmProfile,
    pub evidence_retention_days: i64,
    pub classifier: ClassifierConfig,
    pub remote: RemoteConfig,
    pub analyzer: AnalyzerKind,
    /// Overall bound on the primary analyzer, retries included.
    ///
    /// Defaults to [`RemoteConfig::worst_case`] of the default remote
    /// settings. A shorter deadline cuts off later retries.
    pub analyzer_deadline: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        let remote = RemoteConfig::default();
        Self {
            firm: FirmProfile::default(),
            evidence_retention_days: DEFAULT_EVIDENCE_RETENTION_DAYS,
            classifier: ClassifierConfig::default(),
            analyzer: AnalyzerKind::RuleBased,
            analyzer_deadline: remote.worst_case(),
            remote,
        }
    }
}

impl IntakeConfig {
    /// True when the remote analyzer is selected and has a credential.
    ///
    /// Selecting `Remote` without a key is not an error; the pipeline runs
    /// rule-based only.
    pub fn remote_enabled(&self) -> bool {
        self.analyzer == AnalyzerKind::Remote && self.remote.api_key().is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evidence_retention_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "evidence_retention_days must be positive, got {}",
                self.evidence_retention_days
            )));
        }
        let floor = self.classifier.no_match_confidence;
        if !(0.0..=1.0).contains(&floor) {
            return Err(ConfigError::Invalid(format!(
                "no_match_confidence must be within [0, 1], got {floor}"
            )));
        }
        if self.analyzer_deadline.is_zero() {
            return Err(ConfigError::Invalid("analyzer_deadline must be non-zero".into()));
        }
        if self.remote.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("remote request_timeout must be non-zero".into()));
        }
        if self.remote.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("remote endpoint is empty".into()));
        }
        if self.firm.name.trim().is_empty() {
            return Err(ConfigError::Invalid("firm name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = IntakeConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.remote_enabled());
        assert_eq!(cfg.classifier.no_match_confidence, 0.5);
        assert_eq!(cfg.evidence_retention_days, 60);
    }

    #[test]
    fn remote_needs_a_key() {
        let mut cfg = IntakeConfig {
            analyzer: AnalyzerKind::Remote,
            ..Default::default()
        };
        assert!(!cfg.remote_enabled());

        cfg.remote.api_key = Some("  ".into());
        assert!(!cfg.remote_enabled());

        cfg.remote.api_key = Some("sk-test".into());
        assert!(cfg.remote_enabled());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = IntakeConfig::default();
        cfg.classifier.no_match_confidence = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = IntakeConfig::default();
        cfg.evidence_retention_days = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = IntakeConfig::default();
        cfg.analyzer_deadline = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_deadline_covers_every_retry() {
        let cfg = IntakeConfig::default();
        // 3 attempts of 20s plus 1s and 2s of backoff.
        assert_eq!(cfg.remote.worst_case(), Duration::from_secs(63));
        assert_eq!(cfg.analyzer_deadline, cfg.remote.worst_case());

        let no_retry = RemoteConfig {
            retries: 0,
            ..Default::default()
        };
        assert_eq!(no_retry.worst_case(), no_retry.request_timeout);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let cap = Duration::from_secs(8);
        let delays: Vec<u64> = (0..6).map(|i| backoff_delay(i, cap).as_secs()).collect();
        assert_eq!(delays, [1, 2, 4, 8, 8, 8]);
        assert_eq!(backoff_delay(200, cap), cap);
    }

    #[test]
    fn debug_redacts_api_key() {
        let remote = RemoteConfig {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        let dbg = format!("{remote:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
