//! Shared analysis types passed from the analyzers to the intake pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category for narratives that match no scenario.
pub const CATEGORY_OTHER: &str = "other";

/// Department for narratives that match no scenario.
pub const DEPARTMENT_GENERAL: &str = "General";

/// Severity scale shared by priority and urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    #[default]
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

pub type Priority = Level;
pub type Urgency = Level;

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium-High",
            Self::High => "High",
        }
    }

    /// Lower-case form used for persisted case and action priorities.
    pub fn as_lower(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::MediumHigh => "medium-high",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    /// Case-insensitive; accepts `medium-high`, `medium high` and `medium_high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();
        match norm.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "medium-high" => Ok(Self::MediumHigh),
            "high" => Ok(Self::High),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// The four hand-authored narrative archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    SlipFall,
    CarAccident,
    Employment,
    MedicalMalpractice,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        Self::SlipFall,
        Self::CarAccident,
        Self::Employment,
        Self::MedicalMalpractice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlipFall => "slip_fall",
            Self::CarAccident => "car_accident",
            Self::Employment => "employment",
            Self::MedicalMalpractice => "medical_malpractice",
        }
    }

    /// Map a category label onto a scenario by its prefix.
    ///
    /// `"Personal Injury - ..."` → slip-and-fall, `"Car Accident ..."` →
    /// collision, `"Employment Law ..."` → employment, `"Medical Malpractice ..."`
    /// → malpractice. Labels from the generic classifier (`personal_injury`,
    /// `other`, ...) map to nothing.
    pub fn from_category(category: &str) -> Option<Self> {
        let category = category.trim();
        if category.starts_with("Personal Injury") {
            Some(Self::SlipFall)
        } else if category.starts_with("Car Accident") {
            Some(Self::CarAccident)
        } else if category.starts_with("Employment Law") {
            Some(Self::Employment)
        } else if category.starts_with("Medical Malpractice") {
            Some(Self::MedicalMalpractice)
        } else {
            None
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown scenario: {s}"))
    }
}

/// Structured output of one analyzer call.
///
/// Produced fresh per call and never mutated after return. `key_facts` and
/// `parties` keep keys whose value was looked for but not found as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: String,
    pub department: String,
    pub priority: Priority,
    pub urgency: Urgency,
    #[serde(default)]
    pub key_facts: BTreeMap<String, Option<String>>,
    /// Raw date and time mentions, in order of discovery. Not resolved.
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub parties: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub checklists: BTreeMap<String, Vec<String>>,
    /// Taxonomy key linking the result to a persisted case type.
    #[serde(default)]
    pub case_type_key: Option<String>,
    /// In [0, 1] when present.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl AnalysisResult {
    /// An `other` / `General` result at `Medium` with every collection empty.
    pub fn uncategorised() -> Self {
        Self {
            category: CATEGORY_OTHER.to_string(),
            department: DEPARTMENT_GENERAL.to_string(),
            priority: Level::Medium,
            urgency: Level::Medium,
            key_facts: BTreeMap::new(),
            dates: Vec::new(),
            parties: BTreeMap::new(),
            suggested_actions: Vec::new(),
            checklists: BTreeMap::new(),
            case_type_key: None,
            confidence: None,
        }
    }

    /// The scenario this result belongs to, if any.
    pub fn scenario(&self) -> Option<ScenarioKind> {
        ScenarioKind::from_category(&self.category)
    }

    /// Look up a key fact, treating `null` the same as absent.
    pub fn fact(&self, key: &str) -> Option<&str> {
        self.key_facts.get(key).and_then(|v| v.as_deref())
    }
}
