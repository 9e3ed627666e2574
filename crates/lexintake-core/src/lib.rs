pub mod analysis;
pub mod config;
pub mod deadlines;
pub mod letters;
pub mod taxonomy;

pub use analysis::{AnalysisResult, Level, Priority, ScenarioKind, Urgency};
pub use config::{AnalyzerKind, ClassifierConfig, ConfigError, IntakeConfig, RemoteConfig};
pub use deadlines::{
    DateBase, DeadlineSpec, ResolvedDeadline, deadline_rules, resolve_deadlines,
    resolve_incident_date,
};
pub use letters::{
    FirmProfile, LetterFields, LetterSpec, generate_all_letters_for_scenario,
    letter_fields_from_analysis,
};
pub use taxonomy::CaseType;
