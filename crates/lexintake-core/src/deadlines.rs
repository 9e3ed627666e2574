//! Deadline rules per case category.
//!
//! Each rule carries its own date base: statutes and evidence windows run
//! from the incident, records requests and expert retention run from now.
//! Rules are declarative ([`DeadlineSpec`]); [`resolve_deadlines`] turns them
//! into absolute timestamps.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::ScenarioKind;

/// Days from incident to the (approximate, two-year) statute of limitations.
pub const STATUTE_OF_LIMITATIONS_DAYS: i64 = 730;

/// Days security footage is typically kept before being overwritten.
pub const DEFAULT_EVIDENCE_RETENTION_DAYS: i64 = 60;

/// Days from incident to the federal EEOC charge deadline.
pub const EEOC_FILING_DAYS: i64 = 180;

/// Which date a deadline offset is counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBase {
    Incident,
    Now,
}

/// A declarative deadline rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineSpec {
    pub name: String,
    pub due_offset_days: i64,
    pub base: DateBase,
    pub source: String,
    pub notes: String,
}

/// A deadline with its absolute due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDeadline {
    pub name: String,
    pub due: DateTime<Utc>,
    pub source: String,
    pub notes: String,
}

impl DeadlineSpec {
    fn new(name: &str, days: i64, base: DateBase, source: &str, notes: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            due_offset_days: days,
            base,
            source: source.to_string(),
            notes: notes.into(),
        }
    }

    /// Resolve against the incident date and the current time.
    pub fn resolve(&self, incident: DateTime<Utc>, now: DateTime<Utc>) -> ResolvedDeadline {
        let base = match self.base {
            DateBase::Incident => incident,
            DateBase::Now => now,
        };
        ResolvedDeadline {
            name: self.name.clone(),
            due: base + Duration::days(self.due_offset_days),
            source: self.source.clone(),
            notes: self.notes.clone(),
        }
    }
}

fn statute(notes: &str) -> DeadlineSpec {
    DeadlineSpec::new(
        "Statute of Limitations",
        STATUTE_OF_LIMITATIONS_DAYS,
        DateBase::Incident,
        "statute_of_limitations",
        notes,
    )
}

/// Deadline rules for a category label.
///
/// The category is matched by prefix (`"Personal Injury"`, `"Car Accident"`,
/// `"Employment Law"`, `"Medical Malpractice"`). Anything else has no rules.
pub fn deadline_rules(category: &str, evidence_retention_days: i64) -> Vec<DeadlineSpec> {
    use DateBase::{Incident, Now};

    let Some(kind) = ScenarioKind::from_category(category) else {
        return Vec::new();
    };

    match kind {
        ScenarioKind::SlipFall => vec![
            DeadlineSpec::new(
                "Security Footage Retention Deadline",
                evidence_retention_days,
                Incident,
                "slip_fall_evidence",
                format!(
                    "Stores commonly overwrite security footage after {evidence_retention_days} days. \
                     Send the preservation letter now."
                ),
            ),
            statute("File suit before this date. Confirm the state-specific statute."),
            DeadlineSpec::new(
                "Medical Records Collection",
                14,
                Now,
                "medical_records",
                "Collect all treatment records within 14 days.",
            ),
        ],
        ScenarioKind::CarAccident => vec![
            DeadlineSpec::new(
                "Police Report Request",
                7,
                Now,
                "police_report",
                "Request the police report and any dash cam footage within 7 days.",
            ),
            DeadlineSpec::new(
                "Traffic Camera Footage Deadline",
                30,
                Now,
                "traffic_camera",
                "Traffic camera footage is usually kept 30 to 90 days. Request it immediately.",
            ),
            DeadlineSpec::new(
                "Medical Evaluation",
                2,
                Now,
                "medical_evaluation",
                "Client should be medically evaluated within 48 hours of the collision.",
            ),
            statute("File suit before this date. Confirm the state-specific statute."),
        ],
        ScenarioKind::Employment => vec![
            DeadlineSpec::new(
                "EEOC Filing Deadline (Federal)",
                EEOC_FILING_DAYS,
                Incident,
                "eeoc_filing",
                "EEOC charge due within 180 days (300 in deferral states). Critical.",
            ),
            DeadlineSpec::new(
                "Send Litigation Hold Letter",
                7,
                Now,
                "employment_evidence",
                "Send the litigation hold to the employer before emails are purged.",
            ),
            DeadlineSpec::new(
                "Personnel File Request",
                14,
                Now,
                "personnel_file",
                "Request the complete personnel file within 14 days.",
            ),
        ],
        ScenarioKind::MedicalMalpractice => vec![
            DeadlineSpec::new(
                "Medical Records Request (URGENT)",
                7,
                Now,
                "medical_records",
                "Request the full chart now, including operative reports, count sheets and imaging.",
            ),
            DeadlineSpec::new(
                "Retain Medical Expert Witness",
                30,
                Now,
                "expert_witness",
                "Retain a medical expert for case review and the certificate of merit.",
            ),
            DeadlineSpec::new(
                "Certificate of Merit",
                60,
                Now,
                "certificate_of_merit",
                "Many states require a certificate of merit 60 to 90 days after filing.",
            ),
            statute("Malpractice statutes are short, often 1 to 2 years. Check the discovery rule."),
            DeadlineSpec::new(
                "Discovery Rule Deadline",
                365,
                Now,
                "discovery_rule",
                "Alternative limitation period counted from discovery of the injury.",
            ),
        ],
    }
}

/// Resolve the rules for `category` against an incident date.
pub fn resolve_deadlines(
    category: &str,
    incident: DateTime<Utc>,
    now: DateTime<Utc>,
    evidence_retention_days: i64,
) -> Vec<ResolvedDeadline> {
    deadline_rules(category, evidence_retention_days)
        .iter()
        .map(|spec| spec.resolve(incident, now))
        .collect()
}

/// Pick the incident date from raw date mentions.
///
/// Uses the first mention that parses as `YYYY-MM-DD`, `MM/DD/YYYY`,
/// `MM-DD-YYYY` or `Month D, YYYY` (abbreviated months, ordinals and periods
/// allowed), or the word `yesterday`. Falls back to `now`.
pub fn resolve_incident_date(dates: &[String], now: DateTime<Utc>) -> DateTime<Utc> {
    match dates.iter().find_map(|raw| parse_mention(raw, now)) {
        Some(incident) => incident,
        None => {
            debug!(mentions = dates.len(), "no parseable incident date, using now");
            now
        }
    }
}

fn parse_mention(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("yesterday") {
        return Some(now - Duration::days(1));
    }
    parse_calendar_date(raw).map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Parse an absolute calendar date in one of the accepted layouts.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }

    let cleaned = raw
        .replace([',', '.'], " ")
        .split_whitespace()
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ");
    ["%B %d %Y", "%b %d %Y"]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

fn strip_ordinal(token: &str) -> &str {
    let lower = token.to_ascii_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if lower.ends_with(suffix) {
            let head = &token[..token.len() - 2];
            if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
                return head;
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn find<'a>(deadlines: &'a [ResolvedDeadline], name: &str) -> &'a ResolvedDeadline {
        deadlines
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("missing deadline {name}"))
    }

    #[test]
    fn medmal_statute_and_records_use_different_bases() {
        let incident = ts(2024, 1, 10);
        let now = ts(2024, 6, 1);
        let resolved = resolve_deadlines("Medical Malpractice", incident, now, 60);

        assert_eq!(resolved.len(), 5);
        assert_eq!(
            find(&resolved, "Statute of Limitations").due,
            incident + Duration::days(730)
        );
        assert_eq!(
            find(&resolved, "Medical Records Request (URGENT)").due,
            now + Duration::days(7)
        );
    }

    #[test]
    fn medmal_bases_stay_distinct_when_incident_is_now() {
        let now = ts(2024, 6, 1);
        let rules = deadline_rules("Medical Malpractice - Retained Foreign Object", 60);
        let statute = rules.iter().find(|r| r.name == "Statute of Limitations").unwrap();
        let records = rules
            .iter()
            .find(|r| r.name == "Medical Records Request (URGENT)")
            .unwrap();
        assert_eq!(statute.base, DateBase::Incident);
        assert_eq!(records.base, DateBase::Now);

        let resolved = resolve_deadlines("Medical Malpractice", now, now, 60);
        assert_eq!(find(&resolved, "Statute of Limitations").due, now + Duration::days(730));
    }

    #[test]
    fn slip_fall_retention_follows_configuration() {
        let incident = ts(2024, 3, 5);
        let now = ts(2024, 3, 20);
        let resolved = resolve_deadlines("Personal Injury - Premises Liability", incident, now, 30);
        assert_eq!(resolved.len(), 3);
        assert_eq!(
            find(&resolved, "Security Footage Retention Deadline").due,
            incident + Duration::days(30)
        );
        assert!(
            find(&resolved, "Security Footage Retention Deadline")
                .notes
                .contains("30 days")
        );
        assert_eq!(find(&resolved, "Medical Records Collection").due, now + Duration::days(14));
    }

    #[test]
    fn car_and_employment_rules() {
        let incident = ts(2024, 2, 1);
        let now = ts(2024, 2, 3);

        let car = resolve_deadlines("Car Accident / Auto Collision", incident, now, 60);
        let names: Vec<_> = car.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Police Report Request",
                "Traffic Camera Footage Deadline",
                "Medical Evaluation",
                "Statute of Limitations"
            ]
        );
        assert_eq!(find(&car, "Medical Evaluation").due, now + Duration::days(2));

        let emp = resolve_deadlines("Employment Law - Age Discrimination", incident, now, 60);
        assert_eq!(emp.len(), 3);
        assert_eq!(
            find(&emp, "EEOC Filing Deadline (Federal)").due,
            incident + Duration::days(180)
        );
    }

    #[test]
    fn unknown_category_has_no_deadlines() {
        assert!(deadline_rules("other", 60).is_empty());
        assert!(deadline_rules("family", 60).is_empty());
        assert!(deadline_rules("", 60).is_empty());
    }

    #[test]
    fn incident_date_from_first_parseable_mention() {
        let now = ts(2024, 6, 1);
        let dates = vec![
            "last Tuesday".to_string(),
            "3pm".to_string(),
            "2024-05-20".to_string(),
            "2024-05-01".to_string(),
        ];
        assert_eq!(resolve_incident_date(&dates, now), ts(2024, 5, 20));
    }

    #[test]
    fn incident_date_accepts_common_layouts() {
        let now = ts(2024, 6, 1);
        for (raw, expected) in [
            ("05/20/2024", ts(2024, 5, 20)),
            ("05-20-2024", ts(2024, 5, 20)),
            ("May 20, 2024", ts(2024, 5, 20)),
            ("Jan. 3rd, 2024", ts(2024, 1, 3)),
            ("yesterday", ts(2024, 5, 31)),
        ] {
            assert_eq!(resolve_incident_date(&[raw.to_string()], now), expected, "{raw}");
        }
    }

    #[test]
    fn incident_date_falls_back_to_now() {
        let now = ts(2024, 6, 1);
        assert_eq!(resolve_incident_date(&[], now), now);
        assert_eq!(resolve_incident_date(&["last week".into(), "13/45/2024".into()], now), now);
    }
}
