//! Case-type catalog.
//!
//! Analyzer output links to this table through `AnalysisResult::case_type_key`.
//! Keys are stable identifiers; labels and departments are display data.

use serde::Serialize;

/// One row of the case-type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseType {
    pub key: &'static str,
    pub label: &'static str,
    pub department: &'static str,
    /// Inactive rows are kept so old cases still resolve a label, but new
    /// analyses never link to them.
    pub active: bool,
}

const fn row(
    key: &'static str,
    label: &'static str,
    department: &'static str,
    active: bool,
) -> CaseType {
    CaseType {
        key,
        label,
        department,
        active,
    }
}

/// The full catalog, scenario types first.
pub const CASE_TYPES: &[CaseType] = &[
    // ── Scenario types ──
    row("pi_slip_fall", "Premises Liability - Slip and Fall", "Personal Injury", true),
    row("pi_auto_collision", "Motor Vehicle Collision", "Personal Injury", true),
    row("emp_age_discrimination", "Age Discrimination", "Employment", true),
    row("medmal_retained_object", "Retained Foreign Object", "Medical Malpractice", true),
    // ── Generic practice areas ──
    row("family_law", "Family Law", "Family Law", true),
    row("criminal_defense", "Criminal Defense", "Criminal Defense", true),
    row("civil_litigation", "Civil Litigation", "Civil Litigation", true),
    row("employment_law", "Employment Law", "Employment", true),
    row("real_estate", "Real Estate", "Real Estate", true),
    row("personal_injury", "Personal Injury", "Personal Injury", true),
    row("medical_malpractice", "Medical Malpractice", "Medical Malpractice", true),
    row("business_law", "Business Law", "Business Law", true),
    row("immigration", "Immigration", "Immigration", true),
    row("bankruptcy", "Bankruptcy", "Bankruptcy", true),
    row("intellectual_property", "Intellectual Property", "Business Law", true),
    row("estate_planning", "Estate Planning", "Estate Planning", true),
    // ── Legacy ──
    row("civil_tort_premises_liability", "Premises Liability (legacy)", "Personal Injury", false),
];

/// Find an active case type by key.
pub fn lookup(key: &str) -> Option<&'static CaseType> {
    CASE_TYPES.iter().find(|ct| ct.active && ct.key == key)
}

/// Find a case type by key, including inactive rows.
pub fn lookup_any(key: &str) -> Option<&'static CaseType> {
    CASE_TYPES.iter().find(|ct| ct.key == key)
}

/// All active case types, in catalog order.
pub fn active() -> impl Iterator<Item = &'static CaseType> {
    CASE_TYPES.iter().filter(|ct| ct.active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = CASE_TYPES.iter().map(|ct| ct.key).collect();
        assert_eq!(keys.len(), CASE_TYPES.len());
    }

    #[test]
    fn lookup_skips_inactive_rows() {
        assert!(lookup("civil_tort_premises_liability").is_none());
        let legacy = lookup_any("civil_tort_premises_liability").unwrap();
        assert!(!legacy.active);
    }

    #[test]
    fn lookup_finds_scenario_keys() {
        let ct = lookup("pi_slip_fall").unwrap();
        assert_eq!(ct.department, "Personal Injury");
        assert!(lookup("unknown_key").is_none());
    }

    #[test]
    fn active_excludes_legacy() {
        assert_eq!(active().count(), CASE_TYPES.len() - 1);
    }
}
