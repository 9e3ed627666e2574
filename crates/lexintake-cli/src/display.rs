//! Vertical card display for analyses and intake plans.
//!
//! Renders grouped, human-readable sections. Empty sections are skipped and
//! long lists are cut off after a fixed number of items.

use std::collections::BTreeMap;

use lexintake_core::taxonomy::{self, CASE_TYPES};
use lexintake_pipeline::{AnalysisOutcome, IntakePlan};

const MAX_LIST_ITEMS: usize = 10;

/// Accumulates card lines.
#[derive(Default)]
struct Card {
    buf: String,
}

impl Card {
    fn line(&mut self, s: impl AsRef<str>) {
        self.buf.push_str(s.as_ref());
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn field(&mut self, name: &str, value: impl std::fmt::Display) {
        self.line(format!("  {:<26} {}", name, value));
    }

    fn list(&mut self, items: &[String]) {
        for item in items.iter().take(MAX_LIST_ITEMS) {
            self.line(format!("    - {item}"));
        }
        if items.len() > MAX_LIST_ITEMS {
            self.line(format!("    ... and {} more", items.len() - MAX_LIST_ITEMS));
        }
    }

    fn map_section(&mut self, header: &str, map: &BTreeMap<String, Option<String>>) {
        if map.is_empty() {
            return;
        }
        self.line(header);
        for (k, v) in map {
            self.field(k, v.as_deref().unwrap_or("-"));
        }
        self.blank();
    }
}

// ── Public API ──

/// A single analysis as a card.
pub fn analysis_card(outcome: &AnalysisOutcome) -> String {
    let mut card = Card::default();
    analysis_sections(&mut card, outcome);
    card.buf
}

/// A full intake plan as a card.
pub fn plan_card(plan: &IntakePlan) -> String {
    let mut card = Card::default();
    card.line(format!("=== {} ===", plan.title));
    card.line(&plan.insight);
    card.blank();

    card.line("Case");
    if !plan.client_name.is_empty() {
        card.field("client", &plan.client_name);
    }
    card.field("priority", plan.priority);
    if let Some(ct) = plan.case_type {
        card.field("case type", format!("{} ({})", ct.label, ct.key));
    }
    card.field("incident date", plan.incident_date.format("%Y-%m-%d"));
    card.blank();

    analysis_sections(&mut card, &plan.analysis);

    if !plan.actions.is_empty() {
        card.line(format!("Actions ({})", plan.actions.len()));
        for a in &plan.actions {
            card.line(format!(
                "  [{}] {} (due {}, {})",
                a.status,
                a.title,
                a.due.format("%Y-%m-%d"),
                a.priority
            ));
        }
        card.blank();
    }

    if !plan.letters.is_empty() {
        card.line(format!("Letters ({})", plan.letters.len()));
        for l in &plan.letters {
            card.field(&l.filename, &l.subject);
        }
        card.blank();
    }

    if !plan.queued_notices.is_empty() {
        card.line("Queued Notices");
        for n in &plan.queued_notices {
            card.line(format!(
                "  {} after {}: {}",
                n.filename,
                n.send_after.format("%Y-%m-%d %H:%M UTC"),
                n.subject
            ));
        }
        card.blank();
    }

    if !plan.deadlines.is_empty() {
        card.line("Deadlines");
        for d in &plan.deadlines {
            card.field(&d.due.format("%Y-%m-%d").to_string(), &d.name);
        }
        card.blank();
    }

    card.buf
}

/// The case-type catalog as a table.
pub fn case_type_table(include_inactive: bool) -> String {
    let mut card = Card::default();
    card.line(format!("{:<26} {:<40} {}", "KEY", "LABEL", "DEPARTMENT"));
    let rows: Vec<_> = if include_inactive {
        CASE_TYPES.iter().collect()
    } else {
        taxonomy::active().collect()
    };
    for ct in rows {
        let marker = if ct.active { "" } else { " (inactive)" };
        card.line(format!(
            "{:<26} {:<40} {}{}",
            ct.key, ct.label, ct.department, marker
        ));
    }
    card.buf
}

// ── Section rendering ──

fn analysis_sections(card: &mut Card, outcome: &AnalysisOutcome) {
    let r = &outcome.result;
    card.line(format!("=== {} ===", r.category));
    card.line(format!("Department: {}", r.department));
    card.blank();

    card.line("Assessment");
    card.field("priority", r.priority);
    card.field("urgency", r.urgency);
    if let Some(c) = r.confidence {
        card.field("confidence", format!("{c:.2}"));
    }
    if let Some(key) = &r.case_type_key {
        card.field("case type key", key);
    }
    card.field("source", &outcome.source);
    if let Some(reason) = &outcome.fallback_reason {
        card.field("fallback reason", reason);
    }
    card.blank();

    card.map_section("Key Facts", &r.key_facts);

    if !r.dates.is_empty() {
        card.line("Dates");
        card.list(&r.dates);
        card.blank();
    }

    card.map_section("Parties", &r.parties);

    if !r.suggested_actions.is_empty() {
        card.line("Suggested Actions");
        for (i, a) in r.suggested_actions.iter().enumerate() {
            card.line(format!("  {:>2}. {a}", i + 1));
        }
        card.blank();
    }

    if !r.checklists.is_empty() {
        card.line("Checklists");
        for (name, items) in &r.checklists {
            card.line(format!("  {} ({}):", name, items.len()));
            card.list(items);
        }
        card.blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lexintake_core::{AnalysisResult, IntakeConfig};
    use lexintake_pipeline::{IntakePipeline, IntakeRequest};

    #[test]
    fn uncategorised_card_skips_empty_sections() {
        let outcome = AnalysisOutcome {
            result: AnalysisResult::uncategorised(),
            source: "rule_based".into(),
            fallback_reason: Some("upstream returned 503: busy".into()),
        };
        let card = analysis_card(&outcome);
        assert!(card.starts_with("=== other ===\nDepartment: General\n"));
        assert!(card.contains("fallback reason"));
        assert!(!card.contains("Key Facts"));
        assert!(!card.contains("Checklists"));
    }

    #[test]
    fn long_lists_are_truncated() {
        let mut card = Card::default();
        let items: Vec<String> = (0..13).map(|i| format!("item {i}")).collect();
        card.list(&items);
        assert_eq!(card.buf.lines().count(), MAX_LIST_ITEMS + 1);
        assert!(card.buf.ends_with("    ... and 3 more\n"));
    }

    #[tokio::test]
    async fn plan_card_lists_letters_and_deadlines() {
        let pipeline = IntakePipeline::rule_based(&IntakeConfig::default());
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let plan = pipeline
            .plan(
                &IntakeRequest::new(
                    "I was in a car accident on the highway on 2024-05-20. Allstate insures the other driver.",
                    "Jane Doe",
                ),
                now,
            )
            .await
            .unwrap();
        let card = plan_card(&plan);
        assert!(card.contains("Letters (3)"));
        assert!(card.contains("Queued Notices"));
        assert!(card.contains("Deadlines"));
        assert!(
            card.lines()
                .any(|l| l.trim_start().starts_with("client") && l.ends_with(" Jane Doe"))
        );
    }

    #[test]
    fn catalog_table_hides_inactive_by_default() {
        let active = case_type_table(false);
        let all = case_type_table(true);
        assert!(active.contains("pi_slip_fall"));
        assert!(!active.contains("(inactive)"));
        assert!(all.contains("(inactive)"));
    }
}
