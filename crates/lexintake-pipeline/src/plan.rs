use chrono::{DateTime, Duration, Utc};
use lexintake_core::letters::extract_subject;
use lexintake_core::taxonomy::{self, CaseType};
use lexintake_core::{
    FirmProfile, LetterSpec, Priority, ResolvedDeadline, generate_all_letters_for_scenario,
    letter_fields_from_analysis, resolve_deadlines, resolve_incident_date,
};
use serde::Serialize;

use crate::AnalysisOutcome;

/// Most action drafts created from one analysis.
pub const MAX_ACTIONS: usize = 10;

/// Filename fragments of letters that are queued for sending.
const QUEUED_LETTERS: &[&str] = &[
    "preservation",
    "police_report_request",
    "dot_camera_request",
    "hospital_lit_hold",
    "employment_lit_hold",
    "medical_records_request",
];

/// A new intake as submitted.
#[derive(Debug, Clone, Default)]
pub struct IntakeRequest {
    pub text: String,
    pub client_name: String,
    /// Case title; defaults to the analysis category.
    pub title: Option<String>,
}

impl IntakeRequest {
    pub fn new(text: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            client_name: client_name.into(),
            title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDraft {
    pub title: String,
    pub status: String,
    /// Lower-case priority label, e.g. `medium-high`.
    pub priority: String,
    pub due: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    /// Filename of the letter this draft carries.
    pub attachment: String,
}

/// A letter scheduled to go out unless a reviewer intervenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedNotice {
    pub filename: String,
    pub subject: String,
    pub body: String,
    pub send_after: DateTime<Utc>,
}

/// Everything derived for a new case from one intake narrative.
#[derive(Debug, Clone, Serialize)]
pub struct IntakePlan {
    pub title: String,
    pub client_name: String,
    pub analysis: AnalysisOutcome,
    pub case_type: Option<&'static CaseType>,
    pub priority: Priority,
    pub insight: String,
    pub actions: Vec<ActionDraft>,
    pub letters: Vec<LetterSpec>,
    pub email_drafts: Vec<EmailDraft>,
    pub queued_notices: Vec<QueuedNotice>,
    pub incident_date: DateTime<Utc>,
    pub deadlines: Vec<ResolvedDeadline>,
}

pub(crate) fn build(
    analysis: AnalysisOutcome,
    request: &IntakeRequest,
    firm: &FirmProfile,
    evidence_retention_days: i64,
    now: DateTime<Utc>,
) -> IntakePlan {
    let result = &analysis.result;
    let priority = result.priority;

    let insight = format!(
        "{} | Urgency: {} | Dept: {}",
        result.category, result.urgency, result.department
    );

    let actions = result
        .suggested_actions
        .iter()
        .take(MAX_ACTIONS)
        .map(|title| ActionDraft {
            title: title.clone(),
            status: "pending".to_string(),
            priority: priority.as_lower().to_string(),
            due: now + Duration::days(1),
        })
        .collect();

    let letters = match result.scenario() {
        Some(kind) => {
            let fields = letter_fields_from_analysis(result, &request.client_name);
            generate_all_letters_for_scenario(kind, &fields, firm, now.date_naive())
        }
        None => Vec::new(),
    };

    let email_drafts = letters
        .iter()
        .map(|l| EmailDraft {
            subject: format!("Draft: {}", draft_title(&l.filename)),
            body: format!("Please review attached draft document: {}", l.filename),
            attachment: l.filename.clone(),
        })
        .collect();

    let queued_notices = letters
        .iter()
        .filter(|l| should_queue(&l.filename))
        .map(|l| QueuedNotice {
            filename: l.filename.clone(),
            subject: queued_subject(l),
            body: l.body.clone(),
            send_after: now + Duration::hours(1),
        })
        .collect();

    let incident_date = resolve_incident_date(&result.dates, now);
    let deadlines =
        resolve_deadlines(&result.category, incident_date, now, evidence_retention_days);

    let case_type = result.case_type_key.as_deref().and_then(taxonomy::lookup);

    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| result.category.clone());

    IntakePlan {
        title,
        client_name: request.client_name.trim().to_string(),
        case_type,
        priority,
        insight,
        actions,
        letters,
        email_drafts,
        queued_notices,
        incident_date,
        deadlines,
        analysis,
    }
}

fn should_queue(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    QUEUED_LETTERS.iter().any(|k| lower.contains(k))
}

fn queued_subject(letter: &LetterSpec) -> String {
    let subject = if letter.subject.trim().is_empty() {
        extract_subject(&letter.body)
    } else {
        letter.subject.clone()
    };
    if subject.is_empty() {
        "Legal Notice".to_string()
    } else {
        subject
    }
}

/// `preservation_walmart_2024-05-01.txt` -> `Preservation Walmart 2024-05-01.Txt`.
///
/// Each run of letters is capitalised after any non-letter.
fn draft_title(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    let mut prev_alpha = false;
    for c in filename.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
