//! Scenario detection for intake narratives.
//!
//! Four hand-authored detectors run in a fixed order and the first match
//! wins: premises slip-and-fall, motor-vehicle collision, employment age
//! discrimination, medical malpractice with a retained object. Each detector
//! is a conjunction of word-bounded token groups. A narrative that matches
//! none of them gets the generic result, annotated with the keyword
//! classifier's best guess.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use lexintake_core::analysis::{AnalysisResult, Level, ScenarioKind};
use regex::Regex;
use tracing::debug;

use crate::classifier::CaseTypeClassifier;
use crate::extract::dates_in_order;

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("Invalid scenario regex")
}

// ── Detection tokens ──

static RETAILER: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bwal-?mart\b"));
static SLIP: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bslip(?:s|ped|ping|pery)?\b"));
static HAZARD: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:water|wet\s+floors?|produce)\b"));

static COLLISION: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:accidents?|collisions?|crash(?:es|ed|ing)?|wrecks?)\b")
});
static ROAD: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:highways?|roads?|roadways?|streets?|intersections?|freeways?)\b")
});

static DISCRIMINATION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:discriminat\w*|harass\w*|pushed\s+out)\b"));
static AGE_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:age[sd]?|older|retir\w*)\b"));

static RETAINED: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:sponges?|retained\s+foreign|left\s+inside)\b"));
static SURGICAL: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bsurg(?:ery|eries|eon|eons)\b"));

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\b(?:yesterday|last\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|week|month)|\d{1,2}(?::\d{2})?\s?(?:am|pm))\b",
    )
});

// ── Fact extraction ──

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b\d{1,2}(?::\d{2})?\s?(?:am|pm)\b"));
static BODY_PART: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(head|neck|back|shoulders?|arms?|wrists?|hips?|knees?|ankles?|legs?|ribs?)\b")
});
static TREATMENT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(emergency\s+room|hospital|urgent\s+care|ambulance|doctor|chiropractor)\b")
});
static STORE_AREA: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b([a-z]+\s+(?:section|aisle|department))\b"));
static NO_SIGN: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:no|nobody|didn't|did\s+not|without|never)\b[^.]{0,40}\bsigns?\b")
});
static WITNESS: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:witness(?:es|ed)?|saw\s+(?:me|it|the)|bystanders?)\b")
});

static ROUTE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:highway|route|interstate|hwy|i-)\s?\d{1,4}\b"));
static POLICE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bpolice\b"));

static EMPLOYER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(?:at|for)\s+([A-Z][A-Za-z0-9&.-]*(?:\s+[A-Z][A-Za-z0-9&.-]*)*)")
});
static AGE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:i['’]?m|i\s+am|aged?)\s+(\d{2})\b|\b(\d{2})\s*(?:years?|yrs?)[\s-]*old\b")
});
static TENURE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\bfor\s+(?:over\s+|about\s+|almost\s+|nearly\s+)?(\d{1,2})\s+years\b")
});
static ADVERSE_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\b(fired|terminated|laid\s+off|let\s+go|demoted|bad\s+performance\s+review|pushed\s+out)\b",
    )
});
static WRITTEN_EVIDENCE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(emails?|texts?|text\s+messages|recordings?|notes)\b"));

static HOSPITAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b((?:[A-Z][a-z]+\s+)+(?:Hospital|Medical\s+Center|Clinic|Surgery\s+Center))\b")
});
static SURGEON_NAME: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bDr\.?\s+([A-Z][a-z]+)"));
static PROCEDURE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(gallbladder|appendix|hernia|knee|hip|spinal|spine|heart|cardiac|c-section|cesarean|hysterectomy|bariatric)\b")
});
static SYMPTOM: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(pain|fever|infection|swelling|nausea|bleeding)\b"));
static REPEAT_SURGERY: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:another|second|corrective|follow-up)\s+(?:surgery|operation|procedure)\b")
});

/// Insurance carriers recognised in collision narratives, in lookup order.
pub const KNOWN_INSURERS: [&str; 5] = ["statefarm", "state farm", "geico", "progressive", "allstate"];

/// Which scenario, if any, the narrative matches. First match wins.
pub fn detect_scenario(text: &str) -> Option<ScenarioKind> {
    if RETAILER.is_match(text) && SLIP.is_match(text) && HAZARD.is_match(text) {
        Some(ScenarioKind::SlipFall)
    } else if COLLISION.is_match(text) && ROAD.is_match(text) {
        Some(ScenarioKind::CarAccident)
    } else if DISCRIMINATION.is_match(text) && AGE_CONTEXT.is_match(text) {
        Some(ScenarioKind::Employment)
    } else if RETAINED.is_match(text) && SURGICAL.is_match(text) {
        Some(ScenarioKind::MedicalMalpractice)
    } else {
        None
    }
}

/// Absolute date mentions followed by relative ones, raw and de-duplicated.
pub fn date_mentions(text: &str) -> Vec<String> {
    let mut dates = dates_in_order(text);
    for m in RELATIVE_DATE.find_iter(text) {
        let s = m.as_str().trim().to_string();
        if !dates.contains(&s) {
            dates.push(s);
        }
    }
    dates
}

/// Rule-based analyzer: scenario detectors with keyword-classifier fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioAnalyzer {
    classifier: CaseTypeClassifier,
}

impl ScenarioAnalyzer {
    pub fn new(classifier: CaseTypeClassifier) -> Self {
        Self { classifier }
    }

    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let dates = date_mentions(text);
        let result = match detect_scenario(text) {
            Some(ScenarioKind::SlipFall) => slip_fall(text, dates),
            Some(ScenarioKind::CarAccident) => car_accident(text, dates),
            Some(ScenarioKind::Employment) => employment(text, dates),
            Some(ScenarioKind::MedicalMalpractice) => medical_malpractice(text, dates),
            None => self.generic(dates, text),
        };
        debug!(
            category = %result.category,
            facts = result.key_facts.len(),
            dates = result.dates.len(),
            "scenario analysis complete"
        );
        result
    }

    fn generic(&self, dates: Vec<String>, text: &str) -> AnalysisResult {
        let guess = self.classifier.classify(text);
        AnalysisResult {
            dates,
            suggested_actions: strings(&["Review case details", "Schedule client meeting"]),
            case_type_key: guess.case_type_key().map(str::to_string),
            confidence: Some(guess.confidence),
            ..AnalysisResult::uncategorised()
        }
    }
}

/// Scenario analysis with the default classifier settings.
pub fn analyze_intake_text_scenarios(text: &str) -> AnalysisResult {
    ScenarioAnalyzer::default().analyze(text)
}

// ── Helpers ──

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn checklist(name: &str, items: &[&str]) -> (String, Vec<String>) {
    (name.to_string(), strings(items))
}

fn facts(pairs: Vec<(&str, Option<String>)>) -> BTreeMap<String, Option<String>> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().trim().to_string())
}

fn first_group(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|c| {
        c.iter()
            .skip(1)
            .flatten()
            .next()
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Distinct lower-cased matches joined with ", ".
fn all_matches(re: &Regex, text: &str) -> Option<String> {
    let mut seen: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        let s = collapse_ws(&m.as_str().to_lowercase());
        if !seen.contains(&s) {
            seen.push(s);
        }
    }
    (!seen.is_empty()).then(|| seen.join(", "))
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn insurer(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    KNOWN_INSURERS
        .iter()
        .find(|name| lower.contains(*name))
        .map(|name| title_case(name))
}

// ── Scenario builders ──

fn slip_fall(text: &str, dates: Vec<String>) -> AnalysisResult {
    let store = first_match(&RETAILER, text)
        .map(|s| title_case(&s.replace('-', "")))
        .unwrap_or_else(|| "Walmart".to_string());

    AnalysisResult {
        category: "Personal Injury - Premises Liability".into(),
        department: "Personal Injury".into(),
        priority: Level::High,
        urgency: Level::High,
        key_facts: facts(vec![
            ("store", Some(store.clone())),
            ("hazard", first_match(&HAZARD, text).map(|s| collapse_ws(&s.to_lowercase()))),
            ("area", first_group(&STORE_AREA, text).map(|s| collapse_ws(&s.to_lowercase()))),
            ("incident_time", first_match(&CLOCK_TIME, text)),
            ("injuries", all_matches(&BODY_PART, text)),
            ("medical_treatment", first_group(&TREATMENT, text).map(|s| s.to_lowercase())),
            ("warning_signs", NO_SIGN.is_match(text).then(|| "None posted".to_string())),
            ("witnesses", WITNESS.is_match(text).then(|| "Possible witnesses present".to_string())),
        ]),
        dates,
        parties: BTreeMap::new(),
        suggested_actions: vec![
            format!("Send evidence preservation letter to {store} immediately"),
            "Request security camera footage before it is overwritten".into(),
            "Obtain the store incident report".into(),
            "Collect medical records and bills".into(),
            "Identify and interview witnesses".into(),
        ],
        checklists: BTreeMap::from([
            checklist(
                "evidence",
                &[
                    "Security camera footage",
                    "Store incident report",
                    "Photos of the hazard and the area",
                    "Cleaning and inspection logs",
                ],
            ),
            checklist(
                "medical_records",
                &[
                    "Emergency room records",
                    "Imaging and diagnostic results",
                    "Treating physician notes",
                    "Medical bills",
                ],
            ),
            checklist(
                "witnesses",
                &["Customer witness names", "Employees on duty", "Manager on duty"],
            ),
            checklist(
                "damages",
                &["Lost wages", "Out-of-pocket expenses", "Pain and suffering journal"],
            ),
        ]),
        case_type_key: Some("pi_slip_fall".into()),
        confidence: None,
    }
}

fn car_accident(text: &str, dates: Vec<String>) -> AnalysisResult {
    let lower = text.to_lowercase();
    let violation = if lower.contains("red light") {
        Some("Ran red light")
    } else if lower.contains("stop sign") {
        Some("Ran stop sign")
    } else if lower.contains("speeding") {
        Some("Speeding")
    } else if lower.contains("rear-ended") || lower.contains("rear ended") {
        Some("Rear-end collision")
    } else {
        None
    };
    let other_insurance = insurer(text);
    let insurer_label = other_insurance
        .clone()
        .unwrap_or_else(|| "the other driver's insurer".to_string());

    AnalysisResult {
        category: "Car Accident / Auto Collision".into(),
        department: "Personal Injury".into(),
        priority: Level::High,
        urgency: Level::High,
        key_facts: facts(vec![
            ("other_insurance", other_insurance),
            ("violation", violation.map(str::to_string)),
            ("location", first_match(&ROUTE, text).map(|s| collapse_ws(&s))),
            ("incident_time", first_match(&CLOCK_TIME, text)),
            ("injuries", all_matches(&BODY_PART, text)),
            ("medical_treatment", first_group(&TREATMENT, text).map(|s| s.to_lowercase())),
            ("police_report", POLICE.is_match(text).then(|| "Police responded".to_string())),
        ]),
        dates,
        parties: BTreeMap::new(),
        suggested_actions: vec![
            "Request the police accident report".into(),
            format!("Send letter of representation to {insurer_label}"),
            "Request traffic camera footage".into(),
            "Schedule a medical evaluation within 48 hours".into(),
            "Photograph vehicle damage and the scene".into(),
        ],
        checklists: BTreeMap::from([
            checklist(
                "evidence",
                &[
                    "Police report",
                    "Traffic camera footage",
                    "Photos of vehicles and scene",
                    "Witness contact information",
                ],
            ),
            checklist(
                "insurance",
                &[
                    "Client policy declarations page",
                    "Other driver's insurer and claim number",
                    "Property damage estimate",
                ],
            ),
            checklist(
                "medical_records",
                &["Emergency room records", "Follow-up treatment notes", "Medical bills"],
            ),
        ]),
        case_type_key: Some("pi_auto_collision".into()),
        confidence: None,
    }
}

fn employment(text: &str, dates: Vec<String>) -> AnalysisResult {
    AnalysisResult {
        category: "Employment Law - Age Discrimination".into(),
        department: "Employment".into(),
        priority: Level::MediumHigh,
        urgency: Level::MediumHigh,
        key_facts: facts(vec![
            ("employer", first_group(&EMPLOYER, text)),
            ("age", first_group(&AGE_LITERAL, text)),
            ("tenure", first_group(&TENURE, text).map(|n| format!("{n} years"))),
            ("discrimination_type", Some("Age".into())),
            ("adverse_action", first_group(&ADVERSE_ACTION, text).map(|s| collapse_ws(&s.to_lowercase()))),
            ("written_evidence", first_group(&WRITTEN_EVIDENCE, text).map(|s| s.to_lowercase())),
        ]),
        dates,
        parties: BTreeMap::new(),
        suggested_actions: strings(&[
            "Send litigation hold letter to employer",
            "Calendar the 180-day EEOC filing deadline",
            "Request the complete personnel file",
            "Document each age-related comment with dates and witnesses",
            "Identify younger comparator employees",
        ]),
        checklists: BTreeMap::from([
            checklist(
                "documents",
                &[
                    "Performance reviews",
                    "Emails and messages with age-related comments",
                    "Offer letter and employment agreement",
                    "Pay and benefits history",
                ],
            ),
            checklist(
                "witnesses",
                &["Coworkers who heard the comments", "Former employees in the same role"],
            ),
            checklist(
                "eeoc",
                &[
                    "Timeline of discriminatory acts",
                    "Internal complaints and HR responses",
                    "Intake questionnaire",
                ],
            ),
        ]),
        case_type_key: Some("emp_age_discrimination".into()),
        confidence: None,
    }
}

fn medical_malpractice(text: &str, dates: Vec<String>) -> AnalysisResult {
    let lower = text.to_lowercase();
    let retained_object = if lower.contains("sponge") {
        "Surgical sponge"
    } else {
        "Foreign object"
    };

    AnalysisResult {
        category: "Medical Malpractice - Retained Foreign Object".into(),
        department: "Medical Malpractice".into(),
        priority: Level::High,
        urgency: Level::High,
        key_facts: facts(vec![
            ("hospital", first_group(&HOSPITAL_NAME, text).map(|s| collapse_ws(&s))),
            ("surgeon", first_group(&SURGEON_NAME, text).map(|n| format!("Dr. {n}"))),
            ("procedure", first_group(&PROCEDURE, text).map(|p| format!("{} surgery", title_case(&p)))),
            ("retained_object", Some(retained_object.into())),
            ("symptoms", all_matches(&SYMPTOM, text)),
            ("corrective_surgery", REPEAT_SURGERY.is_match(text).then(|| "Yes".to_string())),
        ]),
        dates,
        parties: BTreeMap::new(),
        suggested_actions: strings(&[
            "Request complete medical records including surgical count sheets",
            "Send litigation hold letter to the hospital",
            "Retain a medical expert for case review",
            "Obtain imaging that confirms the retained object",
            "Check certificate of merit requirements",
        ]),
        checklists: BTreeMap::from([
            checklist(
                "medical_records",
                &[
                    "Operative report",
                    "Surgical count sheets",
                    "Anesthesia record",
                    "Records from the corrective procedure",
                ],
            ),
            checklist(
                "expert_review",
                &[
                    "Board-certified surgeon in the same specialty",
                    "Standard of care opinion",
                    "Causation opinion",
                ],
            ),
            checklist(
                "damages",
                &["Additional medical bills", "Lost wages", "Future care estimate"],
            ),
        ]),
        case_type_key: Some("medmal_retained_object".into()),
        confidence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexintake_core::analysis::{CATEGORY_OTHER, DEPARTMENT_GENERAL};
    use lexintake_core::taxonomy;

    const SLIP_TEXT: &str = "I was shopping at Walmart last Tuesday around 3pm and I slipped on some water \
        near the produce section. Nobody put up a wet floor sign. I hurt my back and knee really \
        bad and went to the hospital. There were other customers around who saw me fall.";

    const CAR_TEXT: &str = "I was driving on Highway 95 yesterday morning around 8am during rush hour. \
        A red pickup truck ran a red light and hit the driver's side of my Honda Civic. \
        My neck hurts and my car is totaled. The other driver's insurance is StateFarm. \
        The police came and took a report. I went to the emergency room after the accident.";

    const EMP_TEXT: &str = "I've been working at TechCorp for 5 years as a software engineer. \
        He makes comments about my age - I'm 58. Last month he gave me a bad performance review. \
        Yesterday he told me I should consider retiring. I think I'm being pushed out because of \
        my age. I have emails where he mentions my age.";

    const MEDMAL_TEXT: &str = "Three months ago I had surgery at City Hospital to remove my gallbladder. \
        The surgeon was Dr. Roberts. After the surgery I kept having pain and fever. \
        I went to a different hospital last week and they found the surgeon left a surgical \
        sponge inside me. I had to have another surgery to remove it.";

    #[test]
    fn slip_and_fall_narrative() {
        let r = analyze_intake_text_scenarios(SLIP_TEXT);
        assert_eq!(r.category, "Personal Injury - Premises Liability");
        assert_eq!(r.priority, Level::High);
        assert_eq!(r.urgency, Level::High);
        assert_eq!(r.case_type_key.as_deref(), Some("pi_slip_fall"));
        assert_eq!(r.fact("store"), Some("Walmart"));
        assert_eq!(r.fact("hazard"), Some("water"));
        assert_eq!(r.fact("area"), Some("produce section"));
        assert_eq!(r.fact("injuries"), Some("back, knee"));
        assert_eq!(r.fact("incident_time"), Some("3pm"));
        assert_eq!(r.fact("warning_signs"), Some("None posted"));
        assert!(r.fact("witnesses").is_some());
        assert_eq!(r.dates, ["last Tuesday", "3pm"]);
        assert_eq!(r.suggested_actions.len(), 5);
        assert_eq!(r.checklists.len(), 4);
    }

    #[test]
    fn car_accident_narrative() {
        let r = analyze_intake_text_scenarios(CAR_TEXT);
        assert_eq!(r.category, "Car Accident / Auto Collision");
        assert_eq!(r.priority, Level::High);
        assert_eq!(r.fact("other_insurance"), Some("Statefarm"));
        assert_eq!(r.fact("violation"), Some("Ran red light"));
        assert_eq!(r.fact("location"), Some("Highway 95"));
        assert_eq!(r.fact("injuries"), Some("neck"));
        assert_eq!(r.fact("medical_treatment"), Some("emergency room"));
        assert_eq!(r.dates, ["yesterday", "8am"]);
        assert!(r.suggested_actions.iter().any(|a| a.contains("Statefarm")));
    }

    #[test]
    fn employment_narrative() {
        let r = analyze_intake_text_scenarios(EMP_TEXT);
        assert_eq!(r.category, "Employment Law - Age Discrimination");
        assert_eq!(r.department, "Employment");
        assert_eq!(r.priority, Level::MediumHigh);
        assert_eq!(r.urgency, Level::MediumHigh);
        assert_eq!(r.fact("employer"), Some("TechCorp"));
        assert_eq!(r.fact("age"), Some("58"));
        assert_eq!(r.fact("tenure"), Some("5 years"));
        assert_eq!(r.fact("adverse_action"), Some("bad performance review"));
        assert_eq!(r.fact("written_evidence"), Some("emails"));
        assert_eq!(r.case_type_key.as_deref(), Some("emp_age_discrimination"));
    }

    #[test]
    fn medical_malpractice_narrative() {
        let r = analyze_intake_text_scenarios(MEDMAL_TEXT);
        assert_eq!(r.category, "Medical Malpractice - Retained Foreign Object");
        assert_eq!(r.fact("hospital"), Some("City Hospital"));
        assert_eq!(r.fact("surgeon"), Some("Dr. Roberts"));
        assert_eq!(r.fact("procedure"), Some("Gallbladder surgery"));
        assert_eq!(r.fact("retained_object"), Some("Surgical sponge"));
        assert_eq!(r.fact("symptoms"), Some("pain, fever"));
        assert_eq!(r.fact("corrective_surgery"), Some("Yes"));
        assert_eq!(r.dates, ["last week"]);
    }

    #[test]
    fn minimal_conjuncts_select_each_scenario() {
        let cases = [
            ("I slipped on water at Walmart", ScenarioKind::SlipFall),
            ("There was a crash on the highway", ScenarioKind::CarAccident),
            ("Harassment at work because of my age", ScenarioKind::Employment),
            ("The surgeon left a sponge", ScenarioKind::MedicalMalpractice),
        ];
        for (text, kind) in cases {
            assert_eq!(detect_scenario(text), Some(kind), "{text}");
            let padded = format!("Hello there. {text}. The weather was mild and I had lunch.");
            let r = analyze_intake_text_scenarios(&padded);
            assert_eq!(r.scenario(), Some(kind), "{padded}");
        }
    }

    #[test]
    fn partial_conjuncts_fall_through() {
        // Retailer and slip without a hazard.
        assert_eq!(detect_scenario("I slipped at Walmart"), None);
        // Collision without a road.
        assert_eq!(detect_scenario("It was an accident"), None);
        // Age context without a discrimination indicator.
        assert_eq!(detect_scenario("I am thinking about retirement"), None);
        // Retained object without a surgical context.
        assert_eq!(detect_scenario("I bought a new sponge"), None);
    }

    #[test]
    fn tokens_are_word_bounded() {
        // "page" contains "age", "roadmap" contains "road".
        assert_eq!(detect_scenario("harassment over the page layout"), None);
        assert_eq!(detect_scenario("accident on the roadmap"), None);
    }

    #[test]
    fn tokens_accept_inflections() {
        let cases = [
            ("I have been in two accidents on this highway", ScenarioKind::CarAccident),
            ("The crash happened on the roadway", ScenarioKind::CarAccident),
            ("Collisions at the intersection hurt me", ScenarioKind::CarAccident),
            ("Two cars crashed on Main Street", ScenarioKind::CarAccident),
            ("I fell on a slippery wet floor at Walmart", ScenarioKind::SlipFall),
            ("She slips on wet floors at Wal-Mart", ScenarioKind::SlipFall),
            ("They harassed the aged staff", ScenarioKind::Employment),
        ];
        for (text, kind) in cases {
            assert_eq!(detect_scenario(text), Some(kind), "{text}");
        }
    }

    #[test]
    fn first_declared_scenario_wins() {
        let text = "After the accident on the highway my boss made harassment remarks about my age";
        assert_eq!(detect_scenario(text), Some(ScenarioKind::CarAccident));
    }

    #[test]
    fn unmatched_text_gets_generic_result() {
        let r = analyze_intake_text_scenarios("I need help with a will for my grandmother");
        assert_eq!(r.category, CATEGORY_OTHER);
        assert_eq!(r.department, DEPARTMENT_GENERAL);
        assert_eq!(r.priority, Level::Medium);
        assert_eq!(r.urgency, Level::Medium);
        assert_eq!(r.suggested_actions, ["Review case details", "Schedule client meeting"]);
        assert!(r.checklists.is_empty());
        assert!(r.key_facts.is_empty());
        // Classifier guess is attached without changing the category.
        assert_eq!(r.case_type_key.as_deref(), Some("estate_planning"));
        assert_eq!(r.confidence, Some(0.1));
    }

    #[test]
    fn empty_text_is_generic() {
        let r = analyze_intake_text_scenarios("");
        assert_eq!(r.category, CATEGORY_OTHER);
        assert_eq!(r.case_type_key, None);
        assert_eq!(r.confidence, Some(0.5));
        assert!(r.dates.is_empty());
    }

    #[test]
    fn missing_facts_are_null_not_absent() {
        let r = analyze_intake_text_scenarios("There was a crash on the highway");
        assert!(r.key_facts.contains_key("other_insurance"));
        assert_eq!(r.fact("other_insurance"), None);
        assert_eq!(r.fact("violation"), None);
        assert!(
            r.suggested_actions
                .iter()
                .any(|a| a.contains("the other driver's insurer"))
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        for text in [SLIP_TEXT, CAR_TEXT, EMP_TEXT, MEDMAL_TEXT, "random words", ""] {
            assert_eq!(
                analyze_intake_text_scenarios(text),
                analyze_intake_text_scenarios(text)
            );
        }
    }

    #[test]
    fn scenario_keys_resolve_in_taxonomy() {
        for text in [SLIP_TEXT, CAR_TEXT, EMP_TEXT, MEDMAL_TEXT] {
            let key = analyze_intake_text_scenarios(text).case_type_key.unwrap();
            assert!(taxonomy::lookup(&key).is_some(), "{key}");
        }
    }

    #[test]
    fn date_mentions_put_absolute_dates_first() {
        let dates = date_mentions("Yesterday at 10:30 am, and again on March 3, 2024. Also yesterday.");
        assert_eq!(dates, ["March 3, 2024", "Yesterday", "10:30 am", "yesterday"]);
    }

    #[test]
    fn insurer_lookup_is_closed_list() {
        assert_eq!(insurer("my insurer is State Farm"), Some("State Farm".into()));
        assert_eq!(insurer("GEICO called"), Some("Geico".into()));
        assert_eq!(insurer("Liberty Mutual"), None);
    }
}
