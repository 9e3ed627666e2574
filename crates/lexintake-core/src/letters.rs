//! Letter templates per scenario.
//!
//! Rendering is pure string templating. A field that is not supplied is
//! rendered as a bracketed placeholder (`[HOSPITAL NAME]`) for a human to
//! fill in; missing fields are never an error.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, ScenarioKind};
use crate::deadlines::STATUTE_OF_LIMITATIONS_DAYS;

pub const DEFAULT_FIRM_NAME: &str = "Your Law Firm Name";
pub const DEFAULT_FIRM_CONTACT: &str = "Address | Phone | Email";

/// Firm identity used to sign every letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmProfile {
    pub name: String,
    /// Single-line address / phone / email block.
    pub contact: String,
}

impl Default for FirmProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_FIRM_NAME.to_string(),
            contact: DEFAULT_FIRM_CONTACT.to_string(),
        }
    }
}

/// Named inputs for letter rendering. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFields {
    pub client_name: Option<String>,
    /// Incident, accident or procedure date. Defaults to the render date.
    pub incident_date: Option<String>,
    pub incident_time: Option<String>,
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub location: Option<String>,
    pub insurance_company: Option<String>,
    pub employer_name: Option<String>,
    pub hospital_name: Option<String>,
    pub surgeon_name: Option<String>,
    pub procedure_type: Option<String>,
    pub analysis_summary: Option<String>,
}

/// One rendered letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSpec {
    pub filename: String,
    pub subject: String,
    pub body: String,
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

/// Resolved field values for one render.
struct Ctx<'a> {
    client: &'a str,
    date: String,
    time: &'a str,
    store: &'a str,
    address: &'a str,
    location: &'a str,
    insurer: &'a str,
    employer: &'a str,
    hospital: &'a str,
    surgeon: &'a str,
    procedure: &'a str,
    summary: &'a str,
    today: NaiveDate,
    firm: &'a FirmProfile,
}

impl<'a> Ctx<'a> {
    fn new(fields: &'a LetterFields, firm: &'a FirmProfile, today: NaiveDate) -> Self {
        let date = match fields.incident_date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => today.format("%Y-%m-%d").to_string(),
        };
        Self {
            client: or_placeholder(&fields.client_name, "[CLIENT NAME]"),
            date,
            time: or_placeholder(&fields.incident_time, "[TIME]"),
            store: or_placeholder(&fields.store_name, "Walmart"),
            address: or_placeholder(&fields.store_address, "[ADDRESS]"),
            location: or_placeholder(&fields.location, "[LOCATION]"),
            insurer: or_placeholder(&fields.insurance_company, "[INSURANCE COMPANY]"),
            employer: or_placeholder(&fields.employer_name, "[EMPLOYER NAME]"),
            hospital: or_placeholder(&fields.hospital_name, "[HOSPITAL NAME]"),
            surgeon: or_placeholder(&fields.surgeon_name, "[SURGEON NAME]"),
            procedure: or_placeholder(&fields.procedure_type, "[PROCEDURE TYPE]"),
            summary: or_placeholder(&fields.analysis_summary, "N/A"),
            today,
            firm,
        }
    }

    fn stamp(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// Header, body and firm signature.
    fn signed(&self, header: &str, body: &str) -> String {
        format!(
            "{header}\n\n{body}\n\n{}\n{}\n",
            self.firm.name, self.firm.contact
        )
    }

    fn letter(&self, stem: &str, body: String) -> LetterSpec {
        LetterSpec {
            filename: format!("{stem}_{}.txt", self.stamp()),
            subject: extract_subject(&body),
            body,
        }
    }
}

/// Subject of a rendered letter: the text after a `Subject:` line, else the
/// first non-empty line.
pub fn extract_subject(body: &str) -> String {
    let mut first = None;
    for line in body.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Subject:") {
            return rest.trim().to_string();
        }
        if first.is_none() && !line.is_empty() {
            first = Some(line);
        }
    }
    first.unwrap_or_default().to_string()
}

/// Render every letter for a scenario, in a fixed order.
pub fn generate_all_letters_for_scenario(
    kind: ScenarioKind,
    fields: &LetterFields,
    firm: &FirmProfile,
    today: NaiveDate,
) -> Vec<LetterSpec> {
    let ctx = Ctx::new(fields, firm, today);
    match kind {
        ScenarioKind::SlipFall => vec![
            ctx.letter(
                &format!("preservation_{}", slug(ctx.store)),
                slip_fall_preservation(&ctx),
            ),
            ctx.letter("staff_request", slip_fall_staff_request(&ctx)),
            ctx.letter("medical_checklist", slip_fall_medical_checklist(&ctx)),
            ctx.letter("timeline", slip_fall_timeline(&ctx)),
        ],
        ScenarioKind::CarAccident => vec![
            ctx.letter("police_report_request", car_police_report(&ctx)),
            ctx.letter("dot_camera_request", car_dot_camera(&ctx)),
            ctx.letter("letter_of_representation", car_representation(&ctx)),
        ],
        ScenarioKind::Employment => vec![
            ctx.letter("employment_lit_hold", employment_lit_hold(&ctx)),
            ctx.letter("eeoc_preparation", employment_eeoc_guide(&ctx)),
        ],
        ScenarioKind::MedicalMalpractice => vec![
            ctx.letter("medical_records_request", medmal_records_request(&ctx)),
            ctx.letter("hospital_lit_hold", medmal_hospital_hold(&ctx)),
            ctx.letter("expert_witness_checklist", medmal_expert_checklist(&ctx)),
        ],
    }
}

/// Build letter fields from an analysis and the client's name.
///
/// The incident date is the first date mention that is not a clock time and
/// the incident time is the first `am`/`pm` mention.
pub fn letter_fields_from_analysis(analysis: &AnalysisResult, client_name: &str) -> LetterFields {
    let is_time = |d: &&String| {
        let lower = d.to_ascii_lowercase();
        lower.ends_with("am") || lower.ends_with("pm")
    };
    let fact = |key: &str| analysis.fact(key).map(str::to_string);
    let client = client_name.trim();

    LetterFields {
        client_name: (!client.is_empty()).then(|| client.to_string()),
        incident_date: analysis.dates.iter().find(|d| !is_time(d)).cloned(),
        incident_time: analysis.dates.iter().find(is_time).cloned(),
        store_name: fact("store"),
        store_address: fact("store_address"),
        location: fact("location"),
        insurance_company: fact("other_insurance"),
        employer_name: fact("employer"),
        hospital_name: fact("hospital"),
        surgeon_name: fact("surgeon"),
        procedure_type: fact("procedure"),
        analysis_summary: fact("summary"),
    }
}

fn slug(s: &str) -> String {
    let out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    out.trim_matches('_').to_string()
}

// ── Slip and fall ──

fn slip_fall_preservation(c: &Ctx) -> String {
    let header = format!(
        "To: {store} Legal Department / Store Manager\nSubject: Evidence Preservation Notice - Incident on {date}",
        store = c.store,
        date = c.date
    );
    let body = format!(
        "Dear Sir/Madam,

We represent {client}, who was injured at your store at {address} on {date} at about {time}.

Please treat this letter as formal notice to preserve the following evidence:

- Security camera footage from {date}, covering two hours before and after {time}
- Footage of the area where the fall occurred and its approaches
- Footage of the entrances, exits and checkout lanes
- Incident reports prepared on {date}
- Shift schedules and the full list of staff on duty at {time}
- Cleaning and maintenance logs for {date}
- Customer complaints about spills or floor hazards on {date}
- Training records for the employees on duty
- Store policies on floor inspection and warning signs
- Internal communications about the incident

Destroying or altering this material may expose {store} to sanctions for spoliation of evidence.

Please confirm in writing within 48 hours that the evidence has been preserved.

This is a litigation hold. Do not delete, discard or modify any of the items listed above.",
        client = c.client,
        address = c.address,
        date = c.date,
        time = c.time,
        store = c.store,
    );
    c.signed(&header, &body)
}

fn slip_fall_staff_request(c: &Ctx) -> String {
    let header = format!("Subject: Staff Information Request - Incident on {}", c.date);
    let body = format!(
        "Dear Sir/Madam,

In connection with the incident involving our client {client} on {date} at about {time}, please provide:

1. A list of every employee working on {date} during the shift that covered {time}
2. Names and contact details for:
   - The manager and assistant managers on duty
   - Cleaning and maintenance staff on duty
   - Security staff on duty
   - Any employee who saw or responded to the incident

3. Assigned responsibilities:
   - Who was responsible for cleaning the area where the fall occurred
   - Who was responsible for floor inspections that shift
   - Who was responsible for placing warning signs

4. Incident response:
   - Employees who helped our client
   - Employees who wrote any incident report
   - Employees who may have seen the hazard before the fall

We ask for this information within 7 business days.",
        client = c.client,
        date = c.date,
        time = c.time,
    );
    c.signed(&header, &body)
}

fn slip_fall_medical_checklist(c: &Ctx) -> String {
    let header = format!("Subject: Medical Records Checklist - {}", c.client);
    let body = format!(
        "Records to collect for {client}:

EMERGENCY CARE:
- Emergency room admission and triage records
- Physician and nursing notes
- Discharge summary

IMAGING AND DIAGNOSTICS:
- X-rays, CT and MRI studies with radiology reports
- Any other diagnostic test results

TREATMENT:
- Diagnoses and treatment plans
- Prescriptions and pain management records
- Procedure and injection notes

FOLLOW-UP:
- Follow-up visit notes
- Physical and occupational therapy records
- Specialist consultation reports

ONGOING CARE:
- Current treatment plan and prognosis
- Work restrictions or disability assessments
- Projected future medical needs

BILLING:
- All medical bills and invoices
- Insurance claims and explanations of benefits
- Receipts for out-of-pocket costs

Every record should show its date of service.",
        client = c.client,
    );
    c.signed(&header, &body)
}

/// Internal working document; not signed.
fn slip_fall_timeline(c: &Ctx) -> String {
    let statute = match parse_iso(&c.date) {
        Some(d) => (d + Duration::days(STATUTE_OF_LIMITATIONS_DAYS))
            .format("%Y-%m-%d")
            .to_string(),
        None => "[CALCULATE BASED ON STATE LAW]".to_string(),
    };
    let stamp = c.stamp();
    let lines = [
        format!("CASE TIMELINE - {}", c.client),
        "=".repeat(60),
        format!("Generated: {stamp}"),
        String::new(),
        "INCIDENT:".to_string(),
        format!("  Date: {}", c.date),
        format!("  Time: {}", c.time),
        format!("  Location: {} {}", c.store, c.address),
        String::new(),
        "MEDICAL TREATMENT:".to_string(),
        "  First Hospital Visit: [DATE/TIME]".to_string(),
        "  Follow-up Appointments: [DATES]".to_string(),
        "  Physical Therapy Start: [DATE]".to_string(),
        "  Treatment Status: [ONGOING/COMPLETED]".to_string(),
        String::new(),
        "KEY DEADLINES:".to_string(),
        format!("  Evidence Preservation Letter: {stamp} (IMMEDIATE)"),
        "  Security Footage Retention: usually 30-90 days (URGENT)".to_string(),
        format!("  Statute of Limitations: {statute}"),
        "  Demand Letter: [TO BE DETERMINED]".to_string(),
        String::new(),
        "NOTES:".to_string(),
        c.summary.to_string(),
        String::new(),
        "NEXT STEPS:".to_string(),
        "  1. Send the evidence preservation letter (immediately)".to_string(),
        "  2. Obtain security footage (within 7 days)".to_string(),
        "  3. Collect medical records (within 14 days)".to_string(),
        "  4. Interview witnesses (within 30 days)".to_string(),
        "  5. Retain experts if needed (within 60 days)".to_string(),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// ── Car accident ──

fn car_police_report(c: &Ctx) -> String {
    let header = format!(
        "Subject: Request for Accident Report - {} at {}",
        c.date, c.location
    );
    let body = format!(
        "Dear Records Division,

We represent {client}, who was involved in a collision on {date} at about {time} at {location}.

Please send us:

- The complete accident report with diagrams
- Officer narratives and supplemental reports
- Witness statements and contact information
- Photographs taken at the scene
- Any citations issued
- Dash camera or body camera footage

Report number, if assigned: [NUMBER]
Responding officer(s): [NAME(S)]

We will pay any reasonable copying fee. Please reply to the address below.",
        client = c.client,
        date = c.date,
        time = c.time,
        location = c.location,
    );
    c.signed(&header, &body)
}

fn car_dot_camera(c: &Ctx) -> String {
    let header = format!("Subject: Traffic Camera Footage Request - {}", c.date);
    let body = format!(
        "Dear Department of Transportation,

Our office is investigating a collision on {date} at {location}. Please preserve and produce:

- Traffic camera footage from all cameras covering {location}
- Time window: 30 minutes before and after {time}
- Signal timing and phase records for the intersection on {date}
- Maintenance or malfunction records for those signals and cameras

Footage at many agencies is overwritten within 30 to 90 days. Please preserve it now even if production will take longer.",
        date = c.date,
        location = c.location,
        time = c.time,
    );
    c.signed(&header, &body)
}

fn car_representation(c: &Ctx) -> String {
    let header = format!("Subject: Letter of Representation - {}", c.client);
    let body = format!(
        "To {insurer}:

Please be advised that this firm represents {client} for injuries from a motor vehicle collision on {date}.

From now on, direct all communication about this claim to our office. Do not contact our client directly.

Please send us:

- A copy of the declarations page for your insured's policy
- Your insured's recorded statement, if one was taken
- Photographs and property damage estimates

Date of loss: {date}
Claim number: [IF KNOWN]
Policy number: [IF KNOWN]

Please acknowledge this letter and confirm the available liability limits.",
        insurer = c.insurer,
        client = c.client,
        date = c.date,
    );
    c.signed(&header, &body)
}

// ── Employment ──

fn employment_lit_hold(c: &Ctx) -> String {
    let header = format!(
        "To: {} Human Resources / Legal\nSubject: Evidence Preservation Notice - Employment Matter",
        c.employer
    );
    let body = format!(
        "Dear Sir/Madam,

This firm represents {client} in a potential claim against {employer}. You are required to preserve all documents and electronically stored information related to our client's employment, including:

- Emails sent to or from {client} from [DATE] to present
- Emails and messages that mention {client}
- The complete personnel file
- Performance reviews, warnings and disciplinary records
- Compensation, bonus and benefits records
- Records of promotions, transfers and reassignments
- Documents about any reduction in force or reorganization
- Age and demographic data for the relevant department
- Chat, text and collaboration-tool messages about {client}

Suspend any automatic deletion policy that could affect these records. Failure to preserve them may lead to sanctions.

Please confirm in writing within 10 days that a litigation hold is in place.",
        client = c.client,
        employer = c.employer,
    );
    c.signed(&header, &body)
}

fn employment_eeoc_guide(c: &Ctx) -> String {
    let header = format!("Subject: EEOC Charge Preparation - {}", c.client);
    let body = format!(
        "EEOC charge preparation for {client} against {employer}.

DEADLINE:
- 180 days from the last discriminatory act (300 days in deferral states)

INFORMATION TO GATHER:
- Dates of hire, promotions and separation
- Job titles and supervisors
- Each discriminatory remark or act, with date, speaker and witnesses
- Ages of employees who replaced or were favored over {client}
- Any complaint made to HR and the response
- Pay and benefits history

DOCUMENTS:
- Offer letter and employment agreement
- Performance reviews
- Termination or resignation paperwork
- Emails or messages showing age-related comments

NEXT STEPS:
1. Complete the intake questionnaire with the client
2. Draft the charge narrative
3. File through the EEOC public portal
4. Calendar the right-to-sue window",
        client = c.client,
        employer = c.employer,
    );
    c.signed(&header, &body)
}

// ── Medical malpractice ──

fn medmal_records_request(c: &Ctx) -> String {
    let header = "Subject: Authorization to Release Medical Records - URGENT";
    let body = format!(
        "To: {hospital} Medical Records Department

Patient: {client}
Date of Birth: [DOB]
Medical Record Number: [IF KNOWN]
Date of Procedure: {date}

Under the enclosed authorization, please release the complete record for this patient, including:

PRE-OPERATIVE:
- History and physical, consent forms, pre-operative testing

OPERATIVE:
- Operative report and anesthesia record
- Surgical count sheets for sponges, needles and instruments
- Intraoperative nursing notes
- Names of everyone in the operating room

POST-OPERATIVE:
- Recovery and nursing notes
- Imaging studies and reports
- Discharge summary and instructions
- Incident or occurrence reports

Please also send the itemized billing record. We ask for production within 14 days.",
        hospital = c.hospital,
        client = c.client,
        date = c.date,
    );
    c.signed(header, &body)
}

fn medmal_hospital_hold(c: &Ctx) -> String {
    let header = format!(
        "To: {} Risk Management / Legal\nSubject: Litigation Hold - Surgical Procedure on {}",
        c.hospital, c.date
    );
    let body = format!(
        "Dear Risk Manager,

This firm represents {client}, who underwent surgery at {hospital} on {date}. The matter involves a retained surgical item.

Patient: {client}
Procedure: {procedure}
Surgeon: {surgeon}
Date: {date}

You are directed to preserve:

- The complete medical and billing record
- Surgical count sheets and count policies
- Operating room schedules and staffing for {date}
- Credentialing files for {surgeon}
- Any retained item, specimen or pathology material
- Incident reports, root cause analyses and peer review material to the extent permitted
- Audit trails of the electronic health record

Do not alter, destroy or relocate any of these items. Please confirm the hold in writing within 10 days.",
        client = c.client,
        hospital = c.hospital,
        date = c.date,
        procedure = c.procedure,
        surgeon = c.surgeon,
    );
    c.signed(&header, &body)
}

fn medmal_expert_checklist(c: &Ctx) -> String {
    let header = format!("Subject: Medical Expert Witness Requirements - {}", c.client);
    let body = format!(
        "Expert review for {client}, procedure: {procedure}.

QUALIFICATIONS:
- Board certified in the same specialty as the defendant surgeon
- Actively practicing or teaching within the last five years
- Experience performing {procedure}

SCOPE OF REVIEW:
- Standard of care for surgical counts
- Whether the retained item was a breach of that standard
- Causation of the client's injuries
- Future medical needs

MATERIALS TO SEND:
- Complete medical records
- Imaging showing the retained item
- Client timeline and symptom history

FEES:
- Initial review: $[AMOUNT]
- Written report: $[AMOUNT]
- Deposition: $[AMOUNT] per hour
- Trial testimony: $[AMOUNT] per day

The expert must be able to support a certificate of merit where the state requires one.",
        client = c.client,
        procedure = c.procedure,
    );
    c.signed(&header, &body)
}
