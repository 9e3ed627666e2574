//! Command-line surface: argument parsing, configuration, command dispatch.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use lexintake_ai::{CaseTypeClassifier, TextAnalyzer, extract_entities};
use lexintake_core::deadlines::DEFAULT_EVIDENCE_RETENTION_DAYS;
use lexintake_core::letters::{DEFAULT_FIRM_CONTACT, DEFAULT_FIRM_NAME};
use lexintake_core::{
    AnalyzerKind, ClassifierConfig, FirmProfile, IntakeConfig, LetterFields, RemoteConfig,
    ScenarioKind, generate_all_letters_for_scenario, resolve_deadlines,
};
use lexintake_pipeline::{IntakePipeline, IntakeRequest, write_letter_files, write_letters};
use lexintake_remote::RemoteAnalyzer;
use serde::Serialize;
use tracing::{info, warn};

use crate::display;

#[derive(Debug, Parser)]
#[command(
    name = "lexintake",
    version,
    about = "Legal intake analysis: classification, fact extraction, letter drafts and deadlines"
)]
pub struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Configuration shared by every command.
#[derive(Debug, Args)]
struct Settings {
    /// Firm name used to sign letters
    #[arg(long, env = "LAW_FIRM_NAME", default_value = DEFAULT_FIRM_NAME, global = true)]
    firm_name: String,

    /// Firm contact line used to sign letters
    #[arg(long, env = "LAW_FIRM_CONTACT", default_value = DEFAULT_FIRM_CONTACT, global = true)]
    firm_contact: String,

    /// Days a store keeps security footage before overwriting it
    #[arg(
        long,
        env = "EVIDENCE_RETENTION_DAYS",
        default_value_t = DEFAULT_EVIDENCE_RETENTION_DAYS,
        global = true
    )]
    evidence_retention_days: i64,

    /// API key for the remote analyzer
    #[arg(long, env = "ASSEMBLYAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Use the remote analyzer first, falling back to rule-based analysis.
    /// Only "true" (any case) enables it; `--remote` alone means true.
    #[arg(
        long = "remote",
        env = "USE_AAI_ANALYZER",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_switch,
        global = true
    )]
    use_remote: bool,

    /// Overall deadline for the remote analyzer, in seconds. Defaults to
    /// long enough for every remote retry.
    #[arg(long, env = "LEXINTAKE_ANALYZER_DEADLINE_SECS", global = true)]
    analyzer_deadline_secs: Option<u64>,

    /// Confidence reported when no keyword matches
    #[arg(long, env = "LEXINTAKE_NO_MATCH_CONFIDENCE", default_value_t = 0.5, global = true)]
    no_match_confidence: f32,
}

fn parse_switch(s: &str) -> Result<bool, String> {
    Ok(s.trim().eq_ignore_ascii_case("true"))
}

impl Settings {
    fn to_config(&self) -> anyhow::Result<IntakeConfig> {
        let remote = RemoteConfig {
            api_key: self.api_key.clone(),
            ..RemoteConfig::default()
        };
        let analyzer_deadline = match self.analyzer_deadline_secs {
            Some(secs) => Duration::from_secs(secs),
            None => remote.worst_case(),
        };
        let config = IntakeConfig {
            firm: FirmProfile {
                name: self.firm_name.clone(),
                contact: self.firm_contact.clone(),
            },
            evidence_retention_days: self.evidence_retention_days,
            classifier: ClassifierConfig {
                no_match_confidence: self.no_match_confidence,
            },
            remote,
            analyzer: if self.use_remote {
                AnalyzerKind::Remote
            } else {
                AnalyzerKind::RuleBased
            },
            analyzer_deadline,
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Where narrative text comes from. Stdin when neither flag is given.
#[derive(Debug, Args)]
struct InputArgs {
    /// Narrative text
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the narrative from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl InputArgs {
    fn read(&self) -> anyhow::Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading narrative from stdin")?;
        Ok(buf)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract dates, emails, phone numbers, amounts and locations as JSON
    Entities(InputArgs),

    /// Keyword classification into a practice area
    Classify {
        #[command(flatten)]
        input: InputArgs,
        /// Classify one narrative per input line
        #[arg(long)]
        batch: bool,
    },

    /// Full analysis with the configured analyzer
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        /// Print a readable card instead of JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Render the letter set for a scenario
    Letters(LettersArgs),

    /// Resolve filing and preservation deadlines for a category
    Deadlines {
        /// Category label, e.g. "Personal Injury - Premises Liability"
        #[arg(long)]
        category: String,
        /// Incident date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        incident_date: Option<NaiveDate>,
    },

    /// Analyze a new intake and build the full case plan
    Intake {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "")]
        client_name: String,
        /// Case title; defaults to the analysis category
        #[arg(long)]
        title: Option<String>,
        /// Write letter drafts into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },

    /// List the case-type catalog
    CaseTypes {
        /// Include inactive entries
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Args)]
struct LettersArgs {
    /// slip_fall, car_accident, employment or medical_malpractice
    #[arg(long)]
    scenario: ScenarioKind,
    #[arg(long)]
    client_name: Option<String>,
    #[arg(long)]
    incident_date: Option<String>,
    #[arg(long)]
    incident_time: Option<String>,
    #[arg(long)]
    store_name: Option<String>,
    #[arg(long)]
    store_address: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    insurance_company: Option<String>,
    #[arg(long)]
    employer: Option<String>,
    #[arg(long)]
    hospital: Option<String>,
    #[arg(long)]
    surgeon: Option<String>,
    #[arg(long)]
    procedure: Option<String>,
    #[arg(long)]
    summary: Option<String>,
    /// Render date used in filenames and headers; defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Write letters into this directory instead of printing them
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl LettersArgs {
    fn fields(&self) -> LetterFields {
        LetterFields {
            client_name: self.client_name.clone(),
            incident_date: self.incident_date.clone(),
            incident_time: self.incident_time.clone(),
            store_name: self.store_name.clone(),
            store_address: self.store_address.clone(),
            location: self.location.clone(),
            insurance_company: self.insurance_company.clone(),
            employer_name: self.employer.clone(),
            hospital_name: self.hospital.clone(),
            surgeon_name: self.surgeon.clone(),
            procedure_type: self.procedure.clone(),
            analysis_summary: self.summary.clone(),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.settings.to_config()?;

        match self.command {
            Command::Entities(input) => {
                let text = input.read()?;
                print_json(&extract_entities(&text))
            }
            Command::Classify { input, batch } => {
                let text = input.read()?;
                let classifier = CaseTypeClassifier::new(&config.classifier);
                if batch {
                    let lines: Vec<&str> = text
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .collect();
                    print_json(&classifier.classify_batch(&lines))
                } else {
                    print_json(&classifier.classify(&text))
                }
            }
            Command::Analyze { input, pretty } => {
                let text = input.read()?;
                let pipeline = build_pipeline(&config);
                let outcome = pipeline.analyze(&text).await;
                if pretty {
                    print!("{}", display::analysis_card(&outcome));
                    Ok(())
                } else {
                    print_json(&outcome)
                }
            }
            Command::Letters(args) => {
                let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
                let letters = generate_all_letters_for_scenario(
                    args.scenario,
                    &args.fields(),
                    &config.firm,
                    today,
                );
                match &args.out_dir {
                    Some(dir) => report_written(&write_letter_files(&letters, dir)?, dir),
                    None => {
                        for letter in &letters {
                            println!("===== {} =====", letter.filename);
                            println!("{}", letter.body);
                        }
                        Ok(())
                    }
                }
            }
            Command::Deadlines {
                category,
                incident_date,
            } => {
                let now = Utc::now();
                let incident = incident_date
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc())
                    .unwrap_or(now);
                let deadlines =
                    resolve_deadlines(&category, incident, now, config.evidence_retention_days);
                if deadlines.is_empty() {
                    warn!(category = %category, "no deadline rules for category");
                }
                print_json(&deadlines)
            }
            Command::Intake {
                input,
                client_name,
                title,
                out_dir,
                pretty,
            } => {
                let text = input.read()?;
                let pipeline = build_pipeline(&config);
                let request = IntakeRequest {
                    text,
                    client_name,
                    title,
                };
                let plan = pipeline
                    .plan(&request, Utc::now())
                    .await
                    .context("building intake plan")?;
                if pretty {
                    print!("{}", display::plan_card(&plan));
                } else {
                    print_json(&plan)?;
                }
                if let Some(dir) = &out_dir {
                    report_written(&write_letters(&plan, dir)?, dir)?;
                }
                Ok(())
            }
            Command::CaseTypes { all } => {
                print!("{}", display::case_type_table(all));
                Ok(())
            }
        }
    }
}

/// Rule-based pipeline, with the remote analyzer in front when enabled.
fn build_pipeline(config: &IntakeConfig) -> IntakePipeline {
    if config.analyzer == AnalyzerKind::Remote && !config.remote_enabled() {
        warn!("remote analyzer selected without an API key; using rule-based analysis");
    }
    let primary: Option<Box<dyn TextAnalyzer>> = if config.remote_enabled() {
        match RemoteAnalyzer::from_config(&config.remote) {
            Ok(analyzer) => Some(Box::new(analyzer)),
            Err(e) => {
                warn!(error = %e, "remote analyzer unavailable; using rule-based analysis");
                None
            }
        }
    } else {
        None
    };
    IntakePipeline::new(config, primary)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialising output")?;
    println!("{json}");
    Ok(())
}

fn report_written(paths: &[PathBuf], dir: &Path) -> anyhow::Result<()> {
    info!(dir = %dir.display(), count = paths.len(), "letters written");
    for path in paths {
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}
