//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{self, Context};
use ecotrack::core::models::{
    AnomalyKind, AnomalyStatus, EducationLevel, ExpenseCategory, GpsPoint, Severity, Sex,
    StudentStatus,
};
use ecotrack::core::services::Period;
use ecotrack::output::OutputMode;

/// ecotrack - Student living-cost survey auditing
#[derive(Parser, Debug)]
#[command(
    name = "ecotrack",
    version,
    about = "Student living-cost survey auditing",
    long_about = "Record surveyed students and their expenses, flag data-quality anomalies \
                  and compare living costs across districts.\n\n\
                  Every command acts for one surveyor, chosen with --surveyor or the \
                  [survey] default_surveyor setting."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Act as this surveyor (registration code or user name)
    #[arg(short, long, global = true)]
    pub surveyor: Option<String>,

    /// Dataset file to use instead of the configured one
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize ecotrack in the current directory
    Init {
        /// Force re-initialization
        #[arg(short, long)]
        force: bool,
    },

    /// Manage surveyor profiles
    Surveyor {
        #[command(subcommand)]
        action: SurveyorAction,
    },

    /// Manage surveyed students
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Record or delete expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Detect and triage data-quality anomalies
    Anomaly {
        #[command(subcommand)]
        action: AnomalyAction,
    },

    /// Show survey-wide statistics
    Dashboard,

    /// Compare living costs across districts
    ///
    /// Without arguments every district is ranked by mean expense. With two
    /// or three districts, those are compared side by side.
    Compare {
        /// Districts to compare (two or three)
        districts: Vec<String>,

        /// Restrict the comparison to one category
        #[arg(short, long)]
        category: Option<ExpenseCategory>,
    },

    /// Show version
    Version,
}

/// Surveyor subcommands
#[derive(Subcommand, Debug)]
pub enum SurveyorAction {
    /// Provision a surveyor profile for a user
    Add {
        /// User name
        user: String,

        /// Registration code (default: USER followed by the id)
        #[arg(long)]
        code: Option<String>,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the acting surveyor
    Show,

    /// Edit the acting surveyor's profile
    Edit {
        /// New registration code
        #[arg(long)]
        code: Option<String>,

        /// New contact phone
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Profile fields shared by `student add` and `student edit`
#[derive(Args, Debug, Default)]
pub struct StudentFields {
    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Education level (bachelor-1 ... master-2, doctorate)
    #[arg(long)]
    pub level: Option<EducationLevel>,

    /// School or university
    #[arg(long)]
    pub institution: Option<String>,

    /// District of residence
    #[arg(long)]
    pub district: Option<String>,

    /// Coordinates as LAT,LNG
    #[arg(long, value_parser = parse_gps)]
    pub gps: Option<GpsPoint>,

    /// Free notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Student subcommands
#[derive(Subcommand, Debug)]
pub enum StudentAction {
    /// Register a student
    Add {
        /// Unique survey code
        #[arg(long)]
        code: String,

        /// Full name
        #[arg(long)]
        name: String,

        /// Sex (male, female)
        #[arg(long)]
        sex: Sex,

        #[command(flatten)]
        fields: StudentFields,
    },

    /// Edit a student's profile
    Edit {
        /// Student id
        id: u64,

        /// New survey code
        #[arg(long)]
        code: Option<String>,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New sex
        #[arg(long)]
        sex: Option<Sex>,

        /// New status
        #[arg(long)]
        status: Option<StudentStatus>,

        #[command(flatten)]
        fields: StudentFields,

        /// Forget the recorded age
        #[arg(long, conflicts_with = "age")]
        clear_age: bool,

        /// Forget the recorded education level
        #[arg(long, conflicts_with = "level")]
        clear_level: bool,

        /// Forget the recorded coordinates
        #[arg(long, conflicts_with = "gps")]
        clear_gps: bool,
    },

    /// List students
    List {
        /// Name contains (case-insensitive)
        #[arg(long)]
        name: Option<String>,

        /// District equals
        #[arg(long)]
        district: Option<String>,

        /// Status equals
        #[arg(long)]
        status: Option<StudentStatus>,

        /// Sex equals
        #[arg(long)]
        sex: Option<Sex>,

        /// Collected during: today, week, month, quarter
        #[arg(long)]
        period: Option<Period>,
    },

    /// Show one student with spending and anomalies
    Show {
        /// Student id
        id: u64,
    },

    /// Show a student's spending profile
    Stats {
        /// Student id
        id: u64,
    },

    /// Delete students with their expenses and anomalies
    Delete {
        /// Student ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Set the status of several students
    Mark {
        /// New status (draft, complete, verified, flagged)
        status: StudentStatus,

        /// Student ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseAction {
    /// Record one or more expenses for a student
    ///
    /// Use --category/--amount for a single expense, or repeat --row with
    /// CATEGORY,AMOUNT[,DISTRICT[,DATE[,LOCATION[,COMMENT]]]] for a batch.
    Add {
        /// Student id
        student: u64,

        /// Category
        #[arg(short, long)]
        category: Option<String>,

        /// Amount in FCFA
        #[arg(short, long)]
        amount: Option<String>,

        /// District (default: the student's)
        #[arg(long)]
        district: Option<String>,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Place of purchase
        #[arg(long)]
        location: Option<String>,

        /// Comment
        #[arg(long)]
        comment: Option<String>,

        /// Extra rows, comma separated
        #[arg(long = "row")]
        rows: Vec<String>,
    },

    /// Correct a recorded expense
    Edit {
        /// Expense id
        id: u64,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New amount in FCFA
        #[arg(short, long)]
        amount: Option<String>,

        /// New district (empty: the student's)
        #[arg(long)]
        district: Option<String>,

        /// New date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// New place of purchase (empty clears it)
        #[arg(long)]
        location: Option<String>,

        /// New comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense id
        id: u64,
    },
}

/// Anomaly subcommands
#[derive(Subcommand, Debug)]
pub enum AnomalyAction {
    /// Run detection and print findings without storing them
    Detect,

    /// Run detection and store new findings
    Scan,

    /// List stored anomalies
    List {
        /// Status filter
        #[arg(long)]
        status: Option<AnomalyStatus>,

        /// Severity filter
        #[arg(long)]
        severity: Option<Severity>,

        /// Kind filter
        #[arg(long)]
        kind: Option<AnomalyKind>,
    },

    /// Mark an anomaly resolved
    Resolve {
        /// Anomaly id
        id: u64,

        /// How it was fixed
        #[arg(short = 'm', long)]
        solution: Option<String>,
    },

    /// Dismiss an anomaly
    Ignore {
        /// Anomaly id
        id: u64,
    },

    /// Mark an anomaly as being worked on
    Start {
        /// Anomaly id
        id: u64,
    },

    /// Delete an anomaly
    Delete {
        /// Anomaly id
        id: u64,
    },
}

fn parse_gps(raw: &str) -> Result<GpsPoint, String> {
    let (lat, lng) = raw.split_once(',').ok_or("expected LAT,LNG")?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude: {lat}"))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("invalid longitude: {lng}"))?;
    Ok(GpsPoint { lat, lng })
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let Some(command) = cli.command else {
        if output_mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "hint": "Use --help for usage"
                })
            );
        } else {
            println!("ecotrack v{}", env!("CARGO_PKG_VERSION"));
            println!("\nRun 'ecotrack --help' for usage");
            println!("Run 'ecotrack init' to get started");
        }
        return Ok(());
    };

    if matches!(command, Command::Version) {
        if output_mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION")
                })
            );
        } else {
            println!("ecotrack v{}", env!("CARGO_PKG_VERSION"));
        }
        return Ok(());
    }

    let ctx = Context::open(cli.data, cli.surveyor, output_mode)?;

    match command {
        Command::Init { force } => commands::init(&ctx, force),
        Command::Surveyor { action } => commands::surveyor(&ctx, action),
        Command::Student { action } => commands::student(&ctx, action),
        Command::Expense { action } => commands::expense(&ctx, action),
        Command::Anomaly { action } => commands::anomaly(&ctx, action),
        Command::Dashboard => commands::dashboard(&ctx),
        Command::Compare {
            districts,
            category,
        } => commands::compare(&ctx, &districts, category),
        Command::Version => Ok(()),
    }
}
