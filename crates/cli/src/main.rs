// carelink CLI - aggregate operator stores and reconcile patient identifiers

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use carelink_cli::report;
use carelink_config::{ConfigError, Settings};
use carelink_core::{Fix, NewFix};
use carelink_io::{
    apply_migrations, migrations, Aggregator, FixStore, MergedDataset, MigrationError,
    MigrationOutcome, SnapshotError, SqliteCollection, StoreError,
};
use carelink_recon::ReconResult;
use clap::{Parser, Subcommand};
use serde::Serialize;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_MIGRATION, EXIT_PARTIAL, EXIT_ROOT, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "carelink")]
#[command(about = "Reconcile patient encounters across operator stores")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/carelink/carelink.toml)
    #[arg(long, global = true, env = "CARELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Operator root; overrides the settings file
    #[arg(long, global = true, env = "CARELINK_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot every operator, apply fixes, and reconcile
    #[command(after_help = "\
Examples:
  carelink aggregate --root /srv/carelink/operators
  carelink aggregate --json > run.json
  carelink aggregate --strict || echo 'some operators were skipped'")]
    Aggregate {
        /// Print the full reconciled result as JSON
        #[arg(long)]
        json: bool,

        /// Exit non-zero when any operator was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Print the Swedish/Providence inference tables
    Identifiers {
        #[arg(long)]
        json: bool,
    },

    /// Print pending-match groups for review
    Pending {
        #[arg(long)]
        json: bool,
    },

    /// Apply built-in migrations to one live operator collection in place
    Migrate {
        /// Operator directory name under the root
        operator: String,
    },

    /// Manual corrections
    #[command(subcommand)]
    Fix(FixCommands),
}

#[derive(Subcommand)]
enum FixCommands {
    /// Append a correction for one record
    #[command(after_help = "\
Examples:
  carelink fix add --unique-id south-9 --swedish-id s1
  carelink fix add --unique-id north-4 --dob 1980-02-01")]
    Add {
        /// Record to correct (<owner>-<record id>)
        #[arg(long)]
        unique_id: String,

        #[arg(long)]
        swedish_id: Option<String>,

        #[arg(long)]
        providence_id: Option<String>,

        /// Date of birth
        #[arg(long)]
        dob: Option<String>,
    },

    /// List recorded corrections in insertion order
    List {
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\ntarget:  ",
        env!("TARGET"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = load_settings(cli.config.as_deref(), cli.root).and_then(|settings| match cli.command {
        Commands::Aggregate { json, strict } => cmd_aggregate(&settings, json, strict),
        Commands::Identifiers { json } => cmd_identifiers(&settings, json),
        Commands::Pending { json } => cmd_pending(&settings, json),
        Commands::Migrate { operator } => cmd_migrate(&settings, &operator),
        Commands::Fix(FixCommands::Add {
            unique_id,
            swedish_id,
            providence_id,
            dob,
        }) => cmd_fix_add(
            &settings,
            NewFix {
                unique_id,
                swedish_id,
                providence_id,
                date_of_birth: dob,
            },
        ),
        Commands::Fix(FixCommands::List { json }) => cmd_fix_list(&settings, json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Invalid(_) | ConfigError::Parse(_) => {
                Some("see `root`, `collection_file`, `fixes_file`, `workers` and `scratch_dir` keys".to_string())
            }
            ConfigError::Read { .. } => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }
}

impl From<SnapshotError> for CliError {
    fn from(err: SnapshotError) -> Self {
        Self { code: EXIT_ROOT, message: err.to_string(), hint: None }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self { code: EXIT_STORE, message: err.to_string(), hint: None }
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        Self {
            code: EXIT_MIGRATION,
            message: err.to_string(),
            hint: Some(format!(
                "migrations before {} are committed; rerun once the document is repaired",
                err.migration_id()
            )),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self { code: EXIT_ERROR, message: err.to_string(), hint: None }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Explicit `--config` must exist. The default location is optional when
/// `--root` is given.
fn load_settings(config: Option<&Path>, root: Option<PathBuf>) -> Result<Settings, CliError> {
    let settings = match (config, root) {
        (Some(path), root) => {
            let settings = Settings::load(path)?;
            match root {
                Some(root) => settings.with_root(root),
                None => settings,
            }
        }
        (None, root) => {
            let path = Settings::default_path();
            if path.exists() {
                let settings = Settings::load(&path)?;
                match root {
                    Some(root) => settings.with_root(root),
                    None => settings,
                }
            } else if let Some(root) = root {
                Settings::new(root)
            } else {
                return Err(CliError::usage("no operator root configured").with_hint(format!(
                    "pass --root or create {}",
                    path.display()
                )));
            }
        }
    };
    settings.validate()?;
    log::debug!("operator root: {}", settings.root.display());
    Ok(settings)
}

fn aggregator(settings: &Settings) -> Aggregator {
    Aggregator::new(settings.aggregator_config())
}

/// Read-only commands never create the fix log.
fn read_fixes(settings: &Settings) -> Result<Vec<Fix>, CliError> {
    let path = settings.fixes_path();
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(FixStore::open(&path)?.list_fixes()?)
}

fn reconcile(settings: &Settings) -> Result<(MergedDataset, ReconResult), CliError> {
    let dataset = aggregator(settings).aggregate()?;
    for failure in &dataset.failures {
        eprintln!("warning: operator {} skipped: {}", failure.owner_id, failure.reason);
    }
    let fixes = read_fixes(settings)?;
    let result = carelink_recon::run(&dataset.records, &fixes);
    Ok((dataset, result))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_aggregate(settings: &Settings, json: bool, strict: bool) -> Result<(), CliError> {
    let (dataset, result) = reconcile(settings)?;

    if json {
        print_json(&report::AggregateReport {
            operators: &dataset.operators,
            failures: &dataset.failures,
            result: &result,
        })?;
    } else {
        print!("{}", report::summary(&result, &dataset.operators, &dataset.failures));
    }

    if strict && !dataset.failures.is_empty() {
        return Err(CliError {
            code: EXIT_PARTIAL,
            message: format!("{} operator(s) skipped", dataset.failures.len()),
            hint: None,
        });
    }
    Ok(())
}

fn cmd_identifiers(settings: &Settings, json: bool) -> Result<(), CliError> {
    let (_, result) = reconcile(settings)?;
    if json {
        print_json(&result.mappings)
    } else {
        print!("{}", report::identifiers(&result.mappings));
        Ok(())
    }
}

fn cmd_pending(settings: &Settings, json: bool) -> Result<(), CliError> {
    let (_, result) = reconcile(settings)?;
    if json {
        print_json(&result.pending)
    } else {
        print!("{}", report::pending(&result.pending));
        Ok(())
    }
}

fn cmd_migrate(settings: &Settings, operator: &str) -> Result<(), CliError> {
    let aggregator = aggregator(settings);
    let path = aggregator.collection_path(operator);
    if !path.is_file() {
        return Err(CliError::usage(format!("no collection at {}", path.display()))
            .with_hint("operator names are directory names under the root"));
    }

    let mut collection = SqliteCollection::open(&path)?;
    let report = apply_migrations(&mut collection, &migrations::builtin())?;
    for step in &report.steps {
        match &step.outcome {
            MigrationOutcome::Skipped => println!("{}  already applied", step.id),
            MigrationOutcome::Applied { matched, rewritten } => {
                println!("{}  {} matched, {} rewritten", step.id, matched, rewritten)
            }
        }
    }
    Ok(())
}

fn cmd_fix_add(settings: &Settings, fix: NewFix) -> Result<(), CliError> {
    if fix.is_empty() {
        return Err(CliError::usage("a fix needs at least one of --swedish-id, --providence-id, --dob"));
    }
    let mut store = FixStore::open(&settings.fixes_path())?;
    let stored = store.record_fix(&fix)?;
    println!("recorded fix #{} for {}", stored.seq, stored.unique_id);
    Ok(())
}

fn cmd_fix_list(settings: &Settings, json: bool) -> Result<(), CliError> {
    let fixes = read_fixes(settings)?;
    if json {
        print_json(&fixes)
    } else {
        print!("{}", report::fixes(&fixes));
        Ok(())
    }
}
