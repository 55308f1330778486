//! sqlgate CLI - compile questions, plans and model SQL for one table
//!
//! Usage:
//!   sqlgate template <catalog.json> --table <ident> --question <text>
//!   sqlgate compile  <catalog.json> --table <ident> --plan <plan.json>
//!   sqlgate sanitize <catalog.json> --table <ident> --sql <file>
//!   sqlgate limit    --sql <file> [--ceiling <n>]
//!
//! Examples:
//!   sqlgate template zeec.json --table 1201_ce_zeec --question "quantas zonas existem"
//!   sqlgate compile zeec.json --table 1201_ce_zeec --plan plan.json --ceiling 20
//!   RUST_LOG=sqlgate=debug sqlgate sanitize zeec.json --table 1201_ce_zeec --sql answer.txt

use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlgate::catalog::{AuthorizedTable, ColumnMeta};
use sqlgate::config::Settings;
use sqlgate::limit::enforce_limit;
use sqlgate::plan::PlanPayload;
use sqlgate::{CompileOptions, CompiledPlan, Dialect, Request};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(about = "sqlgate - safe, deterministic SQL for one authorized table")]
#[command(version)]
struct Cli {
    /// Log pipeline decisions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to SQLGATE_CONFIG, ./sqlgate.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from a deterministic template
    Template {
        #[command(flatten)]
        target: TargetArgs,

        /// The user's question
        #[arg(short, long)]
        question: String,
    },

    /// Compile an intent or generic plan payload
    Compile {
        #[command(flatten)]
        target: TargetArgs,

        /// JSON plan file, or raw model output containing one JSON object
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Sanitize model-written SQL and force the authorized table
    Sanitize {
        #[command(flatten)]
        target: TargetArgs,

        /// File with the model's SQL answer
        #[arg(short, long)]
        sql: PathBuf,
    },

    /// Enforce a row ceiling on an existing statement
    Limit {
        /// File with the SQL statement
        #[arg(short, long)]
        sql: PathBuf,

        /// Row ceiling (defaults to the configured ceiling)
        #[arg(short, long)]
        ceiling: Option<u64>,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Column catalog: JSON array of {"name", "type", "is_geometry"}
    catalog: PathBuf,

    /// Table identifier; bare names are qualified with the default schema
    #[arg(short, long)]
    table: String,

    /// Row ceiling (defaults to the configured ceiling)
    #[arg(long)]
    ceiling: Option<u64>,

    /// SQL dialect to generate (defaults to the configured dialect)
    #[arg(short, long)]
    dialect: Option<DialectArg>,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Template { target, question } => run(&settings, &target, |req| {
            match req.plan_template(&question)? {
                Some(plan) => Ok(plan),
                None => Err("no template applies to this question".into()),
            }
        }),
        Commands::Compile { target, plan } => run(&settings, &target, |req| {
            let text = read_file(&plan)?;
            let payload = PlanPayload::from_model_text(&text)?;
            Ok(req.compile_payload(&payload)?)
        }),
        Commands::Sanitize { target, sql } => run(&settings, &target, |req| {
            let text = read_file(&sql)?;
            Ok(req.sanitize_model_sql(&text)?)
        }),
        Commands::Limit { sql, ceiling } => cmd_limit(&settings, &sql, ceiling),
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlgate=debug" } else { "sqlgate=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    Ok(match path {
        Some(p) => Settings::from_file(p)?,
        None => Settings::load()?,
    })
}

fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e).into())
}

fn build_request(settings: &Settings, target: &TargetArgs) -> CliResult<Request> {
    let mut options: CompileOptions = settings.compile_options()?;
    if let Some(dialect) = target.dialect.clone() {
        options.dialect = dialect.into();
    }
    if let Some(ceiling) = target.ceiling {
        options.row_ceiling = ceiling;
    }

    let catalog: Vec<ColumnMeta> = serde_json::from_str(&read_file(&target.catalog)?)
        .map_err(|e| format!("Invalid catalog '{}': {}", target.catalog.display(), e))?;
    let table = AuthorizedTable::from_identifier(&target.table, &settings.default_schema()?)?;

    Ok(Request::new(table, &catalog, options))
}

fn run(
    settings: &Settings,
    target: &TargetArgs,
    compile: impl FnOnce(&Request) -> CliResult<CompiledPlan>,
) -> ExitCode {
    let result = build_request(settings, target).and_then(|req| compile(&req));
    match result {
        Ok(plan) => print_plan(&plan),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_limit(settings: &Settings, sql: &Path, ceiling: Option<u64>) -> ExitCode {
    let text = match read_file(sql) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let ceiling = ceiling.unwrap_or(settings.limits.row_ceiling);
    println!("{}", enforce_limit(&text, ceiling));
    ExitCode::SUCCESS
}

fn print_plan(plan: &CompiledPlan) -> ExitCode {
    let output = serde_json::json!({
        "sql": plan.sql,
        "used_template": plan.used_template,
        "reason": plan.reason,
        "fingerprint": plan.fingerprint(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
