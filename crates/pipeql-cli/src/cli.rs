//! PipeQL Command Line Interface
//!
//! Converts SQL statements to pipe syntax, optionally annotated with the costs
//! of a PostgreSQL EXPLAIN plan, and renders plans on their own.

mod logging;
mod output;
mod settings;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pipeql_analyzer::{PlanNode, parse_json_plan_str, parse_postgres_explain, parse_text_plan};
use pipeql_pipe::{SqlDialect, render_plan, sql_to_pipe};

use crate::logging::LoggingConfig;
use crate::settings::PipeqlSettings;

/// SQL to pipe syntax, annotated with EXPLAIN costs
#[derive(Parser, Debug)]
#[command(name = "pipeql")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long, env = "PIPEQL_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a SQL statement to pipe syntax
    Pipe {
        /// SQL file, or `-` for stdin
        #[arg(long)]
        sql: PathBuf,

        /// EXPLAIN output used for cost annotation
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Format of the EXPLAIN output
        #[arg(long, value_enum, default_value = "auto")]
        format: PlanFormat,

        /// Dialect used to parse the SQL
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,

        /// Leave out cost comments
        #[arg(long)]
        no_costs: bool,
    },

    /// Render an EXPLAIN plan alone as pipe syntax
    Plan {
        /// EXPLAIN output, or `-` for stdin
        #[arg(long)]
        plan: PathBuf,

        /// Format of the EXPLAIN output
        #[arg(long, value_enum, default_value = "auto")]
        format: PlanFormat,

        /// Print the parsed tree as JSON instead
        #[arg(long)]
        json: bool,

        /// Leave out cost comments
        #[arg(long)]
        no_costs: bool,
    },

    /// Show an EXPLAIN plan as a table of operators
    Tree {
        /// EXPLAIN output, or `-` for stdin
        #[arg(long)]
        plan: PathBuf,

        /// Format of the EXPLAIN output
        #[arg(long, value_enum, default_value = "auto")]
        format: PlanFormat,
    },

    /// Print the effective settings as JSON
    Settings {
        /// Write the effective settings to the settings file
        #[arg(long)]
        save: bool,
    },
}

/// EXPLAIN output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlanFormat {
    /// Detect from the first character
    Auto,
    /// `EXPLAIN ANALYZE` text
    Text,
    /// `EXPLAIN (FORMAT JSON)`
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DialectArg {
    Postgresql,
    Mysql,
    Sqlite,
    Ansi,
}

impl From<DialectArg> for SqlDialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgresql => SqlDialect::PostgreSql,
            DialectArg::Mysql => SqlDialect::MySql,
            DialectArg::Sqlite => SqlDialect::Sqlite,
            DialectArg::Ansi => SqlDialect::Ansi,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => PipeqlSettings::load_from(path)?,
        None => PipeqlSettings::load()?,
    };

    let logging = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::new(&settings.log_filter)
    };
    logging::init(&logging)?;

    run(cli.command, cli.settings, settings)
}

fn run(command: Commands, settings_path: Option<PathBuf>, settings: PipeqlSettings) -> Result<()> {
    let mut options = settings.pipe.clone();

    match command {
        Commands::Pipe {
            sql,
            plan,
            format,
            dialect,
            no_costs,
        } => {
            if let Some(dialect) = dialect {
                options.dialect = dialect.into();
            }
            if no_costs {
                options.annotate_costs = false;
            }

            let sql = read_input(&sql)?;
            let plan = match plan {
                Some(path) => {
                    let plan = load_plan(&path, format)?;
                    if plan.is_none() {
                        tracing::warn!(path = %path.display(), "plan has no operators, costs omitted");
                    }
                    plan
                }
                None => None,
            };

            let pipe = sql_to_pipe(&sql, plan.as_ref(), &options)
                .context("Failed to convert SQL to pipe syntax")?;
            println!("{pipe}");
        }
        Commands::Plan {
            plan,
            format,
            json,
            no_costs,
        } => {
            if no_costs {
                options.annotate_costs = false;
            }
            let root = require_plan(&plan, format)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&root)?);
            } else {
                println!("{}", render_plan(&root, &options));
            }
        }
        Commands::Tree { plan, format } => {
            let root = require_plan(&plan, format)?;
            println!("{}", output::plan_table(&root));
        }
        Commands::Settings { save } => {
            if save {
                let path = match settings_path {
                    Some(path) => path,
                    None => PipeqlSettings::settings_path()?,
                };
                settings
                    .save_to(&path)
                    .with_context(|| format!("Failed to write settings to {:?}", path))?;
                tracing::info!(path = %path.display(), "settings saved");
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Reads a file, or stdin for `-`
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn load_plan(path: &Path, format: PlanFormat) -> Result<Option<PlanNode>> {
    let input = read_input(path)?;
    let plan = match format {
        PlanFormat::Auto => parse_postgres_explain(&input)?,
        PlanFormat::Text => parse_text_plan(&input),
        PlanFormat::Json => parse_json_plan_str(&input)?,
    };
    Ok(plan)
}

fn require_plan(path: &Path, format: PlanFormat) -> Result<PlanNode> {
    match load_plan(path, format)? {
        Some(root) => Ok(root),
        None => bail!("No plan operators found in {:?}", path),
    }
}
