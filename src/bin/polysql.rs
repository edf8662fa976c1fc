//! polysql: compile query descriptors and write rows from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL a descriptor compiles to
//! polysql compile --dialect mssql query.json
//!
//! # Run it against a database
//! polysql run --database-url sqlite://data.db --columns cols.json query.json
//!
//! # Upsert rows from a JSON array of arrays
//! polysql write --table People --columns cols.json --search Id rows.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use polysql::config::Config;
use polysql::prelude::*;
use polysql::transpiler::literal::parse_literal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polysql")]
#[command(version)]
#[command(about = "Typed query descriptors compiled to SQL for many dialects", long_about = None)]
#[command(after_help = "EXAMPLES:
    polysql dialects
    polysql defaults --dialect access
    polysql compile --dialect db2 query.json
    echo '{\"table\": \"Users\"}' | polysql compile --dialect sqlite")]
struct Cli {
    /// Config file (default: ./polysql.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, env = "POLYSQL_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Insert,
    Update,
    Upsert,
}

impl From<ModeArg> for WriteMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Insert => WriteMode::Insert,
            ModeArg::Update => WriteMode::Update,
            ModeArg::Upsert => WriteMode::InsertOrUpdate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON select descriptor and print the SQL
    Compile {
        /// Dialect name or alias (default from config)
        #[arg(short, long)]
        dialect: Option<String>,
        /// Render every value as a literal instead of a placeholder
        #[arg(long)]
        inline: bool,
        /// Descriptor file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Show the capabilities of every registered dialect
    Dialects,
    /// Show the default-value literal of every column type
    Defaults {
        #[arg(short, long)]
        dialect: Option<String>,
    },
    /// Compile a descriptor and execute it against the database
    Run {
        /// JSON file with the table's column definitions, used to correct
        /// values the backend stores in another form
        #[arg(long)]
        columns: Option<PathBuf>,
        file: Option<PathBuf>,
    },
    /// Write rows from a JSON array of arrays into a table
    Write {
        #[arg(short, long)]
        table: String,
        /// JSON file with the column definitions
        #[arg(long)]
        columns: PathBuf,
        /// Key column; repeat for composite keys
        #[arg(short, long)]
        search: Vec<String>,
        #[arg(short, long, value_enum, default_value = "upsert")]
        mode: ModeArg,
        /// Rows file; stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config, cli.verbose);
    let registry = DialectRegistry::builtin();

    match &cli.command {
        Commands::Compile { dialect, inline, file } => {
            let name = dialect.clone().unwrap_or_else(|| config.dialect.key().to_string());
            let dialect = registry.get(&name)?;
            let select = read_select(file.as_deref())?;
            let mode = if *inline { ParamMode::Inline } else { ParamMode::preferred(dialect.as_ref()) };
            let stmt = polysql::transpiler::dml::select::build_select(&select, dialect.as_ref(), mode)?;
            print_statement(&stmt, cli.format)?;
        }
        Commands::Dialects => show_dialects(&registry, cli.format)?,
        Commands::Defaults { dialect } => {
            let name = dialect.clone().unwrap_or_else(|| config.dialect.key().to_string());
            show_defaults(registry.get(&name)?.as_ref())?;
        }
        Commands::Run { columns, file } => {
            let url = database_url(&cli, &config)?;
            let schema = match columns {
                Some(path) => read_columns(path)?,
                None => Vec::new(),
            };
            let select = read_select(file.as_deref())?;
            let mut db = SqlxExecutor::connect(&url)?;
            let stmt = select.to_sql_with(db.dialect())?;
            if cli.verbose {
                println!("{} {}", "SQL:".dimmed(), stmt.sql.yellow());
            }
            let result = db.fetch(&stmt, &select.result_types(&schema))?;
            format_output(&result, cli.format)?;
        }
        Commands::Write {
            table,
            columns,
            search,
            mode,
            file,
        } => {
            let url = database_url(&cli, &config)?;
            let columns = read_columns(columns)?;
            let rows = read_rows(file.as_deref())?;

            let mut db = SqlxExecutor::connect(&url)?;
            let dialect = polysql::engine::dialect_for_url(&url)?.generator();
            let search: Vec<&str> = search.iter().map(String::as_str).collect();
            let mut writer = RowWriter::new(dialect.as_ref(), &mut db, table, columns, &search, (*mode).into())?;
            if let Some(size) = config.batch_size {
                writer = writer.with_batch_size(size);
            }
            writer.write_all(rows)?;
            let summary = writer.finish()?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Table => println!(
                    "{} {} inserted, {} updated, {} merged, {} unmatched",
                    "✓".green(),
                    summary.inserted.to_string().cyan(),
                    summary.updated.to_string().cyan(),
                    summary.merged.to_string().cyan(),
                    summary.unmatched.to_string().cyan()
                ),
            }
        }
    }
    Ok(())
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("polysql={}", level)));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn database_url(cli: &Cli, config: &Config) -> Result<String> {
    match cli.database_url.clone().or_else(|| config.database_url.clone()) {
        Some(url) => Ok(url),
        None => bail!("No database URL. Use --database-url or set POLYSQL_DATABASE_URL"),
    }
}

fn read_columns(path: &Path) -> Result<Vec<ColumnDef>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).context("parsing column definitions")
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn read_select(file: Option<&Path>) -> Result<Select> {
    let text = read_input(file)?;
    serde_json::from_str(&text).context("parsing select descriptor")
}

/// Rows as arrays of plain JSON values; conversion to column types happens
/// in the writer.
fn read_rows(file: Option<&Path>) -> Result<Vec<Vec<Value>>> {
    let text = read_input(file)?;
    let raw: Vec<Vec<serde_json::Value>> = serde_json::from_str(&text).context("parsing rows")?;
    raw.into_iter()
        .map(|row| row.into_iter().map(json_to_value).collect::<Result<Vec<_>>>())
        .collect()
}

fn json_to_value(v: serde_json::Value) -> Result<Value> {
    Ok(match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::String(s),
        other => bail!("unsupported cell value {}", other),
    })
}

fn print_statement(stmt: &CompiledStatement, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stmt)?);
        return Ok(());
    }
    println!("{}", "Generated SQL:".green().bold());
    println!("{}", stmt.sql.white());
    if !stmt.params.is_empty() {
        println!();
        println!("{}", "Parameters:".cyan());
        for (i, p) in stmt.params.iter().enumerate() {
            println!("  {} = {} {}", format!("#{}", i + 1).dimmed(), p.value.to_string().yellow(), p.ty.to_string().dimmed());
        }
    }
    if let Some(rows) = stmt.max_rows {
        println!();
        println!("{} {}", "Driver row cap:".dimmed(), rows);
    }
    Ok(())
}

fn show_dialects(registry: &DialectRegistry, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let table: HashMap<&str, _> = registry.iter().map(|(name, d)| (name, d.features())).collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };
    println!(
        "{:10} {:9} {:9} {:8} {:8} {:8} {:10} {}",
        "Name".white().bold(),
        "Between".white().bold(),
        "Subquery".white().bold(),
        "Params".white().bold(),
        "Bulk".white().bold(),
        "Batch".white().bold(),
        "In-list".white().bold(),
        "Max length".white().bold()
    );
    println!("{}", "─".repeat(80).dimmed());
    for (name, d) in registry.iter() {
        let f = d.features();
        println!(
            "{:10} {:9} {:9} {:8} {:8} {:8} {:10} {}",
            name.cyan().bold(),
            yes_no(f.between),
            yes_no(f.in_subquery),
            yes_no(f.parameters),
            yes_no(f.bulk_load),
            f.batch_rows(1),
            limit(f.max_in_list),
            limit(f.max_statement_len)
        );
    }
    Ok(())
}

fn limit(n: usize) -> String {
    if n == 0 { "-".to_string() } else { n.to_string() }
}

fn show_defaults(dialect: &dyn SqlDialect) -> Result<()> {
    println!("{} {}", "Default values for".dimmed(), dialect.name().cyan().bold());
    println!();
    for ty in ColumnType::ALL {
        match dialect.default_literal(ty) {
            Ok(lit) => {
                let back = parse_literal(&lit, ty)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|e| e.to_string());
                println!("  {:10} {:40} {}", ty.to_string().white(), lit.yellow(), back.dimmed());
            }
            Err(e) => println!("  {:10} {}", ty.to_string().white(), e.to_string().red()),
        }
    }
    Ok(())
}

fn format_output(result: &ResultSet, format: OutputFormat) -> Result<()> {
    if result.rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let rows: Vec<HashMap<&str, String>> = result
                .rows
                .iter()
                .map(|row| {
                    result
                        .columns
                        .iter()
                        .map(String::as_str)
                        .zip(row.iter().map(Value::to_plain_string))
                        .collect()
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let cell = |v: &Value| if v.is_null() { "NULL".to_string() } else { v.to_plain_string() };
            let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
            for row in &result.rows {
                for (w, v) in widths.iter_mut().zip(row) {
                    *w = (*w).max(cell(v).len());
                }
            }

            let header: Vec<String> = result
                .columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());
            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in &result.rows {
                let cells: Vec<String> = row
                    .iter()
                    .zip(&widths)
                    .map(|(v, w)| format!("{:width$}", cell(v), width = w))
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", result.rows.len().to_string().cyan());
        }
    }
    Ok(())
}
