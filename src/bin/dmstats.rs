//! dmstats - correlation and regression statistics CLI
//!
//! Command-line interface over TSV tables of named numeric columns.

use clap::{Parser, Subcommand, ValueEnum};
use depmap_stats::association::{correlate_against, AssociationSet};
use depmap_stats::correlation::{
    correlation_matrix_with, CorrelationMatrix, CorrelationMethod, MatrixOptions,
};
use depmap_stats::data::{CorrelationResult, RegressionResult, SeriesTable};
use depmap_stats::error::{Result, StatsError};
use depmap_stats::pipeline::{Analysis, AnalysisConfig, AnalysisOutput, AnalysisReport};
use depmap_stats::regression::linregress;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLI-friendly correlation method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMethod {
    /// Pearson product-moment correlation
    Pearson,
    /// Spearman rank correlation
    Spearman,
}

impl From<CliMethod> for CorrelationMethod {
    fn from(method: CliMethod) -> Self {
        match method {
            CliMethod::Pearson => CorrelationMethod::Pearson,
            CliMethod::Spearman => CorrelationMethod::Spearman,
        }
    }
}

/// Output format for results
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Correlation and regression statistics for dependency-map data
#[derive(Parser)]
#[command(name = "dmstats")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pearson correlation between two columns
    Pearson {
        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// First column
        #[arg(short, long)]
        x: String,

        /// Second column
        #[arg(short, long)]
        y: String,
    },

    /// Spearman rank correlation between two columns
    Spearman {
        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// First column
        #[arg(short, long)]
        x: String,

        /// Second column
        #[arg(short, long)]
        y: String,
    },

    /// Linear regression of y on x
    Linregress {
        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Predictor column
        #[arg(short, long)]
        x: String,

        /// Response column
        #[arg(short, long)]
        y: String,
    },

    /// Correlation matrix over some or all columns
    Matrix {
        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Columns to include (comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Correlation method
        #[arg(short, long, value_enum, default_value = "pearson")]
        method: CliMethod,

        /// Reorder rows and columns by hierarchical clustering
        #[arg(long)]
        cluster: bool,
    },

    /// Rank every column by its correlation with a target column
    Associations {
        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Target column
        #[arg(short, long)]
        target: String,

        /// Correlation method
        #[arg(short, long, value_enum, default_value = "pearson")]
        method: CliMethod,

        /// Number of top associations to report
        #[arg(long)]
        top: Option<usize>,
    },

    /// Run an analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to input table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

/// Initialize the tracing subscriber on stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = cli.format;

    let result = match cli.command {
        Commands::Pearson { input, x, y } => {
            cmd_correlate(&input, &x, &y, CorrelationMethod::Pearson, format)
        }
        Commands::Spearman { input, x, y } => {
            cmd_correlate(&input, &x, &y, CorrelationMethod::Spearman, format)
        }
        Commands::Linregress { input, x, y } => cmd_linregress(&input, &x, &y, format),
        Commands::Matrix {
            input,
            columns,
            method,
            cluster,
        } => cmd_matrix(&input, columns.as_deref(), method.into(), cluster, format),
        Commands::Associations {
            input,
            target,
            method,
            top,
        } => cmd_associations(&input, &target, method.into(), top, format),
        Commands::Run {
            config,
            input,
            output,
        } => cmd_run(&config, &input, output.as_deref(), format),
        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_table(path: &Path) -> Result<SeriesTable> {
    tracing::info!("loading table from {:?}", path);
    let table = SeriesTable::from_tsv(path)?;
    tracing::info!(
        rows = table.n_rows(),
        columns = table.n_columns(),
        "loaded table"
    );
    Ok(table)
}

/// Print a serializable value as JSON or YAML
fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => {
            return Err(StatsError::InvalidParameter(
                "text output is not structured".to_string(),
            ))
        }
    }
    Ok(())
}

/// Correlate two columns
fn cmd_correlate(
    input: &Path,
    x: &str,
    y: &str,
    method: CorrelationMethod,
    format: OutputFormat,
) -> Result<()> {
    let table = load_table(input)?;
    let result = method.correlate(table.require(x)?, table.require(y)?)?;

    match format {
        OutputFormat::Text => print_correlation(x, y, method, &result),
        _ => print_structured(&result, format)?,
    }
    Ok(())
}

/// Fit a linear regression between two columns
fn cmd_linregress(input: &Path, x: &str, y: &str, format: OutputFormat) -> Result<()> {
    let table = load_table(input)?;
    let result = linregress(table.require(x)?, table.require(y)?)?;

    match format {
        OutputFormat::Text => print_regression(x, y, &result),
        _ => print_structured(&result, format)?,
    }
    Ok(())
}

/// Build a correlation matrix
fn cmd_matrix(
    input: &Path,
    columns: Option<&[String]>,
    method: CorrelationMethod,
    cluster: bool,
    format: OutputFormat,
) -> Result<()> {
    let table = load_table(input)?;
    let selected = match columns {
        Some(names) => table.select(names)?,
        None => table,
    };
    let result = correlation_matrix_with(selected.series(), &MatrixOptions { method, cluster })?;

    match format {
        OutputFormat::Text => print_matrix(&result),
        _ => print_structured(&result, format)?,
    }
    Ok(())
}

/// Rank columns by correlation with a target
fn cmd_associations(
    input: &Path,
    target: &str,
    method: CorrelationMethod,
    top: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let table = load_table(input)?;
    let mut result = correlate_against(&table, target, method)?;
    if let Some(k) = top {
        result.truncate(k);
    }

    match format {
        OutputFormat::Text => print_associations(&result),
        _ => print_structured(&result, format)?,
    }
    Ok(())
}

/// Run an analysis from configuration
fn cmd_run(
    config_path: &Path,
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    eprintln!("Loading analysis configuration from {:?}...", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&config_str)?;

    let table = load_table(input)?;

    eprintln!("Running analysis '{}'...", config.name);
    let report = Analysis::from_config(&config).run(&table)?;

    let rendered = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Yaml => report.to_yaml()?,
        OutputFormat::Text => render_report(&report),
    };

    match output {
        Some(path) => {
            eprintln!("Writing report to {:?}...", path);
            std::fs::write(path, rendered)?;
        }
        None => print!("{}", rendered),
    }

    eprintln!("Done! {} steps completed", report.len());
    Ok(())
}

/// Write an example configuration
fn cmd_example(output: &Path) -> Result<()> {
    let config = Analysis::new()
        .name("lineage-markers")
        .pearson("SOX10", "MITF")
        .spearman("SOX10", "PAX3")
        .linregress("SOX10", "MITF")
        .correlation_matrix(
            Some(&["SOX10", "MITF", "PAX3", "TYR"]),
            CorrelationMethod::Pearson,
            true,
        )
        .associations("SOX10", CorrelationMethod::Pearson, Some(25))
        .to_config(Some("Correlation of melanocyte lineage markers"));

    std::fs::write(output, config.to_yaml()?)?;
    eprintln!("Example configuration written to {:?}", output);
    Ok(())
}

fn print_correlation(x: &str, y: &str, method: CorrelationMethod, result: &CorrelationResult) {
    println!("{} correlation: {} vs {}", method, x, y);
    println!("  statistic: {:.6}", result.statistic);
    println!("  p-value:   {:.6e}", result.pvalue);
}

fn print_regression(x: &str, y: &str, result: &RegressionResult) {
    println!("Linear regression: {} ~ {}", y, x);
    println!("  slope:            {:.6}", result.slope);
    println!("  intercept:        {:.6}", result.intercept);
    println!("  r-value:          {:.6}", result.rvalue);
    println!("  p-value:          {:.6e}", result.pvalue);
    println!("  stderr:           {:.6}", result.stderr);
    println!("  intercept stderr: {:.6}", result.intercept_stderr);
}

fn print_matrix(result: &CorrelationMatrix) {
    print!("{}", render_matrix(result));
}

fn print_associations(result: &AssociationSet) {
    print!("{}", render_associations(result));
}

fn render_matrix(result: &CorrelationMatrix) -> String {
    let mut out = String::new();
    out.push_str("feature");
    for name in &result.columns {
        out.push('\t');
        out.push_str(name);
    }
    out.push('\n');
    for (name, row) in result.columns.iter().zip(result.rows()) {
        out.push_str(name);
        for value in row {
            out.push_str(&format!("\t{:.4}", value));
        }
        out.push('\n');
    }
    out
}

fn render_associations(result: &AssociationSet) -> String {
    let mut out = format!(
        "Associations with {} ({}, {} tests)\n",
        result.target, result.method, result.n_tests
    );
    out.push_str("feature\tstatistic\tpvalue\tqvalue\tn\n");
    for a in &result.associations {
        out.push_str(&format!(
            "{}\t{:.4}\t{:.4e}\t{:.4e}\t{}\n",
            a.feature, a.statistic, a.pvalue, a.qvalue, a.n
        ));
    }
    out
}

fn render_report(report: &AnalysisReport) -> String {
    let mut out = format!("Analysis: {}\n\n", report.name);
    for output in &report.outputs {
        match output {
            AnalysisOutput::Correlation {
                x,
                y,
                method,
                result,
            } => out.push_str(&format!(
                "{} {} vs {}: statistic={:.4}, p={:.4e}\n",
                method, x, y, result.statistic, result.pvalue
            )),
            AnalysisOutput::Regression { x, y, result } => out.push_str(&format!(
                "linregress {} ~ {}: slope={:.4}, intercept={:.4}, r={:.4}, p={:.4e}\n",
                y, x, result.slope, result.intercept, result.rvalue, result.pvalue
            )),
            AnalysisOutput::Matrix {
                method,
                clustered,
                result,
            } => {
                out.push_str(&format!(
                    "{} correlation matrix{}:\n",
                    method,
                    if *clustered { " (clustered)" } else { "" }
                ));
                out.push_str(&render_matrix(result));
            }
            AnalysisOutput::Associations { result } => {
                out.push_str(&render_associations(result));
            }
        }
        out.push('\n');
    }
    out
}
