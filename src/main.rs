use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use code_outline_lib::config::{OutlineConfig, ReportFormat};

#[derive(Parser)]
#[command(name = "code-outline")]
#[command(about = "Write a structural outline of a C#, JavaScript, Razor, Python and C/C++ source tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to scan recursively
    #[arg(long, alias = "scan_directory", default_value = ".")]
    scan_directory: PathBuf,

    /// File to write the summary to
    #[arg(long, alias = "output_file", default_value = "./CODE_SUMMARY.txt")]
    output_file: PathBuf,

    /// Summary format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Also skip paths matched by .gitignore and .ignore files
    #[arg(long)]
    respect_ignore_files: bool,

    /// Log per-file decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = OutlineConfig {
        scan_directory: cli.scan_directory,
        output_file: cli.output_file,
        format: cli.format,
        respect_ignore_files: cli.respect_ignore_files,
        ..OutlineConfig::default()
    };

    code_outline_lib::run(&config)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
