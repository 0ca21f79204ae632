//! thesis-qmd - split a thesis HTML export into a Quarto project

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use thesis_qmd::{ConvertOptions, ConvertOutcome, DetectionReport, GeneratedFile, convert};

#[derive(Parser)]
#[command(name = "thesis-qmd")]
#[command(version, about = "Split a thesis HTML export into Quarto chapter files", long_about = None)]
#[command(after_help = "EXAMPLES:
    thesis-qmd                                   Convert with the default paths
    thesis-qmd --html export.html --project out  Convert export.html into out/
    thesis-qmd --dry-run --json                  Show detected boundaries as JSON")]
struct Cli {
    /// HTML export of the thesis
    #[arg(long, value_name = "PATH", default_value = "thesis_content/ShanChenThesis.html")]
    html: PathBuf,

    /// Quarto project directory to write into
    #[arg(long, value_name = "DIR", default_value = "shan-chen-thesis")]
    project: PathBuf,

    /// Detect chapters and appendices without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the dry-run report as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = ConvertOptions::new(&cli.html, &cli.project).with_dry_run(cli.dry_run);

    match run(&cli, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, options: &ConvertOptions) -> Result<(), String> {
    match convert(options).map_err(|e| e.to_string())? {
        ConvertOutcome::DryRun(report) if cli.json => print_json(&report),
        ConvertOutcome::DryRun(report) => {
            println!("Detected chapters: {}", report.chapter_list());
            println!("Detected appendices: {}", report.appendix_list());
            Ok(())
        }
        ConvertOutcome::Generated(files) => {
            if !cli.quiet {
                print_generated(&files);
            }
            Ok(())
        }
    }
}

fn print_json(report: &DetectionReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn print_generated(files: &[GeneratedFile]) {
    println!("Generated:");
    for file in files {
        println!(" - {}", file.describe());
    }
}
