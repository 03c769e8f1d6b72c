//! pdfdraft CLI - convert PDF articles to draft Markdown

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdraft::{
    BatchItem, BatchReport, ConvertOptions, ConvertOutcome, Converter, Error, ItemStatus,
    JsonFormat, MIN_CONTENT_CHARS,
};

#[derive(Parser)]
#[command(name = "pdfdraft")]
#[command(version)]
#[command(about = "Convert PDF articles to draft Markdown", long_about = None)]
struct Cli {
    /// Path to a PDF file or a directory containing PDFs
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Output file name (single file only)
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,

    /// Directory that receives the Markdown files
    #[arg(long, value_name = "DIR", default_value = ".", env = "PDFDRAFT_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Characters a source must extract before fallbacks are skipped
    #[arg(long, value_name = "N", default_value_t = MIN_CONTENT_CHARS)]
    min_chars: usize,

    /// Convert directory entries one at a time
    #[arg(long)]
    sequential: bool,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    report: ReportMode,

    /// Keep extracted text exactly as the PDF library returns it
    #[arg(long)]
    no_normalize: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ReportMode {
    /// Human-readable lines
    Text,
    /// JSON report on stdout
    Json,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_output_dir(&self.output_dir)
            .with_parallel(!self.sequential)
            .with_min_content_chars(self.min_chars)
            .with_normalization(!self.no_normalize);
        if let Some(ref name) = self.output {
            options = options.with_output_name(name);
        }
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let converter = Converter::with_options(cli.options());
    let result = if cli.path.is_file() {
        Ok(run_single(&converter, &cli.path, cli.report))
    } else if cli.path.is_dir() {
        run_batch(&converter, &cli.path, cli.report)
    } else {
        Err(Error::InputNotFound(cli.path.clone()))
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_single(converter: &Converter, path: &Path, report: ReportMode) -> bool {
    if report == ReportMode::Text {
        println!("{} {}", "Processing PDF:".cyan(), path.display());
    }

    let status: ItemStatus = converter.convert_file(path).into();
    let converted = status.is_converted();
    let item = BatchItem::new(path, status);

    match report {
        ReportMode::Text => print_item(&item),
        ReportMode::Json => print_json(&BatchReport::from_items(vec![item])),
    }
    converted
}

fn run_batch(converter: &Converter, dir: &Path, report: ReportMode) -> pdfdraft::Result<bool> {
    let total = pdfdraft::convert::list_documents(dir)?.len();
    if total == 0 {
        return Err(Error::NoDocuments(dir.to_path_buf()));
    }
    if report == ReportMode::Text {
        println!("{} {} PDF files", "Found".cyan(), total);
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let batch = converter.convert_dir_with(dir, |item| {
        pb.set_message(file_name(&item.input));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    match report {
        ReportMode::Text => {
            for item in &batch.items {
                println!("\n--- {} ---", file_name(&item.input).bold());
                print_item(item);
            }
            let tally = format!(
                "Completed: {}/{} PDFs processed successfully",
                batch.succeeded(),
                batch.total()
            );
            if batch.is_success() {
                println!("\n{}", tally.green().bold());
            } else {
                println!("\n{}", tally.red().bold());
            }
        }
        ReportMode::Json => print_json(&batch),
    }

    Ok(batch.is_success())
}

fn print_item(item: &BatchItem) {
    match &item.status {
        ItemStatus::Converted(outcome) => print_outcome(outcome),
        ItemStatus::Failed { message } => {
            eprintln!("{}: {}", "Error".red().bold(), message);
            eprintln!("{} {}", "Failed to process".red(), file_name(&item.input));
        }
    }
}

fn print_outcome(outcome: &ConvertOutcome) {
    println!(
        "Extracted {} characters from PDF ({})",
        outcome.chars_extracted, outcome.source
    );
    if !outcome.confident {
        println!(
            "{}",
            "Warning: little text was found; the draft may be incomplete".yellow()
        );
    }
    println!(
        "  {} {} sections, {} subsections, {} references, {} tables",
        "├─".dimmed(),
        outcome.stats.section_headings,
        outcome.stats.subsection_headings,
        outcome.stats.reference_entries,
        outcome.stats.table_count
    );
    println!(
        "  {} {} {}",
        "└─".dimmed(),
        "Markdown saved to:".green(),
        outcome.output.display()
    );
}

fn print_json(report: &BatchReport) {
    match report.to_json(JsonFormat::Pretty) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}: {}", "Error".red().bold(), e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
