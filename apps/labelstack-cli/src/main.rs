//! labelstack CLI - duplicate a PDF page vertically with a gap
//!
//! Bottom-aligned: the first copy sits at y = 0, the second above it with
//! the configured gap. Exit code 0 on success, 1 on any error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use labelstack_core::{stack_file, StackError, StackOptions};
use tracing::info;

#[derive(Parser)]
#[command(name = "labelstack")]
#[command(version)]
#[command(about = "Duplicate a PDF page twice onto one sheet, stacked vertically", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Zero-based page index to duplicate
    #[arg(long, value_name = "N", default_value_t = 0)]
    page: u32,

    /// Gap between the two copies, in inches
    #[arg(long, value_name = "G", default_value_t = 0.12)]
    gap: f64,

    /// Size and place using the PDF CropBox instead of the MediaBox
    #[arg(long)]
    use_cropbox: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labelstack=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), StackError> {
    let options = StackOptions {
        page_index: cli.page,
        gap_inches: cli.gap,
        use_cropbox: cli.use_cropbox,
    };

    stack_file(&cli.input, &cli.output, &options)?;

    info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        page = cli.page,
        gap_inches = cli.gap,
        "stacked PDF written"
    );
    Ok(())
}
