use anyhow::{bail, Result};
use clap::Parser;
use rdf2smw::pipeline::{self, ConvertConfig};
use rdf2smw::serialize::DumpPaths;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "rdf2smw")]
#[command(about = "Convert RDF data to MediaWiki XML dumps for Semantic MediaWiki")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input file in Turtle or N-Triples format (.bz2 is decompressed)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file in MediaWiki XML format; properties and templates go to
    /// sibling files with _properties / _templates suffixes
    #[arg(short, long)]
    output: PathBuf,

    /// Write facts as plain annotations instead of template calls
    #[arg(long)]
    no_templates: bool,

    /// Only write pages in this category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Also write every converted page as JSON lines to this file
    #[arg(long)]
    dump_pages: Option<PathBuf>,
}

fn run_convert(cli: Cli) -> Result<()> {
    if cli.input == cli.output {
        bail!("Input and output must be different files");
    }

    let config = ConvertConfig {
        input: cli.input,
        output: cli.output,
        use_templates: !cli.no_templates,
        categories: cli.categories,
        dump_pages: cli.dump_pages,
        show_progress: true,
    };

    let start = Instant::now();
    let stats = pipeline::run(&config)?;
    let duration = start.elapsed();
    info!(duration_secs = duration.as_secs_f64(), "Conversion complete");

    let paths = DumpPaths::from_output(&config.output);
    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", duration.as_secs_f64());
    println!();
    println!("Triples read:       {}", stats.triples());
    println!("Subjects:           {}", stats.subject_count());
    println!("Pages written:      {}", stats.pages());
    println!("Property pages:     {}", stats.property_pages());
    println!("Template pages:     {}", stats.template_pages());
    println!("Pages filtered:     {}", stats.filtered());
    println!("Facts written:      {}", stats.facts());
    println!("Categories written: {}", stats.categories());
    println!();
    println!("Pages:      {}", paths.pages.display());
    println!("Properties: {}", paths.properties.display());
    println!("Templates:  {}", paths.templates.display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run_convert(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
