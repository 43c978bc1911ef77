use clap::{Parser, Subcommand};
use cli::ScanJob;
use color_eyre::eyre::{bail, Result};
use grid_regions::{
    records_to_json_lines, Detector, DetectorConfig, FsArtifactSink, ImageFileSource, PageSource,
    ScanReport, SequenceScope, Strictness,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect table candidates on rendered page images
    Detect {
        /// Page images in page order, or a single directory of page images
        #[arg(required = true)]
        pages: Vec<PathBuf>,
        /// Output directory for cropped candidates
        #[arg(short, long, default_value = "extracted_candidates")]
        output_dir: PathBuf,
        /// Detector configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strictness preset, applied when no configuration file is given
        #[arg(long)]
        strictness: Option<Strictness>,
        /// Minimum line crossings per candidate in strict mode
        #[arg(long)]
        min_joints: Option<u32>,
        /// Number candidates per page instead of across the document
        #[arg(long)]
        page_scoped: bool,
    },
    /// Run a scan described in a job file
    Run {
        /// Path to the job file (.toml or .json)
        #[arg(short, long)]
        job: PathBuf,
    },
    /// Write the default detector configuration for a strictness preset
    InitConfig {
        /// Where to write the TOML configuration
        #[arg(short, long, default_value = "detector.toml")]
        output: PathBuf,
        #[arg(long, default_value = "permissive")]
        strictness: Strictness,
    },
    /// Print the JSON schema of the detector configuration
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    // Records go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            pages,
            output_dir,
            config,
            strictness,
            min_joints,
            page_scoped,
        } => {
            let mut detector_config = match (&config, strictness) {
                (Some(path), _) => DetectorConfig::from_file(path)?,
                (None, Some(strictness)) => DetectorConfig::for_strictness(strictness),
                (None, None) => DetectorConfig::default(),
            };
            if let Some(min_joints) = min_joints {
                detector_config.min_joints = min_joints;
            }
            if page_scoped {
                detector_config.sequence_scope = SequenceScope::Page;
            }

            let source = page_source(pages)?;
            scan(detector_config, &source, &output_dir)?;
        }
        Commands::Run { job } => {
            let job = ScanJob::from_file(&job)?;
            info!("Scan job: {:?}", job);
            let source = job.page_source()?;
            scan(job.detector, &source, &job.output_dir)?;
        }
        Commands::InitConfig { output, strictness } => {
            DetectorConfig::for_strictness(strictness).to_toml_file(&output)?;
            info!("Wrote {} configuration to {}", strictness, output.display());
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&DetectorConfig::schema())?);
        }
    }

    Ok(())
}

fn page_source(pages: Vec<PathBuf>) -> Result<ImageFileSource> {
    match pages.as_slice() {
        [dir] if dir.is_dir() => Ok(ImageFileSource::from_dir(dir)?),
        _ => Ok(ImageFileSource::new(pages)),
    }
}

fn scan(config: DetectorConfig, source: &ImageFileSource, output_dir: &Path) -> Result<ScanReport> {
    if source.page_count() == 0 {
        bail!("No page images found");
    }

    let detector = Detector::new(config)?;
    let sink = FsArtifactSink::new(output_dir);
    let report = detector.scan_document(source, &sink);

    print!("{}", records_to_json_lines(&report.records())?);

    for failure in &report.skipped_pages {
        warn!("Page {} skipped: {}", failure.page_index, failure.error);
    }
    for failure in &report.artifact_failures {
        warn!(
            "Candidate {} on page {} not saved: {}",
            failure.sequence_index, failure.page_index, failure.error
        );
    }
    info!(
        "Extracted {} candidates from {} pages to '{}'",
        report.artifacts.len(),
        report.page_count,
        output_dir.display()
    );

    Ok(report)
}
