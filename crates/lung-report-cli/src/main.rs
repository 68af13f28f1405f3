use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lung_report_core::{
    HtmlExporter, JsonExporter, PatientRecord, PdfExporter, Region, RegionRenderer, ReportConfig,
    ReportSession, ReportSink, RngSource, SeverityLevel, Tally,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "lung_report=info";

#[derive(Parser)]
#[command(name = "lung-report")]
#[command(about = "Lung region scoring and report export")]
struct Cli {
    /// JSON configuration file (title, regions, levels, draw policy)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every region and write a report
    Generate {
        /// Patient name
        #[arg(long, default_value = "")]
        name: String,
        /// Patient last name
        #[arg(long, default_value = "")]
        last_name: String,
        /// Date of birth, free text
        #[arg(long, default_value = "")]
        date_of_birth: String,
        /// Date of acquisition, free text (defaults to today)
        #[arg(long, default_value = "")]
        date_of_acquisition: String,
        /// Clinician notes
        #[arg(long, default_value = "")]
        notes: String,
        /// Seed for reproducible scores
        #[arg(long)]
        seed: Option<u64>,
        /// Directory the report is written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Pdf)]
        format: Format,
    },
    /// Print the level palette
    Legend,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Html,
    Json,
}

/// Prints each region as it is scored, then the totals.
struct ConsoleRenderer {
    /// Captions of the scored levels, in tally order
    labels: Vec<String>,
}

impl RegionRenderer for ConsoleRenderer {
    fn render_region(&mut self, region: &Region, level: &SeverityLevel) {
        println!("{:<16} {} {}", region, level.color, level.label);
    }

    fn render_totals(&mut self, tally: &Tally) {
        println!();
        println!("Totals");
        println!("Pathological areas: {}", tally.pathological());
        for (label, count) in self.labels.iter().zip(tally.counts()) {
            println!("  {}: {}", label, count);
        }
    }
}

/// `RUST_LOG` when it is set and parses, the default filter otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ReportConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            name,
            last_name,
            date_of_birth,
            date_of_acquisition,
            notes,
            seed,
            output_dir,
            format,
        } => {
            let source = match seed {
                Some(seed) => RngSource::seeded(seed),
                None => RngSource::from_entropy(),
            };
            let mut session = ReportSession::new(&config, source)?;
            session.set_patient(PatientRecord {
                name,
                last_name,
                date_of_birth,
                date_of_acquisition,
                notes,
            });

            let mut console = ConsoleRenderer {
                labels: session
                    .palette()
                    .scored_levels()
                    .iter()
                    .map(|level| level.label.clone())
                    .collect(),
            };
            session.generate_with(&mut console);

            let sink: Box<dyn ReportSink> = match format {
                Format::Pdf => Box::new(PdfExporter::new(&output_dir)),
                Format::Html => Box::new(HtmlExporter::new(&output_dir)),
                Format::Json => Box::new(JsonExporter::new(&output_dir)),
            };
            let path = session
                .export_with(session.patient(), sink.as_ref())
                .with_context(|| format!("writing report to {}", output_dir.display()))?;

            println!();
            println!("Report written to {}", path.display());
        }
        Commands::Legend => {
            let session = ReportSession::new(&config, RngSource::from_entropy())?;
            println!("{}", session.title());
            for row in session.legend().rows {
                println!("  {} {}", row.color, row.label);
            }
        }
    }

    Ok(())
}
