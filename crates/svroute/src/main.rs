mod output;
mod settings;

use clap::Parser;
use log::info;
use output::write_priorities;
use route_core::annotations::Annotations;
use route_core::batch::prioritize_batch;
use route_core::contig_header::ContigHeader;
use route_core::error::SvError;
use route_core::prioritizer::SvPrioritizer;
use route_core::settings::PrioritizationSettings;
use route_core::variant::VariantRepository;
use settings::{Cli, Commands, Settings};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), SvError> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Settings => {
            println!(
                "{}",
                serde_json::to_string_pretty(&PrioritizationSettings::default())?
            );
            Ok(())
        }
        Commands::Prioritize(args) => {
            let settings: Settings = args.try_into()?;
            prioritize(settings).await
        }
    }
}

async fn prioritize(settings: Settings) -> Result<(), SvError> {
    let contig_header = ContigHeader::from_chrom_sizes(&settings.contigs)?;
    let annotations = Annotations::from_paths(
        &settings.annotations,
        &contig_header,
        settings.prioritization.tad_stability_threshold,
    )?;
    let variants = VariantRepository::new(&settings.variants).read_variants(&contig_header)?;

    info!(
        "Prioritizing {} variants on {} workers",
        variants.len(),
        settings.prioritization.workers
    );
    let prioritizer = Arc::new(SvPrioritizer::from_settings(
        Arc::new(annotations),
        &settings.prioritization,
    ));
    let priorities =
        prioritize_batch(prioritizer, variants.clone(), &settings.prioritization).await;

    match &settings.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| SvError::IOError(format!("Cannot create {}: {}", path, e)))?;
            write_priorities(
                BufWriter::new(file),
                &variants,
                &priorities,
                settings.output_format,
            )
        }
        None => write_priorities(
            std::io::stdout().lock(),
            &variants,
            &priorities,
            settings.output_format,
        ),
    }
}
