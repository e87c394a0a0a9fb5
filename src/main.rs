//! vibes - Coding-assistant usage wrapped from the command line

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibes::{
    acquisition::{Acquirer, BundleRequest},
    batch::{self, ClassifiedFile},
    cli::{Cli, Command, DEFAULT_LOG_DIRECTIVE},
    client::ApiClient,
    demo::demo_bundle,
    enrichment::Enricher,
    output::get_formatter,
    submission::SubmissionService,
};
use vibes_core::{Result, VibesError};
use vibes_persona::{PersonaId, RULES};
use vibes_store::MemoryPopulationStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --quiet and --verbose override RUST_LOG
    let filter = match cli.log_directive() {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.json || !is_terminal::is_terminal(std::io::stdout()) {
        colored::control::set_override(false);
    }

    let config = cli.config()?;
    let formatter = get_formatter(cli.json);

    match cli.command {
        Command::Enrich {
            url,
            id,
            data,
            file,
        } => {
            let enricher = Enricher::from_config(&config)?;
            let view = match file {
                // A local file is explicit input: read and parse errors are reported
                Some(path) => {
                    info!("Enriching {}", path.display());
                    enricher.enrich(batch::load_bundle(&path)?, None).await
                }
                None => {
                    let mut request = url
                        .as_deref()
                        .map(BundleRequest::from_share_link)
                        .unwrap_or_default();
                    if id.is_some() {
                        request.id = id;
                    }
                    if data.is_some() {
                        request.data = data;
                    }
                    let acquired = Acquirer::from_config(&config)?.acquire(&request).await;
                    enricher.enrich_acquired(acquired).await
                }
            };
            println!("{}", formatter.format_view(&view));
        }
        Command::Encode { path, short } => {
            let bundle = batch::load_bundle(&path)?;
            if short {
                let client = ApiClient::from_config(&config)?.ok_or_else(|| {
                    VibesError::Config("--short needs --server and no --offline".to_string())
                })?;
                println!("{}", client.store_bundle(&bundle).await?);
            } else {
                println!("{}", vibes_codec::encode(&bundle)?);
            }
        }
        Command::Decode { encoded } => {
            let bundle = vibes_codec::decode(&encoded)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::Classify { paths } => {
            info!("Classifying {} files", paths.len());
            let mut classified: Vec<ClassifiedFile> = Vec::new();
            for (path, result) in batch::classify_files(paths).await? {
                match result {
                    Ok(file) => classified.push(file),
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }
            println!("{}", formatter.format_classifications(&classified));
        }
        Command::Rank { paths } => {
            info!("Ranking {} files", paths.len());
            let mut bundles = Vec::new();
            for (path, result) in batch::load_bundles(paths).await? {
                match result {
                    Ok(bundle) => bundles.push((path, bundle)),
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }

            let service = SubmissionService::new(MemoryPopulationStore::from_config(&config));
            let ranked = batch::rank_bundles(&service, bundles).await?;
            let stats = service.global_stats().await?;
            println!("{}", formatter.format_rankings(&ranked, &stats));
        }
        Command::Personas { rules } => {
            if rules {
                println!("{}", formatter.format_rules(RULES));
            } else {
                let personas: Vec<_> = PersonaId::ALL.iter().map(|id| id.definition()).collect();
                println!("{}", formatter.format_catalog(&personas));
            }
        }
        Command::Demo { sample } => {
            info!("Enriching demo sample {}", sample.name());
            // Demo data never leaves the process
            let view = Enricher::offline().enrich(demo_bundle(sample), None).await;
            println!("{}", formatter.format_view(&view));
        }
    }

    Ok(())
}
