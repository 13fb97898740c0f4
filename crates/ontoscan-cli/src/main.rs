//! ontoscan — ontology term annotation from the command line.
//! Entry point for the `ontoscan` binary.

mod cli;

use std::io::Read;
use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use ontoscan_annotator::{AnnotatorStack, CacheStack, OntologyCatalog};
use ontoscan_common::{OntologyId, Settings};
use ontoscan_recommender::Recommender;
use ontoscan_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, TextInput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ontoscan=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Settings::load()?,
    };
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve { bind } => {
            let stack = AnnotatorStack::from_settings(&settings).await?;
            let state = AppState::from_stack(&stack, &settings);
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            let addr: SocketAddr = bind.parse().with_context(|| format!("invalid bind address {bind}"))?;
            ontoscan_web::serve(state, addr).await?;
        }

        Command::Annotate { input, options } => {
            let stack = AnnotatorStack::from_settings(&settings).await?;
            let bytes = read_input(&input)?;
            let annotations = stack.annotator.annotate_bytes(&bytes, &options.to_options()).await?;
            println!("{}", serde_json::to_string_pretty(&annotations)?);
        }

        Command::Recommend { input, ontologies, include_classes } => {
            let stack = AnnotatorStack::from_settings(&settings).await?;
            let text = String::from_utf8_lossy(&read_input(&input)?).into_owned();
            let recommender = Recommender::new(stack.annotator.clone(), stack.catalog.clone())
                .with_hierarchy_levels(settings.recommender.hierarchy_levels);
            let recs = recommender.recommend(&text, &ontologies, include_classes).await?;
            println!("{}", serde_json::to_string_pretty(&recs)?);
        }

        Command::BuildCache { instance, ontologies } => {
            let cache = CacheStack::from_settings(&settings).await?;
            match instance {
                Some(instance) => {
                    let only = resolve_ontologies(&*cache.corpus, &ontologies).await?;
                    let report = cache.term_cache.create_term_cache(&instance, &only).await?;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                None => {
                    let path = settings.require_dictionary_path()?;
                    let report = cache.term_cache.rebuild(path).await?;
                    info!(
                        "Rebuilt cache: {} -> {}, {} dictionary entries",
                        report.previous, report.current, report.dictionary_entries
                    );
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }

        Command::Dictionary { instance, output } => {
            let cache = CacheStack::from_settings(&settings).await?;
            let instance = match instance {
                Some(i) => i,
                None => cache.term_cache.instances().current().await?,
            };
            let path = match &output {
                Some(p) => p.as_path(),
                None => settings.require_dictionary_path()?,
            };
            let entries = cache.term_cache.generate_dictionary_file(&instance, path).await?;
            println!("{entries} entries written to {}", path.display());
        }

        Command::SwitchInstance { to } => {
            let cache = CacheStack::from_settings(&settings).await?;
            let current = cache.term_cache.instances().switch(to.as_deref()).await?;
            println!("{current}");
        }
    }

    Ok(())
}

fn read_input(input: &TextInput) -> anyhow::Result<Vec<u8>> {
    if let Some(text) = &input.text {
        return Ok(text.clone().into_bytes());
    }
    if let Some(path) = &input.file {
        return std::fs::read(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
    Ok(buf)
}

/// Map ids or acronyms to catalog ontology ids; unknown names are an error.
async fn resolve_ontologies(catalog: &dyn OntologyCatalog, names: &[String]) -> anyhow::Result<Vec<OntologyId>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let known = catalog.ontologies().await?;
    names
        .iter()
        .map(|name| {
            known
                .iter()
                .find(|id| id.matches(name))
                .cloned()
                .with_context(|| format!("unknown ontology {name}"))
        })
        .collect()
}
