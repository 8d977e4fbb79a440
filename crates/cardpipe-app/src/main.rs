use std::io::{self, BufReader};
use std::sync::Arc;

use cardpipe_app::cli::{Cli, Command};
use cardpipe_app::commands::{open_input, read_contacts, run_export, run_fields, run_import};
use cardpipe_core::config::load_config;
use cardpipe_service::{ConversionParameters, MappingRegistry};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let params = ConversionParameters::from_settings(&config)?;
    let registry = Arc::new(MappingRegistry::standard());
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Import(args) => {
            let input = open_input(&args.file)?;
            run_import(input, registry, args.apply(params), &mut stdout)?;
        }
        Command::Export(args) => {
            let contacts = read_contacts(BufReader::new(open_input(&args.file)?))?;
            let summary = run_export(&contacts, registry, args.apply(params), &mut stdout)?;
            tracing::info!(
                contacts = summary.contacts,
                warnings = summary.warnings,
                bytes = summary.bytes,
                "Export finished"
            );
        }
        Command::Fields => run_fields(&registry, &mut stdout)?,
    }

    Ok(())
}
