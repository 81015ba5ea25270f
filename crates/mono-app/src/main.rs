use anyhow::{Context, Result};
use clap::Parser;
use mono_core::config::{DitherConfig, load_config};

pub mod batch;
pub mod cli;
pub mod convert;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config)?;
    log::debug!("Config effective : {config:?}");

    // 5. Lot ou fichier unique
    if let Some(folder) = cli.batch_folder.as_deref() {
        let report = batch::run_batch(folder, cli.batch_out.as_deref(), &config)?;
        for (path, err) in &report.failed {
            eprintln!("échec : {} : {err}", path.display());
        }
        println!(
            "{} image(s) convertie(s), {} échec(s)",
            report.converted.len(),
            report.failed.len()
        );
        return Ok(());
    }

    let input = cli.input.as_deref().context("--input manquant")?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| convert::default_output(input, config.output_format));
    convert::convert(input, &output, &config)?;
    println!("{}", output.display());
    Ok(())
}

/// Config file when present, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<DitherConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(DitherConfig::default())
    }
}
