//! inkpost - Markdown content pipeline for a technical blog.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use inkpost::cli::{self, Cli, Commands};
use inkpost::config::SiteConfig;
use inkpost::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mut config = SiteConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Build { build_args } => {
            build_args.apply(&mut config);
            cli::build::build_site(&config, build_args)
        }
        Commands::Render { file, json } => cli::render::render_file(&config, file, *json),
        Commands::Css { output } => cli::css::export_css(&config, output.as_deref()),
    }
}
