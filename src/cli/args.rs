//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CONFIG_FILE, SiteConfig};

/// Markdown blog pipeline: admonitions, code groups, highlighted code and a post link graph
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every post and write HTML fragments plus posts.json
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Render a single post to stdout
    #[command(visible_alias = "r")]
    Render {
        /// Post source file (`<dir>/index.md`)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Print metadata as JSON instead of the HTML body
        #[arg(short, long)]
        json: bool,
    },

    /// Print the code palette as CSS variables
    Css {
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Content directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Abort when any post fails to parse
    #[arg(short, long)]
    pub strict: bool,

    /// Ignore and do not update the post cache
    #[arg(long)]
    pub no_cache: bool,

    /// Do not query git for modification dates
    #[arg(long)]
    pub no_history: bool,
}

impl BuildArgs {
    /// Apply command-line overrides to the loaded config.
    pub fn apply(&self, config: &mut SiteConfig) {
        if let Some(content) = &self.content {
            config.build.content = content.clone();
        }
        if let Some(output) = &self.output {
            config.build.output = output.clone();
        }
        if self.strict {
            config.build.strict = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_overrides() {
        let cli = Cli::parse_from(["inkpost", "build", "-c", "posts", "--strict", "--no-cache"]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        let mut config = SiteConfig::default();
        build_args.apply(&mut config);

        assert_eq!(config.build.content, PathBuf::from("posts"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(config.build.strict);
        assert!(build_args.no_cache);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["inkpost", "css", "--verbose", "-C", "site/inkpost.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site/inkpost.toml"));
    }
}
