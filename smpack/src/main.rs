//! # smpack CLI
//!
//! Produce and audit styled map packages: self-contained ZIP bundles holding a MapLibre
//! style plus every tile, glyph range, and sprite it references.
//!
//! ## Subcommands
//! - **Download**: fetch a style and all referenced resources into a package.
//! - **Validate**: structural audit of an existing package.
//!
//! ## Example
//! ```sh
//! smpack download https://demotiles.maplibre.org/style.json berlin.smp \
//!     --bbox 13.3,52.4,13.5,52.6 --max-zoom 12
//!
//! smpack validate berlin.smp
//! ```

mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = false,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(
		long,
		short = 'q',
		action = clap::ArgAction::Count,
		global = true,
		help = "Decrease logging verbosity",
		conflicts_with = "verbose",
		display_order = 100,
	)]
	quiet: u8,

	#[arg(
		long,
		short = 'v',
		action = clap::ArgAction::Count,
		global = true,
		help = "Increase logging verbosity (repeat for more detail, e.g. '-vvv')",
		display_order = 100,
	)]
	verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Download a style with all referenced resources into a package
	Download(tools::download::Subcommand),

	#[clap(alias = "check")]
	/// Check the structure of an existing package
	Validate(tools::validate::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let verbosity = cli.verbose as i16 - cli.quiet as i16;
	let log_level = match verbosity {
		i16::MIN..=-1 => LevelFilter::Off,
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		3..=i16::MAX => LevelFilter::Trace,
	};

	env_logger::Builder::new()
		.filter_level(log_level)
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Download(arguments) => tools::download::run(arguments),
		Commands::Validate(arguments) => {
			let valid = tools::validate::run(arguments)?;
			if !valid {
				std::process::exit(1);
			}
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn subcommand_is_required() {
		assert!(Cli::try_parse_from(["smpack"]).is_err());
	}

	#[test]
	fn download_arguments_parse() {
		let cli = Cli::try_parse_from([
			"smpack",
			"download",
			"https://example.com/style.json",
			"out.smp",
			"--bbox",
			"-10,-10,10,10",
			"--max-zoom",
			"5",
		])
		.unwrap();
		assert!(matches!(cli.command, Commands::Download(_)));
	}
}
