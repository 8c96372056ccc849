use anyhow::Result;
use colored::Colorize;
use smpack_container::validate_path;
use std::path::Path;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// package file to check
	#[arg(required = true)]
	filename: String,
}

/// Prints the audit result and returns whether the package is valid.
pub fn run(arguments: &Subcommand) -> Result<bool> {
	let report = validate_path(Path::new(&arguments.filename));

	for error in &report.errors {
		println!("  {} {error}", "✘".red());
	}
	for warning in &report.warnings {
		println!("  {} {warning}", "⚠".yellow());
	}

	if report.is_valid() {
		println!("{} {} is a valid styled map package", "✔".green(), arguments.filename);
	} else {
		println!(
			"{} {} is not a valid styled map package ({} errors)",
			"✘".red(),
			arguments.filename,
			report.errors.len()
		);
	}

	Ok(report.is_valid())
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{prelude::*, NamedTempFile};
	use smpack_container::testing::build_minimal_package;

	#[test]
	fn valid_package_passes() -> Result<()> {
		let temp = NamedTempFile::new("valid.smp")?;
		temp.write_binary(build_minimal_package()?.as_slice())?;

		let valid = run(&Subcommand {
			filename: temp.path().to_str().unwrap().to_string(),
		})?;
		assert!(valid);
		Ok(())
	}

	#[test]
	fn missing_file_fails() -> Result<()> {
		let valid = run(&Subcommand {
			filename: "/no/such/package.smp".to_string(),
		})?;
		assert!(!valid);
		Ok(())
	}
}
