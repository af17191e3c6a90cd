//! Keyward driver binary.
//!
//! Registers one wrapped object per `--value`, prints each object's data through its
//! identity key, and tears the registry down.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

mod config;
mod driver;

use config::Config;
use driver::Plan;

/// Driver command line arguments.
#[derive(Parser, Debug)]
#[command(name = "keyward")]
#[command(about = "Register objects by identity and print them back")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Object payload to register (repeatable)
	#[arg(long = "value", value_name = "N", allow_negative_numbers = true)]
	values: Vec<i64>,

	/// Label given to each registered object
	#[arg(short, long)]
	label: Option<String>,

	/// Remove the entry with the lowest identity after printing
	#[arg(long)]
	remove_first: bool,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => Config::load(path).context("loading configuration")?,
		None => Config::default(),
	};
	let plan = plan_from(&args, &config);

	info!(registry = %config.registry.name, objects = plan.values.len(), "starting keyward");

	let mut stdout = std::io::stdout().lock();
	let remaining = driver::run(config.registry, &plan, &mut stdout)?;

	info!(remaining, "registry torn down");
	Ok(())
}

/// Command-line flags win over configuration values, which win over defaults.
fn plan_from(args: &Args, config: &Config) -> Plan {
	let defaults = Plan::default();
	let values = if !args.values.is_empty() {
		args.values.clone()
	} else if !config.driver.values.is_empty() {
		config.driver.values.clone()
	} else {
		defaults.values
	};
	let label = args
		.label
		.clone()
		.or_else(|| config.driver.label.clone())
		.unwrap_or(defaults.label);

	Plan {
		label,
		values,
		remove_first: args.remove_first,
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("keyward=trace,debug")
		} else {
			EnvFilter::new("keyward=info")
		}
	});

	tracing_subscriber::registry()
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.with(filter)
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flags_override_config() {
		let args = Args::parse_from(["keyward", "--value", "-3", "--label", "cli"]);
		let config = Config {
			driver: config::DriverSection {
				label: Some("file".to_owned()),
				values: vec![9],
			},
			..Config::default()
		};

		let plan = plan_from(&args, &config);
		assert_eq!(plan.values, vec![-3]);
		assert_eq!(plan.label, "cli");
	}

	#[test]
	fn test_config_fills_missing_flags() {
		let args = Args::parse_from(["keyward", "--remove-first"]);
		let config = Config {
			driver: config::DriverSection {
				label: Some("file".to_owned()),
				values: vec![9, 10],
			},
			..Config::default()
		};

		let plan = plan_from(&args, &config);
		assert_eq!(plan.values, vec![9, 10]);
		assert_eq!(plan.label, "file");
		assert!(plan.remove_first);
	}

	#[test]
	fn test_defaults_without_config() {
		let args = Args::parse_from(["keyward"]);
		assert_eq!(plan_from(&args, &Config::default()), Plan::default());
	}
}
