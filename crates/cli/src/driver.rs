//! Registers wrapped objects and prints their data through the registry's identity keys.

use std::fmt;
use std::io::Write;

use anyhow::Context;
use keyward_registry::{Owned, OwnershipRegistry, RegistryOptions};

/// The wrapped resource: a single integer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
	pub data: i64,
}

impl fmt::Display for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "data={}", self.data)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
	pub label: String,
	pub values: Vec<i64>,
	pub remove_first: bool,
}

impl Default for Plan {
	fn default() -> Self {
		Self {
			label: "object".to_owned(),
			values: vec![42],
			remove_first: false,
		}
	}
}

/// Runs `plan` against a fresh registry, writing the report to `out`.
///
/// Returns the number of entries still registered when the registry is torn down.
pub fn run(options: RegistryOptions, plan: &Plan, out: &mut impl Write) -> anyhow::Result<usize> {
	let registry: OwnershipRegistry<Object> = OwnershipRegistry::with_options(options);

	for (index, &data) in plan.values.iter().enumerate() {
		let mut handle = Owned::new(Object { data });
		registry
			.register(&mut handle, format!("{} {index}", plan.label))
			.with_context(|| format!("registering {} {index}", plan.label))?;
	}

	let identities = registry.identities();
	for &identity in &identities {
		let entry = registry.lookup(identity)?;
		writeln!(out, "{identity} {} label={:?}", entry.resource(), entry.label())?;
	}

	if plan.remove_first
		&& let Some(&first) = identities.first()
	{
		let object = registry.remove(first)?;
		tracing::info!(identity = %first, "removed first entry");
		writeln!(out, "removed {first} {object}")?;
	}

	let remaining = registry.len();
	writeln!(out, "registry size {remaining}")?;
	Ok(remaining)
}
