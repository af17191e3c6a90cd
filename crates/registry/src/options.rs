use serde::Deserialize;

/// Tunables for an [`crate::OwnershipRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryOptions {
	/// Name recorded on every tracing event.
	pub name: String,
	/// Prepended to caller-supplied labels when an entry is created.
	pub label_prefix: String,
}

impl Default for RegistryOptions {
	fn default() -> Self {
		Self {
			name: "registry".to_owned(),
			label_prefix: "added from ".to_owned(),
		}
	}
}

impl RegistryOptions {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub(crate) fn derive_label(&self, label: &str) -> String {
		let mut derived = String::with_capacity(self.label_prefix.len() + label.len());
		derived.push_str(&self.label_prefix);
		derived.push_str(label);
		derived
	}
}
