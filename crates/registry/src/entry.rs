use std::cell::Ref;
use std::fmt;

use crate::Identity;

/// Borrowed view of a registered entry.
///
/// While a view is alive the registry refuses structural changes with
/// [`crate::RegistryError::ConcurrentModification`].
pub type EntryRef<'a, T> = Ref<'a, Entry<T>>;

/// A registered resource together with its label and the identity it was keyed under.
pub struct Entry<T> {
	identity: Identity,
	label: String,
	resource: Box<T>,
}

impl<T> Entry<T> {
	pub(crate) fn new(identity: Identity, resource: Box<T>, label: String) -> Self {
		Self {
			identity,
			label,
			resource,
		}
	}

	/// Identity captured before the resource was transferred in.
	#[inline]
	pub fn identity(&self) -> Identity {
		self.identity
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn resource(&self) -> &T {
		&self.resource
	}

	pub fn into_resource(self) -> Box<T> {
		self.resource
	}

	pub fn into_parts(self) -> (Identity, String, Box<T>) {
		(self.identity, self.label, self.resource)
	}
}

impl<T: fmt::Debug> fmt::Debug for Entry<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Entry")
			.field("identity", &self.identity)
			.field("label", &self.label)
			.field("resource", &self.resource)
			.finish()
	}
}
