use std::fmt;

use crate::{Identity, PendingTransfer};

/// Registry operation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// The handle offered for registration holds no resource.
	#[error("resource handle is empty")]
	InvalidResource,

	/// The identity is already keyed to a live entry.
	#[error("identity {identity} already registered as {existing_label:?}")]
	DuplicateIdentity {
		identity: Identity,
		existing_label: String,
	},

	#[error("no entry registered under {0}")]
	NotFound(Identity),

	/// A structural change was attempted while the entries are borrowed by an
	/// enumeration or a lookup view.
	#[error("{operation} attempted while entries are borrowed")]
	ConcurrentModification { operation: &'static str },

	/// A stored key no longer matches its resource.
	#[error("entry keyed {key} resolves to {actual}")]
	StaleIdentity { key: Identity, actual: Identity },
}

/// A commit that did not happen, returning the pending transfer to the caller.
pub struct Rejected<T, S> {
	error: RegistryError,
	pending: PendingTransfer<T, S>,
}

impl<T, S> Rejected<T, S> {
	pub(crate) fn new(error: RegistryError, pending: PendingTransfer<T, S>) -> Self {
		Self { error, pending }
	}

	pub fn error(&self) -> &RegistryError {
		&self.error
	}

	pub fn pending(&self) -> &PendingTransfer<T, S> {
		&self.pending
	}

	pub fn into_pending(self) -> PendingTransfer<T, S> {
		self.pending
	}

	pub fn into_resource(self) -> Box<T> {
		self.pending.into_resource()
	}

	pub fn into_parts(self) -> (RegistryError, PendingTransfer<T, S>) {
		(self.error, self.pending)
	}
}

impl<T, S> fmt::Debug for Rejected<T, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rejected")
			.field("error", &self.error)
			.field("identity", &self.pending.identity())
			.field("label", &self.pending.label())
			.finish()
	}
}

impl<T, S> fmt::Display for Rejected<T, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"registration of '{}' at {} rejected: {}",
			self.pending.label(),
			self.pending.identity(),
			self.error
		)
	}
}

impl<T, S> std::error::Error for Rejected<T, S> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.error)
	}
}

impl<T, S> From<Rejected<T, S>> for RegistryError {
	fn from(rejected: Rejected<T, S>) -> Self {
		rejected.error
	}
}
