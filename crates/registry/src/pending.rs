//! Pending ownership transfers.
//!
//! # Role
//!
//! Splits registration into two steps that cannot be reordered. The identity is read and
//! stored while the caller still owns the resource; only afterwards does the resource leave
//! the caller's handle.
//!
//! # Invariants
//!
//! - The identity is captured from the pre-transfer resource and never re-read on commit.
//!   - Enforced in: [`PendingTransfer::capture`], [`PendingTransfer::from_boxed`].
//!   - Tested by: `invariants::test_identity_captured_before_transfer`.
//!   - Failure symptom: stored keys that resolve to nothing.

use std::fmt;
use std::marker::PhantomData;

use crate::identity::{ByAddress, Identity, IdentityScheme};
use crate::{Owned, RegistryError};

/// A resource on its way into a registry, keyed by an identity captured beforehand.
pub struct PendingTransfer<T, S = ByAddress> {
	identity: Identity,
	resource: Box<T>,
	label: String,
	_scheme: PhantomData<fn() -> S>,
}

impl<T, S> PendingTransfer<T, S>
where
	S: IdentityScheme<T>,
{
	/// Captures the identity of the resource in `handle`, then takes the resource.
	///
	/// Fails with [`RegistryError::InvalidResource`] if the handle is empty; the handle is
	/// left untouched in that case.
	pub fn capture(handle: &mut Owned<T>, label: impl Into<String>) -> Result<Self, RegistryError> {
		let identity = match handle.get() {
			Some(resource) => S::identity(resource),
			None => return Err(RegistryError::InvalidResource),
		};
		let resource = handle.take().ok_or(RegistryError::InvalidResource)?;
		Ok(Self::with_identity(identity, resource, label.into()))
	}

	/// Captures the identity of an already-unwrapped resource.
	pub fn from_boxed(resource: Box<T>, label: impl Into<String>) -> Self {
		let identity = S::identity(&*resource);
		Self::with_identity(identity, resource, label.into())
	}

	fn with_identity(identity: Identity, resource: Box<T>, label: String) -> Self {
		Self {
			identity,
			resource,
			label,
			_scheme: PhantomData,
		}
	}
}

impl<T, S> PendingTransfer<T, S> {
	#[inline]
	pub fn identity(&self) -> Identity {
		self.identity
	}

	/// The caller-supplied label, before any prefix is applied.
	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn resource(&self) -> &T {
		&self.resource
	}

	pub fn into_resource(self) -> Box<T> {
		self.resource
	}

	pub(crate) fn into_parts(self) -> (Identity, Box<T>, String) {
		(self.identity, self.resource, self.label)
	}
}

impl<T, S> fmt::Debug for PendingTransfer<T, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PendingTransfer")
			.field("identity", &self.identity)
			.field("label", &self.label)
			.finish_non_exhaustive()
	}
}
