//! The registry type and its operations.
//!
//! # Role
//!
//! Registration, lookup, removal and enumeration over the identity map. Mutating operations
//! take a `RefMut` for the duration of one call and never run caller code while holding it,
//! so readers can always borrow.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::hash_map;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::identity::{ByAddress, Identity, IdentityScheme};
use crate::{Entry, EntryRef, Owned, PendingTransfer, Rejected, RegistryError, RegistryOptions};

/// Owns resources keyed by their pre-transfer identity.
pub struct OwnershipRegistry<T, S = ByAddress> {
	options: RegistryOptions,
	entries: RefCell<FxHashMap<Identity, Entry<T>>>,
	/// Number of enumerations currently running.
	traversals: Cell<u32>,
	/// First structural change refused during the running enumerations.
	interrupted: Cell<Option<&'static str>>,
	_scheme: PhantomData<fn() -> S>,
}

impl<T> OwnershipRegistry<T> {
	/// Creates an empty registry keyed by heap address.
	pub fn new() -> Self {
		Self::configured(RegistryOptions::default())
	}

	/// Creates an empty registry keyed by heap address with the given options.
	pub fn with_options(options: RegistryOptions) -> Self {
		Self::configured(options)
	}
}

impl<T, S> Default for OwnershipRegistry<T, S> {
	fn default() -> Self {
		Self::configured(RegistryOptions::default())
	}
}

impl<T, S> OwnershipRegistry<T, S> {
	/// Creates an empty registry for any identity scheme.
	pub fn configured(options: RegistryOptions) -> Self {
		Self {
			options,
			entries: RefCell::new(FxHashMap::default()),
			traversals: Cell::new(0),
			interrupted: Cell::new(None),
			_scheme: PhantomData,
		}
	}

	pub fn options(&self) -> &RegistryOptions {
		&self.options
	}

	/// Returns the number of registered entries.
	pub fn len(&self) -> usize {
		self.entries().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, identity: Identity) -> bool {
		self.entries().contains_key(&identity)
	}

	/// Returns all registered identities in ascending order.
	pub fn identities(&self) -> Vec<Identity> {
		let mut identities: Vec<_> = self.entries().keys().copied().collect();
		identities.sort_unstable();
		identities
	}

	/// Returns a non-owning view of the entry keyed by `identity`.
	pub fn lookup(&self, identity: Identity) -> Result<EntryRef<'_, T>, RegistryError> {
		Ref::filter_map(self.entries(), |entries| entries.get(&identity))
			.map_err(|_| RegistryError::NotFound(identity))
	}

	/// Commits a transfer whose identity was captured beforehand.
	///
	/// The captured identity becomes the key as-is. On failure the registry is unchanged and
	/// the pending transfer, resource included, comes back inside [`Rejected`].
	pub fn commit(&self, pending: PendingTransfer<T, S>) -> Result<Identity, Rejected<T, S>> {
		let identity = pending.identity();
		let mut entries = match self.entries_mut("register") {
			Ok(entries) => entries,
			Err(error) => return Err(Rejected::new(error, pending)),
		};

		match entries.entry(identity) {
			hash_map::Entry::Occupied(existing) => {
				tracing::warn!(
					registry = %self.options.name,
					%identity,
					existing = existing.get().label(),
					incoming = pending.label(),
					"duplicate identity rejected"
				);
				let error = RegistryError::DuplicateIdentity {
					identity,
					existing_label: existing.get().label().to_owned(),
				};
				Err(Rejected::new(error, pending))
			}
			hash_map::Entry::Vacant(slot) => {
				let (identity, resource, label) = pending.into_parts();
				let label = self.options.derive_label(&label);
				tracing::debug!(registry = %self.options.name, %identity, %label, "registered");
				slot.insert(Entry::new(identity, resource, label));
				Ok(identity)
			}
		}
	}

	/// Removes the entry keyed by `identity` and returns its resource.
	pub fn remove(&self, identity: Identity) -> Result<Box<T>, RegistryError> {
		self.remove_entry(identity).map(Entry::into_resource)
	}

	/// Removes the entry keyed by `identity` and returns the whole record.
	pub fn remove_entry(&self, identity: Identity) -> Result<Entry<T>, RegistryError> {
		let entry = self
			.entries_mut("remove")?
			.remove(&identity)
			.ok_or(RegistryError::NotFound(identity))?;
		tracing::debug!(registry = %self.options.name, %identity, "removed");
		Ok(entry)
	}

	/// Visits every entry, stopping at the first error the visitor returns.
	///
	/// The entries stay borrowed for the whole traversal: `register`, `commit`, `remove` and
	/// `remove_where` called from the visitor fail with
	/// [`RegistryError::ConcurrentModification`]. Lookups are allowed. A refused change ends
	/// the traversal after the current visit, even if the visitor discards the error.
	pub fn try_for_each<E, F>(&self, mut visit: F) -> Result<(), E>
	where
		E: From<RegistryError>,
		F: FnMut(&Entry<T>) -> Result<(), E>,
	{
		let entries = self.entries();
		let _traversal = Traversal::begin(&self.traversals, &self.interrupted);
		for entry in entries.values() {
			visit(entry)?;
			if let Some(operation) = self.interrupted.get() {
				return Err(RegistryError::ConcurrentModification { operation }.into());
			}
		}
		Ok(())
	}

	/// Visits every entry. See [`Self::try_for_each`] for what the visitor may do.
	///
	/// Fails with [`RegistryError::ConcurrentModification`] if the visitor attempted a
	/// structural change; no entries are visited after that attempt.
	pub fn for_each<F>(&self, mut visit: F) -> Result<(), RegistryError>
	where
		F: FnMut(&Entry<T>),
	{
		self.try_for_each(|entry| {
			visit(entry);
			Ok(())
		})
	}

	/// Removes every entry matching `predicate`.
	///
	/// Matches are collected during a read-only pass and removed once the pass has ended.
	/// Removed entries are returned in ascending identity order.
	pub fn remove_where<P>(&self, mut predicate: P) -> Result<Vec<Entry<T>>, RegistryError>
	where
		P: FnMut(&Entry<T>) -> bool,
	{
		let mut doomed = Vec::new();
		self.for_each(|entry| {
			if predicate(entry) {
				doomed.push(entry.identity());
			}
		})?;
		doomed.sort_unstable();

		let mut entries = self.entries_mut("remove_where")?;
		let removed: Vec<_> = doomed
			.into_iter()
			.filter_map(|identity| entries.remove(&identity))
			.collect();
		if !removed.is_empty() {
			tracing::debug!(registry = %self.options.name, count = removed.len(), "removed matching entries");
		}
		Ok(removed)
	}

	/// Returns `"{identity} {label}"` for every entry, in ascending identity order.
	pub fn report(&self) -> Vec<String> {
		let entries = self.entries();
		let mut rows: Vec<_> = entries.values().collect();
		rows.sort_unstable_by_key(|entry| entry.identity());
		rows.into_iter()
			.map(|entry| format!("{} {}", entry.identity(), entry.label()))
			.collect()
	}

	/// Shared borrow of the entries.
	///
	/// Cannot fail: mutable borrows are confined to a single method call and never span
	/// caller code.
	fn entries(&self) -> Ref<'_, FxHashMap<Identity, Entry<T>>> {
		self.entries.borrow()
	}

	fn entries_mut(
		&self,
		operation: &'static str,
	) -> Result<RefMut<'_, FxHashMap<Identity, Entry<T>>>, RegistryError> {
		self.entries.try_borrow_mut().map_err(|_| {
			if self.traversals.get() > 0 && self.interrupted.get().is_none() {
				self.interrupted.set(Some(operation));
			}
			tracing::warn!(registry = %self.options.name, operation, "structural change while entries are borrowed");
			RegistryError::ConcurrentModification { operation }
		})
	}
}

impl<T, S> OwnershipRegistry<T, S>
where
	S: IdentityScheme<T>,
{
	/// Registers the resource held by `handle` under `label`.
	///
	/// The identity is read while the handle still owns the resource; only then is the
	/// resource moved into a new entry. On success the handle is empty and the captured
	/// identity is returned. On failure the registry is unchanged and any resource taken
	/// from the handle is put back.
	pub fn register(
		&self,
		handle: &mut Owned<T>,
		label: impl Into<String>,
	) -> Result<Identity, RegistryError> {
		let pending = PendingTransfer::<T, S>::capture(handle, label).inspect_err(|_| {
			tracing::warn!(registry = %self.options.name, "registration with an empty handle");
		})?;
		self.commit(pending).map_err(|rejected| {
			let (error, pending) = rejected.into_parts();
			handle.restore(pending.into_resource());
			error
		})
	}

	/// Registers an unwrapped resource. The resource comes back inside [`Rejected`] on failure.
	pub fn register_boxed(
		&self,
		resource: Box<T>,
		label: impl Into<String>,
	) -> Result<Identity, Rejected<T, S>> {
		self.commit(PendingTransfer::from_boxed(resource, label))
	}

	/// Checks that every stored key still resolves to the resource it was captured from.
	pub fn verify(&self) -> Result<(), RegistryError> {
		let entries = self.entries();
		let mut keys: Vec<_> = entries.keys().copied().collect();
		keys.sort_unstable();
		for key in keys {
			let entry = &entries[&key];
			let actual = S::identity(entry.resource());
			if entry.identity() != key {
				return Err(RegistryError::StaleIdentity {
					key,
					actual: entry.identity(),
				});
			}
			if actual != key {
				return Err(RegistryError::StaleIdentity { key, actual });
			}
		}
		Ok(())
	}
}

/// Marks an enumeration as running until dropped.
struct Traversal<'a> {
	depth: &'a Cell<u32>,
	interrupted: &'a Cell<Option<&'static str>>,
}

impl<'a> Traversal<'a> {
	fn begin(depth: &'a Cell<u32>, interrupted: &'a Cell<Option<&'static str>>) -> Self {
		depth.set(depth.get() + 1);
		Self { depth, interrupted }
	}
}

impl Drop for Traversal<'_> {
	fn drop(&mut self) {
		let depth = self.depth.get() - 1;
		self.depth.set(depth);
		if depth == 0 {
			self.interrupted.set(None);
		}
	}
}

impl<T, S> Drop for OwnershipRegistry<T, S> {
	fn drop(&mut self) {
		let released = self.entries.get_mut().len();
		if released > 0 {
			tracing::debug!(registry = %self.options.name, released, "releasing registered resources");
		}
	}
}

impl<T, S> fmt::Debug for OwnershipRegistry<T, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OwnershipRegistry")
			.field("name", &self.options.name)
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}
