#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Ownership registry container.
//!
//! # Purpose
//!
//! Holds boxed resources keyed by an [`crate::Identity`] that was captured before the
//! resource changed hands, and returns them on removal or destroys them on teardown.
//!
//! # Concurrency
//!
//! - Single-threaded. Entries live in a `RefCell`, so the registry is `Send` when `T: Send`
//!   but never `Sync`. Share it across threads behind an external lock.
//! - Structural changes made while entries are borrowed fail with
//!   [`crate::RegistryError::ConcurrentModification`] instead of panicking.
//!
//! # Invariants
//!
//! - Every stored key equals the identity its resource had before transfer.
//!   - Enforced in: [`crate::PendingTransfer::capture`], [`registry::OwnershipRegistry::commit`].
//!   - Tested by: [`invariants::test_identity_captured_before_transfer`]
//!   - Failure symptom: lookups by the returned identity miss, or resolve to a different resource.
//!
//! - Every stored key resolves to a live resource.
//!   - Enforced in: [`registry::OwnershipRegistry::commit`] (keys are only written alongside their entry).
//!   - Tested by: [`invariants::test_keys_resolve_to_live_resources`]
//!   - Failure symptom: enumeration yields an entry with no resource behind it.
//!
//! - Each resource is destroyed exactly once, by the registry only while it owns it.
//!   - Enforced in: `Drop for OwnershipRegistry`, [`registry::OwnershipRegistry::remove`].
//!   - Tested by: [`invariants::test_exactly_once_destruction`]
//!   - Failure symptom: double free or leaked resource.
//!
//! - A rejected registration leaves the registry unchanged.
//!   - Enforced in: [`registry::OwnershipRegistry::commit`].
//!   - Tested by: [`invariants::test_rejection_leaves_registry_unchanged`]
//!   - Failure symptom: existing entry overwritten or the incoming resource lost.
//!
//! - Enumeration never observes a structural change, and a refused change ends it.
//!   - Enforced in: [`registry::OwnershipRegistry::try_for_each`] (holds the shared borrow and
//!     stops once a change was refused).
//!   - Tested by: [`invariants::test_enumeration_rejects_mutation`]
//!   - Failure symptom: entries skipped or visited twice.

mod registry;

pub use registry::OwnershipRegistry;

#[cfg(any(test, doc))]
pub(crate) mod invariants;

#[cfg(test)]
mod tests;
