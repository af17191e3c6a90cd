//! Identity-keyed ownership registry.
//!
//! The registry owns boxed resources and indexes them by an [`Identity`] derived from each
//! resource before ownership moves into the registry.
//!
//! # Mental Model
//!
//! 1. **Capture:** [`PendingTransfer::capture`] reads the identity of a resource while the
//!    caller still owns it, then takes the resource out of the caller's [`Owned`] handle.
//! 2. **Commit:** [`OwnershipRegistry::commit`] accepts only a pending transfer, so the key
//!    written into the map is always the captured value and never a fresh read.
//! 3. **Release:** [`OwnershipRegistry::remove`] hands the resource back; dropping the
//!    registry destroys everything still registered.
//!
//! [`OwnershipRegistry::register`] performs capture and commit in one call.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`OwnershipRegistry`] | Owns entries keyed by identity. |
//! | [`Owned`] | Caller-side nullable handle to a boxed resource. |
//! | [`PendingTransfer`] | Identity, resource and label between capture and commit. |
//! | [`Entry`] | Registered record: identity, label, owned resource. |
//! | [`IdentityScheme`] | How an identity is derived ([`ByAddress`], [`ByHandle`]). |

mod entry;
mod error;
mod handle;
mod identity;
mod options;
mod ownership;
mod pending;

pub use entry::{Entry, EntryRef};
pub use error::{Rejected, RegistryError};
pub use handle::Owned;
pub use identity::{ByAddress, ByHandle, Identity, IdentityScheme, StableHandle};
pub use options::RegistryOptions;
pub use ownership::OwnershipRegistry;
pub use pending::PendingTransfer;
