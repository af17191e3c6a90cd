//! Stable identities and the schemes that derive them.

use std::fmt;

/// Stable key denoting one registered resource.
///
/// Displays as lowercase hex with a `0x` prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(u64);

impl Identity {
	/// Builds an identity from a known raw value, e.g. for probing lookups.
	#[inline]
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	#[inline]
	pub const fn as_u64(self) -> u64 {
		self.0
	}

	/// Identity of the storage `resource` currently occupies.
	#[inline]
	pub fn of_address<T: ?Sized>(resource: &T) -> Self {
		Self((resource as *const T).cast::<()>() as usize as u64)
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// Derives the identity of a resource.
///
/// Implementations must return the same value for the same resource for as long as it lives
/// behind its `Box`. The registry relies on this to keep stored keys resolvable.
pub trait IdentityScheme<T: ?Sized> {
	fn identity(resource: &T) -> Identity;
}

/// Keys resources by their heap address.
///
/// Moving a `Box<T>` leaves the pointee in place, so the address read before a transfer is
/// still the address afterwards. Zero-sized resources have no storage and all share one
/// dangling address; registering two of them collides.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByAddress;

impl<T: ?Sized> IdentityScheme<T> for ByAddress {
	#[inline]
	fn identity(resource: &T) -> Identity {
		Identity::of_address(resource)
	}
}

/// A handle fixed when the resource was constructed.
pub trait StableHandle {
	fn stable_handle(&self) -> u64;
}

/// Keys resources by [`StableHandle::stable_handle`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ByHandle;

impl<T: StableHandle + ?Sized> IdentityScheme<T> for ByHandle {
	#[inline]
	fn identity(resource: &T) -> Identity {
		Identity::from_raw(resource.stable_handle())
	}
}
