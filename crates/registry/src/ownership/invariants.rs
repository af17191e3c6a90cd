#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
	ByAddress, ByHandle, IdentityScheme, Owned, OwnershipRegistry, RegistryError, StableHandle,
};

struct Tracked {
	handle: u64,
	drops: Arc<AtomicUsize>,
}

impl StableHandle for Tracked {
	fn stable_handle(&self) -> u64 {
		self.handle
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		self.drops.fetch_add(1, Ordering::SeqCst);
	}
}

fn tracked(handle: u64, drops: &Arc<AtomicUsize>) -> Owned<Tracked> {
	Owned::new(Tracked {
		handle,
		drops: Arc::clone(drops),
	})
}

/// Invariant: the stored key is the identity the resource had before it changed hands.
pub(crate) fn inv_identity_captured_before_transfer() {
	let registry: OwnershipRegistry<String> = OwnershipRegistry::new();
	let mut handle = Owned::new("payload".to_owned());

	let before = ByAddress::identity(handle.get().unwrap());
	let identity = registry.register(&mut handle, "first").unwrap();

	assert_eq!(identity, before);
	assert!(handle.is_empty(), "caller handle must be consumed");
	assert_eq!(registry.lookup(before).unwrap().identity(), before);
	assert_eq!(ByAddress::identity(registry.lookup(before).unwrap().resource()), before);
}

#[cfg_attr(test, test)]
pub(crate) fn test_identity_captured_before_transfer() {
	inv_identity_captured_before_transfer()
}

/// Invariant: every stored key resolves to a live resource.
pub(crate) fn inv_keys_resolve_to_live_resources() {
	let registry: OwnershipRegistry<Vec<u8>> = OwnershipRegistry::new();
	for n in 0..16u8 {
		let mut handle = Owned::new(vec![n; n as usize + 1]);
		registry.register(&mut handle, format!("buf {n}")).unwrap();
	}

	let mut visited = 0;
	registry.for_each(|entry| {
		let resolved = registry.lookup(entry.identity()).unwrap();
		assert_eq!(resolved.resource(), entry.resource());
		visited += 1;
	})
	.unwrap();
	assert_eq!(visited, 16);
	registry.verify().unwrap();
}

#[cfg_attr(test, test)]
pub(crate) fn test_keys_resolve_to_live_resources() {
	inv_keys_resolve_to_live_resources()
}

/// Invariant: teardown destroys each still-registered resource exactly once, and removed
/// resources belong to the caller.
pub(crate) fn inv_exactly_once_destruction() {
	let drops = Arc::new(AtomicUsize::new(0));
	let registry: OwnershipRegistry<Tracked, ByHandle> = OwnershipRegistry::default();

	for handle in 1..=3 {
		registry.register(&mut tracked(handle, &drops), "t").unwrap();
	}
	let removed = registry.remove(crate::Identity::from_raw(2)).unwrap();
	assert_eq!(drops.load(Ordering::SeqCst), 0, "removal must not destroy the resource");

	drop(registry);
	assert_eq!(drops.load(Ordering::SeqCst), 2, "teardown destroys remaining entries once");

	drop(removed);
	assert_eq!(drops.load(Ordering::SeqCst), 3);
}

#[cfg_attr(test, test)]
pub(crate) fn test_exactly_once_destruction() {
	inv_exactly_once_destruction()
}

/// Invariant: a rejected registration changes nothing and loses nothing.
pub(crate) fn inv_rejection_leaves_registry_unchanged() {
	let drops = Arc::new(AtomicUsize::new(0));
	let registry: OwnershipRegistry<Tracked, ByHandle> = OwnershipRegistry::default();
	registry.register(&mut tracked(7, &drops), "original").unwrap();

	let mut intruder = tracked(7, &drops);
	let err = registry.register(&mut intruder, "intruder").unwrap_err();

	assert!(matches!(
		err,
		RegistryError::DuplicateIdentity { existing_label, .. } if existing_label == "added from original"
	));
	assert!(!intruder.is_empty(), "rejected resource goes back to the caller");
	assert_eq!(registry.len(), 1);
	assert_eq!(
		registry.lookup(crate::Identity::from_raw(7)).unwrap().label(),
		"added from original"
	);
	assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[cfg_attr(test, test)]
pub(crate) fn test_rejection_leaves_registry_unchanged() {
	inv_rejection_leaves_registry_unchanged()
}

/// Invariant: structural changes from inside an enumeration fail and change nothing.
pub(crate) fn inv_enumeration_rejects_mutation() {
	let registry: OwnershipRegistry<u32> = OwnershipRegistry::new();
	for n in 0..4 {
		registry.register(&mut Owned::new(n), "n").unwrap();
	}
	let before = registry.identities();

	let result: Result<(), RegistryError> = registry.try_for_each(|entry| {
		registry.remove(entry.identity())?;
		Ok(())
	});
	assert_eq!(
		result,
		Err(RegistryError::ConcurrentModification { operation: "remove" })
	);

	let mut late = Owned::new(99);
	let mut visits = 0;
	let result = registry.for_each(|_| {
		visits += 1;
		let err = registry.register(&mut late, "late").unwrap_err();
		assert_eq!(err, RegistryError::ConcurrentModification { operation: "register" });
	});
	assert_eq!(
		result,
		Err(RegistryError::ConcurrentModification { operation: "register" })
	);
	assert_eq!(visits, 1, "a refused change ends the enumeration");
	assert!(!late.is_empty());
	assert_eq!(registry.identities(), before);
}

#[cfg_attr(test, test)]
pub(crate) fn test_enumeration_rejects_mutation() {
	inv_enumeration_rejects_mutation()
}
