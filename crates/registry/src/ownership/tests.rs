use std::cell::Cell;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{
	ByHandle, Identity, Owned, OwnershipRegistry, PendingTransfer, RegistryError, RegistryOptions,
	StableHandle,
};

#[derive(Debug, PartialEq, Eq)]
struct Object {
	id: u64,
	data: i32,
}

impl StableHandle for Object {
	fn stable_handle(&self) -> u64 {
		self.id
	}
}

fn object(id: u64, data: i32) -> Owned<Object> {
	Owned::new(Object { id, data })
}

fn handle_registry() -> OwnershipRegistry<Object, ByHandle> {
	OwnershipRegistry::default()
}

/// Register, enumerate, remove, then probe the freed identity.
#[test]
fn test_register_enumerate_remove_scenario() {
	let registry = handle_registry();
	let mut a = object(0x1, 42);

	let identity = registry.register(&mut a, "first").unwrap();
	assert_eq!(identity, Identity::from_raw(0x1));
	assert_eq!(registry.len(), 1);

	let mut visited = Vec::new();
	registry
		.for_each(|entry| visited.push((entry.identity(), entry.label().to_owned())))
		.unwrap();
	assert_eq!(visited, vec![(Identity::from_raw(0x1), "added from first".to_owned())]);

	let resource = registry.remove(identity).unwrap();
	assert_eq!(*resource, Object { id: 0x1, data: 42 });
	assert_eq!(registry.len(), 0);
	assert!(matches!(
		registry.lookup(identity),
		Err(RegistryError::NotFound(id)) if id == identity
	));
}

#[test]
fn test_round_trip_by_address() {
	let registry: OwnershipRegistry<String> = OwnershipRegistry::new();
	let mut handle = Owned::new("hello".to_owned());

	let identity = registry.register(&mut handle, "L").unwrap();
	assert!(handle.is_empty());
	assert!(registry.contains(identity));

	let resource = registry.remove(identity).unwrap();
	assert_eq!(*resource, "hello");
	assert!(!registry.contains(identity));
	assert_eq!(registry.remove(identity).unwrap_err(), RegistryError::NotFound(identity));
}

#[test]
fn test_empty_handle_is_invalid() {
	let registry: OwnershipRegistry<u8> = OwnershipRegistry::new();
	let mut handle = Owned::empty();
	assert_eq!(
		registry.register(&mut handle, "nothing"),
		Err(RegistryError::InvalidResource)
	);

	let mut consumed = Owned::new(1);
	registry.register(&mut consumed, "once").unwrap();
	assert_eq!(
		registry.register(&mut consumed, "twice"),
		Err(RegistryError::InvalidResource)
	);
	assert_eq!(registry.len(), 1);
}

/// Zero-sized resources have no storage of their own, so address identities collide.
#[test]
fn test_zero_sized_resources_collide_by_address() {
	#[derive(Debug, PartialEq)]
	struct Marker;

	let registry: OwnershipRegistry<Marker> = OwnershipRegistry::new();
	let first = registry.register(&mut Owned::new(Marker), "a").unwrap();

	let mut second = Owned::new(Marker);
	let err = registry.register(&mut second, "b").unwrap_err();
	assert_eq!(
		err,
		RegistryError::DuplicateIdentity {
			identity: first,
			existing_label: "added from a".to_owned(),
		}
	);
	assert!(!second.is_empty());
	assert_eq!(registry.len(), 1);
}

#[test]
fn test_commit_returns_resource_on_rejection() {
	let registry = handle_registry();
	registry.register(&mut object(5, 1), "kept").unwrap();

	let pending = PendingTransfer::<Object, ByHandle>::from_boxed(
		Box::new(Object { id: 5, data: 2 }),
		"dropped?",
	);
	let rejected = registry.commit(pending).unwrap_err();
	assert!(matches!(rejected.error(), RegistryError::DuplicateIdentity { .. }));
	assert_eq!(rejected.pending().label(), "dropped?");
	assert_eq!(rejected.into_resource().data, 2);
	assert_eq!(registry.lookup(Identity::from_raw(5)).unwrap().resource().data, 1);
}

#[test]
fn test_capture_then_commit() {
	let registry = handle_registry();
	let mut handle = object(9, 3);

	let pending = PendingTransfer::<Object, ByHandle>::capture(&mut handle, "split").unwrap();
	assert!(handle.is_empty());
	assert_eq!(pending.identity(), Identity::from_raw(9));

	assert_eq!(registry.commit(pending).unwrap(), Identity::from_raw(9));
	assert_eq!(
		registry.lookup(Identity::from_raw(9)).unwrap().label(),
		"added from split"
	);
}

#[test]
fn test_register_boxed() {
	let registry: OwnershipRegistry<i64> = OwnershipRegistry::new();
	let boxed = Box::new(-7);
	let expected = Identity::of_address(&*boxed);

	let identity = registry.register_boxed(boxed, "boxed").unwrap();
	assert_eq!(identity, expected);
	assert_eq!(*registry.lookup(identity).unwrap().resource(), -7);
}

#[test]
fn test_label_prefix_from_options() {
	let registry: OwnershipRegistry<u8> = OwnershipRegistry::with_options(RegistryOptions {
		name: "custom".to_owned(),
		label_prefix: "via ".to_owned(),
	});
	let identity = registry.register(&mut Owned::new(0), "cli").unwrap();
	assert_eq!(registry.lookup(identity).unwrap().label(), "via cli");
	assert_eq!(registry.options().name, "custom");
}

#[test]
fn test_lookup_view_blocks_structural_change() {
	let registry = handle_registry();
	registry.register(&mut object(1, 10), "a").unwrap();

	let view = registry.lookup(Identity::from_raw(1)).unwrap();
	assert_eq!(
		registry.remove(Identity::from_raw(1)).unwrap_err(),
		RegistryError::ConcurrentModification { operation: "remove" }
	);
	drop(view);

	assert!(registry.remove(Identity::from_raw(1)).is_ok());
}

#[test]
fn test_lookup_inside_enumeration_is_allowed() {
	let registry = handle_registry();
	for id in 1..=3 {
		registry.register(&mut object(id, id as i32), "x").unwrap();
	}

	let mut sum = 0;
	registry.for_each(|entry| {
		sum += registry.lookup(entry.identity()).unwrap().resource().data;
	})
	.unwrap();
	assert_eq!(sum, 6);
}

#[test]
fn test_remove_where_is_two_phase() {
	let registry = handle_registry();
	for id in 1..=6 {
		registry.register(&mut object(id, id as i32 * 10), "n").unwrap();
	}

	let removed = registry.remove_where(|entry| entry.resource().data % 20 == 0).unwrap();
	let removed_ids: Vec<_> = removed.iter().map(|entry| entry.identity().as_u64()).collect();
	assert_eq!(removed_ids, vec![2, 4, 6]);
	assert_eq!(
		registry.identities(),
		vec![Identity::from_raw(1), Identity::from_raw(3), Identity::from_raw(5)]
	);
	registry.verify().unwrap();
}

#[test]
fn test_remove_where_inside_enumeration_fails() {
	let registry = handle_registry();
	registry.register(&mut object(1, 1), "a").unwrap();

	let result = registry.for_each(|_| {
		assert!(matches!(
			registry.remove_where(|_| true),
			Err(RegistryError::ConcurrentModification { operation: "remove_where" })
		));
	});
	assert_eq!(
		result,
		Err(RegistryError::ConcurrentModification { operation: "remove_where" })
	);
	assert_eq!(registry.len(), 1);
}

/// A refused removal ends `for_each` even though the visitor ignores the error.
#[test]
fn test_refused_remove_ends_for_each() {
	let registry = handle_registry();
	for id in 1..=4 {
		registry.register(&mut object(id, 0), "n").unwrap();
	}

	let mut visits = 0;
	let mut refused = 0;
	let result = registry.for_each(|entry| {
		visits += 1;
		if registry.remove(entry.identity()).is_err() {
			refused += 1;
		}
	});

	assert_eq!(
		result,
		Err(RegistryError::ConcurrentModification { operation: "remove" })
	);
	assert_eq!((visits, refused), (1, 1));
	assert_eq!(registry.len(), 4);

	// The interruption does not leak into the next enumeration.
	let mut visits = 0;
	registry.for_each(|_| visits += 1).unwrap();
	assert_eq!(visits, 4);
}

/// A visitor that swallows the error still cannot keep `try_for_each` going.
#[test]
fn test_refused_register_ends_try_for_each() {
	let registry = handle_registry();
	for id in 1..=3 {
		registry.register(&mut object(id, 0), "n").unwrap();
	}

	let mut late = object(9, 0);
	let mut visits = 0;
	let result: Result<(), RegistryError> = registry.try_for_each(|_| {
		visits += 1;
		let _ = registry.register(&mut late, "late");
		Ok(())
	});

	assert_eq!(
		result,
		Err(RegistryError::ConcurrentModification { operation: "register" })
	);
	assert_eq!(visits, 1);
	assert!(!late.is_empty());
	assert_eq!(registry.len(), 3);
}

#[test]
fn test_report_is_sorted() {
	let registry = handle_registry();
	registry.register(&mut object(0x20, 0), "second").unwrap();
	registry.register(&mut object(0x3, 0), "first").unwrap();

	assert_eq!(
		registry.report(),
		vec!["0x3 added from first".to_owned(), "0x20 added from second".to_owned()]
	);
}

struct Drifting {
	handle: Cell<u64>,
}

impl StableHandle for Drifting {
	fn stable_handle(&self) -> u64 {
		self.handle.get()
	}
}

#[test]
fn test_verify_detects_drifted_handle() {
	let registry: OwnershipRegistry<Drifting, ByHandle> = OwnershipRegistry::default();
	let identity = registry
		.register(&mut Owned::new(Drifting { handle: Cell::new(4) }), "d")
		.unwrap();
	registry.verify().unwrap();

	registry.lookup(identity).unwrap().resource().handle.set(8);
	assert_eq!(
		registry.verify(),
		Err(RegistryError::StaleIdentity {
			key: identity,
			actual: Identity::from_raw(8),
		})
	);
}

#[test]
fn test_removed_resource_can_be_registered_again() {
	let registry: OwnershipRegistry<u32> = OwnershipRegistry::new();
	let identity = registry.register(&mut Owned::new(3), "once").unwrap();
	let resource = registry.remove(identity).unwrap();

	let again = registry.register(&mut Owned::from(resource), "twice").unwrap();
	assert_eq!(again, identity, "the allocation did not move");
	assert_eq!(registry.lookup(again).unwrap().label(), "added from twice");
}

proptest! {
	#[test]
	fn registered_values_stay_resolvable(
		values in prop::collection::vec(any::<i64>(), 1..32),
		remove_mask in prop::collection::vec(any::<bool>(), 32),
	) {
		let registry: OwnershipRegistry<i64> = OwnershipRegistry::new();
		let mut registered = Vec::new();
		for (i, value) in values.iter().enumerate() {
			let identity = registry.register(&mut Owned::new(*value), format!("v{i}")).unwrap();
			registered.push((identity, *value));
		}
		prop_assert_eq!(registry.len(), values.len());

		let mut kept = Vec::new();
		for ((identity, value), remove) in registered.into_iter().zip(remove_mask) {
			if remove {
				prop_assert_eq!(*registry.remove(identity).unwrap(), value);
				prop_assert!(registry.lookup(identity).is_err());
			} else {
				kept.push((identity, value));
			}
		}

		for (identity, value) in &kept {
			prop_assert_eq!(*registry.lookup(*identity).unwrap().resource(), *value);
		}
		prop_assert_eq!(registry.len(), kept.len());
		prop_assert!(registry.verify().is_ok());
	}
}
