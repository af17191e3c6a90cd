/// Caller-side owning handle that may be empty.
///
/// Registration takes the resource out of the handle, leaving it empty. A rejected
/// registration through [`crate::OwnershipRegistry::register`] puts the resource back.
#[derive(Debug)]
pub struct Owned<T> {
	slot: Option<Box<T>>,
}

impl<T> Owned<T> {
	pub fn new(value: T) -> Self {
		Self {
			slot: Some(Box::new(value)),
		}
	}

	pub fn empty() -> Self {
		Self { slot: None }
	}

	pub fn is_empty(&self) -> bool {
		self.slot.is_none()
	}

	pub fn get(&self) -> Option<&T> {
		self.slot.as_deref()
	}

	pub fn take(&mut self) -> Option<Box<T>> {
		self.slot.take()
	}

	pub fn into_inner(self) -> Option<Box<T>> {
		self.slot
	}

	pub(crate) fn restore(&mut self, resource: Box<T>) {
		debug_assert!(self.slot.is_none(), "restoring into a full handle");
		self.slot = Some(resource);
	}
}

impl<T> Default for Owned<T> {
	fn default() -> Self {
		Self::empty()
	}
}

impl<T> From<Box<T>> for Owned<T> {
	fn from(resource: Box<T>) -> Self {
		Self {
			slot: Some(resource),
		}
	}
}
