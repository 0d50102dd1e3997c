use crate::RenderFailure;

/// Single-slot synchronous handoff between the section parser and the
/// formatter. At most one value is in flight.
#[derive(Debug)]
pub struct Handoff<T> {
	slot: Option<T>,
}

impl<T> Default for Handoff<T> {
	fn default() -> Self {
		Self { slot: None }
	}
}

impl<T> Handoff<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Place a value into the empty slot. Fails when the previous value has
	/// not been taken yet.
	pub fn put(&mut self, value: T) -> Result<(), RenderFailure> {
		if self.slot.is_some() {
			return Err(RenderFailure::HandoffOccupied);
		}

		self.slot = Some(value);
		Ok(())
	}

	pub fn take(&mut self) -> Option<T> {
		self.slot.take()
	}

	pub fn is_empty(&self) -> bool {
		self.slot.is_none()
	}
}
