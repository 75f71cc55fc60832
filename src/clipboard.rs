//! The single-slot clipboard shared by the delete/change/yank family and `p`/`P`.

/// One unnamed register. Copy replaces the contents wholesale.
#[derive(Default, Debug)]
pub struct Clipboard {
	content: Vec<u8>,
}

impl Clipboard {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn copy(&mut self, value: &[u8]) {
		self.content = value.to_vec();
	}
	/// Returns the stored bytes, or an empty slice if nothing was ever copied.
	pub fn paste(&self) -> &[u8] {
		&self.content
	}
	pub fn clear(&mut self) {
		self.content.clear();
	}
}
