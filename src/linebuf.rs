//! The live command line: a byte buffer, a cursor, and the echo protocol.
//!
//! Every mutation returns the byte sequence that keeps the remote terminal's
//! rendering in sync with the model. The host shell never sees our cursor; it
//! only sees the same arrows, deletes, and literal bytes a human would send.

use crate::charclass::{chunk_leftmost, chunk_rightmost};
use crate::keys::Keymap;

/// The three echo primitives, resolved from the keymap at startup.
#[derive(Clone, Debug)]
pub struct Echo {
	pub left: Vec<u8>,
	pub right: Vec<u8>,
	pub delete: Vec<u8>,
}

impl Echo {
	pub fn from_keymap(keymap: &Keymap) -> Self {
		Self {
			left: keymap.left.clone(),
			right: keymap.right.clone(),
			delete: keymap.delete.clone(),
		}
	}
	fn repeat(seq: &[u8], n: usize) -> Vec<u8> {
		seq.repeat(n)
	}
}

impl Default for Echo {
	fn default() -> Self {
		Self::from_keymap(&Keymap::default())
	}
}

/// A classifier motion: `(content, pos, capital) -> target`, with the usual
/// `-1`/`len` sentinels for "no target".
pub type MotionFn = fn(&[u8], usize, bool) -> isize;

#[derive(Default, Debug)]
pub struct LineBuf {
	line: Vec<u8>,
	pos: usize,
	echo: Echo,
}

impl LineBuf {
	pub fn new(echo: Echo) -> Self {
		Self { line: vec![], pos: 0, echo }
	}

	pub fn with_initial(mut self, line: &[u8], pos: usize) -> Self {
		assert!(pos <= line.len());
		self.line = line.to_vec();
		self.pos = pos;
		self
	}

	pub fn line(&self) -> &[u8] {
		&self.line
	}

	pub fn pos(&self) -> usize {
		self.pos
	}

	pub fn len(&self) -> usize {
		self.line.len()
	}

	pub fn is_empty(&self) -> bool {
		self.line.is_empty()
	}

	/// Remove up to `n` bytes left of the cursor.
	pub fn delete(&mut self, n: usize) -> Vec<u8> {
		let actual = n.min(self.pos);
		self.line.drain(self.pos - actual..self.pos);
		self.pos -= actual;
		Echo::repeat(&self.echo.delete, actual)
	}

	/// Remove from the cursor back to the start of the chunk left of it.
	pub fn delete_by_chunk(&mut self) -> Vec<u8> {
		let target = chunk_leftmost(&self.line, self.pos);
		self.delete(self.pos - target)
	}

	pub fn move_left(&mut self, n: usize) -> Vec<u8> {
		let actual = n.min(self.pos);
		self.pos -= actual;
		Echo::repeat(&self.echo.left, actual)
	}

	pub fn move_right(&mut self, n: usize) -> Vec<u8> {
		let actual = n.min(self.line.len() - self.pos);
		self.pos += actual;
		Echo::repeat(&self.echo.right, actual)
	}

	/// Splice bytes in at the cursor and advance over them. The echo is the
	/// bytes themselves; the remote terminal renders them and advances its own
	/// cursor.
	pub fn insert(&mut self, bytes: &[u8]) -> Vec<u8> {
		self.line.splice(self.pos..self.pos, bytes.iter().copied());
		self.pos += bytes.len();
		bytes.to_vec()
	}

	pub fn move_left_by_chunk(&mut self) -> Vec<u8> {
		let target = chunk_leftmost(&self.line, self.pos);
		self.move_left(self.pos - target)
	}

	pub fn move_right_by_chunk(&mut self) -> Vec<u8> {
		let target = chunk_rightmost(&self.line, self.pos);
		self.move_right(target - self.pos)
	}

	/// Apply a classifier motion and echo the difference.
	///
	/// Sentinel targets clamp: `-1` walks to the line start, `len` to the end.
	pub fn move_vim(&mut self, motion: MotionFn, capital: bool) -> Vec<u8> {
		if self.pos >= self.line.len() {
			return vec![];
		}
		let target = motion(&self.line, self.pos, capital);
		let diff = target - self.pos as isize;
		if diff > 0 {
			self.move_right(diff as usize)
		} else {
			self.move_left(diff.unsigned_abs())
		}
	}

	/// Swap the whole line for a history entry: walk the remote cursor to the
	/// end, erase everything, then type out the replacement.
	pub fn replace_line(&mut self, new: &[u8]) -> Vec<u8> {
		let mut out = Echo::repeat(&self.echo.right, self.line.len() - self.pos);
		out.extend(Echo::repeat(&self.echo.delete, self.line.len()));
		out.extend_from_slice(new);
		self.line = new.to_vec();
		self.pos = new.len();
		out
	}

	pub fn clear(&mut self) {
		self.line.clear();
		self.pos = 0;
	}
}
