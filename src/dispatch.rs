//! The per-keystroke pipeline.
//!
//! `InputFilter::filter` is the input hook handed to the PTY bridge: raw bytes
//! from the user's terminal in, bytes for the host shell out. Handlers are
//! checked in a fixed priority order; the first one whose mode and key match
//! wins. `OutputFilter::filter` is the matching hook for the other direction,
//! and only patches a style reset in front of the shell prompt.

use log::{debug, trace};

use crate::actions::Op;
use crate::charclass::{vim_pair, vim_word, vim_word_begin, vim_word_end};
use crate::editor::{self, Editor, Mode};
use crate::history::History;
use crate::keys::{ESCAPE_SEQUENCE, Keymap};
use crate::linebuf::{Echo, LineBuf};

/// New input lines render red on the local terminal.
const INPUT_COLOR: &[u8] = b"\x1b[31m";
/// Reinserted in front of the shell prompt by the output filter.
const STYLE_RESET: &[u8] = b"\x1b[0m";

/// Printable in the sense the insert handler cares about: no ASCII controls,
/// no tab. Multi-byte sequences pass as a unit.
fn is_printable(key: &[u8]) -> bool {
	!key.is_empty() && key.iter().all(|&b| (0x20..0x7f).contains(&b) || b >= 0x80)
}

/// `%` adapted to the classifier motion signature.
fn pair_motion(content: &[u8], pos: usize, _capital: bool) -> isize {
	vim_pair(content, pos) as isize
}

pub struct InputFilter {
	keymap: Keymap,
	pub line: LineBuf,
	pub editor: Editor,
	pub history: History,
}

impl InputFilter {
	pub fn new(keymap: Keymap, history: History) -> Self {
		let echo = Echo::from_keymap(&keymap);
		let mut filter = Self {
			keymap,
			line: LineBuf::new(echo),
			editor: Editor::new(),
			history,
		};
		filter.reset_line();
		filter
	}

	/// The input hook: one chunk of terminal input in, host-shell bytes out.
	pub fn filter(&mut self, key: &[u8]) -> Vec<u8> {
		debug!("recv ({:>2}) {:?}", key.len(), String::from_utf8_lossy(key));

		let mode = self.editor.mode();
		let mut out = self.dispatch(key, mode);

		// In Normal mode the cursor may not rest past the last character
		if self.editor.mode() == Mode::Normal && self.line.pos() == self.line.len() {
			out.extend(self.line.move_left(1));
		}

		let snapshot = self.line.line().to_vec();
		self.history.set_buffer(&snapshot);

		debug!("send ({:>2}) {:?}", out.len(), String::from_utf8_lossy(&out));
		trace!(
			"line: {:?}|{:?}",
			String::from_utf8_lossy(&snapshot[..self.line.pos()]),
			String::from_utf8_lossy(&snapshot[self.line.pos()..])
		);
		out
	}

	fn dispatch(&mut self, key: &[u8], mode: Mode) -> Vec<u8> {
		// Reserved detach sequence passes through untouched, any mode
		if key == ESCAPE_SEQUENCE {
			return key.to_vec();
		}

		if key == self.keymap.escape {
			if mode == Mode::Insert {
				self.editor.set_normal();
				return self.line.move_left(1);
			}
			self.editor.set_normal();
			return vec![];
		}

		if mode == Mode::Insert && is_printable(key) && key != b"\r" && key != b"\n" {
			return self.line.insert(key);
		}

		if matches!(mode, Mode::Insert | Mode::Replace) && key == self.keymap.delete {
			return self.line.delete(1);
		}

		if mode == Mode::Insert && key == self.keymap.option_delete {
			return self.line.delete_by_chunk();
		}

		if key == self.keymap.up || key == self.keymap.down {
			self.history.skip_buffers();
			let entry = if key == self.keymap.up {
				self.history.go_prev()
			} else {
				self.history.go_next()
			};
			return self.line.replace_line(&entry);
		}

		if mode == Mode::Insert && key == self.keymap.sig_bell {
			return vec![];
		}

		if key == self.keymap.left {
			return self.line.move_left(1);
		}
		if key == self.keymap.right {
			return self.line.move_right(1);
		}
		if mode == Mode::Insert && key == self.keymap.option_left {
			return self.line.move_left_by_chunk();
		}
		if mode == Mode::Insert && key == self.keymap.option_right {
			return self.line.move_right_by_chunk();
		}

		if mode == Mode::Insert && self.is_line_end(key) {
			self.reset_line();
			return self.keymap.enter.clone();
		}

		if mode == Mode::Normal && !self.editor.has_pending_action() && Self::is_nav_key(key) {
			return self.vim_navigate(key[0]);
		}

		if mode == Mode::Normal && self.is_line_end(key) && !self.editor.has_pending_arg() {
			self.reset_line();
			return self.keymap.enter.clone();
		}

		if mode == Mode::Normal
			&& (is_printable(key)
				|| (self.editor.has_pending_arg() && key == b"\r")
				|| (!self.editor.has_pending_action() && key == self.keymap.ctrl_r))
		{
			return self.vim_action(key);
		}

		if mode == Mode::Replace && (is_printable(key) || key == b"\r") {
			if key == b"\r" || key == b"\n" {
				self.reset_line();
				return self.keymap.enter.clone();
			}
			if self.line.pos() == self.line.len() {
				return self.line.insert(key);
			}
			let mut out = self.line.move_right(1);
			out.extend(self.line.delete(1));
			out.extend(self.line.insert(key));
			return out;
		}

		debug!("unhandled key {:?} in mode {mode:?}", String::from_utf8_lossy(key));
		vec![]
	}

	fn is_line_end(&self, key: &[u8]) -> bool {
		key == b"\r" || key == b"\n" || key == b"\r\n" || key == self.keymap.sig_int
	}

	fn is_nav_key(key: &[u8]) -> bool {
		key.len() == 1 && b"hjklbwBWeE0$G%".contains(&key[0])
	}

	/// Submit the current line: style the next one, clear the model, and fold
	/// the scratch into the history.
	fn reset_line(&mut self) {
		editor::write_local(INPUT_COLOR);
		self.line.clear();
		self.history.ingest();
		self.editor.set_insert();
	}

	fn vim_navigate(&mut self, key: u8) -> Vec<u8> {
		self.history.skip_buffers();
		match key {
			b'k' => {
				let entry = self.history.go_prev();
				self.line.replace_line(&entry)
			}
			b'j' => {
				let entry = self.history.go_next();
				self.line.replace_line(&entry)
			}
			b'G' => {
				let entry = self.history.retrieve_buffer();
				self.line.replace_line(&entry)
			}
			b'h' => self.line.move_left(1),
			b'l' => self.line.move_right(1),
			b'0' => {
				let count = self.line.pos();
				self.line.move_left(count)
			}
			b'$' => {
				let count = self.line.len() - self.line.pos();
				self.line.move_right(count)
			}
			b'w' => self.line.move_vim(vim_word, false),
			b'W' => self.line.move_vim(vim_word, true),
			b'b' => self.line.move_vim(vim_word_begin, false),
			b'B' => self.line.move_vim(vim_word_begin, true),
			b'e' => self.line.move_vim(vim_word_end, false),
			b'E' => self.line.move_vim(vim_word_end, true),
			b'%' => self.line.move_vim(pair_motion, false),
			_ => vec![],
		}
	}

	fn vim_action(&mut self, key: &[u8]) -> Vec<u8> {
		let snapshot = self.line.line().to_vec();
		let pos = self.line.pos();
		let Some(ops) = self
			.editor
			.feed_normal(key, &snapshot, pos, &mut self.history)
		else {
			self.history.skip_buffers();
			return vec![];
		};
		self.apply_ops(ops)
	}

	/// Replay an edit plan against the line buffer, collecting the echo.
	fn apply_ops(&mut self, ops: Vec<Op>) -> Vec<u8> {
		let mut out = vec![];
		for op in ops {
			match op {
				Op::Left => out.extend(self.line.move_left(1)),
				Op::Right => out.extend(self.line.move_right(1)),
				Op::Delete => out.extend(self.line.delete(1)),
				Op::Insert(bytes) => {
					if is_printable(&bytes) {
						out.extend(self.line.insert(&bytes));
					}
				}
			}
		}
		out
	}
}

/// The downstream hook: ensures the shell prompt renders unstyled even when
/// the input line left a color active.
#[derive(Default)]
pub struct OutputFilter;

impl OutputFilter {
	pub fn new() -> Self {
		Self
	}

	pub fn filter(&mut self, content: &[u8]) -> Vec<u8> {
		trace!("shell ({:>4}) {:?}", content.len(), String::from_utf8_lossy(content));
		if !content.ends_with(b">") {
			return content.to_vec();
		}
		let Some(last_break) = content
			.windows(2)
			.rposition(|pair| pair == b"\r\n")
		else {
			return content.to_vec();
		};
		if content[last_break..].contains(&b'<') {
			return content.to_vec();
		}
		let mut patched = content[..last_break].to_vec();
		patched.extend_from_slice(STYLE_RESET);
		patched.extend_from_slice(&content[last_break..]);
		patched
	}
}
