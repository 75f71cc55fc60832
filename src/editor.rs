//! The modal controller: which mode we are in, which command bytes are still
//! pending, and the undo/redo/repeat bookkeeping that actions run against.
//!
//! The controller never touches the line buffer. It turns key bytes into edit
//! plans and applies side-ops against itself and the history store; replaying
//! the plan is the dispatcher's job.

use std::io::{self, Write as IoWrite};

use log::warn;

use crate::actions::{self, ActionCtx, ActionKind, ActionOutput, Op, SideOp, Snapshot};
use crate::clipboard::Clipboard;
use crate::history::History;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Normal,
	Insert,
	Replace,
}

const CURSOR_BLOCK: &[u8] = b"\x1b[2 q";
const CURSOR_BAR: &[u8] = b"\x1b[5 q";
const CURSOR_UNDERLINE: &[u8] = b"\x1b[3 q";

/// Write an escape to the user's own terminal. Cursor shapes and input colors
/// style the local side; they must never reach the host shell.
pub(crate) fn write_local(seq: &[u8]) {
	let mut stdout = io::stdout();
	stdout.write_all(seq).ok();
	stdout.flush().ok();
}

pub struct Editor {
	mode: Mode,
	/// The parsed prefix of a partially-typed command, plus its raw bytes so
	/// the next key can try to extend it (`d` -> `di`).
	pending: Option<ActionKind>,
	pending_seq: Vec<u8>,
	/// Accumulated bytes of a variadic argument (`/pattern`).
	arg_buf: Vec<u8>,

	clipboard: Clipboard,
	undo_stack: Vec<Snapshot>,
	redo_stack: Vec<Snapshot>,
	repeat: Option<(ActionKind, Option<Vec<u8>>)>,
	search_forward: bool,
}

impl Editor {
	pub fn new() -> Self {
		Self {
			mode: Mode::Insert,
			pending: None,
			pending_seq: vec![],
			arg_buf: vec![],
			clipboard: Clipboard::new(),
			undo_stack: vec![],
			redo_stack: vec![],
			repeat: None,
			search_forward: true,
		}
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn clipboard(&self) -> &Clipboard {
		&self.clipboard
	}

	pub fn has_pending_action(&self) -> bool {
		self.pending.is_some()
	}

	pub fn has_pending_arg(&self) -> bool {
		!self.arg_buf.is_empty()
	}

	fn reset_buffers(&mut self) {
		self.pending = None;
		self.pending_seq.clear();
		self.arg_buf.clear();
	}

	/// Entering Normal afresh invalidates the redo stack.
	pub fn set_normal(&mut self) {
		if self.mode != Mode::Normal {
			self.redo_stack.clear();
		}
		self.mode = Mode::Normal;
		self.reset_buffers();
		write_local(CURSOR_BLOCK);
	}

	pub fn set_insert(&mut self) {
		self.mode = Mode::Insert;
		self.reset_buffers();
		write_local(CURSOR_BAR);
	}

	pub fn set_replace(&mut self) {
		self.mode = Mode::Replace;
		self.reset_buffers();
		write_local(CURSOR_UNDERLINE);
	}

	/// Feed one Normal-mode key into the command assembly machine.
	///
	/// Returns `None` while a command is still incomplete (the keystroke
	/// produces no output), and the finished edit plan once one fires. An
	/// out-of-grammar byte resets the accumulators and yields `None`.
	pub fn feed_normal(
		&mut self,
		key: &[u8],
		line: &[u8],
		pos: usize,
		history: &mut History,
	) -> Option<Vec<Op>> {
		if key.len() != 1 {
			self.reset_buffers();
			return None;
		}

		let Some(kind) = self.pending else {
			let Some(kind) = ActionKind::parse(key) else {
				self.reset_buffers();
				return None;
			};
			self.pending = Some(kind);
			self.pending_seq = key.to_vec();
			if kind.spec().n_args == 0 {
				let out = self.run(kind, None, line, pos);
				return Some(self.post_process(history, out));
			}
			return None;
		};

		let spec = kind.spec();
		if spec.n_args == -1 {
			self.arg_buf.extend_from_slice(key);
			if spec.terminators.contains(&key[0]) {
				let arg = std::mem::take(&mut self.arg_buf);
				let out = self.run(kind, Some(&arg), line, pos);
				return Some(self.post_process(history, out));
			}
			return None;
		}

		// See whether the pending prefix plus this key names a longer command
		let mut extended = self.pending_seq.clone();
		extended.extend_from_slice(key);
		if let Some(longer) = ActionKind::parse(&extended) {
			self.pending = Some(longer);
			self.pending_seq = extended;
			if longer.spec().n_args == 0 {
				let out = self.run(longer, None, line, pos);
				return Some(self.post_process(history, out));
			}
			return None;
		}

		// No longer command exists, so this key is the pending one's argument
		let out = self.run(kind, Some(key), line, pos);
		Some(self.post_process(history, out))
	}

	fn run(&mut self, kind: ActionKind, arg: Option<&[u8]>, line: &[u8], pos: usize) -> ActionOutput {
		let mut ctx = ActionCtx {
			clipboard: &self.clipboard,
			undo_stack: &mut self.undo_stack,
			redo_stack: &mut self.redo_stack,
			repeat: &mut self.repeat,
			search_forward: self.search_forward,
		};
		actions::act(kind, arg, line, pos, &mut ctx)
	}

	/// Apply each side-op against the controller and history, letting them
	/// rewrite the edit plan, then reset the accumulators.
	///
	/// A failed history navigation clears the plan so the typed line is not
	/// erased for nothing.
	pub fn post_process(&mut self, history: &mut History, output: ActionOutput) -> Vec<Op> {
		let (mut ops, sops) = output;
		for sop in sops {
			match sop {
				SideOp::SetInsert => self.set_insert(),
				SideOp::SetReplace => self.set_replace(),
				SideOp::CopyClipboard(content) => {
					if !content.is_empty() {
						self.clipboard.copy(&content);
					}
				}
				SideOp::StartSearch { forward, pattern } => {
					self.search_forward = forward;
					if let Err(e) = history.start_search(&pattern) {
						warn!("bad search pattern '{pattern}': {e}");
					}
				}
				SideOp::NavigateSearch { forward } => {
					let hit = if forward {
						history.search_next()
					} else {
						history.search_prev()
					};
					history.skip_buffers();
					match hit {
						Some((entry, _)) if !entry.is_empty() => ops.push(Op::Insert(entry)),
						_ => ops.clear(),
					}
				}
				SideOp::SetMark(mark) => {
					history.skip_buffers();
					history.set_mark(mark);
				}
				SideOp::RetrieveMark(mark) => {
					let entry = history.retrieve_mark(mark);
					history.skip_buffers();
					if !entry.is_empty() {
						ops.push(Op::Insert(entry));
					}
				}
			}
		}
		self.reset_buffers();
		ops
	}
}

impl Default for Editor {
	fn default() -> Self {
		Self::new()
	}
}
