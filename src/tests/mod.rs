use crate::dispatch::InputFilter;
use crate::history::History;
use crate::keys::Keymap;

pub mod linebuf;
pub mod history;
pub mod dispatch;

// Echo bytes of the default keymap, for asserting on filter output.
pub const LEFT: &[u8] = b"\x1b[D";
pub const RIGHT: &[u8] = b"\x1b[C";
pub const DELETE: &[u8] = b"\x7f";
pub const ESC: &[u8] = b"\x1b";
pub const UP: &[u8] = b"\x1b[A";
pub const DOWN: &[u8] = b"\x1b[B";
pub const ENTER: &[u8] = b"\r";
pub const CTRL_R: &[u8] = b"\x12";

/// A filter with builtin key bindings and a fresh, file-less history.
pub fn test_filter() -> InputFilter {
	InputFilter::new(Keymap::default(), History::open(None))
}

/// Feed each chunk as one keystroke, collecting all output.
pub fn feed(filter: &mut InputFilter, keys: &[&[u8]]) -> Vec<u8> {
	let mut out = vec![];
	for key in keys {
		out.extend(filter.filter(key));
	}
	out
}

/// Type each byte of `text` as its own keystroke.
pub fn type_text(filter: &mut InputFilter, text: &str) -> Vec<u8> {
	let mut out = vec![];
	for b in text.bytes() {
		out.extend(filter.filter(&[b]));
	}
	out
}

/// Submit each line through insert mode, seeding the history.
pub fn seed_history(filter: &mut InputFilter, lines: &[&str]) {
	for line in lines {
		type_text(filter, line);
		filter.filter(b"\r");
	}
}
