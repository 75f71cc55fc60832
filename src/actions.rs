//! The vim command catalog.
//!
//! Every command is an `ActionKind` plus a transform from `(argument, line,
//! cursor)` to an edit plan. The plan has two halves: `Op`s, which the
//! dispatcher replays against the line buffer, and `SideOp`s, which the
//! controller applies against itself and the history store. Keeping the
//! transforms pure (modulo the shared `ActionCtx` bookkeeping) is what makes
//! undo, redo, and the dot command cheap: they replay plans, not keystrokes.
//!
//! The change and yank families are not written out by hand. Each one wraps
//! the matching delete transform: change appends a switch to insert mode, and
//! yank keeps the clipboard side effect while discarding the edits.

use bitflags::bitflags;

use crate::charclass::{
	vim_find, vim_line_begin, vim_line_end, vim_till, vim_word, vim_word_begin,
	vim_word_boundary, vim_word_end,
};
use crate::clipboard::Clipboard;
use crate::linebuf::MotionFn;

/// An edit primitive, replayed against the line buffer one at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
	Left,
	Right,
	Delete,
	Insert(Vec<u8>),
}

/// A controller directive emitted alongside the edit plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideOp {
	SetInsert,
	SetReplace,
	CopyClipboard(Vec<u8>),
	StartSearch { forward: bool, pattern: String },
	NavigateSearch { forward: bool },
	SetMark(char),
	RetrieveMark(char),
}

pub type ActionOutput = (Vec<Op>, Vec<SideOp>);

/// A `(line, cursor)` pair as captured for undo and redo.
pub type Snapshot = (Vec<u8>, usize);

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct ActionFlags: u8 {
		/// The dot command may replay this action.
		const REPEATABLE = 1 << 0;
		/// Running this action snapshots the pre-action state.
		const UNDOABLE = 1 << 1;
		/// Running this action leaves the redo stack intact.
		const PRESERVE_REDO = 1 << 2;
	}
}

/// Arity and bookkeeping flags for one command.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
	/// `0` fires immediately, `1` consumes the next byte, `-1` accumulates
	/// until a terminator.
	pub n_args: i8,
	pub flags: ActionFlags,
	/// Bytes that end a variadic argument. Only meaningful when `n_args == -1`.
	pub terminators: &'static [u8],
}

/// The command alphabet. Prefix-coded: `d` is a command, and so is `di`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
	Find,
	Till,
	FindBack,
	TillBack,

	Delete,
	DeleteIn,
	DeleteTill,
	DeleteTillBack,
	DeleteFind,
	DeleteFindBack,
	DeleteChar,

	Change,
	ChangeIn,
	ChangeTill,
	ChangeTillBack,
	ChangeFind,
	ChangeFindBack,
	SubstChar,

	Yank,
	YankIn,
	YankTill,
	YankTillBack,
	YankFind,
	YankFindBack,

	Insert,
	InsertAtStart,
	Append,
	AppendAtEnd,

	PasteAfter,
	PasteBefore,

	ReplaceChar,
	ReplaceMode,
	ToggleCase,

	SearchForward,
	SearchBackward,
	SearchNext,
	SearchPrev,

	Repeat,
	Undo,
	Redo,

	SetMark,
	RetrieveMark,
}

impl ActionKind {
	/// Look up the command named by an exact byte sequence.
	///
	/// Returns `None` both for garbage and for sequences that are only a
	/// prefix of something longer; the controller handles the difference by
	/// re-parsing as bytes accumulate.
	pub fn parse(seq: &[u8]) -> Option<Self> {
		let kind = match seq {
			b"f" => Self::Find,
			b"t" => Self::Till,
			b"F" => Self::FindBack,
			b"T" => Self::TillBack,

			b"d" => Self::Delete,
			b"di" => Self::DeleteIn,
			b"dt" => Self::DeleteTill,
			b"dT" => Self::DeleteTillBack,
			b"df" => Self::DeleteFind,
			b"dF" => Self::DeleteFindBack,
			b"x" => Self::DeleteChar,

			b"c" => Self::Change,
			b"ci" => Self::ChangeIn,
			b"ct" => Self::ChangeTill,
			b"cT" => Self::ChangeTillBack,
			b"cf" => Self::ChangeFind,
			b"cF" => Self::ChangeFindBack,
			b"s" => Self::SubstChar,

			b"y" => Self::Yank,
			b"yi" => Self::YankIn,
			b"yt" => Self::YankTill,
			b"yT" => Self::YankTillBack,
			b"yf" => Self::YankFind,
			b"yF" => Self::YankFindBack,

			b"i" => Self::Insert,
			b"I" => Self::InsertAtStart,
			b"a" => Self::Append,
			b"A" => Self::AppendAtEnd,

			b"p" => Self::PasteAfter,
			b"P" => Self::PasteBefore,

			b"r" => Self::ReplaceChar,
			b"R" => Self::ReplaceMode,
			b"~" => Self::ToggleCase,

			b"/" => Self::SearchForward,
			b"?" => Self::SearchBackward,
			b"n" => Self::SearchNext,
			b"N" => Self::SearchPrev,

			b"." => Self::Repeat,
			b"u" => Self::Undo,
			b"\x12" => Self::Redo,

			b"m" => Self::SetMark,
			b"`" => Self::RetrieveMark,

			_ => return None,
		};
		Some(kind)
	}

	pub fn spec(self) -> ActionSpec {
		use ActionKind::*;
		let default = ActionFlags::REPEATABLE | ActionFlags::UNDOABLE;
		match self {
			Find | Till | FindBack | TillBack | Delete | DeleteIn | DeleteTill
			| DeleteTillBack | DeleteFind | DeleteFindBack | Change | ChangeIn
			| ChangeTill | ChangeTillBack | ChangeFind | ChangeFindBack | Yank
			| YankIn | YankTill | YankTillBack | YankFind | YankFindBack
			| ReplaceChar | SetMark | RetrieveMark => ActionSpec {
				n_args: 1,
				flags: default,
				terminators: b"",
			},
			DeleteChar | SubstChar | Insert | InsertAtStart | Append
			| AppendAtEnd | PasteAfter | PasteBefore | ReplaceMode | ToggleCase
			| SearchNext | SearchPrev => ActionSpec {
				n_args: 0,
				flags: default,
				terminators: b"",
			},
			SearchForward | SearchBackward => ActionSpec {
				n_args: -1,
				flags: default,
				terminators: b"\r",
			},
			Repeat => ActionSpec {
				n_args: 0,
				flags: ActionFlags::UNDOABLE | ActionFlags::PRESERVE_REDO,
				terminators: b"",
			},
			Undo => ActionSpec {
				n_args: 0,
				flags: ActionFlags::PRESERVE_REDO,
				terminators: b"",
			},
			Redo => ActionSpec {
				n_args: 0,
				flags: ActionFlags::UNDOABLE | ActionFlags::PRESERVE_REDO,
				terminators: b"",
			},
		}
	}
}

/// The session state actions read or update while running: the repeat slot,
/// the undo/redo stacks, the clipboard (read-only here; copies arrive as
/// side-ops), and the direction of the active history search.
pub struct ActionCtx<'a> {
	pub clipboard: &'a Clipboard,
	pub undo_stack: &'a mut Vec<Snapshot>,
	pub redo_stack: &'a mut Vec<Snapshot>,
	pub repeat: &'a mut Option<(ActionKind, Option<Vec<u8>>)>,
	pub search_forward: bool,
}

/// Run one complete command: record the repeat slot, snapshot for undo, clear
/// the redo stack unless preserved, then produce the edit plan.
pub fn act(
	kind: ActionKind,
	arg: Option<&[u8]>,
	line: &[u8],
	pos: usize,
	ctx: &mut ActionCtx<'_>,
) -> ActionOutput {
	let spec = kind.spec();
	if spec.flags.contains(ActionFlags::REPEATABLE) {
		*ctx.repeat = Some((kind, arg.map(|a| a.to_vec())));
	}
	if spec.flags.contains(ActionFlags::UNDOABLE) {
		let snap = (line.to_vec(), pos);
		if ctx.undo_stack.last() != Some(&snap) {
			ctx.undo_stack.push(snap);
		}
	}
	if !spec.flags.contains(ActionFlags::PRESERVE_REDO) {
		ctx.redo_stack.clear();
	}
	on_act(kind, arg, line, pos, ctx)
}

fn on_act(
	kind: ActionKind,
	arg: Option<&[u8]>,
	line: &[u8],
	pos: usize,
	ctx: &mut ActionCtx<'_>,
) -> ActionOutput {
	use ActionKind::*;
	match kind {
		Find => char_motion(arg, line, pos, false, false),
		Till => char_motion(arg, line, pos, true, false),
		FindBack => char_motion(arg, line, pos, false, true),
		TillBack => char_motion(arg, line, pos, true, true),

		Delete => delete_motion(arg, line, pos, b'd'),
		DeleteIn => delete_in(arg, line, pos),
		DeleteTill => delete_to_char(arg, line, pos, true, false),
		DeleteTillBack => delete_to_char(arg, line, pos, true, true),
		DeleteFind => delete_to_char(arg, line, pos, false, false),
		DeleteFindBack => delete_to_char(arg, line, pos, false, true),
		DeleteChar => delete_one(line, pos),

		Change => wrap_as_change(delete_motion(arg, line, pos, b'c')),
		ChangeIn => wrap_as_change(delete_in(arg, line, pos)),
		ChangeTill => wrap_as_change(delete_to_char(arg, line, pos, true, false)),
		ChangeTillBack => wrap_as_change(delete_to_char(arg, line, pos, true, true)),
		ChangeFind => wrap_as_change(delete_to_char(arg, line, pos, false, false)),
		ChangeFindBack => wrap_as_change(delete_to_char(arg, line, pos, false, true)),
		SubstChar => wrap_as_change(delete_one(line, pos)),

		Yank => wrap_as_yank(delete_motion(arg, line, pos, b'y')),
		YankIn => wrap_as_yank(delete_in(arg, line, pos)),
		YankTill => wrap_as_yank(delete_to_char(arg, line, pos, true, false)),
		YankTillBack => wrap_as_yank(delete_to_char(arg, line, pos, true, true)),
		YankFind => wrap_as_yank(delete_to_char(arg, line, pos, false, false)),
		YankFindBack => wrap_as_yank(delete_to_char(arg, line, pos, false, true)),

		Insert => (vec![], vec![SideOp::SetInsert]),
		InsertAtStart => (vec![Op::Left; pos], vec![SideOp::SetInsert]),
		Append => (vec![Op::Right], vec![SideOp::SetInsert]),
		AppendAtEnd => (vec![Op::Right; line.len() - pos], vec![SideOp::SetInsert]),

		PasteBefore => (vec![Op::Insert(ctx.clipboard.paste().to_vec())], vec![]),
		PasteAfter => (
			vec![
				Op::Right,
				Op::Insert(ctx.clipboard.paste().to_vec()),
				Op::Left,
			],
			vec![],
		),

		ReplaceChar => replace_char(arg, line, pos),
		ReplaceMode => (vec![], vec![SideOp::SetReplace]),
		ToggleCase => toggle_case(line, pos),

		SearchForward => start_search(arg, line, pos, true),
		SearchBackward => start_search(arg, line, pos, false),
		SearchNext => search_nav(line, pos, true, ctx),
		SearchPrev => search_nav(line, pos, false, ctx),

		Repeat => {
			let Some((last_kind, last_arg)) = ctx.repeat.clone() else {
				return (vec![], vec![]);
			};
			act(last_kind, last_arg.as_deref(), line, pos, ctx)
		}
		Undo => {
			let current = (line.to_vec(), pos);
			let Some((new_line, new_pos)) = ctx.undo_stack.pop() else {
				return (vec![], vec![]);
			};
			if ctx.redo_stack.last() != Some(&current) {
				ctx.redo_stack.push(current);
			}
			(swap_ops(line, pos, &new_line, new_pos), vec![])
		}
		Redo => {
			let Some((new_line, new_pos)) = ctx.redo_stack.pop() else {
				return (vec![], vec![]);
			};
			(swap_ops(line, pos, &new_line, new_pos), vec![])
		}

		SetMark => mark_op(arg, false),
		RetrieveMark => {
			let (ops, sops) = mark_op(arg, true);
			if sops.is_empty() {
				(ops, sops)
			} else {
				(delete_line_ops(line, pos), sops)
			}
		}
	}
}

/// Change is delete plus a switch to insert mode.
fn wrap_as_change((ops, mut sops): ActionOutput) -> ActionOutput {
	sops.push(SideOp::SetInsert);
	(ops, sops)
}

/// Yank is the clipboard side effect of delete, with the edits discarded.
fn wrap_as_yank((_ops, sops): ActionOutput) -> ActionOutput {
	(vec![], sops)
}

/// Walk the cursor to the end of the line, then erase all of it.
fn delete_line_ops(line: &[u8], pos: usize) -> Vec<Op> {
	let mut ops = vec![Op::Right; line.len() - pos];
	ops.extend(vec![Op::Delete; line.len()]);
	ops
}

/// Erase the current line and type out a replacement, leaving the cursor at
/// `new_pos`. The undo/redo plan shape.
fn swap_ops(line: &[u8], pos: usize, new_line: &[u8], new_pos: usize) -> Vec<Op> {
	let mut ops = delete_line_ops(line, pos);
	ops.push(Op::Insert(new_line.to_vec()));
	ops.extend(vec![Op::Left; new_line.len() - new_pos]);
	ops
}

/// Arguments to `r` must be printable and not a newline.
fn printable_arg(byte: u8) -> bool {
	byte == b' ' || byte == b'\t' || byte.is_ascii_graphic()
}

/// `f`/`t`/`F`/`T` as bare motions.
fn char_motion(arg: Option<&[u8]>, line: &[u8], pos: usize, till: bool, backward: bool) -> ActionOutput {
	let Some(&[ch]) = arg else {
		return (vec![], vec![]);
	};
	if line.is_empty() || pos >= line.len() {
		return (vec![], vec![]);
	}
	let target = if till {
		vim_till(line, pos, ch, backward)
	} else {
		vim_find(line, pos, ch, backward)
	};
	if target < 0 || target >= line.len() as isize {
		return (vec![], vec![]);
	}
	let target = target as usize;
	if backward {
		(vec![Op::Left; pos - target], vec![])
	} else {
		(vec![Op::Right; target - pos], vec![])
	}
}

/// The classifier motion behind each `d<m>` suffix: `(scan, capital, offset)`.
/// The offset turns inclusive ends (`e`, `$`) into exclusive delete targets.
fn motion_target(suffix: u8) -> Option<(MotionFn, bool, isize)> {
	match suffix {
		b'b' => Some((vim_word_begin, false, 0)),
		b'B' => Some((vim_word_begin, true, 0)),
		b'w' => Some((vim_word, false, 0)),
		b'W' => Some((vim_word, true, 0)),
		b'e' => Some((vim_word_end, false, 1)),
		b'E' => Some((vim_word_end, true, 1)),
		b'$' => Some((vim_line_end, false, 1)),
		b'0' => Some((vim_line_begin, false, 0)),
		_ => None,
	}
}

/// `d<m>` and, through the wrappers, `c<m>` and `y<m>`.
///
/// `double` is the byte that targets the whole line (`dd`/`cc`/`yy`).
/// Forward deletes walk right then delete back; backward deletes just delete.
fn delete_motion(arg: Option<&[u8]>, line: &[u8], pos: usize, double: u8) -> ActionOutput {
	let Some(&[suffix]) = arg else {
		return (vec![], vec![]);
	};
	if line.is_empty() || pos >= line.len() {
		return (vec![], vec![]);
	}

	if suffix == double {
		return (
			delete_line_ops(line, pos),
			vec![SideOp::CopyClipboard(line.to_vec())],
		);
	}

	let Some((scan, capital, offset)) = motion_target(suffix) else {
		return (vec![], vec![]);
	};
	let target = scan(line, pos, capital) + offset;
	let count = target.clamp(0, line.len() as isize) - pos as isize;
	if count > 0 {
		let count = count as usize;
		let mut ops = vec![Op::Right; count];
		ops.extend(vec![Op::Delete; count]);
		(ops, vec![SideOp::CopyClipboard(line[pos..pos + count].to_vec())])
	} else {
		let count = count.unsigned_abs();
		(
			vec![Op::Delete; count],
			vec![SideOp::CopyClipboard(line[pos - count..pos].to_vec())],
		)
	}
}

const IN_BETWEEN_PAIRS: [(u8, u8); 9] = [
	(b'(', b')'),
	(b'[', b']'),
	(b'{', b'}'),
	(b'<', b'>'),
	(b'`', b'`'),
	(b'\'', b'\''),
	(b'"', b'"'),
	(b',', b','),
	(b' ', b' '),
];

/// `di<x>`: `w`/`W` take the word under the cursor, anything else must name a
/// delimiter pair and takes the content strictly between the nearest pair.
fn delete_in(arg: Option<&[u8]>, line: &[u8], pos: usize) -> ActionOutput {
	let Some(&[obj]) = arg else {
		return (vec![], vec![]);
	};
	if line.is_empty() || pos >= line.len() {
		return (vec![], vec![]);
	}

	if obj == b'w' || obj == b'W' {
		let (begin, end) = vim_word_boundary(line, pos, obj == b'W');
		let mut ops = vec![Op::Right; end - pos + 1];
		ops.extend(vec![Op::Delete; end - begin + 1]);
		return (ops, vec![SideOp::CopyClipboard(line[begin..=end].to_vec())]);
	}

	let Some(&(open, close)) = IN_BETWEEN_PAIRS.iter().find(|(l, r)| obj == *l || obj == *r) else {
		return (vec![], vec![]);
	};
	let Some(left) = line[..pos + 1].iter().rposition(|&b| b == open) else {
		return (vec![], vec![]);
	};
	let Some(right) = line[pos..].iter().position(|&b| b == close).map(|i| i + pos) else {
		return (vec![], vec![]);
	};

	// A quote pair can collapse onto the cursor byte itself; nothing between.
	let clip = if right > left {
		line[left + 1..right].to_vec()
	} else {
		vec![]
	};
	let mut ops = vec![Op::Right; right - pos];
	ops.extend(vec![Op::Delete; right.saturating_sub(left + 1)]);
	(ops, vec![SideOp::CopyClipboard(clip)])
}

/// The `dt`/`dT`/`df`/`dF` family: delete through (or up to) a searched byte.
fn delete_to_char(arg: Option<&[u8]>, line: &[u8], pos: usize, till: bool, backward: bool) -> ActionOutput {
	let Some(&[ch]) = arg else {
		return (vec![], vec![]);
	};
	if line.is_empty() || pos >= line.len() {
		return (vec![], vec![]);
	}
	let target = if till {
		vim_till(line, pos, ch, backward)
	} else {
		vim_find(line, pos, ch, backward)
	};
	if target < 0 || target >= line.len() as isize {
		return (vec![], vec![]);
	}
	let target = target as usize;

	if backward {
		let count = pos - target + 1;
		let mut ops = vec![Op::Right];
		ops.extend(vec![Op::Delete; count]);
		(ops, vec![SideOp::CopyClipboard(line[target..=pos].to_vec())])
	} else {
		let count = target - pos + 1;
		let mut ops = vec![Op::Right; count];
		ops.extend(vec![Op::Delete; count]);
		(ops, vec![SideOp::CopyClipboard(line[pos..=target].to_vec())])
	}
}

/// `x`, and through the change wrapper, `s`.
fn delete_one(line: &[u8], pos: usize) -> ActionOutput {
	let clip = if pos < line.len() {
		line[pos..pos + 1].to_vec()
	} else {
		vec![]
	};
	(vec![Op::Right, Op::Delete], vec![SideOp::CopyClipboard(clip)])
}

fn replace_char(arg: Option<&[u8]>, _line: &[u8], _pos: usize) -> ActionOutput {
	let Some(&[ch]) = arg else {
		return (vec![], vec![]);
	};
	if !printable_arg(ch) || ch == b'\n' {
		return (vec![], vec![]);
	}
	(vec![Op::Right, Op::Delete, Op::Insert(vec![ch])], vec![])
}

fn toggle_case(line: &[u8], pos: usize) -> ActionOutput {
	if line.is_empty() || pos >= line.len() {
		return (vec![], vec![]);
	}
	let ch = line[pos];
	if !ch.is_ascii_alphabetic() {
		return (vec![], vec![]);
	}
	let swapped = if ch.is_ascii_lowercase() {
		ch.to_ascii_uppercase()
	} else {
		ch.to_ascii_lowercase()
	};
	(vec![Op::Right, Op::Delete, Op::Insert(vec![swapped])], vec![])
}

/// `/` and `?`: erase the line, start a history search, and jump to the first hit.
fn start_search(arg: Option<&[u8]>, line: &[u8], pos: usize, forward: bool) -> ActionOutput {
	let Some(arg) = arg else {
		return (vec![], vec![]);
	};
	let pattern = arg.strip_suffix(b"\r").unwrap_or(arg);
	let pattern = String::from_utf8_lossy(pattern).into_owned();
	(
		delete_line_ops(line, pos),
		vec![
			SideOp::StartSearch { forward, pattern },
			SideOp::NavigateSearch { forward },
		],
	)
}

/// `n` and `N`. The effective direction folds in the direction of the original
/// search, so `n` under a `?` search walks backward.
fn search_nav(line: &[u8], pos: usize, next: bool, ctx: &ActionCtx<'_>) -> ActionOutput {
	let forward = if next {
		ctx.search_forward
	} else {
		!ctx.search_forward
	};
	(
		delete_line_ops(line, pos),
		vec![SideOp::NavigateSearch { forward }],
	)
}

/// `m<x>` and `` `<x> ``: only ASCII letters name marks.
fn mark_op(arg: Option<&[u8]>, retrieve: bool) -> ActionOutput {
	let Some(&[ch]) = arg else {
		return (vec![], vec![]);
	};
	if !ch.is_ascii_alphabetic() {
		return (vec![], vec![]);
	}
	let sop = if retrieve {
		SideOp::RetrieveMark(ch as char)
	} else {
		SideOp::SetMark(ch as char)
	};
	(vec![], vec![sop])
}
