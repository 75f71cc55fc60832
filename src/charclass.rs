//! Byte classification and motion primitives.
//!
//! Everything in here is pure. The rest of the editor funnels cursor math through
//! these functions, so their boundary behavior is load-bearing: the `-1` and
//! `len` sentinels returned by the word/find scans flow directly into the
//! delete-count arithmetic in `actions`.

/// Categories of bytes as seen by the vim-style word motions.
///
/// With `capital` set (the `W`/`B`/`E` family), the partition collapses to
/// whitespace vs everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
	Whitespace,
	Word,
	Punct,
	NonWhite,
}

impl CharClass {
	pub fn of(byte: u8, capital: bool) -> Self {
		if capital {
			return if byte == b' ' || byte == b'\t' {
				Self::Whitespace
			} else {
				Self::NonWhite
			};
		}
		match byte {
			b' ' | b'\t' | b'\n' => Self::Whitespace,
			b'_' => Self::Word,
			b if b.is_ascii_alphanumeric() => Self::Word,
			b if b.is_ascii_punctuation() => Self::Punct,
			// Multi-byte printables ride with the word class
			b if b >= 0x80 => Self::Word,
			b => panic!("unclassifiable byte {b:#04x}"),
		}
	}
}

/// Categories used by the chunk motions (Option-Left/Right, chunk backspace).
///
/// Unlike `CharClass`, underscore counts as punctuation here and there is no
/// capital variant. A byte outside all three classes is its own chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkClass {
	Whitespace,
	Alnum,
	Punct,
}

impl ChunkClass {
	fn of(byte: u8) -> Option<Self> {
		match byte {
			b' ' | b'\t' | b'\n' => Some(Self::Whitespace),
			b if b.is_ascii_alphanumeric() => Some(Self::Alnum),
			b if b.is_ascii_punctuation() => Some(Self::Punct),
			_ => None,
		}
	}
}

/// Leftmost index of the chunk containing the byte left of the cursor.
///
/// An unclassifiable byte forms a chunk of itself.
pub fn chunk_leftmost(content: &[u8], pos: usize) -> usize {
	assert!(pos <= content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	if content.is_empty() || pos == 0 {
		return 0;
	}
	let Some(chunk) = ChunkClass::of(content[pos - 1]) else {
		return pos - 1;
	};
	let mut start = pos - 1;
	while start > 0 && ChunkClass::of(content[start - 1]) == Some(chunk) {
		start -= 1;
	}
	start
}

/// One past the rightmost index of the chunk containing the byte right of the cursor.
pub fn chunk_rightmost(content: &[u8], pos: usize) -> usize {
	assert!(pos <= content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	if content.is_empty() || pos == content.len() {
		return content.len();
	}
	let Some(chunk) = ChunkClass::of(content[pos]) else {
		return pos + 1;
	};
	let mut end = pos;
	while end + 1 < content.len() && ChunkClass::of(content[end + 1]) == Some(chunk) {
		end += 1;
	}
	end + 1
}

/// Emulates `w`/`W`: index of the next word start, or `len` if there is none.
///
/// Note that this lands on the next class *transition* that isn't whitespace,
/// which means a delete over it eats trailing whitespace along with the word.
/// Vim proper doesn't do that. We keep the behavior.
pub fn vim_word(content: &[u8], pos: usize, capital: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	let mut grp = CharClass::of(content[pos], capital);
	let mut p = pos;
	loop {
		p += 1;
		if p == content.len() {
			return content.len() as isize;
		}
		let newgrp = CharClass::of(content[p], capital);
		if grp != newgrp && newgrp != CharClass::Whitespace {
			return p as isize;
		}
		grp = newgrp;
	}
}

/// Emulates `e`/`E`: index of the next word end, or `len` if there is none.
///
/// If the cursor sits on whitespace or already at a word end, advance into the
/// next word first.
pub fn vim_word_end(content: &[u8], pos: usize, capital: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	let mut p = pos;
	let mut grp = CharClass::of(content[p], capital);
	let at_group_end = p == content.len() - 1 || CharClass::of(content[p + 1], capital) != grp;

	if grp == CharClass::Whitespace || at_group_end {
		let next = vim_word(content, p, capital);
		if next == content.len() as isize {
			return next;
		}
		p = next as usize;
		grp = CharClass::of(content[p], capital);
	}

	loop {
		p += 1;
		if p == content.len() {
			return (p - 1) as isize;
		}
		let newgrp = CharClass::of(content[p], capital);
		if newgrp != grp {
			return (p - 1) as isize;
		}
		grp = newgrp;
	}
}

/// Emulates `b`/`B`: index of the previous word start, or `-1` if there is none.
pub fn vim_word_begin(content: &[u8], pos: usize, capital: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	let mut p = pos as isize;
	let mut grp = CharClass::of(content[pos], capital);
	let mut at_group_begin = pos == 0 || CharClass::of(content[pos - 1], capital) != grp;

	// Walk into the word of interest if we start on whitespace or a word start
	while grp == CharClass::Whitespace || at_group_begin {
		p -= 1;
		at_group_begin = false;
		if p < 0 {
			return -1;
		}
		grp = CharClass::of(content[p as usize], capital);
	}

	loop {
		p -= 1;
		if p < 0 {
			return 0;
		}
		let newgrp = CharClass::of(content[p as usize], capital);
		if newgrp != grp {
			return p + 1;
		}
		grp = newgrp;
	}
}

/// The inclusive `(start, end)` of the run of same-class bytes containing `pos`.
pub fn vim_word_boundary(content: &[u8], pos: usize, capital: bool) -> (usize, usize) {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	let grp = CharClass::of(content[pos], capital);

	let mut end = pos;
	while end + 1 < content.len() && CharClass::of(content[end + 1], capital) == grp {
		end += 1;
	}
	let mut start = pos;
	while start > 0 && CharClass::of(content[start - 1], capital) == grp {
		start -= 1;
	}
	(start, end)
}

pub fn vim_line_begin(content: &[u8], pos: usize, _capital: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	0
}

pub fn vim_line_end(content: &[u8], pos: usize, _capital: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	content.len() as isize - 1
}

/// Emulates `f`/`F`: first occurrence of `ch` strictly after (or before) `pos`.
///
/// Returns `len` (forward) or `-1` (backward) when `ch` does not occur.
pub fn vim_find(content: &[u8], pos: usize, ch: u8, backward: bool) -> isize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	if backward {
		content[..pos]
			.iter()
			.rposition(|&b| b == ch)
			.map(|i| i as isize)
			.unwrap_or(-1)
	} else {
		content[pos + 1..]
			.iter()
			.position(|&b| b == ch)
			.map(|i| (pos + 1 + i) as isize)
			.unwrap_or(content.len() as isize)
	}
}

/// Emulates `t`/`T`: the `vim_find` target shifted one step back toward the cursor.
pub fn vim_till(content: &[u8], pos: usize, ch: u8, backward: bool) -> isize {
	let found = vim_find(content, pos, ch, backward);
	if found >= 0 && (found as usize) < content.len() {
		if backward { found + 1 } else { found - 1 }
	} else {
		found
	}
}

/// Emulates `%`: the matching bracket for the byte under the cursor.
///
/// Returns `pos` unchanged when the byte is not a bracket or has no match.
pub fn vim_pair(content: &[u8], pos: usize) -> usize {
	assert!(pos < content.len(), "invalid cursor position {pos} for buffer of length {}", content.len());
	let (close, forward) = match content[pos] {
		b'(' => (b')', true),
		b'[' => (b']', true),
		b'{' => (b'}', true),
		b'<' => (b'>', true),
		b')' => (b'(', false),
		b']' => (b'[', false),
		b'}' => (b'{', false),
		b'>' => (b'<', false),
		_ => return pos,
	};
	let open = content[pos];

	let mut depth = 0usize;
	if forward {
		for i in pos..content.len() {
			let b = content[i];
			if b == open {
				depth += 1;
			} else if b == close {
				depth -= 1;
			}
			if depth == 0 {
				return i;
			}
		}
	} else {
		for i in (0..=pos).rev() {
			let b = content[i];
			if b == open {
				depth += 1;
			} else if b == close {
				depth -= 1;
			}
			if depth == 0 {
				return i;
			}
		}
	}
	pos
}
