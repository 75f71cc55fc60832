use crate::charclass::{vim_word, vim_word_begin};
use crate::linebuf::{Echo, LineBuf};
use crate::tests::{DELETE, LEFT, RIGHT};
use pretty_assertions::assert_eq;

fn buf(line: &[u8], pos: usize) -> LineBuf {
	LineBuf::new(Echo::default()).with_initial(line, pos)
}

#[test]
fn delete_clamps_at_line_start() {
	let mut b = buf(b"abc", 1);
	assert_eq!(b.delete(5), DELETE);
	assert_eq!(b.line(), b"bc");
	assert_eq!(b.pos(), 0);
	// nothing left of the cursor, nothing emitted
	assert_eq!(b.delete(1), b"");
	assert_eq!(b.line(), b"bc");
}

#[test]
fn moves_clamp_and_echo_actual_distance() {
	let mut b = buf(b"abc", 1);
	assert_eq!(b.move_left(5), LEFT);
	assert_eq!(b.pos(), 0);
	assert_eq!(b.move_right(5), RIGHT.repeat(3));
	assert_eq!(b.pos(), 3);
}

#[test]
fn insert_echoes_the_bytes_themselves() {
	let mut b = buf(b"ad", 1);
	assert_eq!(b.insert(b"bc"), b"bc");
	assert_eq!(b.line(), b"abcd");
	assert_eq!(b.pos(), 3);
}

#[test]
fn chunk_ops_jump_whole_runs() {
	let mut b = buf(b"foo bar", 7);
	assert_eq!(b.move_left_by_chunk(), LEFT.repeat(3));
	assert_eq!(b.pos(), 4);
	assert_eq!(b.move_right_by_chunk(), RIGHT.repeat(3));
	assert_eq!(b.pos(), 7);

	let mut b = buf(b"foo bar", 7);
	assert_eq!(b.delete_by_chunk(), DELETE.repeat(3));
	assert_eq!(b.line(), b"foo ");
}

#[test]
fn vim_moves_clamp_sentinels() {
	// no next word: the len sentinel walks to the end
	let mut b = buf(b"word", 1);
	assert_eq!(b.move_vim(vim_word, false), RIGHT.repeat(3));
	assert_eq!(b.pos(), 4);
	// no previous word start: the -1 sentinel walks to the start
	let mut b = buf(b"   x", 1);
	assert_eq!(b.move_vim(vim_word_begin, false), LEFT);
	assert_eq!(b.pos(), 0);
	// cursor at the end: nothing to classify, no-op
	let mut b = buf(b"ab", 2);
	assert_eq!(b.move_vim(vim_word, false), b"");
}

#[test]
fn replace_line_erases_then_types() {
	let mut b = buf(b"old", 1);
	let out = b.replace_line(b"newer");
	let mut expected = RIGHT.repeat(2);
	expected.extend(DELETE.repeat(3));
	expected.extend_from_slice(b"newer");
	assert_eq!(out, expected);
	assert_eq!(b.line(), b"newer");
	assert_eq!(b.pos(), 5);
}
