use crate::dispatch::OutputFilter;
use crate::editor::Mode;
use crate::tests::{CTRL_R, DELETE, DOWN, ENTER, ESC, LEFT, RIGHT, UP, feed, seed_history, test_filter, type_text};
use pretty_assertions::assert_eq;

#[test]
fn typing_echoes_and_tracks_cursor() {
	let mut f = test_filter();
	let out = type_text(&mut f, "abc");
	assert_eq!(out, b"abc");
	assert_eq!(f.editor.mode(), Mode::Insert);
	assert_eq!(f.line.line(), b"abc");
	assert_eq!(f.line.pos(), 3);
}

#[test]
fn escape_enters_normal_and_steps_left() {
	let mut f = test_filter();
	type_text(&mut f, "abc");
	let out = f.filter(ESC);
	assert_eq!(out, LEFT);
	assert_eq!(f.editor.mode(), Mode::Normal);
	assert_eq!(f.line.line(), b"abc");
	assert_eq!(f.line.pos(), 2);

	let out = f.filter(b"0");
	assert_eq!(out, [LEFT, LEFT].concat());
	assert_eq!(f.line.pos(), 0);
}

#[test]
fn delete_word_walks_then_deletes() {
	let mut f = test_filter();
	type_text(&mut f, "I'm p.name !");
	f.filter(ESC);
	f.filter(b"0");

	let out = feed(&mut f, &[b"d", b"w"]);
	assert_eq!(out, [RIGHT, DELETE].concat());
	assert_eq!(f.line.line(), b"'m p.name !");
	assert_eq!(f.line.pos(), 0);
	assert_eq!(f.editor.clipboard().paste(), b"I");
}

#[test]
fn delete_inside_parens() {
	let mut f = test_filter();
	type_text(&mut f, "(hey)");
	f.filter(ESC);
	f.filter(b"0");
	feed(&mut f, &[b"l", b"l"]);
	assert_eq!(f.line.pos(), 2);

	feed(&mut f, &[b"d", b"i", b"("]);
	assert_eq!(f.line.line(), b"()");
	assert_eq!(f.line.pos(), 1);
	assert_eq!(f.editor.clipboard().paste(), b"hey");
}

#[test]
fn whole_line_delete_and_paste() {
	let mut f = test_filter();
	type_text(&mut f, "hello world");
	f.filter(ESC);

	let out = feed(&mut f, &[b"d", b"d"]);
	let erased = DELETE.repeat(11);
	assert_eq!(out, [RIGHT, erased.as_slice()].concat());
	assert!(f.line.is_empty());
	assert_eq!(f.editor.clipboard().paste(), b"hello world");

	f.filter(b"p");
	assert_eq!(f.line.line(), b"hello world");
	assert_eq!(f.line.pos(), 10);
}

#[test]
fn change_enters_insert_mode() {
	let mut f = test_filter();
	type_text(&mut f, "word");
	f.filter(ESC);
	feed(&mut f, &[b"c", b"c"]);
	assert_eq!(f.line.line(), b"");
	assert_eq!(f.editor.mode(), Mode::Insert);
	assert_eq!(f.editor.clipboard().paste(), b"word");
}

#[test]
fn find_and_till_motions() {
	let mut f = test_filter();
	type_text(&mut f, "abcabc");
	f.filter(ESC);
	f.filter(b"0");

	let out = feed(&mut f, &[b"f", b"b"]);
	assert_eq!(out, RIGHT);
	assert_eq!(f.line.pos(), 1);

	feed(&mut f, &[b"f", b"c"]);
	assert_eq!(f.line.pos(), 2);

	let out = feed(&mut f, &[b"T", b"a"]);
	assert_eq!(out, LEFT);
	assert_eq!(f.line.pos(), 1);

	// no occurrence: cursor stays
	let out = feed(&mut f, &[b"f", b"z"]);
	assert_eq!(out, b"");
	assert_eq!(f.line.pos(), 1);
}

#[test]
fn toggle_case_at_cursor() {
	let mut f = test_filter();
	type_text(&mut f, "abc");
	f.filter(ESC);
	f.filter(b"0");
	f.filter(b"~");
	assert_eq!(f.line.line(), b"Abc");
	assert_eq!(f.line.pos(), 1);
}

#[test]
fn replace_single_char() {
	let mut f = test_filter();
	type_text(&mut f, "abc");
	f.filter(ESC);
	f.filter(b"0");
	feed(&mut f, &[b"r", b"z"]);
	assert_eq!(f.line.line(), b"zbc");
	assert_eq!(f.editor.mode(), Mode::Normal);
}

#[test]
fn replace_mode_overtypes_until_line_end() {
	let mut f = test_filter();
	type_text(&mut f, "abc");
	f.filter(ESC);
	f.filter(b"R");
	assert_eq!(f.editor.mode(), Mode::Replace);

	// overtype the 'c', then extend past the end
	let out = f.filter(b"X");
	assert_eq!(out, [RIGHT, DELETE, b"X"].concat());
	assert_eq!(f.line.line(), b"abX");
	let out = f.filter(b"Y");
	assert_eq!(out, b"Y");
	assert_eq!(f.line.line(), b"abXY");

	f.filter(ESC);
	assert_eq!(f.editor.mode(), Mode::Normal);
	assert_eq!(f.line.pos(), 3);
}

#[test]
fn normal_mode_cursor_never_rests_past_the_end() {
	let mut f = test_filter();
	type_text(&mut f, "abcd");
	f.filter(ESC);
	assert_eq!(f.line.pos(), 3);
	let out = f.filter(b"$");
	// $ walks to the end, the tail clamp pulls back onto the last char
	assert_eq!(out, [RIGHT, LEFT].concat());
	assert_eq!(f.line.pos(), 3);
}

#[test]
fn undo_and_redo_restore_line_and_cursor() {
	let mut f = test_filter();
	type_text(&mut f, "ab");
	f.filter(ESC);
	assert_eq!(f.line.pos(), 1);

	f.filter(b"x");
	assert_eq!(f.line.line(), b"a");
	assert_eq!(f.line.pos(), 0);

	f.filter(b"u");
	assert_eq!(f.line.line(), b"ab");
	assert_eq!(f.line.pos(), 1);

	f.filter(CTRL_R);
	assert_eq!(f.line.line(), b"a");
	assert_eq!(f.line.pos(), 0);
}

#[test]
fn dot_repeats_the_last_edit() {
	let mut f = test_filter();
	type_text(&mut f, "aaaa");
	f.filter(ESC);

	f.filter(b"x");
	assert_eq!(f.line.line(), b"aaa");
	f.filter(b".");
	assert_eq!(f.line.line(), b"aa");
	f.filter(b".");
	assert_eq!(f.line.line(), b"a");
}

#[test]
fn out_of_grammar_bytes_reset_quietly() {
	let mut f = test_filter();
	type_text(&mut f, "abc");
	f.filter(ESC);
	f.filter(b"0");

	let out = f.filter(b"q");
	assert_eq!(out, b"");

	// a half-typed command with a bogus motion fires as a no-op
	let out = feed(&mut f, &[b"d", b"q"]);
	assert_eq!(out, b"");
	assert_eq!(f.line.line(), b"abc");

	// and the machine is clean afterwards
	f.filter(b"x");
	assert_eq!(f.line.line(), b"bc");
}

#[test]
fn enter_submits_and_returns_to_insert() {
	let mut f = test_filter();
	type_text(&mut f, "foo");
	f.filter(ESC);
	let out = f.filter(b"\r");
	assert_eq!(out, ENTER);
	assert_eq!(f.line.line(), b"");
	assert_eq!(f.editor.mode(), Mode::Insert);
	assert_eq!(f.history.len(), 1);
}

#[test]
fn ctrl_c_cancels_and_ingests() {
	let mut f = test_filter();
	type_text(&mut f, "xyz");
	let out = f.filter(b"\x03");
	assert_eq!(out, ENTER);
	assert_eq!(f.line.line(), b"");
	assert_eq!(f.history.len(), 1);
}

#[test]
fn bell_is_swallowed() {
	let mut f = test_filter();
	assert_eq!(f.filter(b"\x07"), b"");
}

#[test]
fn detach_sequence_passes_through() {
	let mut f = test_filter();
	assert_eq!(f.filter(b"\x1d"), b"\x1d");
}

#[test]
fn chunk_backspace_removes_one_chunk() {
	let mut f = test_filter();
	type_text(&mut f, "ab cd");
	let out = f.filter(b"\x1b\x7f");
	assert_eq!(out, DELETE.repeat(2));
	assert_eq!(f.line.line(), b"ab ");
}

#[test]
fn option_arrows_jump_chunks() {
	let mut f = test_filter();
	type_text(&mut f, "foo bar");
	let out = f.filter(b"\x1bb");
	assert_eq!(out, LEFT.repeat(3));
	assert_eq!(f.line.pos(), 4);
	let out = f.filter(b"\x1bf");
	assert_eq!(out, RIGHT.repeat(3));
	assert_eq!(f.line.pos(), 7);
}

#[test]
fn arrow_keys_move_in_insert_mode() {
	let mut f = test_filter();
	type_text(&mut f, "ab");
	assert_eq!(f.filter(b"\x1b[D"), LEFT);
	assert_eq!(f.line.pos(), 1);
	assert_eq!(f.filter(b"\x1b[C"), RIGHT);
	assert_eq!(f.line.pos(), 2);
	// clamped at the ends
	assert_eq!(f.filter(b"\x1b[C"), b"");
}

#[test]
fn history_browsing_wraps_through_scratch() {
	let mut f = test_filter();
	seed_history(&mut f, &["aaa", "bbb", "ccc"]);
	assert_eq!(f.line.line(), b"");

	assert_eq!(f.filter(UP), b"ccc");
	assert_eq!(f.line.line(), b"ccc");
	f.filter(UP);
	assert_eq!(f.line.line(), b"bbb");
	f.filter(UP);
	assert_eq!(f.line.line(), b"aaa");
	// one more step lands on the (empty) scratch slot
	f.filter(UP);
	assert_eq!(f.line.line(), b"");
}

#[test]
fn browsing_preserves_the_typed_scratch() {
	let mut f = test_filter();
	seed_history(&mut f, &["first", "second"]);
	type_text(&mut f, "half typed");

	f.filter(UP);
	assert_eq!(f.line.line(), b"second");
	f.filter(DOWN);
	assert_eq!(f.line.line(), b"half typed");
}

#[test]
fn vim_keys_browse_history_too() {
	let mut f = test_filter();
	seed_history(&mut f, &["one", "two"]);
	f.filter(ESC);

	f.filter(b"k");
	assert_eq!(f.line.line(), b"two");
	f.filter(b"k");
	assert_eq!(f.line.line(), b"one");
	f.filter(b"j");
	assert_eq!(f.line.line(), b"two");
	// G jumps back to the scratch slot
	f.filter(b"G");
	assert_eq!(f.line.line(), b"");
}

#[test]
fn search_walks_matching_entries_in_order() {
	let mut f = test_filter();
	seed_history(&mut f, &["a", "b", "aa", "aaa", "bbb", "abcd"]);
	f.filter(ESC);

	let out = feed(&mut f, &[b"/", b"a", b"+", b"\r"]);
	assert_eq!(out, [b"a".as_slice(), LEFT].concat());
	assert_eq!(f.line.line(), b"a");

	for expected in [b"aa".as_slice(), b"aaa".as_slice(), b"abcd".as_slice(), b"a".as_slice()] {
		f.filter(b"n");
		assert_eq!(f.line.line(), expected);
	}

	// N walks the other way
	f.filter(b"N");
	assert_eq!(f.line.line(), b"abcd");
}

#[test]
fn backward_search_flips_navigation() {
	let mut f = test_filter();
	seed_history(&mut f, &["a1", "b", "a2", "a3"]);
	f.filter(ESC);

	feed(&mut f, &[b"?", b"a", b"\r"]);
	assert_eq!(f.line.line(), b"a3");
	// n under a backward search keeps walking backward
	f.filter(b"n");
	assert_eq!(f.line.line(), b"a2");
	f.filter(b"n");
	assert_eq!(f.line.line(), b"a1");
	f.filter(b"N");
	assert_eq!(f.line.line(), b"a2");
}

#[test]
fn failed_search_leaves_the_line_alone() {
	let mut f = test_filter();
	seed_history(&mut f, &["alpha"]);
	type_text(&mut f, "keep me");
	f.filter(ESC);

	feed(&mut f, &[b"/", b"z", b"q", b"\r"]);
	assert_eq!(f.line.line(), b"keep me");
}

#[test]
fn marks_name_history_positions() {
	let mut f = test_filter();
	seed_history(&mut f, &["aaa", "bbb", "ccc"]);
	f.filter(ESC);

	f.filter(b"k");
	assert_eq!(f.line.line(), b"ccc");
	feed(&mut f, &[b"m", b"a"]);

	f.filter(b"k");
	assert_eq!(f.line.line(), b"bbb");

	feed(&mut f, &[b"`", b"a"]);
	assert_eq!(f.line.line(), b"ccc");
}

#[test]
fn submissions_land_in_history_once() {
	let mut f = test_filter();
	seed_history(&mut f, &["dup", "dup", "h", "HALT", "real"]);
	// consecutive duplicate and the reject patterns never make it in
	assert_eq!(f.history.len(), 2);
}

#[test]
fn output_filter_resets_style_before_prompt() {
	let mut of = OutputFilter::new();
	assert_eq!(of.filter(b"result\r\nUSER>"), b"result\x1b[0m\r\nUSER>");
	// already styled prompts and non-prompt chunks pass through
	assert_eq!(of.filter(b"a<b\r\nx<y>"), b"a<b\r\nx<y>");
	assert_eq!(of.filter(b"no prompt here"), b"no prompt here");
	assert_eq!(of.filter(b"USER>"), b"USER>");
}
