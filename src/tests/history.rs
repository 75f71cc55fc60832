use std::fs;
use std::io::Write as IoWrite;

use crate::history::History;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn history_file(content: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file.flush().unwrap();
	file
}

#[test]
fn load_navigate_ingest_persist() {
	let file = history_file(":aaa\n:bbb\n:ccc\n");
	let path = file.path().to_path_buf();

	{
		let mut hm = History::open_sized(Some(path.clone()), 2);
		// only the last two entries survive the size cap
		assert_eq!(hm.len(), 2);
		assert_eq!(hm.retrieve_buffer(), b"");

		hm.set_buffer(b"d");
		assert_eq!(hm.retrieve_buffer(), b"d");
		hm.set_buffer(b"dd");
		assert_eq!(hm.retrieve_buffer(), b"dd");

		// wrap-around navigation through the scratch slot
		assert_eq!(hm.go_prev(), b"ccc");
		assert_eq!(hm.go_next(), b"dd");
		assert_eq!(hm.go_prev(), b"ccc");
		assert_eq!(hm.go_prev(), b"bbb");
		assert_eq!(hm.go_prev(), b"dd");

		hm.ingest();
		assert_eq!(hm.retrieve_buffer(), b"");
		hm.persist().unwrap();
	}

	let content = fs::read_to_string(&path).unwrap();
	assert_eq!(content, ":aaa\n:bbb\n:ccc\n:dd\n");
}

#[test]
fn lines_without_marker_are_ignored_on_load() {
	let file = history_file(":aaa\ngarbage\n\n:bbb\n");
	let hm = History::open(Some(file.path().to_path_buf()));
	assert_eq!(hm.len(), 2);
}

#[test]
fn missing_file_loads_empty() {
	let hm = History::open(Some("/nonexistent/iriline-history".into()));
	assert_eq!(hm.len(), 0);
	assert!(hm.is_empty());
}

#[test]
fn ingest_rejects_noise_and_duplicates() {
	let mut hm = History::open(None);

	hm.set_buffer(b"write ^x");
	hm.ingest();
	assert_eq!(hm.len(), 1);

	// consecutive duplicate
	hm.set_buffer(b"write ^x");
	hm.ingest();
	assert_eq!(hm.len(), 1);

	// empty line
	hm.set_buffer(b"");
	hm.ingest();
	assert_eq!(hm.len(), 1);

	// the reject patterns are case-insensitive fullmatches
	for noise in ["h", "H", "halt", "HALT  ", "h   "] {
		hm.set_buffer(noise.as_bytes());
		hm.ingest();
		assert_eq!(hm.len(), 1, "{noise:?} should be rejected");
	}

	// but only fullmatches
	hm.set_buffer(b"halt now");
	hm.ingest();
	assert_eq!(hm.len(), 2);
}

#[test]
fn search_navigation_wraps() {
	let file = history_file("\n:a\n:b\n:aa\n:aaa\n:bbb\n");
	let mut hm = History::open(Some(file.path().to_path_buf()));

	hm.start_search("a+").unwrap();

	hm.set_buffer(b"abcd");
	hm.ingest();

	let visits: Vec<Vec<u8>> = (0..5).map(|_| hm.search_next().unwrap().0).collect();
	assert_eq!(visits, [b"a".to_vec(), b"aa".to_vec(), b"aaa".to_vec(), b"abcd".to_vec(), b"a".to_vec()]);

	// a fresh ingest that matches joins the hit list
	hm.set_buffer(b"abcdefg");
	hm.ingest();

	assert_eq!(hm.search_prev().unwrap().0, b"abcdefg");
	assert_eq!(hm.search_next().unwrap().0, b"a");
	assert_eq!(hm.search_prev().unwrap().0, b"abcdefg");

	// no matches at all
	hm.start_search("z").unwrap();
	assert!(hm.search_next().is_none());
	assert!(hm.search_prev().is_none());
}

#[test]
fn search_reports_match_spans() {
	let mut hm = History::open(None);
	hm.set_buffer(b"foo bar");
	hm.ingest();
	hm.start_search("bar").unwrap();

	let (line, span) = hm.search_next().unwrap();
	assert_eq!(line, b"foo bar");
	assert_eq!(span, (4, 7));
}

#[test]
fn invalid_pattern_is_reported() {
	let mut hm = History::open(None);
	hm.set_buffer(b"aaa");
	hm.ingest();
	assert!(hm.start_search("(unclosed").is_err());
	assert!(hm.search_next().is_none());
}

#[test]
fn marks_jump_the_index() {
	let file = history_file(":aaa\n:bbb\n:ccc\n");
	let mut hm = History::open(Some(file.path().to_path_buf()));
	hm.ingest(); // park the index on the scratch slot

	assert_eq!(hm.go_prev(), b"ccc");
	hm.set_mark('q');
	assert_eq!(hm.go_prev(), b"bbb");
	assert_eq!(hm.go_prev(), b"aaa");

	assert_eq!(hm.retrieve_mark('q'), b"ccc");
	// unknown marks emit the line at the current index
	assert_eq!(hm.retrieve_mark('z'), b"ccc");
}

#[test]
fn skip_buffers_suppresses_one_update() {
	let mut hm = History::open(None);
	hm.set_buffer(b"keep me");
	hm.skip_buffers();
	hm.set_buffer(b"transient");
	assert_eq!(hm.retrieve_buffer(), b"keep me");
	// only the next update is skipped
	hm.set_buffer(b"new scratch");
	assert_eq!(hm.retrieve_buffer(), b"new scratch");
}

#[test]
fn persist_appends_only_new_entries() {
	let file = history_file(":old\n");
	let path = file.path().to_path_buf();
	let mut hm = History::open(Some(path.clone()));
	hm.set_buffer(b"fresh");
	hm.ingest();
	hm.persist().unwrap();

	let content = fs::read_to_string(&path).unwrap();
	assert_eq!(content, ":old\n:fresh\n");
}
