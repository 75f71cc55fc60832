//! The command history: an ordered log of submitted lines, a cursor into it,
//! regex-gated ingestion, pattern search, and named marks.
//!
//! The index ranges over `len + 1` slots. The extra slot past the newest entry
//! is the scratch buffer, which holds whatever the user had typed before they
//! started browsing, so browsing is always reversible. Navigation wraps around
//! through that slot on purpose.

use std::collections::HashMap;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;

/// Entries kept from the backing file at load time.
const INIT_MAX_SIZE: usize = 5000;

/// Lines that fully match any of these never enter the history. `h` and `halt`
/// are the IRIS "hang up" commands; recording them would bury everything else.
const DEFAULT_REJECT_PATTERNS: [&str; 2] = [r"(?i)\Ah\s*\z", r"(?i)\Ahalt\s*\z"];

/// Span of a search match within an entry.
pub type MatchSpan = (usize, usize);

pub fn default_history_path() -> Option<PathBuf> {
	dirs::home_dir().map(|home| home.join(".iris_history"))
}

pub struct History {
	path: Option<PathBuf>,
	entries: Vec<String>,
	/// How many entries came from disk. Persistence appends everything past this.
	init_size: usize,
	index: usize,
	scratch: String,
	reject_patterns: Vec<Regex>,
	search_pattern: Option<Regex>,
	/// Sorted by entry index.
	search_hits: Vec<(usize, MatchSpan)>,
	marks: HashMap<char, usize>,
	/// Suppresses the next N scratch updates. Set by actions that navigate the
	/// history themselves, so their transient display state does not clobber
	/// the scratch line.
	skip_buffers: usize,
}

impl History {
	pub fn open(path: Option<PathBuf>) -> Self {
		Self::open_sized(path, INIT_MAX_SIZE)
	}

	pub fn open_sized(path: Option<PathBuf>, init_max_size: usize) -> Self {
		let mut entries: Vec<String> = vec![];
		if let Some(path) = path.as_deref()
			&& path.is_file()
			&& let Ok(raw) = fs::read_to_string(path) {
			entries = raw
				.split('\n')
				.filter_map(|line| line.strip_prefix(':'))
				.map(|line| line.to_string())
				.collect();
		}
		if entries.len() > init_max_size {
			entries.drain(..entries.len() - init_max_size);
		}
		let init_size = entries.len();
		let index = init_size.saturating_sub(1);
		Self {
			path,
			entries,
			init_size,
			index,
			scratch: String::new(),
			reject_patterns: DEFAULT_REJECT_PATTERNS
				.iter()
				.map(|p| Regex::new(p).unwrap())
				.collect(),
			search_pattern: None,
			search_hits: vec![],
			marks: HashMap::new(),
			skip_buffers: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The line at the current index. The slot past the newest entry is the scratch.
	fn emit(&self) -> Vec<u8> {
		if self.index == self.entries.len() {
			self.scratch.clone().into_bytes()
		} else {
			self.entries[self.index].clone().into_bytes()
		}
	}

	pub fn go_prev(&mut self) -> Vec<u8> {
		let slots = self.entries.len() + 1;
		self.index = (self.index + slots - 1) % slots;
		self.emit()
	}

	pub fn go_next(&mut self) -> Vec<u8> {
		let slots = self.entries.len() + 1;
		self.index = (self.index + 1) % slots;
		self.emit()
	}

	/// Jump to the scratch slot (`G`).
	pub fn retrieve_buffer(&mut self) -> Vec<u8> {
		self.index = self.entries.len();
		self.emit()
	}

	fn ingestible(&self, line: &str) -> bool {
		if line.is_empty() {
			return false;
		}
		if self.reject_patterns.iter().any(|p| p.is_match(line)) {
			return false;
		}
		self.entries.last().is_none_or(|last| last.as_str() != line)
	}

	/// Fold the scratch line into the history and park the index on the scratch slot.
	///
	/// Called on line submit. Rejected lines still reset the index.
	pub fn ingest(&mut self) {
		if self.ingestible(&self.scratch) {
			let line = std::mem::take(&mut self.scratch);
			if let Some(pattern) = &self.search_pattern
				&& let Some(m) = pattern.find(&line) {
				self.search_hits.push((self.entries.len(), (m.start(), m.end())));
			}
			self.entries.push(line);
		}
		self.index = self.entries.len();
		self.set_buffer(b"");
	}

	/// Record the in-progress line. The dispatcher calls this after every keystroke.
	pub fn set_buffer(&mut self, line: &[u8]) {
		if self.skip_buffers > 0 {
			self.skip_buffers -= 1;
			return;
		}
		self.scratch = String::from_utf8_lossy(line).into_owned();
	}

	pub fn skip_buffers(&mut self) {
		self.skip_buffers = 1;
	}

	/// Compile `pattern` and collect every matching entry, in order.
	pub fn start_search(&mut self, pattern: &str) -> Result<(), regex::Error> {
		self.search_hits.clear();
		match Regex::new(pattern) {
			Ok(re) => {
				for (i, entry) in self.entries.iter().enumerate() {
					if let Some(m) = re.find(entry) {
						self.search_hits.push((i, (m.start(), m.end())));
					}
				}
				self.search_pattern = Some(re);
				Ok(())
			}
			Err(e) => {
				self.search_pattern = None;
				Err(e)
			}
		}
	}

	/// Next hit with an entry index past the current one, wrapping to the first.
	pub fn search_next(&mut self) -> Option<(Vec<u8>, MatchSpan)> {
		if self.search_hits.is_empty() {
			return None;
		}
		let pos = self.search_hits.partition_point(|(i, _)| *i <= self.index);
		let (idx, span) = self.search_hits[if pos < self.search_hits.len() { pos } else { 0 }];
		self.index = idx;
		Some((self.emit(), span))
	}

	/// Previous hit, wrapping to the last.
	pub fn search_prev(&mut self) -> Option<(Vec<u8>, MatchSpan)> {
		if self.search_hits.is_empty() {
			return None;
		}
		let pos = self.search_hits.partition_point(|(i, _)| *i < self.index);
		let (idx, span) = self.search_hits[if pos == 0 { self.search_hits.len() - 1 } else { pos - 1 }];
		self.index = idx;
		Some((self.emit(), span))
	}

	pub fn set_mark(&mut self, mark: char) {
		self.marks.insert(mark, self.index);
	}

	/// Jump to a mark and emit the line there. An unknown mark emits the line
	/// at the current index.
	pub fn retrieve_mark(&mut self, mark: char) -> Vec<u8> {
		if let Some(&idx) = self.marks.get(&mark) {
			self.index = idx;
		}
		self.emit()
	}

	fn is_default_path(path: &Path) -> bool {
		let Some(default) = default_history_path() else {
			return false;
		};
		match (fs::canonicalize(path), fs::canonicalize(&default)) {
			(Ok(a), Ok(b)) => a == b,
			_ => path == default,
		}
	}

	/// Append this session's new entries to the backing file.
	///
	/// Writes are skipped entirely when the file is the user's default history.
	pub fn persist(&self) -> Result<(), String> {
		let Some(path) = self.path.as_deref() else {
			return Ok(());
		};
		if Self::is_default_path(path) {
			debug!("history path is the default, skipping persistence");
			return Ok(());
		}
		let fresh = &self.entries[self.init_size..];
		if fresh.is_empty() {
			return Ok(());
		}
		let mut file = fs::OpenOptions::new()
			.append(true)
			.create(true)
			.open(path)
			.map_err(|e| format!("failed to open history file '{}': {e}", path.display()))?;
		let chunk: String = fresh.iter().map(|line| format!(":{line}\n")).collect();
		file.write_all(chunk.as_bytes())
			.map_err(|e| format!("failed to write history file '{}': {e}", path.display()))
	}
}
