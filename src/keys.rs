//! The key alphabet: every special byte sequence the dispatcher matches on.
//!
//! Terminals disagree about what Option-chords look like on the wire, so the
//! builtin table can be overlaid from `~/.iridescent/strokes.json`, written by
//! an external detection tool. Loading is our job; detection is not.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde::Deserialize;

/// Typing this byte detaches the session. ASCII GS, rendered as `^]`.
pub const ESCAPE_SEQUENCE: &[u8] = b"\x1d";

/// The resolved key-binding table. Built once at startup, owned by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
	pub left: Vec<u8>,
	pub right: Vec<u8>,
	pub up: Vec<u8>,
	pub down: Vec<u8>,
	pub delete: Vec<u8>,
	pub escape: Vec<u8>,
	pub enter: Vec<u8>,

	pub option_left: Vec<u8>,
	pub option_right: Vec<u8>,
	pub option_up: Vec<u8>,
	pub option_down: Vec<u8>,
	pub option_delete: Vec<u8>,

	pub sig_int: Vec<u8>,
	pub sig_bell: Vec<u8>,
	pub ctrl_r: Vec<u8>,
}

impl Default for Keymap {
	fn default() -> Self {
		Self {
			left: b"\x1b[D".to_vec(),
			right: b"\x1b[C".to_vec(),
			up: b"\x1b[A".to_vec(),
			down: b"\x1b[B".to_vec(),
			delete: b"\x7f".to_vec(),
			escape: b"\x1b".to_vec(),
			enter: b"\r".to_vec(),

			option_left: b"\x1bb".to_vec(),
			option_right: b"\x1bf".to_vec(),
			option_up: b"\x1b[1;9A".to_vec(),
			option_down: b"\x1b[1;9B".to_vec(),
			option_delete: b"\x1b\x7f".to_vec(),

			sig_int: b"\x03".to_vec(),
			sig_bell: b"\x07".to_vec(),
			ctrl_r: b"\x12".to_vec(),
		}
	}
}

/// Raw contents of `strokes.json`. Every field is optional so a partial file
/// still overlays cleanly.
#[derive(Debug, Default, Deserialize)]
pub struct StrokeFile {
	#[serde(rename = "KEY.LEFT")]
	left: Option<String>,
	#[serde(rename = "KEY.RIGHT")]
	right: Option<String>,
	#[serde(rename = "KEY.UP")]
	up: Option<String>,
	#[serde(rename = "KEY.DOWN")]
	down: Option<String>,
	#[serde(rename = "KEY.DELETE")]
	delete: Option<String>,
	#[serde(rename = "KEY.ESCAPE")]
	escape: Option<String>,
	#[serde(rename = "KEY.ENTER")]
	enter: Option<String>,
	#[serde(rename = "OPTION.LEFT")]
	option_left: Option<String>,
	#[serde(rename = "OPTION.RIGHT")]
	option_right: Option<String>,
	#[serde(rename = "OPTION.UP")]
	option_up: Option<String>,
	#[serde(rename = "OPTION.DOWN")]
	option_down: Option<String>,
	#[serde(rename = "OPTION.DELETE")]
	option_delete: Option<String>,
	#[serde(rename = "SIG.INT")]
	sig_int: Option<String>,
	#[serde(rename = "SIG.BELL")]
	sig_bell: Option<String>,
	#[serde(rename = "CTRL.R")]
	ctrl_r: Option<String>,
}

impl Keymap {
	/// Where the detection tool persists its findings.
	pub fn config_path() -> Option<PathBuf> {
		dirs::home_dir().map(|home| home.join(".iridescent").join("strokes.json"))
	}

	/// The builtin table with `strokes.json` overlaid, if one exists.
	pub fn load() -> Result<Self, String> {
		let mut map = Self::default();
		let Some(path) = Self::config_path() else {
			return Ok(map);
		};
		if !path.is_file() {
			return Ok(map);
		}
		let raw = fs::read_to_string(&path)
			.map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
		let strokes: StrokeFile = serde_json::from_str(&raw)
			.map_err(|e| format!("failed to parse '{}': {e}", path.display()))?;
		map.overlay(strokes);
		Ok(map)
	}

	pub fn overlay(&mut self, strokes: StrokeFile) {
		let fields: [(&str, &mut Vec<u8>, Option<String>); 15] = [
			("KEY.LEFT", &mut self.left, strokes.left),
			("KEY.RIGHT", &mut self.right, strokes.right),
			("KEY.UP", &mut self.up, strokes.up),
			("KEY.DOWN", &mut self.down, strokes.down),
			("KEY.DELETE", &mut self.delete, strokes.delete),
			("KEY.ESCAPE", &mut self.escape, strokes.escape),
			("KEY.ENTER", &mut self.enter, strokes.enter),
			("OPTION.LEFT", &mut self.option_left, strokes.option_left),
			("OPTION.RIGHT", &mut self.option_right, strokes.option_right),
			("OPTION.UP", &mut self.option_up, strokes.option_up),
			("OPTION.DOWN", &mut self.option_down, strokes.option_down),
			("OPTION.DELETE", &mut self.option_delete, strokes.option_delete),
			("SIG.INT", &mut self.sig_int, strokes.sig_int),
			("SIG.BELL", &mut self.sig_bell, strokes.sig_bell),
			("CTRL.R", &mut self.ctrl_r, strokes.ctrl_r),
		];
		for (name, slot, value) in fields {
			let Some(value) = value else { continue };
			let bytes = value.into_bytes();
			if *slot != bytes {
				info!("overriding {name}: {slot:?} -> {bytes:?}");
				*slot = bytes;
			}
		}
	}
}
