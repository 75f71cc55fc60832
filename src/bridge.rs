//! The thin PTY bridge: spawns the host shell on a pseudo-terminal and relays
//! bytes through the two filters.
//!
//! The editor core lives entirely on this thread, inside the input filter. The
//! child's output gets its own relay thread, but the output filter shares no
//! state with the core, so nothing here needs a lock.

use std::io::{self, Read, Write as IoWrite};
use std::thread;

use log::info;
use portable_pty::{Child, CommandBuilder, PtySize, native_pty_system};

use crate::dispatch::{InputFilter, OutputFilter};
use crate::editor;
use crate::keys::ESCAPE_SEQUENCE;

const CURSOR_BAR: &[u8] = b"\x1b[5 q";

pub struct Credentials {
	pub username: String,
	pub password: String,
}

/// Spawn `iris terminal <instance>` and interact until the child exits or the
/// user types the escape character. Persists the history on the way out.
pub fn run(
	instance: &str,
	mut input_filter: InputFilter,
	mut output_filter: OutputFilter,
	credentials: Option<Credentials>,
) -> Result<(), String> {
	let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
	let pty_system = native_pty_system();
	let pair = pty_system
		.openpty(PtySize {
			rows,
			cols,
			pixel_width: 0,
			pixel_height: 0,
		})
		.map_err(|e| format!("failed to open pty: {e}"))?;

	let mut cmd = CommandBuilder::new("iris");
	cmd.arg("terminal");
	cmd.arg(instance);
	let mut child = pair
		.slave
		.spawn_command(cmd)
		.map_err(|e| format!("failed to spawn 'iris terminal {instance}': {e}"))?;
	drop(pair.slave);

	let mut reader = pair
		.master
		.try_clone_reader()
		.map_err(|e| format!("failed to open pty reader: {e}"))?;
	let mut writer = pair
		.master
		.take_writer()
		.map_err(|e| format!("failed to open pty writer: {e}"))?;

	// Answer the login prompts before the user gets the session
	if let Some(creds) = credentials {
		expect(&mut reader, b"Username:")?;
		writer
			.write_all(format!("{}\n", creds.username).as_bytes())
			.map_err(|e| format!("failed to send username: {e}"))?;
		expect(&mut reader, b"Password:")?;
		writer
			.write_all(format!("{}\r", creds.password).as_bytes())
			.map_err(|e| format!("failed to send password: {e}"))?;
	}

	println!("You are communicating with IRIS through iriline. The escape character is ^]");
	crossterm::terminal::enable_raw_mode().map_err(|e| format!("failed to enter raw mode: {e}"))?;
	editor::write_local(CURSOR_BAR);

	let relay = thread::spawn(move || {
		let mut stdout = io::stdout();
		let mut buf = [0u8; 4096];
		loop {
			match reader.read(&mut buf) {
				Ok(0) | Err(_) => break,
				Ok(n) => {
					let chunk = output_filter.filter(&buf[..n]);
					if stdout.write_all(&chunk).is_err() {
						break;
					}
					stdout.flush().ok();
				}
			}
		}
	});

	let result = relay_input(&mut input_filter, &mut *writer, &mut *child);

	child.kill().ok();
	drop(writer);
	relay.join().ok();
	crossterm::terminal::disable_raw_mode().ok();
	editor::write_local(CURSOR_BAR);
	println!();

	result?;
	input_filter.history.persist()
}

/// The core loop: every stdin read goes through the input filter, and the
/// filtered bytes go to the child. Typing the escape character ends the
/// session without forwarding it.
fn relay_input(
	filter: &mut InputFilter,
	writer: &mut dyn IoWrite,
	child: &mut dyn Child,
) -> Result<(), String> {
	let mut stdin = io::stdin();
	let mut buf = [0u8; 1024];
	loop {
		let n = match stdin.read(&mut buf) {
			Ok(0) => break,
			Ok(n) => n,
			Err(e) => return Err(format!("stdin read failed: {e}")),
		};
		let bytes = filter.filter(&buf[..n]);
		if bytes
			.windows(ESCAPE_SEQUENCE.len())
			.any(|w| w == ESCAPE_SEQUENCE)
		{
			info!("escape character typed, detaching");
			break;
		}
		if !bytes.is_empty() {
			if writer.write_all(&bytes).is_err() {
				break;
			}
			writer.flush().ok();
		}
		if child.try_wait().ok().flatten().is_some() {
			break;
		}
	}
	Ok(())
}

/// Swallow child output until `pattern` has gone by.
fn expect(reader: &mut dyn Read, pattern: &[u8]) -> Result<(), String> {
	let mut seen: Vec<u8> = vec![];
	let mut byte = [0u8; 1];
	loop {
		match reader.read(&mut byte) {
			Ok(0) => {
				return Err(format!(
					"host shell closed before sending {:?}",
					String::from_utf8_lossy(pattern)
				));
			}
			Ok(_) => {
				seen.push(byte[0]);
				if seen.ends_with(pattern) {
					return Ok(());
				}
			}
			Err(e) => return Err(format!("failed reading from host shell: {e}")),
		}
	}
}
