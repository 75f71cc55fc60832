//! `iriline` wraps an interactive IRIS host-shell session in a vim-flavored
//! line editor.
//!
//! It sits between your terminal and `iris terminal <instance>`, intercepting
//! every keystroke. Keys flow through a modal editor (Insert, Normal, Replace)
//! that keeps a local model of the command line and emits plain terminal
//! bytes, so the host shell never knows an editor is there. Submitted lines
//! land in a persistent, regex-searchable history.
//!
//! ### High-level structure:
//! 1. Arguments and the keyboard layout are resolved into a `Keymap`
//! 2. An `InputFilter` is built around the editor core and the history store
//! 3. The PTY bridge spawns the host shell and relays bytes through the filters

use std::env;
use std::fmt::{Display, Write};
use std::fs;
use std::io::{self, BufRead, Write as IoWrite};
use std::path::PathBuf;

pub mod charclass;
pub mod clipboard;
pub mod keys;
pub mod history;
pub mod linebuf;
pub mod actions;
pub mod editor;
pub mod dispatch;
pub mod bridge;
#[cfg(test)]
pub mod tests;

use dispatch::{InputFilter, OutputFilter};
use history::History;
use keys::Keymap;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Print the given error message and exit the program.
///
/// Despite the header, this function does not return anything. It always calls
/// `std::process::exit(1)`. This is done so that the function can be easily
/// used as an argument to methods such as `unwrap_or_else`.
///
/// The error message will be prefixed with `iriline:` if it is not already.
pub fn complain_and_exit<T>(err: impl Display) -> T {
	let mut err = err.to_string();
	if !err.starts_with("iriline: ") {
		err = format!("iriline: {err}");
	}
	eprintln!("{err}");
	std::process::exit(1)
}

/// The arguments passed to the program by the user
#[derive(Default, Clone, Debug)]
pub struct Opts {
	pub instance: Option<String>,
	pub log_path: Option<PathBuf>,
	pub debug_path: Option<PathBuf>,
	pub history_path: Option<PathBuf>,
}

impl Opts {
	pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
		let mut opts = Self::default();
		while let Some(arg) = args.next() {
			match arg.as_str() {
				"-l" | "--log-path" => {
					let Some(path) = args.next() else {
						return Err("expected a path after '--log-path'".into());
					};
					opts.log_path = Some(PathBuf::from(path));
				}
				"-d" | "--debug-path" => {
					let Some(path) = args.next() else {
						return Err("expected a path after '--debug-path'".into());
					};
					opts.debug_path = Some(PathBuf::from(path));
				}
				"-H" | "--history-path" => {
					let Some(path) = args.next() else {
						return Err("expected a path after '--history-path'".into());
					};
					opts.history_path = Some(PathBuf::from(path));
				}
				"-h" | "--help" => {
					println!("{}", get_help());
					std::process::exit(0);
				}
				_ if arg.starts_with('-') => {
					return Err(format!("unrecognized option '{arg}'"));
				}
				_ => {
					if opts.instance.is_some() {
						return Err(format!("unexpected argument '{arg}'"));
					}
					opts.instance = Some(arg);
				}
			}
		}
		if opts.instance.is_none() {
			opts.instance = env::var("IRIS_INSTANCE").ok();
		}
		if opts.history_path.is_none() {
			opts.history_path = history::default_history_path();
		}
		Ok(opts)
	}
}

/// Prints out the help info for `iriline`
fn get_help() -> String {
	let mut help = String::new();
	writeln!(help).ok();
	writeln!(help, "\x1b[1miriline\x1b[0m").ok();
	writeln!(help, "A vim-flavored line editor for interactive IRIS sessions.").ok();
	writeln!(help).ok();
	writeln!(help, "\x1b[1;4mUSAGE:\x1b[0m").ok();
	writeln!(help, "\tiriline [OPTIONS] [INSTANCE]").ok();
	writeln!(help).ok();
	writeln!(help, "\tINSTANCE names the IRIS instance to connect to.").ok();
	writeln!(help, "\tFalls back to the $IRIS_INSTANCE environment variable.").ok();
	writeln!(help).ok();
	writeln!(help, "\x1b[1;4mOPTIONS:\x1b[0m").ok();
	writeln!(help, "\t-l, --log-path <FILE>").ok();
	writeln!(help, "\t\tLog every keystroke received and every byte sent to the given file.").ok();
	writeln!(help).ok();
	writeln!(help, "\t-d, --debug-path <FILE>").ok();
	writeln!(help, "\t\tLike --log-path, but also records dispatch detail and cursor state.").ok();
	writeln!(help).ok();
	writeln!(help, "\t-H, --history-path <FILE>").ok();
	writeln!(help, "\t\tLocation of the history file. Defaults to ~/.iris_history").ok();
	writeln!(help).ok();
	writeln!(help, "\x1b[1;4mENVIRONMENT:\x1b[0m").ok();
	writeln!(help, "\t$IRIS_INSTANCE\tinstance to connect to when none is given").ok();
	writeln!(help, "\t$IRIS_USERNAME\t$IRIS_PASSWORD\tcredentials for the login handshake").ok();
	writeln!(help).ok();
	writeln!(help, "Once connected, press ESC for Normal mode. The escape character is ^]").ok();
	help
}

/// Initialize the logger
///
/// stdout and stderr belong to the interactive session, so log records go to
/// a file. `--log-path` enables the keystroke log (debug level); `--debug-path`
/// adds dispatch detail (trace level) and wins when both are given.
fn init_logger(opts: &Opts) {
	let mut builder = env_logger::builder();
	let target = opts.debug_path.as_deref().or(opts.log_path.as_deref());
	if let Some(path) = target {
		match fs::OpenOptions::new().create(true).append(true).open(path) {
			Ok(file) => {
				builder.target(env_logger::Target::Pipe(Box::new(file)));
				let level = if opts.debug_path.is_some() {
					log::LevelFilter::Trace
				} else {
					log::LevelFilter::Debug
				};
				builder.filter(None, level);
			}
			Err(e) => eprintln!("iriline: failed to open log file '{}': {e}", path.display()),
		}
	}
	builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
	builder.init();
}

fn fetch_credentials() -> (Option<String>, Option<String>) {
	(env::var("IRIS_USERNAME").ok(), env::var("IRIS_PASSWORD").ok())
}

/// Typed credentials would end up in the keystroke log. Make the user own that.
fn confirm_unsafe_logging() -> bool {
	println!("Credentials are not specified in environment variables $IRIS_USERNAME and $IRIS_PASSWORD.");
	println!("Consider specifying those or turning off logging. Otherwise, your credentials might be logged.");
	print!("Ignore the warning and proceed? (y/N) ");
	io::stdout().flush().ok();
	let mut answer = String::new();
	if io::stdin().lock().read_line(&mut answer).is_err() {
		return false;
	}
	answer.trim().to_lowercase().starts_with('y')
}

fn main() {
	let opts = Opts::parse(env::args().skip(1)).unwrap_or_else(complain_and_exit);
	init_logger(&opts);

	let Some(instance) = opts.instance.clone() else {
		eprintln!(
			"Please specify instance name using\n\tiriline <instance>\nor set the $IRIS_INSTANCE environment variable."
		);
		std::process::exit(1);
	};

	let (username, password) = fetch_credentials();
	let logging = opts.log_path.is_some() || opts.debug_path.is_some();
	if (username.is_none() || password.is_none()) && logging && !confirm_unsafe_logging() {
		println!("Aborting due to security concerns.");
		std::process::exit(0);
	}

	let keymap = Keymap::load().unwrap_or_else(complain_and_exit);
	if let Some(path) = Keymap::config_path() {
		if path.is_file() {
			println!("Loaded keyboard layout from {}", path.display());
			println!("To change the layout, delete this file and rerun the detection tool");
		} else {
			println!("No keyboard layout at {}, using builtin defaults", path.display());
		}
	}

	let history = History::open(opts.history_path.clone());
	let input_filter = InputFilter::new(keymap, history);
	let output_filter = OutputFilter::new();

	let credentials = match (username, password) {
		(Some(username), Some(password)) => Some(bridge::Credentials { username, password }),
		_ => None,
	};

	bridge::run(&instance, input_filter, output_filter, credentials)
		.unwrap_or_else(complain_and_exit);
}
