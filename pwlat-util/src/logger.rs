//! Logger
//!
//! Logs to `stderr`, filtered by `RUST_LOG` (defaulting to `info`), and,
//! optionally, to a log file, filtered by `RUST_LOG_FILE` (defaulting to `debug`).

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing_subscriber::{fmt, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Any messages logged through [`pre_init`] are replayed afterwards.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_layer = fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", "info"));

	// Note: If we can't create the log file we still want terminal output,
	//       so we only report the error once the logger is up.
	let (file_layer, file_err) = match log_file.map(|path| self::open_log_file(path, log_file_append)) {
		Some(Ok(file)) => {
			let layer = fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.with_filter(self::env_filter("RUST_LOG_FILE", "debug"));
			(Some(layer), None)
		},
		Some(Err(err)) => (None, Some(err)),
		None => (None, None),
	};

	tracing_subscriber::registry().with(term_layer).with(file_layer).init();

	if let Some(err) = file_err {
		tracing::warn!(?log_file, ?err, "Unable to open log file, logging only to stderr");
	}

	pre_init::flush();
}

/// Creates an env filter from `var`, or `default` if unset or invalid
fn env_filter(var: &str, default: &str) -> EnvFilter {
	EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Opens the log file
fn open_log_file(path: &Path, append: bool) -> Result<fs::File, io::Error> {
	let mut options = fs::OpenOptions::new();
	options.create(true);
	match append {
		true => options.append(true),
		false => options.write(true).truncate(true),
	};

	options.open(path)
}

/// Logging before the logger is initialized
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Buffered debug messages
	static MESSAGES: Mutex<Vec<String>> = Mutex::new(vec![]);

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		// Note: A poisoned buffer only means another thread panicked mid-push,
		//       the messages themselves are still fine.
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push(msg.into());
	}

	/// Replays all buffered messages
	pub(super) fn flush() {
		let messages = std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
		for msg in messages {
			tracing::debug!("{msg}");
		}
	}
}
