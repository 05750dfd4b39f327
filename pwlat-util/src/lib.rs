//! Utilities

// Modules
pub mod logger;

// Imports
use std::{cell::RefCell, fmt, io};

/// Extension trait for `R: io::BufRead` types to read lines without their terminator
#[extend::ext(name = ReadLineTrimmed)]
pub impl<R: io::BufRead> R {
	/// Reads the next line into `line`, without the trailing `\n` / `\r\n`.
	///
	/// Returns the number of bytes consumed from the reader, including the
	/// line terminator, or `0` at the end of the reader.
	fn read_line_trimmed(&mut self, line: &mut String) -> Result<usize, io::Error> {
		line.clear();
		let bytes_read = self.read_line(line)?;

		// Pop the newline
		if line.ends_with('\n') {
			line.pop();
			if line.ends_with('\r') {
				line.pop();
			}
		}

		Ok(bytes_read)
	}
}

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}


impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}
