//! Dyna log reading

// Imports
use {
	crate::{record::RecordFormat, segment},
	anyhow::Context,
	pwlat_util::ReadLineTrimmed,
	std::io,
};

/// Dyna log reader.
///
/// Streams the lines of the statistics section of a log, skipping blank lines.
#[derive(Clone, Debug)]
pub struct DynaLogReader<R> {
	/// Record format
	format: RecordFormat,

	/// Marker line, if any
	marker_line: Option<usize>,

	/// Index of the next line
	next_line_idx: usize,

	/// Bytes read
	bytes_read: u64,

	/// Total bytes
	total_bytes: u64,

	/// Whether we've reached the end of the section
	finished: bool,

	/// Current line
	line: String,

	/// Reader
	reader: R,
}

impl<R: io::BufRead + io::Seek> DynaLogReader<R> {
	/// Locates the statistics section of a log and positions the reader at its start
	pub fn from_reader(mut reader: R, format: RecordFormat) -> Result<Self, anyhow::Error> {
		let total_bytes = reader
			.seek(io::SeekFrom::End(0))
			.context("Unable to get stream length")?;
		reader.rewind().context("Unable to rewind to start")?;

		let marker_line =
			segment::find_marker_line(&mut reader, format.marker()).context("Unable to search for marker line")?;
		reader.rewind().context("Unable to rewind to start")?;

		// Then skip everything up to and including the marker.
		// Note: Without a marker there's no preamble, so we start at the first line.
		let mut line = String::new();
		let mut next_line_idx = 0;
		let mut bytes_read = 0;
		if let Some(marker_line) = marker_line {
			while next_line_idx <= marker_line {
				let line_bytes = reader.read_line_trimmed(&mut line).context("Unable to skip preamble")?;
				anyhow::ensure!(line_bytes != 0, "Log ended before marker line {marker_line}");
				bytes_read += line_bytes as u64;
				next_line_idx += 1;
			}
		}
		tracing::trace!(?marker_line, bytes_read, total_bytes, "Located statistics section");

		Ok(Self {
			format,
			marker_line,
			next_line_idx,
			bytes_read,
			total_bytes,
			finished: false,
			line,
			reader,
		})
	}

	/// Reads the next non-blank line of the statistics section
	pub fn read_next(&mut self) -> Result<Option<TraceLine<'_>>, anyhow::Error> {
		loop {
			if self.finished {
				return Ok(None);
			}

			let line_bytes = self
				.reader
				.read_line_trimmed(&mut self.line)
				.with_context(|| format!("Unable to read line {}", self.next_line_idx + 1))?;
			if line_bytes == 0 {
				self.finished = true;
				return Ok(None);
			}

			let line_idx = self.next_line_idx;
			self.next_line_idx += 1;
			self.bytes_read += line_bytes as u64;

			if self.line.trim().is_empty() {
				continue;
			}

			if self.format.ends_at_next_marker() && self.line.starts_with('~') {
				tracing::trace!(line_idx, "Reached end of statistics section");
				self.finished = true;
				return Ok(None);
			}

			return Ok(Some(TraceLine {
				idx:  line_idx,
				text: &self.line,
			}));
		}
	}

	/// Returns the record format
	pub fn format(&self) -> RecordFormat {
		self.format
	}

	/// Returns the index of the marker line, if any
	pub fn marker_line(&self) -> Option<usize> {
		self.marker_line
	}

	/// Returns the fraction of the log consumed so far.
	///
	/// Once the section ends, anything after it is skipped, so the log counts as consumed.
	pub fn progress(&self) -> f64 {
		match (self.finished, self.total_bytes) {
			(true, _) | (false, 0) => 1.0,
			(false, total_bytes) => self.bytes_read as f64 / total_bytes as f64,
		}
	}
}

/// Line of the statistics section
#[derive(Clone, Copy, Debug)]
pub struct TraceLine<'a> {
	/// Line index within the whole log
	pub idx: usize,

	/// Contents, without the line terminator
	pub text: &'a str,
}
