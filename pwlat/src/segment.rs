//! Statistics segment location.
//!
//! Dyna logs start with free-form run output, followed by a marker line
//! after which the statistics are printed. Logs of multiple passes contain
//! multiple markers, and only the last one starts the authoritative section.

// Imports
use {
	pwlat_util::ReadLineTrimmed,
	std::io,
};

/// Marker preceding the radix statistics
pub const RADIX_MARKER: &str = "~~~~~~~~~~~~~~~";

/// Marker preceding the per-way ECPT statistics
pub const WAY_MARKER: &str = "~~~~~~ full stats with way ~~~~~~";

/// Returns the index of the last line starting with `marker`, if any
pub fn find_marker_line<R: io::BufRead>(mut reader: R, marker: &str) -> Result<Option<usize>, io::Error> {
	let mut marker_line = None;
	let mut line = String::new();
	let mut line_idx = 0;
	while reader.read_line_trimmed(&mut line)? != 0 {
		if line.starts_with(marker) {
			marker_line = Some(line_idx);
		}
		line_idx += 1;
	}

	Ok(marker_line)
}

/// Returns the index of the last line starting with `marker`, or `0` if there are none
pub fn find_start_line<R: io::BufRead>(reader: R, marker: &str) -> Result<usize, io::Error> {
	self::find_marker_line(reader, marker).map(|marker_line| marker_line.unwrap_or(0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn last_marker_wins() {
		let log = "\
run 1
~~~~~~~~~~~~~~~
L1,5
run 2
~~~~~~~~~~~~~~~
L2,7
";
		assert_eq!(find_start_line(log.as_bytes(), RADIX_MARKER).unwrap(), 4);
	}

	#[test]
	fn missing_marker_is_line_zero() {
		let log = "some preamble\nL1,5\n";
		assert_eq!(find_marker_line(log.as_bytes(), RADIX_MARKER).unwrap(), None);
		assert_eq!(find_start_line(log.as_bytes(), RADIX_MARKER).unwrap(), 0);
		assert_eq!(find_start_line("".as_bytes(), RADIX_MARKER).unwrap(), 0);
	}

	#[test]
	fn markers_are_format_specific() {
		let log = "\
preamble
~~~~~~~~~~~~~~~
L1,5
~~~~~~ full stats with way ~~~~~~
L1,LLC,1\t5
";
		assert_eq!(find_start_line(log.as_bytes(), RADIX_MARKER).unwrap(), 1);
		assert_eq!(find_start_line(log.as_bytes(), WAY_MARKER).unwrap(), 3);
	}

	#[test]
	fn marker_must_start_the_line() {
		let log = "  ~~~~~~~~~~~~~~~\nL1,5\n";
		assert_eq!(find_marker_line(log.as_bytes(), RADIX_MARKER).unwrap(), None);
	}
}
