//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "histogram")]
	Histogram(Histogram),

	#[clap(name = "speedup")]
	Speedup(Speedup),
}

/// Creates a graph for each latency histogram of a benchmark report
#[derive(Debug, clap::Args)]
pub struct Histogram {
	/// Input report
	pub input_file: PathBuf,

	/// Output directory
	#[clap(long = "output-dir")]
	pub output_dir: PathBuf,

	/// Output size
	#[clap(flatten)]
	pub size: OutputSize,
}

/// Creates a bar chart of the speedup of each benchmark
#[derive(Debug, clap::Args)]
pub struct Speedup {
	/// Input comparison
	pub input_file: PathBuf,

	/// Output file
	#[clap(short = 'o', long = "output")]
	pub output_file: PathBuf,

	/// Output size
	#[clap(flatten)]
	pub size: OutputSize,
}

/// Output size
#[derive(Debug, clap::Args)]
pub struct OutputSize {
	/// Output file width
	#[clap(long = "output-width", default_value_t = 640)]
	pub width: u32,

	/// Output file height
	#[clap(long = "output-height", default_value_t = 480)]
	pub height: u32,
}
