//! Aggregation over directories of dyna logs

// Imports
use {
	pwlat::{
		aggregate::{self, LogFile},
		config::{ConfigFile, Design, Overrides, RunConfig},
		data::{FileReport, Summary},
		reduce::ReduceError,
		Aggregator,
		BenchmarkTable,
	},
	std::{fs, path::Path},
};

const RADIX_MCF: &str = "\
[pin] starting run
~~~~~~~~~~~~~~~
L1,MEMORY,10
PWC,L2,5
";

const RADIX_GUPS: &str = "\
~~~~~~~~~~~~~~~
L1,L1,1000
~~~~~~~~~~~~~~~
ZERO,ZERO,PWC,MEMORY,   497

~~~ end of statistics ~~~
L1,L1,1000
";

const RADIX_EMPTY: &str = "\
warmup
~~~~~~~~~~~~~~~
";

const ECPT_SINGLE: &str = "\
~~~~~~ full stats with way ~~~~~~
L1,LLC,MEMORY,1\t5
";

fn config(design: Design) -> RunConfig {
	RunConfig::resolve(&ConfigFile::default(), Overrides {
		design: Some(design),
		..Overrides::default()
	})
	.expect("Default config should resolve")
}

fn write(dir: &Path, file_name: &str, contents: &str) {
	fs::write(dir.join(file_name), contents).expect("Unable to write log");
}

fn radix_summary(table: &BenchmarkTable, benchmark: &str) -> (f64, u64) {
	match table.rows[benchmark].summary {
		Some(Summary::Radix(summary)) => (summary.mean_latency, summary.total_requests),
		ref summary => panic!("Expected radix summary for {benchmark}, found {summary:?}"),
	}
}

#[test]
fn discovery_skips_other_files() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);
	write(dir.path(), "gups_dyna.log", RADIX_GUPS);
	write(dir.path(), "gups_dyna.log.png", "not a log");
	write(dir.path(), "notes.txt", "not a log");
	fs::create_dir(dir.path().join("nested_dyna.log")).unwrap();

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let benchmarks = log_files.iter().map(|log_file| log_file.benchmark.as_str()).collect::<Vec<_>>();
	assert_eq!(benchmarks, ["gups", "mcf"]);
}

#[test]
fn radix_table() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);
	write(dir.path(), "gups_dyna.log", RADIX_GUPS);
	write(dir.path(), "empty_dyna.log", RADIX_EMPTY);

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let output = Aggregator::new(&config).run(&log_files).unwrap();
	let table = output.table;

	// (4 + 200) * 10 + (1 + 14) * 5 = 2115 cycles over 15 requests
	assert_eq!(self::radix_summary(&table, "mcf"), (141.0, 15));

	// Only the last section counts, and it ends at the next `~` line
	assert_eq!(self::radix_summary(&table, "gups"), (201.0, 497));

	let (mean_latency, total_requests) = self::radix_summary(&table, "empty");
	assert!(mean_latency.is_nan());
	assert_eq!(total_requests, 0);
	assert_eq!(table.rows["empty"].error.as_deref(), Some("No requests in trace"));

	let mut csv = vec![];
	table.write_csv(&mut csv).unwrap();
	assert_eq!(
		String::from_utf8(csv).unwrap(),
		"\
Benchmark,latency,total requests,error
empty,NaN,0,No requests in trace
gups,201.0,497,
mcf,141.0,15,
"
	);
	assert!(output.issues.is_empty());
}

#[test]
fn missing_file_keeps_an_annotated_row() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);

	let config = self::config(Design::Radix);
	let log_files = [
		LogFile::from_path(&dir.path().join("mcf_dyna.log"), &config.suffix),
		LogFile::from_path(&dir.path().join("ghost_dyna.log"), &config.suffix),
	];
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	assert_eq!(self::radix_summary(&table, "mcf"), (141.0, 15));
	let ghost = &table.rows["ghost"];
	assert_eq!(ghost.summary, None);
	assert!(ghost
		.error
		.as_deref()
		.is_some_and(|error| error.contains("Unable to open log file")));
}

#[test]
fn saved_latency_starts_from_zero_for_every_file() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "a_dyna.log", ECPT_SINGLE);
	write(dir.path(), "b_dyna.log", ECPT_SINGLE);

	let config = self::config(Design::Ecpt);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	for benchmark in ["a", "b"] {
		match table.rows[benchmark].summary {
			Some(Summary::Ecpt(summary)) => {
				assert_eq!(summary.total_saved_latency, 730);
				assert_eq!(summary.mean_parallel_latency, 60.0);
			},
			ref summary => panic!("Expected ECPT summary for {benchmark}, found {summary:?}"),
		}
	}
}

#[test]
fn way_out_of_range_fails_only_its_file() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "good_dyna.log", ECPT_SINGLE);
	write(dir.path(), "bad_dyna.log", "~~~~~~ full stats with way ~~~~~~\nL1,LLC,2\t5\n");

	let config = self::config(Design::Ecpt);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	assert!(table.rows["good"].error.is_none());
	assert_eq!(table.rows["bad"].summary, None);
	assert!(table.rows["bad"].error.is_some());
}

#[test]
fn large_frequencies_are_reduced_exactly() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "huge_dyna.log", "~~~~~~~~~~~~~~~\nMEMORY,MEMORY,100000000000000000\n");
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	assert_eq!(self::radix_summary(&table, "huge"), (400.0, 100_000_000_000_000_000));
	assert_eq!(self::radix_summary(&table, "mcf"), (141.0, 15));
}

#[test]
fn request_overflow_fails_only_its_file() {
	let dir = tempfile::tempdir().unwrap();
	let log = format!("~~~~~~ full stats with way ~~~~~~\nL1,MEMORY,0\t{}\nL1,MEMORY,0\t1\n", u64::MAX);
	write(dir.path(), "huge_dyna.log", &log);
	write(dir.path(), "good_dyna.log", ECPT_SINGLE);

	let config = self::config(Design::Ecpt);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	assert_eq!(table.rows["huge"].summary, None);
	assert!(table.rows["huge"]
		.error
		.as_deref()
		.is_some_and(|error| error.contains("overflows the request count")));
	assert!(table.rows["good"].error.is_none());
}

#[test]
fn breakdown_overflow_aborts_the_run() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);
	write(dir.path(), "deep_dyna.log", "~~~~~~~~~~~~~~~\nL1,L1,L1,L1,L1,3\n");

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let err = Aggregator::new(&config).run(&log_files).unwrap_err();
	assert!(ReduceError::is_fatal_chain(&err), "Unexpected error: {err:?}");
}

#[test]
fn lenient_issues_are_tallied() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", "~~~~~~~~~~~~~~~\nL1,TLB,2\nL1,ten\nL2,3\n");

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let output = Aggregator::new(&config).run(&log_files).unwrap();

	assert_eq!(output.issues.unknown_labels, 1);
	assert_eq!(output.issues.malformed_fields, 1);

	// `L1,TLB` costs 4 twice, `L1,ten` has no requests, `L2` costs 14 thrice
	assert_eq!(self::radix_summary(&output.table, "mcf"), ((4.0 * 2.0 + 14.0 * 3.0) / 5.0, 5));
}

#[test]
fn strict_mode_fails_the_file() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", "~~~~~~~~~~~~~~~\nL1,TLB,2\n");

	let config = RunConfig::resolve(&ConfigFile::default(), Overrides {
		strict: true,
		..Overrides::default()
	})
	.unwrap();
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config).run(&log_files).unwrap().table;

	assert_eq!(table.rows["mcf"].summary, None);
	assert!(table.rows["mcf"].error.is_some());
}

#[test]
fn results_dir_receives_reports() {
	let dir = tempfile::tempdir().unwrap();
	let results_dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);
	write(dir.path(), "empty_dyna.log", RADIX_EMPTY);

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	Aggregator::new(&config)
		.with_results_dir(results_dir.path())
		.run(&log_files)
		.unwrap();

	let report = FileReport::from_path(&results_dir.path().join("mcf.json")).unwrap();
	assert_eq!(report.benchmark, "mcf");
	assert_eq!(report.preset, "default");
	assert_eq!(report.statistics.summary.total_requests(), 15);
	assert_eq!(report.statistics.histograms["latency"].frequency(204), 10);
	assert_eq!(report.statistics.histograms["latency"].frequency(15), 5);

	assert_eq!(
		fs::read_to_string(results_dir.path().join("mcf_dyna.log")).unwrap(),
		RADIX_MCF
	);
	assert!(!results_dir.path().join("empty.json").exists());
	assert!(results_dir.path().join("empty_dyna.log").exists());
}

#[test]
fn unwritable_results_dir_keeps_the_row() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "mcf_dyna.log", RADIX_MCF);

	// Note: A regular file can't hold any results
	let results_dir = dir.path().join("results");
	fs::write(&results_dir, "not a directory").unwrap();

	let config = self::config(Design::Radix);
	let log_files = aggregate::discover(dir.path(), &config.suffix, &config.exclude_extensions).unwrap();
	let table = Aggregator::new(&config)
		.with_results_dir(&results_dir)
		.run(&log_files)
		.unwrap()
		.table;

	assert_eq!(self::radix_summary(&table, "mcf"), (141.0, 15));
	assert_eq!(table.rows["mcf"].error, None);
}
