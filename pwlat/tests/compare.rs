//! Comparison of designs from the files `pwlat` reads and writes

// Imports
use {
	pwlat::{
		compare::{AccessTable, Comparison, IpcTable, KeyMismatch},
		config::Design,
		data::EcptMetric,
		BenchmarkTable,
	},
	std::fs,
};

const ACCESS: &str = "\
Benchmark,Instructions,Memory Request,TLB Hit,TLB Hit Latency,Page Walk
gups,5000,1000,900,1,100
mcf,9000,100,50,2,50
";

const RADIX_LATENCY: &str = "\
Benchmark,latency,total requests,error
gups,49.0,100,
mcf,98.0,50,
";

const ECPT_LATENCY: &str = "\
Benchmark,avg latency max,avg latency correct,avg latency parallel CWC,avg reduction,total saved latency,total requests,error
gups,60.0,25.0,19.0,35.0,3500,100,
mcf,120.0,50.0,48.0,70.0,3500,50,
";

#[test]
fn radix_against_ecpt() {
	let dir = tempfile::tempdir().unwrap();
	let access_path = dir.path().join("access.csv");
	let radix_path = dir.path().join("radix.csv");
	let ecpt_path = dir.path().join("ecpt.csv");
	fs::write(&access_path, ACCESS).unwrap();
	fs::write(&radix_path, RADIX_LATENCY).unwrap();
	fs::write(&ecpt_path, ECPT_LATENCY).unwrap();

	let access = AccessTable::from_path(&access_path).unwrap();
	let radix = BenchmarkTable::from_path(&radix_path, Design::Radix).unwrap();
	let ecpt = BenchmarkTable::from_path(&ecpt_path, Design::Ecpt).unwrap();

	let baseline = IpcTable::new(&access, &radix, EcptMetric::Parallel).unwrap();
	let candidate = IpcTable::new(&access, &ecpt, EcptMetric::Parallel).unwrap();
	let comparison = Comparison::new(&baseline, &candidate).unwrap();

	// gups: 1000 / (900 + 100 * 50) against 1000 / (900 + 100 * 20)
	let gups = comparison.rows["gups"];
	assert_eq!(gups.baseline_ipc, 1000.0 / 5900.0);
	assert_eq!(gups.candidate_ipc, 1000.0 / 2900.0);
	assert!((gups.speedup - 5900.0 / 2900.0).abs() < 1e-12);

	// mcf: 100 / (50 * 2 + 50 * 100) against 100 / (50 * 2 + 50 * 50)
	let mcf = comparison.rows["mcf"];
	assert!((mcf.speedup - 5100.0 / 2600.0).abs() < 1e-12);

	let mean = (gups.speedup + mcf.speedup) / 2.0;
	assert!((comparison.mean_speedup - mean).abs() < 1e-12);

	let output_path = dir.path().join("comparison.csv");
	comparison.to_path(&output_path).unwrap();
	let rows = Comparison::read_csv_rows(fs::File::open(&output_path).unwrap()).unwrap();
	assert_eq!(rows, comparison.rows);
}

#[test]
fn ecpt_metric_selects_the_column() {
	let access = AccessTable::read_csv(ACCESS.as_bytes()).unwrap();
	let ecpt = BenchmarkTable::read_csv(ECPT_LATENCY.as_bytes(), Design::Ecpt).unwrap();

	let max = IpcTable::new(&access, &ecpt, EcptMetric::Max).unwrap();
	let correct = IpcTable::new(&access, &ecpt, EcptMetric::Correct).unwrap();
	assert_eq!(max.ipc["gups"], 1000.0 / (900.0 + 100.0 * 61.0));
	assert_eq!(correct.ipc["gups"], 1000.0 / (900.0 + 100.0 * 26.0));
}

#[test]
fn failed_rows_are_dropped_before_joining() {
	let access = AccessTable::read_csv(ACCESS.as_bytes()).unwrap();
	let radix = BenchmarkTable::read_csv(
		"Benchmark,latency,total requests,error\ngups,49.0,100,\nmcf,,,Unable to open log file\n".as_bytes(),
		Design::Radix,
	)
	.unwrap();

	let err = IpcTable::new(&access, &radix, EcptMetric::Parallel).unwrap_err();
	assert_eq!(err, KeyMismatch {
		only_left:  vec!["mcf".to_owned()],
		only_right: vec![],
	});
}
