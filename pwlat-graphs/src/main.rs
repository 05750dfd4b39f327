//! Creates graphs from `pwlat`'s output

// Modules
mod args;

// Imports
use {
	anyhow::Context,
	args::Args,
	clap::Parser,
	gnuplot::{AutoOption, AxesCommon, Figure, LabelOption, PlotOption, Tick},
	itertools::Itertools,
	palette::{FromColor, Hsv, Srgb},
	pwlat::{compare::Comparison, data::FileReport},
	pwlat_util::logger,
	std::{fs, io, path::Path},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		args::SubCmd::Histogram(cmd_args) => {
			let report = FileReport::from_path(&cmd_args.input_file)?;
			fs::create_dir_all(&cmd_args.output_dir)
				.with_context(|| format!("Unable to create output directory {:?}", cmd_args.output_dir))?;

			let histogram_count = report.statistics.histograms.len();
			for (histogram_idx, (name, histogram)) in report.statistics.histograms.iter().enumerate() {
				if histogram.is_empty() {
					tracing::warn!(benchmark = %report.benchmark, %name, "Skipping empty histogram");
					continue;
				}

				let (latencies, frequencies): (Vec<_>, Vec<_>) = histogram
					.iter()
					.map(|(latency, frequency)| (latency as f64, frequency as f64))
					.unzip();
				let color = self::hue_color(histogram_idx, histogram_count);

				let mut fig = Figure::new();
				fig.axes2d()
					.set_title(&format!("{} ({name})", report.benchmark), &[])
					.set_x_label("Latency (cycles)", &[])
					.set_y_label("Requests", &[])
					.boxes(latencies, frequencies, &[
						PlotOption::Caption(name.as_str()),
						PlotOption::Color(color.as_str()),
					]);

				let output_path = cmd_args.output_dir.join(format!("{}-{name}.png", report.benchmark));
				self::save_figure(&mut fig, &output_path, cmd_args.size.width, cmd_args.size.height)?;
			}
		},

		args::SubCmd::Speedup(cmd_args) => {
			let rows = {
				let comparison_file = fs::File::open(&cmd_args.input_file)
					.with_context(|| format!("Unable to open comparison {:?}", cmd_args.input_file))?;
				Comparison::read_csv_rows(io::BufReader::new(comparison_file))
					.with_context(|| format!("Unable to read comparison {:?}", cmd_args.input_file))?
			};
			anyhow::ensure!(!rows.is_empty(), "Comparison {:?} has no benchmarks", cmd_args.input_file);

			let ticks = rows
				.keys()
				.enumerate()
				.map(|(idx, benchmark)| Tick::Major(idx as f64, AutoOption::Fix(benchmark.clone())))
				.collect::<Vec<_>>();
			let speedups = rows.values().map(|row| row.speedup).collect::<Vec<_>>();

			// Note: Speedups are drawn relative to `1.0`, so slowdowns point down
			let (min_speedup, max_speedup) = speedups.iter().copied().minmax().into_option().unwrap_or((1.0, 1.0));
			let color = self::hue_color(0, 1);

			let mut fig = Figure::new();
			fig.axes2d()
				.set_x_label("Benchmark", &[])
				.set_y_label("Speedup", &[])
				.set_x_ticks_custom(ticks, &[], &[LabelOption::Rotate(-45.0)])
				.set_y_range(
					AutoOption::Fix(min_speedup.min(1.0) * 0.95),
					AutoOption::Fix(max_speedup.max(1.0) * 1.05),
				)
				.boxes((0..speedups.len()).map(|idx| idx as f64), speedups, &[
					PlotOption::Caption("speedup"),
					PlotOption::Color(color.as_str()),
				]);

			self::save_figure(&mut fig, &cmd_args.output_file, cmd_args.size.width, cmd_args.size.height)?;
		},
	}

	Ok(())
}

/// Returns the `idx`-th of `count` colors evenly spread around the hue wheel, as `#rrggbb`
fn hue_color(idx: usize, count: usize) -> String {
	let hue = 360.0 * idx as f32 / count.max(1) as f32;
	let hsv: Hsv = Hsv::new(hue, 0.6, 0.8);
	let color = Srgb::from_color(hsv).into_format::<u8>();
	format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Saves a figure as a png
fn save_figure(fig: &mut Figure, path: &Path, width: u32, height: u32) -> Result<(), anyhow::Error> {
	fig.save_to_png(path, width, height)
		.map_err(|err| anyhow::anyhow!("Unable to save {path:?}: {err:?}"))?;
	tracing::info!(?path, "Saved graph");

	Ok(())
}

#[cfg(test)]
mod tests {
	#[test]
	fn hue_color_is_hex_rgb() {
		let color = super::hue_color(0, 1);
		assert_eq!(color.len(), 7);
		assert!(color.starts_with('#'));
		assert!(color[1..].chars().all(|ch| ch.is_ascii_hexdigit()));

		// Hue `0` with saturation `0.6` and value `0.8` is a reddish tone
		assert_eq!(color, "#cc5252");
	}

	#[test]
	fn hue_colors_are_distinct() {
		let colors = (0..4).map(|idx| super::hue_color(idx, 4)).collect::<Vec<_>>();
		for (idx, color) in colors.iter().enumerate() {
			assert!(!colors[idx + 1..].contains(color), "Duplicate color {color}");
		}
	}
}
