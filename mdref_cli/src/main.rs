use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;
use mdref_cli::MdrefCli;
use mdref_core::DocumentReport;
use mdref_core::GitCommand;
use mdref_core::MdrefError;
use mdref_core::MdrefResult;
use mdref_core::RefOptions;
use mdref_core::VcsGateway;
use mdref_core::process_directory;
use mdref_core::process_file;
use mdref_core::process_path;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
}

/// How a run ended when no usage or configuration error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
	Success,
	DocumentFailed,
}

fn main() {
	let args = MdrefCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(&args, use_color);

	let started = Instant::now();
	let result = run(&args);
	tracing::info!(elapsed_ms = started.elapsed().as_millis(), "finished");

	match result {
		Ok(RunStatus::Success) => {}
		Ok(RunStatus::DocumentFailed) => process::exit(1),
		Err(e) => {
			print_error(e);
			process::exit(2);
		}
	}
}

/// Logs go to stderr; stdout carries the document in pipe mode.
fn init_logging(args: &MdrefCli, use_color: bool) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init();
}

fn print_error(error: MdrefError) {
	let report: miette::Report = error.into();
	eprintln!("{report:?}");
}

fn run(args: &MdrefCli) -> MdrefResult<RunStatus> {
	let cwd = std::env::current_dir()?;
	let options = args.resolve_options(&cwd)?;

	let Some(input) = args.input.as_deref() else {
		return Ok(run_pipe(&options));
	};
	let Some(output) = args.output.as_deref() else {
		return Err(MdrefError::MissingOutput);
	};

	if input.is_dir() {
		run_directory(input, output, &options)
	} else {
		Ok(run_file(input, output, &options))
	}
}

fn run_pipe(options: &RefOptions) -> RunStatus {
	let stdin = io::stdin();
	let mut gateway = VcsGateway::new(GitCommand::from_options(options));
	let result = process_file(stdin.lock(), &mut gateway, options, || Ok(io::stdout().lock()));

	report_document(Path::new("<stdin>"), result, false)
}

fn run_file(input: &Path, output: &Path, options: &RefOptions) -> RunStatus {
	let result = process_path(input, output, GitCommand::from_options(options), options);

	report_document(input, result, true)
}

fn run_directory(input: &Path, output: &Path, options: &RefOptions) -> MdrefResult<RunStatus> {
	let runtime = tokio::runtime::Runtime::new()?;
	let runner_options = options.clone();
	let report = runtime.block_on(process_directory(input, output, options, move || {
		GitCommand::from_options(&runner_options)
	}))?;

	let total = report.outcomes.len();
	let stale = report.stale_count();
	let mut failed = 0;

	for outcome in report.outcomes {
		if let Err(error) = outcome.result {
			failed += 1;
			eprintln!(
				"{} {}",
				colored!("failed:", red),
				outcome.source.display()
			);
			print_error(error);
		}
	}

	let summary = format!("Processed {total} file(s): {failed} failed, {stale} stale reference(s)");
	if failed > 0 {
		println!("{}", colored!(summary, red));
		Ok(RunStatus::DocumentFailed)
	} else if stale > 0 {
		println!("{}", colored!(summary, yellow));
		Ok(RunStatus::Success)
	} else {
		println!("{}", colored!(summary, green));
		Ok(RunStatus::Success)
	}
}

/// Print the outcome of a single document. Summaries go to stdout unless it
/// carries the document itself.
fn report_document(
	source: &Path,
	result: MdrefResult<DocumentReport>,
	summary_on_stdout: bool,
) -> RunStatus {
	match result {
		Ok(report) => {
			if summary_on_stdout {
				let summary = format!(
					"Processed {}: {} reference(s), {} stale",
					source.display(),
					report.references,
					report.stale.len()
				);
				if report.has_stale() {
					println!("{}", colored!(summary, yellow));
				} else {
					println!("{}", colored!(summary, green));
				}
			}
			RunStatus::Success
		}
		Err(error) => {
			eprintln!("{} {}", colored!("failed:", red), source.display());
			print_error(error);
			RunStatus::DocumentFailed
		}
	}
}
