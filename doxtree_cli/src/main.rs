use std::path::PathBuf;
use std::process;

use clap::Parser;
use doxtree_cli::Commands;
use doxtree_cli::DoxtreeCli;
use doxtree_cli::OutputFormat;
use doxtree_core::DoxConfig;
use doxtree_core::Entity;
use doxtree_core::Project;
use doxtree_core::STARTER_CONFIG;
use doxtree_core::SourceDiagnostic;
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
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
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
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DoxtreeCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	install_tracing(&args, use_color);

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Check {
			deny_warnings,
			format,
		}) => run_check(&args, deny_warnings, format),
		Some(Commands::Tree { format }) => run_tree(&args, format),
		None => {
			eprintln!("No subcommand specified. Run `doxtree --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<doxtree_core::DoxError>() {
			Ok(dox_err) => {
				let report: miette::Report = (*dox_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `DOXTREE_LOG` takes precedence over `--verbose`.
fn install_tracing(args: &DoxtreeCli, use_color: bool) {
	let default_directive = if args.verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("DOXTREE_LOG").unwrap_or_else(|_| EnvFilter::new(default_directive));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init();
}

fn resolve_root(args: &DoxtreeCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<16} {value}");
}

fn run_init(args: &DoxtreeCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = DoxConfig::resolve_path(&root) {
		println!("Configuration already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("doxtree.yaml");
	std::fs::write(&config_path, STARTER_CONFIG)?;
	println!("Created {}", config_path.display());

	println!();
	println!("Next steps:");
	println!("  1. List your headers under `files` and your export macros under `defines`");
	println!("  2. Declare the groups that `@ingroup` refers to under `groups`");
	println!("  3. Run `doxtree check` to see parse and documentation warnings");

	Ok(())
}

fn run_check(
	args: &DoxtreeCli,
	deny_warnings: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let project = Project::build(&root)?;

	match format {
		OutputFormat::Json => {
			let diagnostics: Vec<serde_json::Value> = project
				.diagnostics
				.iter()
				.map(|diagnostic| {
					serde_json::json!({
						"file": display_file(diagnostic),
						"line": diagnostic.line,
						"column": diagnostic.column,
						"code": diagnostic.code(),
						"message": diagnostic.message(),
					})
				})
				.collect();
			let files: Vec<String> = project
				.files
				.iter()
				.map(|file| file.display().to_string())
				.collect();
			let output = serde_json::json!({
				"ok": project.diagnostics.is_empty(),
				"files": files,
				"diagnostics": diagnostics,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if args.verbose {
				print_section("Project");
				print_field(
					"config",
					project
						.config_path
						.as_deref()
						.map_or_else(|| "(defaults)".to_string(), |path| path.display().to_string()),
				);
				print_field("files", project.files.len());
				for file in &project.files {
					println!("  {}", file.display());
				}
				println!();
			}

			for diagnostic in &project.diagnostics {
				println!(
					"{}:{}:{}: {} {} [{}]",
					display_file(diagnostic),
					diagnostic.line,
					diagnostic.column,
					colored!("warning:", yellow),
					diagnostic.message(),
					diagnostic.code()
				);
			}

			let parsed = plural(project.files.len(), "file", "files");
			if project.diagnostics.is_empty() {
				println!("{}", colored!(format!("Check passed: {parsed}, no warnings."), green));
			} else {
				let warnings = plural(project.diagnostics.len(), "warning", "warnings");
				println!("Check finished: {parsed}, {warnings}.");
			}
		}
	}

	if deny_warnings && !project.diagnostics.is_empty() {
		process::exit(1);
	}

	Ok(())
}

fn run_tree(args: &DoxtreeCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let project = Project::build(&root)?;

	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&project.root)?);
		}
		OutputFormat::Text => {
			if !project.root.title.is_empty() {
				println!("{}", colored!(project.root.title, bold));
			}
			print_outline(&project.root, 0);
		}
	}

	Ok(())
}

fn print_outline(entity: &Entity, depth: usize) {
	for child in entity.children() {
		if child.hidden || (child.kind.is_container() && child.is_empty()) {
			continue;
		}

		let name = if child.name.is_empty() {
			child.declaration.as_str()
		} else {
			child.name.as_str()
		};
		let label = format!("{} {}", colored!(child.kind, bold), name);
		let summary = child.summary();
		let indent = depth * 2;

		if summary.is_empty() {
			println!("{:indent$}{label}", "");
		} else {
			println!("{:indent$}{label}: {summary}", "");
		}

		print_outline(child, depth + 1);
	}
}

/// Project-level warnings have no file. They belong to the configuration.
fn display_file(diagnostic: &SourceDiagnostic) -> String {
	if diagnostic.file.as_os_str().is_empty() {
		"doxtree".to_string()
	} else {
		diagnostic.file.display().to_string()
	}
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
	if count == 1 {
		format!("{count} {singular}")
	} else {
		format!("{count} {plural}")
	}
}
