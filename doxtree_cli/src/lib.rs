use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn documented C++ headers into a navigable documentation tree.",
	long_about = "doxtree reads C++ headers, translates their Doxygen-style doc comments into \
	              Markdown and rebuilds the nesting of namespaces, groups, types and functions \
	              into one entity tree.\n\nQuick start:\n  doxtree init   Create a doxtree.yaml \
	              file\n  doxtree check  Report parse and documentation warnings\n  doxtree tree   \
	              Print the documentation tree"
)]
pub struct DoxtreeCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize doxtree in a project by writing a starter `doxtree.yaml`.
	///
	/// If a configuration file already exists this command is a no-op and
	/// exits successfully.
	Init,
	/// Build the documentation tree and report every warning.
	///
	/// Parses all configured files, expanding configured macros and
	/// recovering from unknown ones, and prints parse errors, unresolved
	/// `@ingroup` directives and unrecognized doc comment commands.
	Check {
		/// Exit with a non-zero status code when any warning was produced.
		#[arg(long, default_value_t = false)]
		deny_warnings: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print the documentation tree as an indented outline.
	///
	/// Each line shows the entity kind, its name and the first sentence of
	/// its documentation. Hidden entities and empty namespaces are skipped.
	Tree {
		/// Output format for the tree. `json` prints the full entity tree.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
