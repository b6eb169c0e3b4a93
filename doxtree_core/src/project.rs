use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DoxConfig;
use crate::DoxError;
use crate::DoxResult;
use crate::Entity;
use crate::SourceParser;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::diagnostics::SourceDiagnostic;

/// A fully assembled documentation tree for one project root.
#[derive(Debug)]
pub struct Project {
	/// The root entity, holding every file's declarations.
	pub root: Entity,
	/// Parsed files, relative to the project root, in parse order.
	pub files: Vec<PathBuf>,
	/// Warnings from the whole run.
	pub diagnostics: Vec<SourceDiagnostic>,
	/// The configuration file that was used, if any.
	pub config_path: Option<PathBuf>,
}

impl Project {
	/// Load the configuration found at `root` (or the defaults) and build the
	/// project.
	pub fn build(root: &Path) -> DoxResult<Project> {
		let config = DoxConfig::load(root)?.unwrap_or_default();
		Self::build_with_config(root, &config)
	}

	/// Parse every configured file under `root` in sorted order and merge the
	/// results into one entity tree.
	pub fn build_with_config(root: &Path, config: &DoxConfig) -> DoxResult<Project> {
		let mut diagnostics = Diagnostics::new();
		let config_path = DoxConfig::resolve_path(root);
		if let Some(path) = &config_path {
			diagnostics.set_file(make_relative(root, path));
		}

		let mut entity = config.root_entity(&mut diagnostics);
		let files = collect_files(root, config, &mut diagnostics)?;
		let mut parser = SourceParser::new()?;

		for file in &files {
			let relative = make_relative(root, file);
			match std::fs::read_to_string(file) {
				Ok(text) => parser.parse_text(relative, &text, &config.defines, &mut entity, &mut diagnostics),
				Err(error) => {
					diagnostics.set_file(relative);
					diagnostics.push(
						DiagnosticKind::UnparsableFile {
							reason: error.to_string(),
						},
						Location::new(1, 1),
					);
				}
			}
		}

		tracing::debug!(
			files = files.len(),
			diagnostics = diagnostics.len(),
			"project built"
		);

		Ok(Project {
			root: entity,
			files: files.iter().map(|file| make_relative(root, file).to_path_buf()).collect(),
			diagnostics: diagnostics.into_entries(),
			config_path,
		})
	}

	/// The innermost entity declared at `line` (0-indexed) of `path`, which is
	/// relative to the project root.
	pub fn locate(&self, path: &Path, line: usize) -> Option<&Entity> {
		self.root.locate(path, line)
	}
}

fn make_relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
	path.strip_prefix(root).unwrap_or(path)
}

/// Collect the files under `root` that match the configured `files`
/// patterns, minus gitignored and excluded paths, sorted.
///
/// A pattern without wildcards that matches nothing is reported.
pub fn collect_files(root: &Path, config: &DoxConfig, diagnostics: &mut Diagnostics) -> DoxResult<Vec<PathBuf>> {
	let include = build_glob_set(&config.files)?;
	let gitignore = if config.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &config.exclude)?;

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walk_dir(
		root,
		root,
		&include,
		&gitignore,
		&custom_exclude,
		&mut visited_dirs,
		&mut files,
	)?;
	files.sort();
	files.dedup();

	for pattern in &config.files {
		if pattern.contains(['*', '?', '[', '{']) {
			continue;
		}

		if !files.iter().any(|file| make_relative(root, file) == Path::new(pattern)) {
			diagnostics.push(
				DiagnosticKind::UnmatchedFilePattern {
					pattern: pattern.clone(),
				},
				Location::new(1, 1),
			);
		}
	}

	Ok(files)
}

/// Build a `GlobSet` in which `*` does not cross directory separators.
fn build_glob_set(patterns: &[String]) -> DoxResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = GlobBuilder::new(pattern)
			.literal_separator(true)
			.build()
			.map_err(|e| {
				DoxError::InvalidGlob {
					pattern: pattern.clone(),
					reason: e.to_string(),
				}
			})?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		DoxError::InvalidGlob {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the `exclude` patterns, which follow
/// `.gitignore` syntax and apply on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> DoxResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			DoxError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| DoxError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(path = %gitignore_path.display(), "ignoring unreadable .gitignore: {error}");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	root: &Path,
	dir: &Path,
	include: &GlobSet,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
	files: &mut Vec<PathBuf>,
) -> DoxResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Symlink cycles are walked once.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		tracing::debug!(dir = %dir.display(), "skipping directory already visited");
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) {
				continue;
			}
		}

		let is_dir = path.is_dir();
		if gitignore.matched(&path, is_dir).is_ignore() || custom_exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(
				root,
				&path,
				include,
				gitignore,
				custom_exclude,
				visited_dirs,
				files,
			)?;
		} else if include.is_match(make_relative(root, &path)) {
			files.push(path);
		}
	}

	Ok(())
}
