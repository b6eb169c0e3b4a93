use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DoxError;
use crate::DoxResult;
use crate::Entity;
use crate::EntityKind;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;
use crate::preprocess::Defines;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 4] =
	["doxtree.yaml", "doxtree.yml", "doxtree.toml", "doxtree.json"];

/// File patterns used when the configuration does not list any.
pub const DEFAULT_FILE_PATTERNS: [&str; 4] = ["*.hpp", "**/*.hpp", "*.h", "**/*.h"];

/// Written by `doxtree init`.
pub const STARTER_CONFIG: &str = r#"title: Untitled
description: ""

# Source files to document. `*` stays within a directory, `**` crosses them.
files:
  - "*.hpp"
  - "**/*.hpp"
  - "*.h"
  - "**/*.h"

# Gitignore-style patterns to leave out.
exclude: []

# Macros to expand before parsing, e.g. export annotations.
defines: {}

# Groups that `@ingroup` can refer to.
groups: []
"#;

/// A documentation group declared in the configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GroupConfig {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub description: String,
	/// Subgroups.
	#[serde(default)]
	pub groups: Vec<GroupConfig>,
}

/// Configuration loaded from `doxtree.yaml` (or `.yml`, `.toml`, `.json`).
///
/// ```yaml
/// title: Widgets
/// files:
///   - "include/**/*.hpp"
/// exclude:
///   - "include/detail/"
/// defines:
///   WIDGETS_API: ""
/// groups:
///   - name: widgets
///     title: Widgets
///     groups:
///       - name: buttons
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DoxConfig {
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub description: String,
	/// Glob patterns, relative to the project root, of files to parse.
	#[serde(default = "default_files")]
	pub files: Vec<String>,
	/// Gitignore-style patterns of files and directories to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// Macros expanded before parsing.
	#[serde(default)]
	pub defines: Defines,
	#[serde(default)]
	pub groups: Vec<GroupConfig>,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

fn default_files() -> Vec<String> {
	DEFAULT_FILE_PATTERNS.iter().map(ToString::to_string).collect()
}

impl Default for DoxConfig {
	fn default() -> Self {
		Self {
			title: String::new(),
			description: String::new(),
			files: default_files(),
			exclude: Vec::new(),
			defines: Defines::new(),
			groups: Vec::new(),
			disable_gitignore: false,
		}
	}
}

impl DoxConfig {
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	pub fn load(root: &Path) -> DoxResult<Option<DoxConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let format = config_path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or_default();

		Self::parse(&content, format).map(Some)
	}

	/// Parse `content` written in `format` (a file extension).
	pub fn parse(content: &str, format: &str) -> DoxResult<DoxConfig> {
		match format {
			"yaml" | "yml" => {
				serde_yaml_ng::from_str(content).map_err(|e| DoxError::ConfigParse(e.to_string()))
			}
			"toml" => toml::from_str(content).map_err(|e| DoxError::ConfigParse(e.to_string())),
			"json" => serde_json::from_str(content).map_err(|e| DoxError::ConfigParse(e.to_string())),
			other => Err(DoxError::UnsupportedConfigFormat(other.to_string())),
		}
	}

	/// A root entity carrying the project title and description, with the
	/// configured group tree in place so `@ingroup` can find it.
	pub fn root_entity(&self, diagnostics: &mut Diagnostics) -> Entity {
		let mut root = Entity::root();
		root.title.clone_from(&self.title);
		root.documentation.clone_from(&self.description);

		for group in &self.groups {
			if let Some(entity) = group_entity(group, diagnostics) {
				root.insert(entity);
			}
		}

		root
	}
}

fn group_entity(config: &GroupConfig, diagnostics: &mut Diagnostics) -> Option<Entity> {
	if config.name.is_empty() {
		diagnostics.push(DiagnosticKind::MissingGroupName, Location::new(1, 1));
		return None;
	}

	let mut group = Entity::new(EntityKind::Group, config.name.as_str());
	group.title.clone_from(&config.title);
	group.documentation.clone_from(&config.description);

	for child in &config.groups {
		if let Some(entity) = group_entity(child, diagnostics) {
			group.insert(entity);
		}
	}

	Some(group)
}
