use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// The construct an [`Entity`] represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
	Root,
	Namespace,
	Group,
	Type,
	Concept,
	Template,
	Variable,
	Function,
	Operator,
	Enumerator,
	Macro,
	File,
	#[default]
	None,
}

impl EntityKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Root => "root",
			Self::Namespace => "namespace",
			Self::Group => "group",
			Self::Type => "type",
			Self::Concept => "concept",
			Self::Template => "template",
			Self::Variable => "variable",
			Self::Function => "function",
			Self::Operator => "operator",
			Self::Enumerator => "enumerator",
			Self::Macro => "macro",
			Self::File => "file",
			Self::None => "none",
		}
	}

	/// Namespaces and groups are kept even when undocumented.
	pub fn is_container(self) -> bool {
		matches!(self, Self::Namespace | Self::Group)
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What happened to an entity handed to [`Entity::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
	/// The entity is now a child (or was merged into a same-named namespace).
	Attached,
	/// The entity had no documentation and was dropped.
	Pruned,
	/// A bare template, left over from a declaration that failed to parse.
	Ignored,
	/// The entity's kind has no child collection. Carries its name.
	Unfiled(String),
}

/// Index path from an entity down through its `groups` to one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPath(Vec<usize>);

impl GroupPath {
	pub fn depth(&self) -> usize {
		self.0.len()
	}
}

/// A node of the documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entity {
	pub kind: EntityKind,
	pub name: String,
	/// Display title for groups and the root.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub title: String,
	/// Source text of the signature, without initializer, body or `;`.
	pub declaration: String,
	pub documentation: String,
	/// Explicit brief from `@brief`. See [`Entity::summary`].
	pub brief: String,
	/// Group this entity is filed under instead of its lexical parent.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group: Option<String>,
	pub hidden: bool,
	pub source_path: PathBuf,
	/// 0-indexed first line of the declaration.
	pub start_line: usize,
	/// 0-indexed last line of the declaration.
	pub end_line: usize,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub namespaces: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub groups: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub types: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub concepts: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub variables: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub functions: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub operators: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub enumerators: Vec<Entity>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub macros: Vec<Entity>,
}

/// The first sentence of a text: code spans are kept whole and the sentence
/// ends at `.`, `?` or `!` followed by whitespace or the end of the text.
static FIRST_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
	match Regex::new(r"^(?:`[^`]*`|[^`.?!]|[.?!]\S)*?[.?!](?:\s|$)") {
		Ok(regex) => regex,
		Err(error) => panic!("invalid sentence pattern: {error}"),
	}
});

impl Entity {
	pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
		Self {
			kind,
			name: name.into(),
			..Self::default()
		}
	}

	pub fn root() -> Self {
		Self::new(EntityKind::Root, "")
	}

	/// Attach `child` to this entity's collection for its kind.
	///
	/// Undocumented children are dropped unless they are namespaces or groups.
	/// A namespace with the same name as an existing one is merged into it.
	pub fn insert(&mut self, child: Entity) -> InsertOutcome {
		if child.documentation.is_empty() && !child.kind.is_container() {
			return InsertOutcome::Pruned;
		}

		let collection = match child.kind {
			EntityKind::Namespace => {
				match self.namespaces.iter_mut().find(|ns| ns.name == child.name) {
					Some(existing) => existing.merge(child),
					None => self.namespaces.push(child),
				}
				return InsertOutcome::Attached;
			}
			EntityKind::Group => {
				match self.groups.iter_mut().find(|group| group.name == child.name) {
					Some(existing) => existing.merge(child),
					None => self.groups.push(child),
				}
				return InsertOutcome::Attached;
			}
			EntityKind::Type => &mut self.types,
			EntityKind::Concept => &mut self.concepts,
			EntityKind::Variable => &mut self.variables,
			EntityKind::Function => &mut self.functions,
			EntityKind::Operator => &mut self.operators,
			EntityKind::Enumerator => &mut self.enumerators,
			EntityKind::Macro => &mut self.macros,
			EntityKind::Template => return InsertOutcome::Ignored,
			EntityKind::Root | EntityKind::File | EntityKind::None => {
				return InsertOutcome::Unfiled(child.name);
			}
		};

		collection.push(child);
		InsertOutcome::Attached
	}

	/// Unify `other` into this entity.
	///
	/// Children are combined, with nested namespaces and groups merged by
	/// name. Metadata already set on `self` wins. Hidden flags are OR-ed.
	pub fn merge(&mut self, other: Entity) {
		let Entity {
			title,
			declaration,
			documentation,
			brief,
			group,
			hidden,
			source_path,
			start_line,
			end_line,
			namespaces,
			groups,
			types,
			concepts,
			variables,
			functions,
			operators,
			enumerators,
			macros,
			..
		} = other;

		for child in namespaces.into_iter().chain(groups) {
			self.insert(child);
		}

		self.types.extend(types);
		self.concepts.extend(concepts);
		self.variables.extend(variables);
		self.functions.extend(functions);
		self.operators.extend(operators);
		self.enumerators.extend(enumerators);
		self.macros.extend(macros);

		if self.title.is_empty() {
			self.title = title;
		}
		if self.declaration.is_empty() {
			self.declaration = declaration;
		}
		if self.documentation.is_empty() {
			self.documentation = documentation;
		}
		if self.brief.is_empty() {
			self.brief = brief;
		}
		if self.group.is_none() {
			self.group = group;
		}
		if self.source_path.as_os_str().is_empty() {
			self.source_path = source_path;
			self.start_line = start_line;
			self.end_line = end_line;
		}
		self.hidden = self.hidden || hidden;
	}

	/// Fold the entity declared by a template into the template itself.
	///
	/// The result takes the templated entity's kind and name, with the
	/// template's parameter list prefixed to the declaration.
	pub fn absorb_templated(&mut self, inner: Entity) {
		if self.declaration.is_empty() {
			self.declaration = inner.declaration;
		} else if !inner.declaration.is_empty() {
			self.declaration.push(' ');
			self.declaration.push_str(&inner.declaration);
		}

		self.documentation.push_str(&inner.documentation);
		self.brief.push_str(&inner.brief);
		self.kind = inner.kind;
		self.name = inner.name;
		if self.group.is_none() {
			self.group = inner.group;
		}
		self.hidden = self.hidden || inner.hidden;
		self.end_line = self.end_line.max(inner.end_line);
	}

	/// Find the group named `name` among this entity's groups, searching
	/// immediate children before descending.
	pub fn find_group(&self, name: &str) -> Option<GroupPath> {
		fn search(groups: &[Entity], name: &str, path: &mut Vec<usize>) -> bool {
			if let Some(index) = groups.iter().position(|group| group.name == name) {
				path.push(index);
				return true;
			}

			for (index, group) in groups.iter().enumerate() {
				path.push(index);
				if search(&group.groups, name, path) {
					return true;
				}
				path.pop();
			}

			false
		}

		let mut path = Vec::new();
		search(&self.groups, name, &mut path).then_some(GroupPath(path))
	}

	/// Resolve a path returned by [`Entity::find_group`].
	pub fn group_mut(&mut self, path: &GroupPath) -> Option<&mut Entity> {
		let mut current = self;
		for &index in &path.0 {
			current = current.groups.get_mut(index)?;
		}
		Some(current)
	}

	/// The explicit brief, or else the first sentence of the documentation.
	pub fn summary(&self) -> String {
		if !self.brief.is_empty() {
			return self.brief.clone();
		}

		let flat = self.documentation.trim().replace('\n', " ");
		FIRST_SENTENCE
			.find(&flat)
			.map(|found| found.as_str().trim_end().to_string())
			.unwrap_or_default()
	}

	/// True when there is nothing to document below this entity: no leaf
	/// children and only empty namespaces and groups.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
			&& self.concepts.is_empty()
			&& self.variables.is_empty()
			&& self.functions.is_empty()
			&& self.operators.is_empty()
			&& self.enumerators.is_empty()
			&& self.macros.is_empty()
			&& self.namespaces.iter().all(Entity::is_empty)
			&& self.groups.iter().all(Entity::is_empty)
	}

	/// All children, collection by collection.
	pub fn children(&self) -> impl Iterator<Item = &Entity> {
		self.namespaces
			.iter()
			.chain(&self.groups)
			.chain(&self.types)
			.chain(&self.concepts)
			.chain(&self.variables)
			.chain(&self.functions)
			.chain(&self.operators)
			.chain(&self.enumerators)
			.chain(&self.macros)
	}

	/// The innermost descendant declared in `path` whose lines include `line`
	/// (0-indexed).
	pub fn locate(&self, path: &Path, line: usize) -> Option<&Entity> {
		self.children().find_map(|child| {
			child.locate(path, line).or_else(|| {
				(child.source_path == path && child.start_line <= line && line <= child.end_line)
					.then_some(child)
			})
		})
	}

	pub fn namespace(&self, name: &str) -> Option<&Entity> {
		self.namespaces.iter().find(|ns| ns.name == name)
	}

	pub fn group_named(&self, name: &str) -> Option<&Entity> {
		self.groups.iter().find(|group| group.name == name)
	}

	pub fn type_named(&self, name: &str) -> Option<&Entity> {
		self.types.iter().find(|ty| ty.name == name)
	}

	pub fn variable(&self, name: &str) -> Option<&Entity> {
		self.variables.iter().find(|variable| variable.name == name)
	}

	/// Overloads share a name, so every match is returned.
	pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entity> {
		self.functions.iter().filter(move |function| function.name == name)
	}

	pub fn enumerator(&self, name: &str) -> Option<&Entity> {
		self.enumerators.iter().find(|enumerator| enumerator.name == name)
	}
}
