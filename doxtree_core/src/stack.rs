use crate::Entity;
use crate::InsertOutcome;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Location;

/// Half-open byte range `[start, end)` of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteRange {
	pub start: usize,
	pub end: usize,
}

impl ByteRange {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	/// The `(0, 0)` range, which unwinds the stack down to its base.
	pub fn sentinel() -> Self {
		Self::default()
	}

	pub fn is_sentinel(&self) -> bool {
		self.start == 0 && self.end == 0
	}

	/// Whether `other` lies within this range. Equal ranges contain each
	/// other.
	pub fn contains(&self, other: &ByteRange) -> bool {
		self.start <= other.start && other.end <= self.end
	}
}

/// An open entity and the range it spans.
#[derive(Debug)]
pub struct Frame {
	pub entity: Entity,
	pub range: ByteRange,
	/// Continuation indent carried between trailing doc comments.
	pub indent: usize,
}

impl Frame {
	fn new(entity: Entity, range: ByteRange) -> Self {
		Self {
			entity,
			range,
			indent: 0,
		}
	}
}

/// Stack of open entities ordered by nesting.
///
/// Parent and child relationships are inferred from byte ranges alone: a
/// frame is popped as soon as a declaration arrives that it does not contain,
/// and its entity is folded into the frame below, or into a group of the base
/// entity when it names one.
#[derive(Debug)]
pub struct ContainmentStack {
	base: Frame,
	open: Vec<Frame>,
}

impl ContainmentStack {
	/// Start a stack whose base frame holds `root` across `range`.
	pub fn new(root: Entity, range: ByteRange) -> Self {
		Self {
			base: Frame::new(root, range),
			open: Vec::new(),
		}
	}

	pub fn push(&mut self, entity: Entity, range: ByteRange) {
		self.open.push(Frame::new(entity, range));
	}

	/// Number of frames, including the base frame.
	pub fn depth(&self) -> usize {
		self.open.len() + 1
	}

	pub fn top(&self) -> &Frame {
		self.open.last().unwrap_or(&self.base)
	}

	pub fn top_mut(&mut self) -> &mut Frame {
		self.open.last_mut().unwrap_or(&mut self.base)
	}

	/// Pop and fold every frame that does not contain `range`, returning the
	/// frame left on top: the parent of a declaration spanning `range`.
	pub fn unwind(&mut self, range: ByteRange, diagnostics: &mut Diagnostics) -> &mut Frame {
		while let Some(top) = self.open.last() {
			if !range.is_sentinel() && top.range.contains(&range) {
				break;
			}

			if let Some(frame) = self.open.pop() {
				self.fold(frame.entity, diagnostics);
			}
		}

		self.top_mut()
	}

	/// Unwind completely and return the base entity.
	pub fn finish(mut self, diagnostics: &mut Diagnostics) -> Entity {
		self.unwind(ByteRange::sentinel(), diagnostics);
		self.base.entity
	}

	fn fold(&mut self, mut entity: Entity, diagnostics: &mut Diagnostics) {
		let location = Location::new(entity.start_line + 1, 1);

		if let Some(group) = entity.group.as_deref() {
			if let Some(target) = self
				.base
				.entity
				.find_group(group)
				.and_then(|path| self.base.entity.group_mut(&path))
			{
				report(target.insert(entity), location, diagnostics);
				return;
			}

			diagnostics.push(
				DiagnosticKind::UnresolvedGroup {
					group: group.to_string(),
					entity: entity.name.clone(),
				},
				location,
			);
			entity.group = None;
		}

		let outcome = self.top_mut().entity.insert(entity);
		report(outcome, location, diagnostics);
	}
}

fn report(outcome: InsertOutcome, location: Location, diagnostics: &mut Diagnostics) {
	match outcome {
		InsertOutcome::Attached => {}
		InsertOutcome::Pruned => tracing::trace!(line = location.line, "dropped undocumented entity"),
		InsertOutcome::Ignored => tracing::debug!(line = location.line, "ignored bare template"),
		InsertOutcome::Unfiled(name) => {
			diagnostics.push(DiagnosticKind::UnfiledEntity { name }, location);
		}
	}
}
