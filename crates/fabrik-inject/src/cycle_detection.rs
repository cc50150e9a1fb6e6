//! Circular dependency detection for fabrication
//!
//! Fabricating a dependency may fill its fields, which may fabricate further
//! dependencies. [`FabricationTracker`] records the keys currently being
//! fabricated so that re-entering one of them (A needs B needs A) or nesting
//! deeper than the configured limit is rejected instead of recursing forever.
//!
//! The tracker belongs to one `InjectionState` and therefore to one
//! construction pass; it is not shared between threads.

use crate::key::DependencyKey;

/// Default maximum fabrication depth.
pub const MAX_FABRICATION_DEPTH: usize = 32;

#[derive(Debug)]
pub struct FabricationTracker {
	/// Keys in fabrication order; doubles as the set for cycle checks
	path: Vec<DependencyKey>,
	max_depth: usize,
}

impl FabricationTracker {
	pub fn new(max_depth: usize) -> Self {
		Self {
			path: Vec::new(),
			max_depth,
		}
	}

	pub fn depth(&self) -> usize {
		self.path.len()
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	pub fn is_fabricating(&self, key: &DependencyKey) -> bool {
		self.path.contains(key)
	}

	/// Records the start of a fabrication.
	///
	/// Every successful call must be paired with [`FabricationTracker::end`].
	pub fn begin(&mut self, key: &DependencyKey) -> Result<(), CycleError> {
		if let Some(start) = self.path.iter().position(|entry| entry == key) {
			return Err(CycleError::CircularDependency {
				key: key.to_string(),
				path: self.cycle_path(start, key),
			});
		}

		let depth = self.path.len() + 1;
		if depth > self.max_depth {
			return Err(CycleError::MaxDepthExceeded(depth));
		}

		self.path.push(key.clone());
		Ok(())
	}

	pub fn end(&mut self, key: &DependencyKey) {
		if let Some(pos) = self.path.iter().rposition(|entry| entry == key) {
			self.path.remove(pos);
		}
	}

	pub fn clear(&mut self) {
		self.path.clear();
	}

	fn cycle_path(&self, start: usize, key: &DependencyKey) -> String {
		let cycle: Vec<String> = self.path[start..].iter().map(ToString::to_string).collect();
		format!("{} -> {}", cycle.join(" -> "), key)
	}
}

impl Default for FabricationTracker {
	fn default() -> Self {
		Self::new(MAX_FABRICATION_DEPTH)
	}
}

/// Reason a fabrication was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
	#[error("Circular dependency detected: {key}\n  Path: {path}")]
	CircularDependency {
		/// Key re-entered while still being fabricated
		key: String,
		/// Circular path (format: A -> B -> C -> A)
		path: String,
	},

	#[error("Maximum fabrication depth exceeded: {0}")]
	MaxDepthExceeded(usize),
}
