//! Logging facility handed to tested objects
//!
//! Fields declared as [`well_known::LOGGER`](crate::types::well_known::LOGGER)
//! are never fabricated like other dependencies; they get a [`Logger`] named
//! after the tested class, which forwards to `tracing`.

use crate::class::Instance;
use crate::types::{ClassName, well_known};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
	name: String,
}

impl Logger {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn for_class(class: &ClassName) -> Self {
		Self::new(class.as_str())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn debug(&self, message: &str) {
		tracing::debug!(logger = %self.name, "{message}");
	}

	pub fn info(&self, message: &str) {
		tracing::info!(logger = %self.name, "{message}");
	}

	pub fn warning(&self, message: &str) {
		tracing::warn!(logger = %self.name, "{message}");
	}

	pub fn error(&self, message: &str) {
		tracing::error!(logger = %self.name, "{message}");
	}

	pub(crate) fn into_instance(self) -> Instance {
		Instance::new(well_known::LOGGER, self)
	}
}
