//! Injection settings
//!
//! Settings are read from TOML:
//!
//! ```toml
//! max_fabrication_depth = 16
//!
//! [bindings]
//! "shop::PaymentGateway" = "shop::FakePaymentGateway"
//! ```

use crate::cycle_detection::MAX_FABRICATION_DEPTH;
use crate::error::InjectionResult;
use crate::registry::ClassRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectionSettings {
	/// Deepest chain of nested fabrications allowed in one pass
	pub max_fabrication_depth: usize,
	/// Interface to implementation bindings used when fabricating interfaces
	pub bindings: BTreeMap<String, String>,
}

impl Default for InjectionSettings {
	fn default() -> Self {
		Self {
			max_fabrication_depth: MAX_FABRICATION_DEPTH,
			bindings: BTreeMap::new(),
		}
	}
}

impl InjectionSettings {
	pub fn from_toml_str(source: &str) -> InjectionResult<Self> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_file(path: impl AsRef<Path>) -> InjectionResult<Self> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Installs the configured bindings into `registry`.
	pub fn apply_bindings(&self, registry: &ClassRegistry) {
		for (interface, implementation) in &self.bindings {
			registry.bind(interface.as_str(), implementation.as_str());
		}
	}
}
