//! Error types for injection and fabrication

use crate::types::ClassName;

/// Error returned by user supplied constructors, setters and lifecycle hooks.
pub type ConstructionError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while building a tested object.
///
/// A dependency that simply cannot be produced (unknown type, ambiguous
/// implementation, non-instantiable class) is not an error: the engine
/// reports it as `Ok(None)` and leaves the injection point unset.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
	/// A constructor, collaborator or provider failed to create an instance
	#[error("Failed to construct an instance of {class}: {source}")]
	Construction {
		/// Class being instantiated
		class: ClassName,
		#[source]
		source: ConstructionError,
	},

	/// An initialization method of a fabricated instance failed
	#[error("Initialization method of {class} failed: {source}")]
	Lifecycle {
		/// Class whose initialization method failed
		class: ClassName,
		#[source]
		source: ConstructionError,
	},

	/// Assigning a resolved value to an injection point failed
	#[error("Could not assign injection point {field}: {source}")]
	FieldAssignment {
		/// Qualified field name (`Class.field`)
		field: String,
		#[source]
		source: ConstructionError,
	},

	/// Settings could not be parsed
	#[error("Invalid injection settings: {0}")]
	Settings(#[from] toml::de::Error),

	/// Settings file could not be read
	#[error("Could not read injection settings: {0}")]
	Io(#[from] std::io::Error),
}

impl InjectionError {
	pub(crate) fn construction(class: &ClassName, source: ConstructionError) -> Self {
		Self::Construction {
			class: class.clone(),
			source,
		}
	}
}

/// Result alias used throughout the crate.
pub type InjectionResult<T> = Result<T, InjectionError>;
