//! Type algebra used for matching injection points
//!
//! Types are plain data: a raw class, a parameterized class, or a type
//! variable declared by some class. Generic resolution lives in
//! [`crate::generics`].

use std::fmt;
use std::sync::Arc;

/// Interned identity of a class, e.g. `app::service::UserService`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(Arc<str>);

impl ClassName {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Leading `::` segment of the name.
	pub fn root_segment(&self) -> &str {
		self.0.split("::").next().unwrap_or(&self.0)
	}
}

impl fmt::Display for ClassName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ClassName {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for ClassName {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

/// A type parameter, identified by the class declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
	pub owner: ClassName,
	pub name: String,
}

impl fmt::Display for TypeVariable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// Declared type of an injection point or injectable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	/// Raw class
	Class(ClassName),
	/// Generic class applied to type arguments
	Parameterized {
		raw: ClassName,
		arguments: Vec<TypeRef>,
	},
	/// Type parameter of a generic class
	Variable(TypeVariable),
}

impl TypeRef {
	pub fn class(name: impl Into<ClassName>) -> Self {
		Self::Class(name.into())
	}

	pub fn parameterized(
		raw: impl Into<ClassName>,
		arguments: impl IntoIterator<Item = TypeRef>,
	) -> Self {
		Self::Parameterized {
			raw: raw.into(),
			arguments: arguments.into_iter().collect(),
		}
	}

	pub fn variable(owner: impl Into<ClassName>, name: impl Into<String>) -> Self {
		Self::Variable(TypeVariable {
			owner: owner.into(),
			name: name.into(),
		})
	}

	/// Erased class of this type; `None` for a type variable.
	pub fn raw_class(&self) -> Option<&ClassName> {
		match self {
			Self::Class(name) => Some(name),
			Self::Parameterized { raw, .. } => Some(raw),
			Self::Variable(_) => None,
		}
	}

	/// Whether this is `raw` parameterized with exactly one argument; returns that argument.
	pub fn single_argument_of(&self, raw_class: &ClassName) -> Option<&TypeRef> {
		match self {
			Self::Parameterized { raw, arguments } if raw == raw_class && arguments.len() == 1 => {
				arguments.first()
			}
			_ => None,
		}
	}
}

impl fmt::Display for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(name) => write!(f, "{name}"),
			Self::Parameterized { raw, arguments } => {
				write!(f, "{raw}<")?;
				for (i, argument) in arguments.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{argument}")?;
				}
				f.write_str(">")
			}
			Self::Variable(variable) => write!(f, "{variable}"),
		}
	}
}

/// Classes the engine treats specially.
pub mod well_known {
	/// Lazy provider; parameterized with the provided type.
	pub const PROVIDER: &str = "fabrik::Provider";
	/// Named logging facility.
	pub const LOGGER: &str = "fabrik::Logger";
	/// Conversation scope.
	pub const CONVERSATION: &str = "fabrik::Conversation";
	/// Web-container configuration handed to initialization methods.
	pub const SERVLET_CONFIG: &str = "fabrik::ServletConfig";
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_display_renders_nested_arguments() {
		// Arrange
		let ty = TypeRef::parameterized(
			"app::Repository",
			[
				TypeRef::class("app::User"),
				TypeRef::parameterized("app::Page", [TypeRef::variable("app::Service", "T")]),
			],
		);

		// Act
		let rendered = ty.to_string();

		// Assert
		assert_eq!(rendered, "app::Repository<app::User, app::Page<T>>");
	}

	#[rstest]
	#[case(TypeRef::class("a::B"), Some("a::B"))]
	#[case(TypeRef::parameterized("a::List", [TypeRef::class("a::B")]), Some("a::List"))]
	#[case(TypeRef::variable("a::C", "T"), None)]
	fn test_raw_class(#[case] ty: TypeRef, #[case] expected: Option<&str>) {
		assert_eq!(ty.raw_class().map(ClassName::as_str), expected);
	}

	#[rstest]
	fn test_single_argument_of_requires_matching_raw() {
		// Arrange
		let provider = ClassName::new(well_known::PROVIDER);
		let ty = TypeRef::parameterized(well_known::PROVIDER, [TypeRef::class("a::Dao")]);
		let other = TypeRef::parameterized("a::List", [TypeRef::class("a::Dao")]);

		// Act & Assert
		assert_eq!(ty.single_argument_of(&provider), Some(&TypeRef::class("a::Dao")));
		assert_eq!(other.single_argument_of(&provider), None);
	}

	#[rstest]
	fn test_root_segment() {
		assert_eq!(ClassName::new("shop::orders::OrderService").root_segment(), "shop");
		assert_eq!(ClassName::new("Standalone").root_segment(), "Standalone");
	}
}
