//! Dependency keys

use crate::types::TypeRef;
use std::fmt;

/// Identity under which a resolved dependency is cached.
///
/// Equal to the declared type alone by default, or the type qualified by a
/// name (a named injection point or a persistence unit id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyKey {
	ty: TypeRef,
	qualifier: Option<String>,
}

impl DependencyKey {
	pub fn of(ty: TypeRef) -> Self {
		Self { ty, qualifier: None }
	}

	pub fn qualified(ty: TypeRef, qualifier: impl Into<String>) -> Self {
		Self {
			ty,
			qualifier: Some(qualifier.into()),
		}
	}

	pub fn ty(&self) -> &TypeRef {
		&self.ty
	}

	pub fn qualifier(&self) -> Option<&str> {
		self.qualifier.as_deref()
	}
}

impl From<TypeRef> for DependencyKey {
	fn from(ty: TypeRef) -> Self {
		Self::of(ty)
	}
}

impl fmt::Display for DependencyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.qualifier {
			Some(qualifier) => write!(f, "{}@{}", self.ty, qualifier),
			None => write!(f, "{}", self.ty),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashSet;

	#[rstest]
	fn test_qualifier_distinguishes_keys() {
		// Arrange
		let plain = DependencyKey::of(TypeRef::class("app::DataSource"));
		let primary = DependencyKey::qualified(TypeRef::class("app::DataSource"), "primary");
		let replica = DependencyKey::qualified(TypeRef::class("app::DataSource"), "replica");

		// Act
		let keys: HashSet<_> = [plain.clone(), primary.clone(), replica, primary.clone()]
			.into_iter()
			.collect();

		// Assert
		assert_eq!(keys.len(), 3);
		assert_eq!(primary.to_string(), "app::DataSource@primary");
		assert_eq!(plain.to_string(), "app::DataSource");
	}
}
