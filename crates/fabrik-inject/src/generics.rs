//! Generic type resolution
//!
//! [`GenericTypeReflection`] binds the type parameters reachable from a
//! tested type (its own parameters and those of every supertype it
//! instantiates) and uses those bindings when matching an injection point
//! against an injectable.

use crate::registry::ClassRegistry;
use crate::types::{ClassName, TypeRef, TypeVariable};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct GenericTypeReflection {
	type_arguments: HashMap<TypeVariable, TypeRef>,
}

impl GenericTypeReflection {
	/// Reflection without any bound type parameter.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Collects the type-parameter bindings implied by `tested_type`.
	///
	/// # Examples
	///
	/// ```
	/// use fabrik_inject::{ClassDescriptor, ClassRegistry, GenericTypeReflection, TypeRef};
	///
	/// let registry = ClassRegistry::new();
	/// registry.register(ClassDescriptor::concrete("app::Service").type_parameters(["E"]));
	///
	/// let tested = TypeRef::parameterized("app::Service", [TypeRef::class("app::User")]);
	/// let reflection = GenericTypeReflection::for_type(&registry, &tested);
	///
	/// assert_eq!(
	/// 	reflection.resolve(&TypeRef::variable("app::Service", "E")),
	/// 	TypeRef::class("app::User"),
	/// );
	/// ```
	pub fn for_type(registry: &ClassRegistry, tested_type: &TypeRef) -> Self {
		let mut reflection = Self::empty();
		let mut visited = HashSet::new();

		match tested_type {
			TypeRef::Class(raw) => reflection.collect(registry, raw, &[], &mut visited),
			TypeRef::Parameterized { raw, arguments } => {
				reflection.collect(registry, raw, arguments, &mut visited)
			}
			TypeRef::Variable(_) => {}
		}

		reflection
	}

	fn collect(
		&mut self,
		registry: &ClassRegistry,
		raw: &ClassName,
		arguments: &[TypeRef],
		visited: &mut HashSet<ClassName>,
	) {
		if !visited.insert(raw.clone()) {
			return;
		}
		let Some(class) = registry.get(raw) else {
			return;
		};

		for (parameter, argument) in class.declared_type_parameters().iter().zip(arguments) {
			let resolved = self.resolve(argument);
			self.type_arguments.insert(
				TypeVariable {
					owner: raw.clone(),
					name: parameter.clone(),
				},
				resolved,
			);
		}

		for supertype in class.supertypes() {
			match supertype {
				TypeRef::Class(super_raw) => self.collect(registry, super_raw, &[], visited),
				TypeRef::Parameterized {
					raw: super_raw,
					arguments: super_arguments,
				} => {
					let resolved: Vec<TypeRef> =
						super_arguments.iter().map(|arg| self.resolve(arg)).collect();
					self.collect(registry, super_raw, &resolved, visited);
				}
				TypeRef::Variable(_) => {}
			}
		}
	}

	pub fn binding(&self, variable: &TypeVariable) -> Option<&TypeRef> {
		self.type_arguments.get(variable)
	}

	/// Substitutes every bound type variable inside `ty`.
	pub fn resolve(&self, ty: &TypeRef) -> TypeRef {
		match ty {
			TypeRef::Class(_) => ty.clone(),
			TypeRef::Parameterized { raw, arguments } => TypeRef::Parameterized {
				raw: raw.clone(),
				arguments: arguments.iter().map(|arg| self.resolve(arg)).collect(),
			},
			TypeRef::Variable(variable) => self
				.type_arguments
				.get(variable)
				.cloned()
				.unwrap_or_else(|| ty.clone()),
		}
	}

	/// Whether a value declared as `realization` satisfies an injection point declared as `declaration`.
	///
	/// Raw classes match by assignability. Parameterized types require the
	/// same raw class and pairwise matching arguments. Type variables only
	/// match through a binding; an unbound variable matches nothing but itself.
	pub fn are_matching_types(
		&self,
		registry: &ClassRegistry,
		declaration: &TypeRef,
		realization: &TypeRef,
	) -> bool {
		if declaration == realization {
			return true;
		}

		let declaration = self.resolve(declaration);
		let realization = self.resolve(realization);

		match (&declaration, &realization) {
			(TypeRef::Class(declared), TypeRef::Class(realized)) => {
				registry.is_assignable_from(declared, realized)
			}
			(TypeRef::Class(declared), TypeRef::Parameterized { raw, .. }) => declared == raw,
			(
				TypeRef::Parameterized {
					raw: declared_raw,
					arguments: declared_arguments,
				},
				TypeRef::Parameterized {
					raw: realized_raw,
					arguments: realized_arguments,
				},
			) => {
				declared_raw == realized_raw
					&& declared_arguments.len() == realized_arguments.len()
					&& declared_arguments
						.iter()
						.zip(realized_arguments)
						.all(|(declared, realized)| {
							self.are_matching_types(registry, declared, realized)
						})
			}
			_ => declaration == realization,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::class::ClassDescriptor;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> ClassRegistry {
		let registry = ClassRegistry::new();
		registry.register(
			ClassDescriptor::new("app::BaseService", crate::class::ClassKind::Abstract)
				.type_parameters(["E", "ID"]),
		);
		registry.register(
			ClassDescriptor::concrete("app::UserService")
				.type_parameters(["ID"])
				.extends(TypeRef::parameterized(
					"app::BaseService",
					[
						TypeRef::class("app::User"),
						TypeRef::variable("app::UserService", "ID"),
					],
				)),
		);
		registry.register(ClassDescriptor::concrete("app::User"));
		registry.register(ClassDescriptor::concrete("app::Admin").extends(TypeRef::class("app::User")));
		registry
	}

	#[rstest]
	fn test_resolves_through_superclass_arguments(registry: ClassRegistry) {
		// Arrange
		let tested = TypeRef::parameterized("app::UserService", [TypeRef::class("std::u64")]);

		// Act
		let reflection = GenericTypeReflection::for_type(&registry, &tested);

		// Assert
		assert_eq!(
			reflection.resolve(&TypeRef::variable("app::BaseService", "E")),
			TypeRef::class("app::User")
		);
		assert_eq!(
			reflection.resolve(&TypeRef::variable("app::BaseService", "ID")),
			TypeRef::class("std::u64")
		);
	}

	#[rstest]
	fn test_same_parameter_name_in_different_classes_is_distinct(registry: ClassRegistry) {
		// Arrange
		let tested = TypeRef::parameterized("app::UserService", [TypeRef::class("std::u64")]);
		let reflection = GenericTypeReflection::for_type(&registry, &tested);

		// Act
		let unrelated = reflection.resolve(&TypeRef::variable("app::Other", "ID"));

		// Assert
		assert_eq!(unrelated, TypeRef::variable("app::Other", "ID"));
	}

	#[rstest]
	fn test_parameterized_types_match_pairwise(registry: ClassRegistry) {
		// Arrange
		let reflection = GenericTypeReflection::empty();
		let declared = TypeRef::parameterized("app::Repo", [TypeRef::class("app::User")]);
		let same = TypeRef::parameterized("app::Repo", [TypeRef::class("app::User")]);
		let subtype_argument = TypeRef::parameterized("app::Repo", [TypeRef::class("app::Admin")]);
		let other = TypeRef::parameterized("app::Repo", [TypeRef::class("app::Order")]);

		// Act & Assert
		assert!(reflection.are_matching_types(&registry, &declared, &same));
		assert!(reflection.are_matching_types(&registry, &declared, &subtype_argument));
		assert!(!reflection.are_matching_types(&registry, &declared, &other));
	}

	#[rstest]
	fn test_raw_class_matches_subclass(registry: ClassRegistry) {
		let reflection = GenericTypeReflection::empty();
		assert!(reflection.are_matching_types(
			&registry,
			&TypeRef::class("app::User"),
			&TypeRef::class("app::Admin")
		));
		assert!(!reflection.are_matching_types(
			&registry,
			&TypeRef::class("app::Admin"),
			&TypeRef::class("app::User")
		));
	}

	#[rstest]
	fn test_variable_matches_only_through_binding(registry: ClassRegistry) {
		// Arrange
		let tested = TypeRef::parameterized("app::UserService", [TypeRef::class("std::u64")]);
		let bound = GenericTypeReflection::for_type(&registry, &tested);
		let unbound = GenericTypeReflection::empty();
		let field_type = TypeRef::variable("app::BaseService", "E");

		// Act & Assert
		assert!(bound.are_matching_types(&registry, &field_type, &TypeRef::class("app::User")));
		assert!(!unbound.are_matching_types(&registry, &field_type, &TypeRef::class("app::User")));
	}
}
