//! # Fabrik
//!
//! Automatic dependency injection for tested objects.
//!
//! A test declares injectables (named, typed values, usually mocks) and a
//! tested object; Fabrik assigns each of the tested object's injection
//! points from the matching injectable and, when full injection is enabled,
//! fabricates whatever no injectable satisfies, recursing into the fabricated
//! objects' own injection points.
//!
//! ## Crates
//!
//! - [`inject`] (`fabrik-inject`) - type registry, injection state, full
//!   injection and the field injector
//!
//! ## Quick Start
//!
//! ```
//! use fabrik::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! let registry = Arc::new(ClassRegistry::new());
//! registry.register(ClassDescriptor::concrete("app::Clock").default_constructor::<Clock>());
//!
//! let mut state =
//! 	InjectionState::with_global_dependencies(Arc::clone(&registry), Arc::new(GlobalDependencies::new()));
//! state.build_lists_of_injectables(Instance::new("app::ClockTest", ()), &[], None);
//!
//! let injector = FieldInjector::with_full_injection(FullInjection::builder(registry).build(), "app::Clock");
//! let clock = Instance::new("app::Clock", Clock);
//! injector
//! 	.inject_into_tested_object(&mut state, &TypeRef::class("app::Clock"), &clock)
//! 	.unwrap();
//! ```

pub mod inject;

pub use fabrik_inject::{
	ClassDescriptor, ClassRegistry, FieldDescriptor, FieldInjector, FullInjection, Injectable,
	InjectionError, InjectionResult, InjectionSettings, InjectionState, Instance, TypeRef,
};

/// Re-exports for the common case of wiring a tested object.
pub mod prelude {
	pub use crate::inject::{
		ClassDescriptor, ClassKind, ClassRegistry, DependencyKey, FieldDescriptor, FieldInjector,
		FullInjection, GlobalDependencies, Injectable, InjectionError, InjectionResult,
		InjectionSettings, InjectionState, Instance, TypeRef, well_known,
	};
}
