//! # Fabrik Inject
//!
//! Automatic dependency injection for tested objects.
//!
//! Given a tested object and the injectables declared by a test, this crate
//! wires the object's injection points: each point is matched against the
//! injectables (by type, generic arguments and optionally name), and whatever
//! no injectable satisfies is fabricated, recursively, by [`FullInjection`].
//!
//! ## Components
//!
//! - **Injectables**: named, typed candidate values, consumed at most once per pass
//! - **InjectionState**: injectable matching, consumption tracking and the
//!   tested-object / per-run / global dependency stores
//! - **FullInjection**: fabrication of missing dependencies (default
//!   constructors, unique implementations, providers, conversations, loggers)
//! - **FieldInjector**: the pass over a tested object's injection points
//!
//! Types are described statically through a [`ClassRegistry`] of
//! [`ClassDescriptor`]s rather than discovered through reflection.
//!
//! ## Example
//!
//! ```
//! use fabrik_inject::{
//! 	ClassDescriptor, ClassRegistry, FieldDescriptor, FieldInjector, FullInjection,
//! 	GlobalDependencies, InjectionState, Instance, TypeRef,
//! };
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct OrderRepository;
//!
//! #[derive(Default)]
//! struct OrderService {
//! 	repository: Mutex<Option<Arc<OrderRepository>>>,
//! }
//!
//! let registry = Arc::new(ClassRegistry::new());
//! registry.register(
//! 	ClassDescriptor::concrete("shop::OrderRepository").default_constructor::<OrderRepository>(),
//! );
//! registry.register(
//! 	ClassDescriptor::concrete("shop::OrderService").field(
//! 		FieldDescriptor::new("repository", TypeRef::class("shop::OrderRepository")).setter(
//! 			|service: &OrderService, value: Instance| {
//! 				*service.repository.lock() = value.downcast();
//! 				Ok(())
//! 			},
//! 		),
//! 	),
//! );
//!
//! let mut state =
//! 	InjectionState::with_global_dependencies(Arc::clone(&registry), Arc::new(GlobalDependencies::new()));
//! state.build_lists_of_injectables(Instance::new("shop::OrderServiceTest", ()), &[], None);
//!
//! let injector = FieldInjector::with_full_injection(
//! 	FullInjection::builder(registry).build(),
//! 	"shop::OrderService",
//! );
//! let tested = Instance::new("shop::OrderService", OrderService::default());
//! injector
//! 	.inject_into_tested_object(&mut state, &TypeRef::class("shop::OrderService"), &tested)
//! 	.unwrap();
//!
//! let service = tested.downcast_ref::<OrderService>().unwrap();
//! assert!(service.repository.lock().is_some());
//! ```

pub mod class;
pub mod collaborators;
pub mod conversation;
pub mod cycle_detection;
pub mod error;
mod factory;
pub mod field_injection;
pub mod full_injection;
pub mod generics;
pub mod injectable;
pub mod key;
pub mod lifecycle;
pub mod logger;
pub mod provider;
pub mod registry;
pub mod settings;
pub mod state;
pub mod store;
pub mod types;

pub use class::{
	ClassDescriptor, ClassKind, Constructor, FieldDescriptor, FieldMetadata, FieldSetter, Instance,
	LifecycleHook, Nesting,
};
pub use collaborators::{PersistenceDependencies, WebContainerDependencies};
pub use conversation::Conversation;
pub use cycle_detection::{CycleError, FabricationTracker, MAX_FABRICATION_DEPTH};
pub use error::{ConstructionError, InjectionError, InjectionResult};
pub use field_injection::{FieldInjection, FieldInjector};
pub use full_injection::{FullInjection, FullInjectionBuilder};
pub use generics::GenericTypeReflection;
pub use injectable::{ConsumedInjectables, Injectable, InjectableId, ParameterRedefinitions};
pub use key::DependencyKey;
pub use lifecycle::LifecycleMethods;
pub use logger::Logger;
pub use provider::Provider;
pub use registry::ClassRegistry;
pub use settings::InjectionSettings;
pub use state::InjectionState;
pub use store::{DependencyStore, GlobalDependencies};
pub use types::{ClassName, TypeRef, TypeVariable, well_known};
