//! Injection engine module.
//!
//! This module provides access to the type registry, the injection state,
//! full injection and the field injector.
//!
//! # Examples
//!
//! ```rust
//! use fabrik::inject::{ClassRegistry, InjectionState};
//! use std::sync::Arc;
//!
//! let state = InjectionState::new(Arc::new(ClassRegistry::new()));
//! assert!(state.injectables().is_empty());
//! ```

pub use fabrik_inject::*;
