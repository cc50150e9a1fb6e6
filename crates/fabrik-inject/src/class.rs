//! Class metadata and runtime instances
//!
//! A [`ClassDescriptor`] is the statically declared stand-in for runtime
//! reflection: it tells the engine what kind of type a class is, which
//! supertypes it has, how to build it and which fields accept injection.

use crate::error::ConstructionError;
use crate::types::{ClassName, TypeRef};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A fabricated or supplied value, tagged with its concrete class.
#[derive(Clone)]
pub struct Instance {
	class: ClassName,
	value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
	pub fn new<T: Any + Send + Sync>(class: impl Into<ClassName>, value: T) -> Self {
		Self {
			class: class.into(),
			value: Arc::new(value),
		}
	}

	pub fn from_arc<T: Any + Send + Sync>(class: impl Into<ClassName>, value: Arc<T>) -> Self {
		Self {
			class: class.into(),
			value,
		}
	}

	/// Concrete class of the value.
	pub fn class_name(&self) -> &ClassName {
		&self.class
	}

	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.value.clone().downcast::<T>().ok()
	}

	pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	/// Identity comparison.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("class", &self.class)
			.field("addr", &Arc::as_ptr(&self.value).cast::<()>())
			.finish()
	}
}

/// Kind of declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
	Concrete,
	Interface,
	Abstract,
	Enum,
	Annotation,
	Primitive,
	Array,
}

/// Where a class is declared relative to its enclosing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
	#[default]
	TopLevel,
	/// Nested class without access to an enclosing instance
	StaticMember,
	/// Nested class bound to an enclosing instance
	InnerMember,
}

pub type Constructor = Arc<dyn Fn() -> Result<Instance, ConstructionError> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&Instance, Instance) -> Result<(), ConstructionError> + Send + Sync>;
pub type LifecycleHook =
	Arc<dyn Fn(&Instance, Option<&Instance>) -> Result<(), ConstructionError> + Send + Sync>;

fn wrong_target(expected: &'static str, actual: &ClassName) -> ConstructionError {
	format!("expected an instance of {expected}, found {actual}").into()
}

/// Metadata item attached to a field, e.g. a persistence-context declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
	pub kind: String,
	pub attributes: Vec<(String, String)>,
}

impl FieldMetadata {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			attributes: Vec::new(),
		}
	}

	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push((name.into(), value.into()));
		self
	}

	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}
}

/// An injection point declared by a class.
#[derive(Clone)]
pub struct FieldDescriptor {
	name: String,
	declaring_class: ClassName,
	declared_type: TypeRef,
	qualifier: Option<String>,
	metadata: Vec<FieldMetadata>,
	setter: Option<FieldSetter>,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, declared_type: TypeRef) -> Self {
		Self {
			name: name.into(),
			declaring_class: ClassName::new(""),
			declared_type,
			qualifier: None,
			metadata: Vec::new(),
			setter: None,
		}
	}

	/// Name the field must be injected by.
	pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
		self.qualifier = Some(qualifier.into());
		self
	}

	pub fn metadata(mut self, item: FieldMetadata) -> Self {
		self.metadata.push(item);
		self
	}

	/// Installs the assignment used when a value is injected.
	///
	/// The target instance is downcast to `T` before `assign` runs.
	pub fn setter<T, F>(mut self, assign: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&T, Instance) -> Result<(), ConstructionError> + Send + Sync + 'static,
	{
		self.setter = Some(Arc::new(move |target: &Instance, value: Instance| {
			let typed = target
				.downcast_ref::<T>()
				.ok_or_else(|| wrong_target(std::any::type_name::<T>(), target.class_name()))?;
			assign(typed, value)
		}));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn declaring_class(&self) -> &ClassName {
		&self.declaring_class
	}

	pub fn declared_type(&self) -> &TypeRef {
		&self.declared_type
	}

	pub fn qualified_name(&self) -> Option<&str> {
		self.qualifier.as_deref()
	}

	pub fn metadata_items(&self) -> &[FieldMetadata] {
		&self.metadata
	}

	pub fn is_assignable(&self) -> bool {
		self.setter.is_some()
	}

	/// Assigns `value` to this field of `target`; fields without a setter are left alone.
	pub fn assign(&self, target: &Instance, value: Instance) -> Result<(), ConstructionError> {
		match &self.setter {
			Some(setter) => setter(target, value),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("name", &self.name)
			.field("declaring_class", &self.declaring_class)
			.field("declared_type", &self.declared_type)
			.field("qualifier", &self.qualifier)
			.finish_non_exhaustive()
	}
}

/// Static description of a class.
///
/// # Examples
///
/// ```
/// use fabrik_inject::{ClassDescriptor, FieldDescriptor, TypeRef};
///
/// #[derive(Default)]
/// struct AuditLog;
///
/// let class = ClassDescriptor::concrete("shop::AuditLog")
/// 	.implements(TypeRef::class("shop::Log"))
/// 	.default_constructor::<AuditLog>();
///
/// assert!(class.is_instantiable());
/// assert!(class.has_default_constructor());
/// ```
#[derive(Clone)]
pub struct ClassDescriptor {
	name: ClassName,
	kind: ClassKind,
	nesting: Nesting,
	module: Option<String>,
	supertypes: Vec<TypeRef>,
	type_parameters: Vec<String>,
	singleton: bool,
	constructor: Option<Constructor>,
	fields: Vec<FieldDescriptor>,
	initialization_methods: Vec<LifecycleHook>,
}

impl ClassDescriptor {
	pub fn new(name: impl Into<ClassName>, kind: ClassKind) -> Self {
		Self {
			name: name.into(),
			kind,
			nesting: Nesting::TopLevel,
			module: None,
			supertypes: Vec::new(),
			type_parameters: Vec::new(),
			singleton: false,
			constructor: None,
			fields: Vec::new(),
			initialization_methods: Vec::new(),
		}
	}

	pub fn concrete(name: impl Into<ClassName>) -> Self {
		Self::new(name, ClassKind::Concrete)
	}

	pub fn interface(name: impl Into<ClassName>) -> Self {
		Self::new(name, ClassKind::Interface)
	}

	pub fn nesting(mut self, nesting: Nesting) -> Self {
		self.nesting = nesting;
		self
	}

	/// Code module the class belongs to; defaults to the root segment of its name.
	pub fn module(mut self, module: impl Into<String>) -> Self {
		self.module = Some(module.into());
		self
	}

	pub fn extends(mut self, superclass: TypeRef) -> Self {
		self.supertypes.push(superclass);
		self
	}

	pub fn implements(mut self, interface: TypeRef) -> Self {
		self.supertypes.push(interface);
		self
	}

	pub fn type_parameters<I, S>(mut self, parameters: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.type_parameters = parameters.into_iter().map(Into::into).collect();
		self
	}

	/// Marks the class as singleton-scoped.
	pub fn singleton(mut self) -> Self {
		self.singleton = true;
		self
	}

	pub fn constructor<T, F>(mut self, factory: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> Result<T, ConstructionError> + Send + Sync + 'static,
	{
		let class = self.name.clone();
		self.constructor = Some(Arc::new(move || {
			factory().map(|value| Instance::new(class.clone(), value))
		}));
		self
	}

	pub fn default_constructor<T>(self) -> Self
	where
		T: Any + Default + Send + Sync,
	{
		self.constructor(|| Ok(T::default()))
	}

	pub fn field(mut self, mut field: FieldDescriptor) -> Self {
		field.declaring_class = self.name.clone();
		self.fields.push(field);
		self
	}

	pub fn initialization_method<T, F>(mut self, hook: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&T, Option<&Instance>) -> Result<(), ConstructionError> + Send + Sync + 'static,
	{
		self.initialization_methods.push(Arc::new(
			move |instance: &Instance, servlet_config: Option<&Instance>| {
				let typed = instance.downcast_ref::<T>().ok_or_else(|| {
					wrong_target(std::any::type_name::<T>(), instance.class_name())
				})?;
				hook(typed, servlet_config)
			},
		));
		self
	}

	pub fn name(&self) -> &ClassName {
		&self.name
	}

	pub fn kind(&self) -> ClassKind {
		self.kind
	}

	pub fn is_interface(&self) -> bool {
		self.kind == ClassKind::Interface
	}

	pub fn is_singleton(&self) -> bool {
		self.singleton
	}

	pub fn declared_module(&self) -> Option<&str> {
		self.module.as_deref()
	}

	pub fn supertypes(&self) -> &[TypeRef] {
		&self.supertypes
	}

	pub fn declared_type_parameters(&self) -> &[String] {
		&self.type_parameters
	}

	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	pub fn initialization_methods(&self) -> &[LifecycleHook] {
		&self.initialization_methods
	}

	pub fn has_default_constructor(&self) -> bool {
		self.constructor.is_some()
	}

	/// Whether the engine may ever fabricate a value declared with this type.
	///
	/// Interfaces qualify since an implementation may be found for them.
	pub fn is_instantiable(&self) -> bool {
		match self.kind {
			ClassKind::Interface => true,
			ClassKind::Concrete => self.nesting != Nesting::InnerMember,
			ClassKind::Abstract
			| ClassKind::Enum
			| ClassKind::Annotation
			| ClassKind::Primitive
			| ClassKind::Array => false,
		}
	}

	/// Invokes the default constructor; `None` when the class has none.
	pub fn new_instance_using_default_constructor_if_available(
		&self,
	) -> Option<Result<Instance, ConstructionError>> {
		self.constructor.as_ref().map(|construct| construct())
	}
}

impl fmt::Debug for ClassDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassDescriptor")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("nesting", &self.nesting)
			.field("module", &self.module)
			.field("supertypes", &self.supertypes)
			.field("singleton", &self.singleton)
			.field("fields", &self.fields)
			.finish_non_exhaustive()
	}
}
