//! # Types Module
//!
//! Runtime descriptors for everything a handler can declare.
//!
//! ## Overview
//!
//! Handlers are written against strict domain types, but the host framework only
//! understands its own model classes and plain scalars. Both sides are described
//! here as data so they can be inspected and rewritten at registration time:
//!
//! - [`ScalarKind`] - plain scalars (`string`, `integer`, `number`, `boolean`, any)
//! - [`PrimitiveType`] - a scalar wrapper carrying its own bounds (e.g. a
//!   positive `UserId`, a length-limited `Slug`)
//! - [`ModelClass`] - a composite "class" of one of three representations:
//!   domain object, host model, or plain record ([`ModelKind`])
//! - [`TypeRef`] - a declared type, possibly nested (`list[Pet]`,
//!   `Optional[UserId]`, `dict[str, Tag]`) or a forward reference by name
//! - [`TypeRegistry`] - the namespace forward references resolve against
//!
//! ## Identity
//!
//! Every built class gets a process-unique [`ClassId`]. The conversion caches
//! key on it, so a generated class is always found again as the very same
//! `Arc<ModelClass>`.

mod model;
mod primitive;
mod registry;
mod type_ref;

pub use model::{
    ClassId, DefaultFactory, FieldDef, FieldDefault, ModelClass, ModelClassBuilder, ModelKind,
};
pub use primitive::{Constraints, PrimitiveType, PrimitiveTypeBuilder, ScalarKind};
pub use registry::TypeRegistry;
pub use type_ref::TypeRef;
