//! # Signature Module
//!
//! Describes handlers and classifies their parameters.
//!
//! ## Flow
//!
//! 1. A handler is declared as a [`FunctionDef`]: ordered [`ParamDecl`]s, an
//!    optional return type and the callable. `#[routebridge::handler]` writes
//!    this for ordinary Rust functions.
//! 2. [`SignatureAnalyzer::analyze`] resolves forward references and produces a
//!    [`SignatureDescriptor`]: each parameter is a primitive wrapper, a domain
//!    object (routed to the body) or a pass-through value.
//! 3. [`SignatureConverter::enrich`] asks the schema bridge for the generated
//!    host classes and fills the descriptor's conversion maps.
//! 4. At call time the wrapper uses [`SignatureConverter::convert_parameter_value`]
//!    and [`SignatureConverter::convert_return_value`].
//!
//! ```rust
//! use routebridge::signature::{FunctionDef, SignatureAnalyzer};
//! use routebridge::types::{PrimitiveType, ScalarKind, TypeRef, TypeRegistry};
//! use routebridge::value::Value;
//!
//! let user_id = PrimitiveType::new("UserId", ScalarKind::Integer).minimum(1.0).build();
//! let def = FunctionDef::new("get_user", |_| Ok(Value::Null))
//!     .param("user_id", TypeRef::primitive(&user_id));
//!
//! let registry = TypeRegistry::new();
//! let sig = SignatureAnalyzer::new(&registry).analyze(&def).unwrap();
//! assert!(sig.parameters[0].is_primitive());
//! assert!(!sig.has_body_params);
//! ```

mod analyzer;
mod converter;
mod types;

pub use analyzer::SignatureAnalyzer;
pub use converter::SignatureConverter;
pub use types::{
    FunctionDef, HandlerFn, ParamDecl, ParameterDescriptor, ParameterKind, SignatureDescriptor,
};
