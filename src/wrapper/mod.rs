//! # Wrapper Module
//!
//! Turns an analyzed handler into an [`Endpoint`] the host framework can call
//! and introspect, and installs it into a router.
//!
//! ## Wrapper selection
//!
//! | Condition | Kind |
//! |-----------|------|
//! | nothing to convert, return is not a host response | [`WrapperKind::Original`] |
//! | host response return, no parameter conversions | [`WrapperKind::Passthrough`] |
//! | any domain-object parameter | [`WrapperKind::Body`] |
//! | otherwise | [`WrapperKind::Query`] |
//!
//! Every wrapped endpoint carries a rewritten parameter list and annotations
//! (primitive wrappers become their base scalar, domain classes their generated
//! host class) plus the original declared types for tooling that needs them.
//!
//! ## Errors at the boundary
//!
//! Host-native errors ([`crate::error::HttpError`],
//! [`crate::error::AggregatedValidationError`]) pass through untouched. Any
//! other failure, including a panic, is converted exactly once into a 400
//! client error carrying only the error's type name and message.

mod core;
mod registration;

pub use core::{create_wrapper, Endpoint, ExternalParam, RouteWrapper, WrapperKind};
pub use registration::{RouteBridge, RouteInfo};
