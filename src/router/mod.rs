//! # Router Module
//!
//! The host-framework side of the bridge: route path derivation, a small
//! regex-based route table that wrapped endpoints are installed into, and the
//! response type handlers may return directly.
//!
//! ## Overview
//!
//! - [`parse_path`] turns a handler name such as `v1__models_raw` into a route
//!   path such as `/v1/{models}/raw`
//! - [`HostRouter`] is the seam registration installs endpoints through
//! - [`RouteTable`] is the reference implementation: it matches requests,
//!   binds path, query and body arguments from the endpoint's host-facing
//!   parameters, and renders handler results and errors as [`HostResponse`]s
//!
//! ## Example
//!
//! ```rust
//! use routebridge::router::RouteTable;
//!
//! let table = RouteTable::new();
//! assert!(table.is_empty());
//! assert!(table.route(&http::Method::GET, "/missing").is_none());
//! ```
//!
//! ## Status codes
//!
//! | Outcome | Status |
//! |---------|--------|
//! | handler value | 200 with the JSON body |
//! | handler returned a [`HostResponse`] | as returned |
//! | missing or unparseable argument, aggregated validation error | 422 |
//! | [`crate::error::HttpError`] | its own status |
//! | unconverted handler failure (unwrapped handlers only) | 500 |
//! | no route / wrong method | 404 / 405 |

mod core;
mod path;
mod response;
#[cfg(test)]
mod tests;

pub use core::{HostRouter, ParamVec, RouteError, RouteMatch, RouteTable, ANY_METHODS, MAX_INLINE_PARAMS};
pub use path::parse_path;
pub use response::{HeaderVec, HostResponse};
