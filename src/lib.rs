//! # routebridge
//!
//! **routebridge** lets route handlers be written against a strict, validated
//! domain type system while the host web framework keeps doing what it does
//! best: parsing requests, serializing responses and publishing API schemas.
//!
//! ## Overview
//!
//! A handler declares domain objects and constrained primitive wrappers. At
//! registration time routebridge inspects that declaration, synthesizes an
//! equivalent host model class for every domain class it meets, and installs a
//! wrapper whose host-facing signature only mentions types the host framework
//! understands. At request time the wrapper converts the host's parsed values
//! back into domain values, calls the handler, and projects the result into
//! plain serializable data.
//!
//! ## Architecture
//!
//! - **[`types`]** - runtime type descriptors: scalars, primitive wrappers, model
//!   classes of three kinds (domain, host, record) and declared types
//! - **[`value`]** - dynamic values and validated model instances
//! - **[`bridge`]** - the schema bridge: cached class-to-class synthesis in four
//!   directions, instance conversion, JSON-Schema and tool envelopes
//! - **[`signature`]** - handler declarations, signature analysis and enrichment
//! - **[`wrapper`]** - wrapper selection and the registration façade
//! - **[`router`]** - route path derivation and a reference host router
//! - **[`config`]**, **[`logging`]**, **[`error`]** - the ambient stack
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Router as RouteTable
//!     participant Wrapper as Endpoint wrapper
//!     participant Converter as SignatureConverter
//!     participant Bridge as SchemaBridge
//!     participant Handler
//!
//!     Client->>Router: POST /pets {"name": "rex"}
//!     Router->>Router: Bind path, query and body<br/>(host model validation)
//!     Router->>Wrapper: call(CallArgs)
//!     Wrapper->>Converter: convert_parameter_value
//!     Converter->>Bridge: host instance → domain instance
//!     Bridge-->>Converter: Pet
//!     Wrapper->>Handler: call(converted args)
//!     Handler-->>Wrapper: Pet
//!     Wrapper->>Converter: convert_return_value
//!     Converter-->>Wrapper: plain data
//!     Wrapper-->>Router: Value
//!     Router-->>Client: 200 {"name": "rex", "age": 0}
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use routebridge::{handler, RouteBridge, RouteTable};
//! use routebridge::router::HostResponse;
//!
//! /// Say hello.
//! #[handler]
//! fn greet(name: String, excited: Option<bool>) -> String {
//!     if excited.unwrap_or(false) {
//!         format!("Hello, {name}!")
//!     } else {
//!         format!("Hello, {name}")
//!     }
//! }
//!
//! let bridge = RouteBridge::new();
//! let mut table = RouteTable::new();
//! bridge.register_route_any(&mut table, &greet_def(), Some("/greet/{name}")).unwrap();
//!
//! let response: HostResponse = table.dispatch(http::Method::GET, "/greet/ann", "excited=true", None);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, "Hello, ann!");
//! ```
//!
//! ## Caching
//!
//! Every synthesized class, JSON-Schema and compiled validator is cached in the
//! [`SchemaBridge`] that produced it. The process-wide bridge
//! ([`SchemaBridge::global`]) is built from the environment on first use; tests
//! and embedders that need isolation create their own.

// Lets the handler macro's `::routebridge::` paths resolve inside this crate.
extern crate self as routebridge;

pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod router;
pub mod signature;
pub mod types;
pub mod value;
pub mod wrapper;

pub use bridge::{Direction, SchemaBridge, ToolFormat};
pub use config::BridgeConfig;
pub use error::{HandlerError, HttpError, RegistrationError};
pub use router::{HostResponse, HostRouter, RouteTable};
pub use routebridge_macros::handler;
pub use signature::FunctionDef;
pub use wrapper::{Endpoint, RouteBridge, RouteInfo, WrapperKind};
