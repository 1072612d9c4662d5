//! EPS schema model, fetching, caching, and normalization.
//!
//! The backend describes itself through an "eps" endpoint: a mapping of
//! groups to arrays of entities, each carrying its route prefix, API methods
//! and columns. This crate turns that payload (or the cached copy of it from
//! the previous run) into a normalized entity list.
//!
//! # Examples
//!
//! ```no_run
//! use epsgen_core::GeneratorConfig;
//! use epsgen_schema::{HttpTransport, SchemaNormalizer};
//!
//! # async fn example() {
//! let config = GeneratorConfig {
//!     req_url: "http://127.0.0.1:8001".to_string(),
//!     ..Default::default()
//! };
//!
//! let normalizer = SchemaNormalizer::new(HttpTransport::new(), &config);
//! let fetched = normalizer.fetch().await;
//! println!("{} entities ({:?})", fetched.entities.len(), fetched.origin);
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cache;
pub mod dictionary;
pub mod fs;
pub mod model;
pub mod normalizer;
pub mod response;
pub mod transport;

pub use dictionary::fetch_dict_keys;
pub use model::{
    Column, Entity, EntitySummary, Method, MethodDts, MethodSummary, PageQueryOp, Parameter,
    ParameterSchema, Search,
};
pub use normalizer::{FetchedSchema, SchemaNormalizer, SchemaOrigin, normalize};
pub use response::{ApiResponse, SUCCESS_CODE};
pub use transport::{HttpTransport, SchemaTransport};
