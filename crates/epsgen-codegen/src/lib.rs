//! TypeScript declaration synthesis from EPS schemas.
//!
//! # Architecture
//!
//! ```text
//! Vec<Entity> → NamespaceTree → TypeSynthesizer → (Flattener) → CodeFormatter → eps.d.ts / eps.ts
//!                     └──────→ ServiceCode
//! ```
//!
//! - [`brace`]: closing-brace lookup used by the flattener
//! - [`tree`]: route prefixes to a nested namespace tree
//! - [`synth`]: entity and controller interfaces, the `Service` chain
//! - [`flatten`]: nested object types lifted into named interfaces
//! - [`service_code`]: runtime object literal that forwards to `request`
//! - [`pipeline`]: the whole run, with overlapping triggers coalesced
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::{NamespaceTree, TypeMapper, TypeSynthesizer};
//! use epsgen_core::Target;
//! use epsgen_schema::{Entity, Method};
//!
//! let entities = vec![Entity {
//!     prefix: "/admin/demo/goods".to_string(),
//!     name: "DemoGoodsEntity".to_string(),
//!     api: vec![Method::new("post", "/list")],
//!     ..Default::default()
//! }];
//! let tree = NamespaceTree::build(&entities, "admin");
//! let synth = TypeSynthesizer::new(Target::Admin, TypeMapper::default()).unwrap();
//!
//! let out = synth.synthesize(&entities, &tree, None).unwrap();
//! assert!(out.text.contains("list(data?: any): Promise<DemoGoodsEntity[]>;"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod brace;
pub mod flatten;
pub mod format;
pub mod mapping;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod service_code;
pub mod synth;
pub mod template_engine;
pub mod tree;

pub use brace::find_closing_brace;
pub use flatten::{Flattened, flatten, interface_to_type};
pub use format::{CodeFormatter, TabFormatter};
pub use mapping::{CustomRule, TypeMapper, TypeRule};
pub use pipeline::{EpsGenerator, GenerationContext, GenerationOutcome, GenerationReport};
pub use report::{Collision, CollisionKind};
pub use service_code::ServiceCode;
pub use synth::{Synthesized, TypeSynthesizer};
pub use template_engine::TemplateEngine;
pub use tree::{NamespaceTree, Node};
