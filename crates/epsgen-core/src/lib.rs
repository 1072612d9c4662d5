//! Core types, configuration, and errors for the EPS type generator.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - The `Target` platform identifier and its endpoint conventions
//! - Error hierarchy with contextual information
//! - Generator configuration (`GeneratorConfig` and its sections)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod target;

pub use config::{
    DEFAULT_DIST, DEFAULT_TIMEOUT_MS, EpsConfig, GeneratorConfig, MappingRule, SvgConfig,
    TailwindConfig,
};
pub use error::{Error, Result};
pub use target::Target;
