//! Surface model of an API service.
//!
//! The surface model is a flat, ordered list of Types and Methods that sits
//! between an OpenAPI 3 document and a code generator. [`build_model`] turns a
//! [`surface_openapi::Document`] into a [`Model`]; renderers only ever read the
//! model.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

mod builder;
mod error;
mod model;
pub mod names;

pub use builder::build_model;
pub use error::BuildError;
pub use model::{
    Field, FieldKind, FieldType, HttpMethod, Method, Model, OBJECT_PLACEHOLDER, Position, Type,
    TypeKind, TypeRole,
};
