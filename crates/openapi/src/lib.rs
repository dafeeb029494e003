//! Typed OpenAPI 3.0 document tree.
//!
//! This crate defines the subset of the OpenAPI 3.0 object model that the
//! surface builder consumes. Every map keeps the order in which entries appear
//! in the source document, so downstream generation is deterministic and
//! diffable. `$ref` strings are parsed into [`Reference`] values instead of
//! being sliced ad hoc by callers.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

mod document;
mod error;
mod reference;

pub use document::{
    AdditionalProperties, Components, Document, HttpMethod, Info, Items, MediaType, Operation,
    Parameter, ParameterOrReference, PathItem, RefOr, ReferenceObject, RequestBody,
    RequestBodyOrReference, Response, ResponseOrReference, Schema, SchemaOrReference, SchemaType,
};
pub use error::DocumentError;
pub use reference::{Namespace, Reference};
