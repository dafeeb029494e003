//! proto3 generation from OpenAPI 3 documents.
//!
//! [`Renderer`] turns a [`surface_model::Model`] into the text of one
//! `.proto` file. [`plugin`] adapts it to the plugin host protocol, and the
//! `protoc-gen-surface` binary exposes both on the command line.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

mod cli;
mod error;
mod logging;
pub mod plugin;
mod proto;
mod renderer;

pub use cli::run_cli;
pub use error::PluginError;
pub use logging::{LOG_ENV, init_tracing};
pub use plugin::{File, Parameter, Request, Response, Wrapper, handle_request};
pub use proto::{Emit, ProtoField, ProtoMessage, ProtoRpc, ProtoType};
pub use renderer::{RenderOptions, Renderer};
