//! Plugin host protocol.
//!
//! The host writes an encoded [`Request`] carrying the raw OpenAPI document
//! and reads back an encoded [`Response`] with the generated files. Failures
//! are reported inside the response, never by crashing.

use std::io::{Read, Write};

use prost::Message;
use surface_model::Model;
use surface_model::names::{legalize_package_name, package_name_from_title};
use surface_openapi::Document;
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::renderer::{RenderOptions, Renderer};

/// Plugin parameter naming the proto package.
pub const PACKAGE_PARAMETER: &str = "package";

#[derive(Clone, PartialEq, Message)]
pub struct Request {
    #[prost(message, optional, tag = "1")]
    pub wrapper: Option<Wrapper>,
    #[prost(string, tag = "2")]
    pub output_path: String,
    #[prost(message, repeated, tag = "3")]
    pub parameters: Vec<Parameter>,
    #[prost(string, tag = "4")]
    pub source_name: String,
}

/// The source document as the host read it.
#[derive(Clone, PartialEq, Message)]
pub struct Wrapper {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub version: String,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Parameter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Response {
    #[prost(string, repeated, tag = "1")]
    pub errors: Vec<String>,
    #[prost(message, repeated, tag = "2")]
    pub files: Vec<File>,
}

#[derive(Clone, PartialEq, Message)]
pub struct File {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl Request {
    /// Value of the first parameter called `name`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            package: self
                .parameter(PACKAGE_PARAMETER)
                .filter(|package| !package.is_empty())
                .map(str::to_string),
        }
    }
}

/// Generate `files` for a request. An empty list means `<package>.proto`.
///
/// Errors are appended to `Response::errors` as `ERROR <message>`, and every
/// requested file is still listed with empty data.
pub fn handle_request(request: &Request, files: &[String]) -> Response {
    let options = request.render_options();
    match build(request) {
        Ok(model) => {
            let renderer = Renderer::new(&model, options);
            let requested = if files.is_empty() {
                vec![renderer.file_name()]
            } else {
                files.to_vec()
            };
            renderer.render_files(&requested)
        }
        Err(err) => {
            warn!(error = %err, "Failed to generate proto file.");
            let requested = if files.is_empty() {
                vec![fallback_file_name(request, &options)]
            } else {
                files.to_vec()
            };
            Response {
                errors: vec![format!("ERROR {err}")],
                files: requested
                    .into_iter()
                    .map(|name| File {
                        name,
                        data: Vec::new(),
                    })
                    .collect(),
            }
        }
    }
}

fn build(request: &Request) -> Result<Model, PluginError> {
    let wrapper = request.wrapper.as_ref().ok_or(PluginError::MissingDocument)?;
    debug!(
        source = %request.source_name,
        name = %wrapper.name,
        version = %wrapper.version,
        bytes = wrapper.value.len(),
        "Building surface model from plugin request."
    );
    let document = Document::from_slice(&wrapper.value)?;
    Ok(Model::from_openapi(&document)?)
}

/// File name used in the response when the document could not be built.
fn fallback_file_name(request: &Request, options: &RenderOptions) -> String {
    let package = options.package.as_deref().map_or_else(
        || {
            let stem = std::path::Path::new(&request.source_name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            package_name_from_title(stem)
        },
        legalize_package_name,
    );
    format!("{package}.proto")
}

/// Read one request from `input`, handle it and write the response to
/// `output`.
pub fn run<R: Read, W: Write>(mut input: R, mut output: W) -> Result<Response, PluginError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let request = Request::decode(bytes.as_slice())?;

    let response = handle_request(&request, &[]);
    output.write_all(&response.encode_to_vec())?;
    output.flush()?;
    Ok(response)
}
