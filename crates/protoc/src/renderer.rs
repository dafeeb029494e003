//! Renders a surface [`Model`] as a proto3 file.
//!
//! Messages follow `Model::types` order and RPCs follow `Model::methods`
//! order. Each Type is emitted by the pass matching its role: parameter Types
//! are flattened, response Types are deduplicated, component Types are
//! emitted as declared. Fields are numbered 1..N after that.

use std::collections::HashSet;

use surface_model::names::{
    legalize_identifier, legalize_package_name, package_name_from_title, pascal_case,
};
use surface_model::{Method, Model, OBJECT_PLACEHOLDER, Position, Type, TypeKind, TypeRole};
use tracing::{debug, warn};

use crate::plugin::{File, Response};
use crate::proto::{EMPTY, Emit, ProtoField, ProtoMessage, ProtoRpc, ProtoType};

/// Renderer configuration.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// proto package; derived from the document title when unset.
    pub package: Option<String>,
}

#[derive(Debug)]
pub struct Renderer<'a> {
    model: &'a Model,
    package: String,
}

impl<'a> Renderer<'a> {
    pub fn new(model: &'a Model, options: RenderOptions) -> Self {
        let package = options
            .package
            .as_deref()
            .map(legalize_package_name)
            .unwrap_or_else(|| package_name_from_title(&model.name));
        Self { model, package }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Name of the one file this renderer produces.
    pub fn file_name(&self) -> String {
        format!("{}.proto", self.package)
    }

    pub fn service_name(&self) -> String {
        legalize_identifier(&pascal_case(&self.package))
    }

    /// Produce each requested file: the proto source for [`Self::file_name`]
    /// and empty data for any other name.
    pub fn render_files(&self, files: &[String]) -> Response {
        let own = self.file_name();
        let files = files
            .iter()
            .map(|name| {
                let data = if *name == own {
                    self.render().into_bytes()
                } else {
                    debug!(file = %name, "Requested file is not produced by this renderer.");
                    Vec::new()
                };
                File {
                    name: name.clone(),
                    data,
                }
            })
            .collect();
        Response {
            errors: Vec::new(),
            files,
        }
    }

    /// Render the complete proto file.
    pub fn render(&self) -> String {
        let messages = self.render_messages();
        let rpcs: Vec<ProtoRpc> = self
            .model
            .methods()
            .iter()
            .map(|m| self.render_rpc(m))
            .collect();

        let mut output = String::new();
        output.push_str("// GENERATED FILE: DO NOT EDIT!\n\n");
        output.push_str("syntax = \"proto3\";\n\n");
        output.push_str("import \"google/api/annotations.proto\";\n");
        output.push_str("import \"google/protobuf/empty.proto\";\n");
        if messages.iter().any(ProtoMessage::needs_struct_import) {
            output.push_str("import \"google/protobuf/struct.proto\";\n");
        }
        output.push('\n');
        output.push_str(&format!("package {};\n\n", self.package));

        output.push_str(&format!("service {} {{\n", self.service_name()));
        let service_body: Vec<String> = rpcs.iter().map(Emit::emit).collect();
        output.push_str(&service_body.join("\n"));
        output.push_str("}\n");

        for message in &messages {
            output.push('\n');
            output.push_str(&message.emit());
        }

        debug!(
            package = %self.package,
            messages = messages.len(),
            rpcs = rpcs.len(),
            "Rendered proto file."
        );
        output
    }

    fn render_messages(&self) -> Vec<ProtoMessage> {
        self.model
            .types()
            .iter()
            .map(|t| {
                let fields = match t.role {
                    TypeRole::Parameters => self.render_request_parameters(t).fields,
                    TypeRole::Responses => render_responses(t),
                    TypeRole::Component => render_components(t),
                };
                ProtoMessage::new(&t.name, fields)
            })
            .collect()
    }

    fn render_rpc(&self, method: &Method) -> ProtoRpc {
        let parameters = method
            .parameters_type_name
            .as_deref()
            .and_then(|name| self.model.find_type(name));
        let responses = method
            .responses_type_name
            .as_deref()
            .and_then(|name| self.model.find_type(name));

        let body = parameters.and_then(|t| self.render_request_parameters(t).body);

        ProtoRpc {
            name: legalize_identifier(&method.name),
            request: parameters.map_or_else(|| EMPTY.to_string(), |t| legalize_identifier(&t.name)),
            response: responses.map_or_else(|| EMPTY.to_string(), |t| legalize_identifier(&t.name)),
            verb: method.method.as_str().to_lowercase(),
            path: method.path.clone(),
            body,
        }
    }

    /// Fields of a parameters Type with references flattened and names made
    /// unique.
    fn render_request_parameters(&self, t: &Type) -> ParametersMessage {
        let mut fields = Vec::new();
        let mut visiting = HashSet::from([t.name.clone()]);
        self.flatten_into(t, &mut fields, &mut visiting);
        unique_parameter_fields(&t.name, fields)
    }

    /// Appends `(field, is_body)` pairs.
    fn flatten_into(
        &self,
        t: &Type,
        out: &mut Vec<(ProtoField, bool)>,
        visiting: &mut HashSet<String>,
    ) {
        for field in &t.fields {
            let outside_body = field.position.is_some_and(|p| p != Position::Body);
            if field.is_reference() && (!field.serialize || outside_body) {
                match self.model.find_type(&field.type_name) {
                    Some(target) if target.kind == TypeKind::Struct => {
                        if visiting.insert(target.name.clone()) {
                            self.flatten_into(target, out, visiting);
                            visiting.remove(&target.name);
                        } else {
                            warn!(
                                type_name = %t.name,
                                field = %field.name,
                                target = %target.name,
                                "Reference cycle while flattening parameters; skipping field."
                            );
                        }
                        continue;
                    }
                    Some(target) if target.kind == TypeKind::Scalar => {
                        if let Some(value) = target.fields.first() {
                            out.push((ProtoField::named(value, &field.name), false));
                        }
                        continue;
                    }
                    _ => {}
                }
            } else if !field.serialize {
                continue;
            }
            let is_body = field.position == Some(Position::Body);
            out.push((ProtoField::from_surface(field), is_body));
        }
    }
}

/// Flattened fields of a parameters Type and the emitted name of its body
/// field.
#[derive(Debug)]
struct ParametersMessage {
    fields: Vec<ProtoField>,
    body: Option<String>,
}

/// Drop repeated parameter names, keeping the first. A body field whose name
/// is taken is renamed to `<name>_body` instead, so the HTTP binding can still
/// point at it.
fn unique_parameter_fields(
    type_name: &str,
    entries: Vec<(ProtoField, bool)>,
) -> ParametersMessage {
    let plain: HashSet<String> = entries
        .iter()
        .filter(|(_, is_body)| !is_body)
        .map(|(field, _)| field.name.clone())
        .collect();

    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    let mut body = None;
    for (mut field, is_body) in entries {
        if is_body {
            if plain.contains(&field.name) || seen.contains(&field.name) {
                let renamed = body_field_name(&field.name, |name| {
                    plain.contains(name) || seen.contains(name)
                });
                warn!(
                    type_name,
                    field = %field.name,
                    renamed = %renamed,
                    "Body field name collides with a parameter; renaming."
                );
                field.name = renamed;
            }
            if body.is_none() {
                body = Some(field.name.clone());
            }
        } else if seen.contains(&field.name) {
            warn!(
                type_name,
                field = %field.name,
                "Duplicate parameter field; only the first is rendered."
            );
            continue;
        }
        seen.insert(field.name.clone());
        fields.push(field);
    }
    ParametersMessage { fields, body }
}

fn body_field_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let first = format!("{base}_body");
    if !taken(&first) {
        return first;
    }
    (2..)
        .map(|n| format!("{base}_body_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(first)
}

/// Response fields with duplicate names removed; the first occurrence wins
/// and keeps its position.
fn render_responses(t: &Type) -> Vec<ProtoField> {
    let mut seen = HashSet::new();
    t.fields
        .iter()
        .map(ProtoField::from_surface)
        .filter(|field| {
            let first = seen.insert(field.name.clone());
            if !first {
                debug!(type_name = %t.name, field = %field.name, "Dropping duplicate response field.");
            }
            first
        })
        .collect()
}

fn render_components(t: &Type) -> Vec<ProtoField> {
    if t.kind == TypeKind::Object {
        let content = t.content_type.as_deref().unwrap_or(OBJECT_PLACEHOLDER);
        return vec![ProtoField {
            repeated: false,
            ty: ProtoType::map_of(ProtoType::from_surface(content, None)),
            name: "additional_properties".to_string(),
            number: 0,
        }];
    }
    t.fields.iter().map(ProtoField::from_surface).collect()
}
