//! Builds a surface [`Model`] from an OpenAPI 3 [`Document`].
//!
//! Building happens in two passes. First a [`ComponentIndex`] assigns a Type
//! name to every reusable component, so references resolve regardless of
//! declaration order. Then each step below returns the Types and Methods it
//! produced, and [`build_model`] is the single place that registers them on
//! the model, in order.
//!
//! Only a reference that cannot be resolved, or a reusable schema that is
//! nothing but a `$ref` alias, aborts the build. Everything else the builder
//! does not understand is logged and replaced by a placeholder.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use surface_openapi::{
    AdditionalProperties, Components, Document, HttpMethod, Items, Namespace, Operation,
    ParameterOrReference, PathItem, RefOr, Reference, RequestBodyOrReference, Response,
    ResponseOrReference, Schema, SchemaOrReference,
};
use tracing::{debug, warn};

use crate::error::BuildError;
use crate::model::{
    Field, FieldKind, FieldType, Method, Model, OBJECT_PLACEHOLDER, Position, Type, TypeKind,
    TypeRole,
};
use crate::names::{generate_operation_name, sanitize_operation_name};

/// Scalar schema types that map directly onto a scalar field.
const SCALAR_TYPES: [&str; 4] = ["string", "integer", "number", "boolean"];

/// Item types an array field can carry without a reference.
const ARRAY_ITEM_TYPES: [&str; 6] = ["string", "integer", "number", "boolean", "array", "object"];

/// Bound on `$ref` chains and `allOf` nesting.
const MAX_REFERENCE_DEPTH: usize = 16;

/// Build a surface model from a parsed document.
pub fn build_model(document: &Document) -> Result<Model, BuildError> {
    let builder = OpenApi3Builder::new(document)?;
    let mut model = Model::new(document.info.title.clone());

    for t in builder.build_types_from_components()? {
        model.add_type(t)?;
    }

    for (path, item) in &document.paths {
        for built in builder.build_methods_from_path_item(path, item)? {
            for t in built.types {
                model.add_type(t)?;
            }
            model.add_method(built.method)?;
        }
    }

    debug!(
        model = %model.name,
        types = model.types().len(),
        methods = model.methods().len(),
        "Built surface model."
    );
    Ok(model)
}

/// RPC name of an operation: its sanitized id, or one generated from the verb
/// and path.
fn method_name(path: &str, method: HttpMethod, op: &Operation) -> String {
    op.operation_id
        .as_deref()
        .map(sanitize_operation_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| generate_operation_name(method.as_str(), path))
}

/// Names of the `<method>Parameters` and `<method>Responses` Types the
/// operations of a document may synthesize.
fn synthesized_type_names(document: &Document) -> HashSet<String> {
    document
        .paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, op)| method_name(path, method, op))
        })
        .flat_map(|name| [format!("{name}Parameters"), format!("{name}Responses")])
        .collect()
}

/// A method together with the Types synthesized for its parameters and
/// responses, in registration order.
#[derive(Debug)]
struct BuiltMethod {
    method: Method,
    types: Vec<Type>,
}

/// Type names assigned to reusable components, keyed by namespace and
/// component name.
///
/// Schemas are registered first and keep their names. A reusable parameter
/// or request body whose name is already taken gets its namespace as a
/// suffix (`PetParameter`, `PetRequestBody`). Names reserved for synthesized
/// method Types count as taken, so a schema called `listPetsResponses` becomes
/// `listPetsResponsesSchema`.
#[derive(Debug, Default)]
struct ComponentIndex {
    names: HashMap<(Namespace, String), String>,
}

impl ComponentIndex {
    fn new(
        components: Option<&Components>,
        reserved: HashSet<String>,
    ) -> Result<Self, BuildError> {
        let mut index = Self::default();
        let Some(components) = components else {
            return Ok(index);
        };

        let mut taken = reserved;
        for name in components.schemas.keys() {
            index.register(&mut taken, Namespace::Schemas, name, "Schema")?;
        }
        for name in components.parameters.keys() {
            index.register(&mut taken, Namespace::Parameters, name, "Parameter")?;
        }
        for name in components.request_bodies.keys() {
            index.register(&mut taken, Namespace::RequestBodies, name, "RequestBody")?;
        }
        Ok(index)
    }

    fn register(
        &mut self,
        taken: &mut HashSet<String>,
        namespace: Namespace,
        name: &str,
        suffix: &str,
    ) -> Result<(), BuildError> {
        let type_name = if taken.contains(name) {
            let renamed = format!("{name}{suffix}");
            if taken.contains(&renamed) {
                return Err(BuildError::DuplicateType { name: renamed });
            }
            warn!(
                component = name,
                namespace = namespace.as_str(),
                renamed = %renamed,
                "Component name already taken; renaming."
            );
            renamed
        } else {
            name.to_string()
        };
        taken.insert(type_name.clone());
        self.names.insert((namespace, name.to_string()), type_name);
        Ok(())
    }

    fn registered(&self, namespace: Namespace, name: &str) -> String {
        self.names
            .get(&(namespace, name.to_string()))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Type name a reference resolves to.
    fn type_name(&self, reference: &Reference) -> Result<String, BuildError> {
        self.names
            .get(&(reference.namespace, reference.name.clone()))
            .cloned()
            .ok_or_else(|| BuildError::DanglingReference {
                reference: reference.raw.clone(),
            })
    }
}

#[derive(Debug)]
struct OpenApi3Builder<'a> {
    document: &'a Document,
    index: ComponentIndex,
}

impl<'a> OpenApi3Builder<'a> {
    fn new(document: &'a Document) -> Result<Self, BuildError> {
        Ok(Self {
            document,
            index: ComponentIndex::new(
                document.components.as_ref(),
                synthesized_type_names(document),
            )?,
        })
    }

    /// One Type per reusable schema, parameter and request body, in that
    /// namespace order.
    fn build_types_from_components(&self) -> Result<Vec<Type>, BuildError> {
        let mut types = Vec::new();
        let Some(components) = &self.document.components else {
            return Ok(types);
        };

        for (name, schema) in &components.schemas {
            let type_name = self.index.registered(Namespace::Schemas, name);
            types.push(self.build_type_from_schema_or_reference(&type_name, schema)?);
        }

        for (name, parameter) in &components.parameters {
            let type_name = self.index.registered(Namespace::Parameters, name);
            if let Some(t) = self.build_type_from_parameters(&type_name, &[parameter], None, true)? {
                types.push(t);
            }
        }

        for (name, request_body) in &components.request_bodies {
            let type_name = self.index.registered(Namespace::RequestBodies, name);
            types.push(self.build_type_from_request_body(&type_name, request_body, None)?);
        }

        Ok(types)
    }

    fn build_type_from_schema_or_reference(
        &self,
        name: &str,
        schema_or_reference: &SchemaOrReference,
    ) -> Result<Type, BuildError> {
        let Some(schema) = schema_or_reference.as_item() else {
            return Err(BuildError::UnresolvableSchema {
                name: name.to_string(),
            });
        };

        let properties = self.struct_properties(schema, 0)?;
        if !properties.is_empty() {
            let mut t = Type::new(name, TypeKind::Struct, TypeRole::Component)
                .with_description(format!("implements the service definition of {name}"));
            for (property_name, property) in properties {
                let field_type = self.type_for_schema_or_reference(property)?;
                t.add_field(Field::from_type(property_name, field_type));
            }
            return Ok(t);
        }

        if let Some(additional) = &schema.additional_properties {
            let content_type = self
                .additional_properties_type(additional)?
                .unwrap_or_else(|| OBJECT_PLACEHOLDER.to_string());
            let mut t = Type::new(name, TypeKind::Object, TypeRole::Component)
                .with_description(format!("implements the service definition of {name}"));
            t.content_type = Some(content_type);
            return Ok(t);
        }

        match schema.type_name() {
            Some("object") => Ok(Type::new(name, TypeKind::Struct, TypeRole::Component)
                .with_description(format!("implements the service definition of {name}"))),
            Some(kind) if SCALAR_TYPES.contains(&kind) || kind == "array" => {
                if schema.enum_values.is_some() {
                    warn!(schema = name, "unimplemented: enum values are not rendered");
                }
                let field_type = self.type_for_schema(schema)?;
                Ok(Type::new(name, TypeKind::Scalar, TypeRole::Component)
                    .with_description(format!("wraps the {kind} value of {name}"))
                    .with_field(Field::from_type("value", field_type)))
            }
            _ => {
                if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
                    warn!(
                        schema = name,
                        "unimplemented: oneOf/anyOf composition; using an untyped value"
                    );
                } else {
                    warn!(schema = name, "schema declares no shape; using an untyped value");
                }
                Ok(Type::new(name, TypeKind::Scalar, TypeRole::Component)
                    .with_description(format!("wraps the untyped value of {name}"))
                    .with_field(Field::from_type("value", FieldType::placeholder())))
            }
        }
    }

    /// Fixed properties of a schema, including those contributed by `allOf`
    /// parts. The first declaration of a property name wins.
    fn struct_properties<'s>(
        &'s self,
        schema: &'s Schema,
        depth: usize,
    ) -> Result<IndexMap<&'s str, &'s SchemaOrReference>, BuildError> {
        let mut properties = IndexMap::new();
        if depth > MAX_REFERENCE_DEPTH {
            warn!("allOf nesting too deep; ignoring remaining parts");
            return Ok(properties);
        }

        for part in &schema.all_of {
            let part_schema = match part {
                RefOr::Item(inline) => inline.as_ref(),
                RefOr::Reference(reference) => self.referenced_schema(&reference.target())?,
            };
            for (name, property) in self.struct_properties(part_schema, depth + 1)? {
                properties.entry(name).or_insert(property);
            }
        }

        if let Some(own) = &schema.properties {
            for (name, property) in own {
                properties.entry(name.as_str()).or_insert(property);
            }
        }
        Ok(properties)
    }

    /// The inline schema a `#/components/schemas/...` reference points at.
    fn referenced_schema(&self, reference: &Reference) -> Result<&'a Schema, BuildError> {
        let mut current = reference.clone();
        for _ in 0..MAX_REFERENCE_DEPTH {
            let target = self
                .document
                .components
                .as_ref()
                .filter(|_| current.namespace == Namespace::Schemas)
                .and_then(|components| components.schemas.get(&current.name))
                .ok_or_else(|| BuildError::DanglingReference {
                    reference: current.raw.clone(),
                })?;
            match target {
                RefOr::Item(schema) => return Ok(schema.as_ref()),
                RefOr::Reference(next) => current = next.target(),
            }
        }
        Err(BuildError::DanglingReference {
            reference: reference.raw.clone(),
        })
    }

    fn build_methods_from_path_item(
        &self,
        path: &str,
        item: &PathItem,
    ) -> Result<Vec<BuiltMethod>, BuildError> {
        item.operations()
            .map(|(method, op)| self.build_method_from_operation(path, item, method, op))
            .collect()
    }

    fn build_method_from_operation(
        &self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<BuiltMethod, BuildError> {
        let name = method_name(path, method, op);

        let parameters = self.merge_parameters(&item.parameters, &op.parameters);
        let mut types = Vec::new();

        let parameters_type =
            self.build_type_from_parameters(&name, &parameters, op.request_body.as_ref(), false)?;
        let parameters_type_name = parameters_type.as_ref().map(|t| t.name.clone());
        types.extend(parameters_type);

        let responses_type = self.build_type_from_responses(&name, &op.responses)?;
        let responses_type_name = responses_type.as_ref().map(|t| t.name.clone());
        types.extend(responses_type);

        let description = op
            .description
            .clone()
            .or_else(|| op.summary.clone())
            .unwrap_or_default();

        Ok(BuiltMethod {
            method: Method {
                operation: op.operation_id.clone().unwrap_or_default(),
                name,
                path: path.to_string(),
                method,
                description,
                parameters_type_name,
                responses_type_name,
            },
            types,
        })
    }

    /// Path-level parameters followed by operation-level ones; an operation
    /// parameter replaces a path parameter with the same name and location.
    fn merge_parameters<'p>(
        &self,
        path_parameters: &'p [ParameterOrReference],
        operation_parameters: &'p [ParameterOrReference],
    ) -> Vec<&'p ParameterOrReference> {
        let overridden: HashSet<(String, String)> = operation_parameters
            .iter()
            .filter_map(|p| self.parameter_key(p))
            .collect();

        path_parameters
            .iter()
            .filter(|p| {
                self.parameter_key(p)
                    .is_none_or(|key| !overridden.contains(&key))
            })
            .chain(operation_parameters)
            .collect()
    }

    /// `(in, name)` of a parameter, following one reference.
    fn parameter_key(&self, parameter: &ParameterOrReference) -> Option<(String, String)> {
        let parameter = match parameter {
            RefOr::Item(parameter) => parameter,
            RefOr::Reference(reference) => {
                let target = reference.target();
                if target.namespace != Namespace::Parameters {
                    return None;
                }
                self.document
                    .components
                    .as_ref()?
                    .parameters
                    .get(&target.name)?
                    .as_item()?
            }
        };
        Some((parameter.location.clone(), parameter.name.clone()))
    }

    /// Position of the reusable parameter a reference points at.
    fn referenced_parameter_position(&self, reference: &Reference) -> Option<Position> {
        if reference.namespace != Namespace::Parameters {
            return None;
        }
        let components = self.document.components.as_ref()?;
        let parameter = components.parameters.get(&reference.name)?.as_item()?;
        Position::from_location(&parameter.location)
    }

    /// Synthesize the parameters Type of a method (`<name>Parameters`), or of
    /// a reusable parameter (`name` as-is when `from_component`).
    ///
    /// A method's Type is `None` when no field was produced; a reusable
    /// parameter always yields its Type so references to it resolve.
    fn build_type_from_parameters(
        &self,
        name: &str,
        parameters: &[&ParameterOrReference],
        request_body: Option<&RequestBodyOrReference>,
        from_component: bool,
    ) -> Result<Option<Type>, BuildError> {
        let type_name = if from_component {
            name.to_string()
        } else {
            format!("{name}Parameters")
        };
        let mut t = Type::new(type_name.as_str(), TypeKind::Struct, TypeRole::Parameters)
            .with_description(format!("{type_name} holds parameters to {name}"));

        for parameter in parameters {
            match parameter {
                RefOr::Item(parameter) => {
                    let Some(position) = Position::from_location(&parameter.location) else {
                        warn!(
                            method = name,
                            parameter = %parameter.name,
                            location = %parameter.location,
                            "unimplemented: parameter location; skipping"
                        );
                        continue;
                    };
                    let field_type = match &parameter.schema {
                        Some(schema) => self.type_for_schema_or_reference(schema)?,
                        None => FieldType::new(FieldKind::Scalar, "string", None),
                    };
                    t.add_field(
                        Field::from_type(parameter.name.as_str(), field_type)
                            .with_position(position),
                    );
                }
                RefOr::Reference(reference) => {
                    let target = reference.target();
                    let referenced_type = self.index.type_name(&target)?;
                    let mut field = Field::new(
                        target.name.to_lowercase(),
                        FieldKind::Reference,
                        referenced_type,
                    )
                    .with_serialize(false);
                    field.position = self.referenced_parameter_position(&target);
                    t.add_field(field);
                }
            }
        }

        if let Some(request_body) = request_body {
            t = self.build_type_from_request_body(name, request_body, Some(t))?;
        }

        Ok((from_component || !t.fields.is_empty()).then_some(t))
    }

    /// Add at most one body field to `existing`, or to a new Type named
    /// `name` when there is none.
    fn build_type_from_request_body(
        &self,
        name: &str,
        request_body: &RequestBodyOrReference,
        existing: Option<Type>,
    ) -> Result<Type, BuildError> {
        let mut t = existing.unwrap_or_else(|| {
            Type::new(name, TypeKind::Struct, TypeRole::Component)
                .with_description(format!("implements the request body {name}"))
        });

        match request_body {
            RefOr::Item(body) => {
                for (media_type, content) in &body.content {
                    if !is_json_media_type(media_type) {
                        warn!(
                            method = name,
                            media_type = %media_type,
                            "unimplemented: request body media type; skipping"
                        );
                        continue;
                    }
                    let Some(schema) = &content.schema else {
                        debug!(method = name, "request body without schema; skipping");
                        continue;
                    };
                    let field_type = self.type_for_schema_or_reference(schema)?;
                    // Use the schema name as the field name, since none is specified.
                    let field_name = field_type.type_name.to_lowercase();
                    t.add_field(Field::from_type(field_name, field_type).with_position(Position::Body));
                    break;
                }
            }
            RefOr::Reference(reference) => {
                let target = reference.target();
                let referenced_type = self.index.type_name(&target)?;
                t.add_field(
                    Field::new(
                        target.name.to_lowercase(),
                        FieldKind::Reference,
                        referenced_type,
                    )
                    .with_position(Position::Body),
                );
            }
        }

        Ok(t)
    }

    /// Synthesize `<name>Responses`: one field per status code (then
    /// `default`) with JSON content, named by the status code.
    fn build_type_from_responses(
        &self,
        name: &str,
        responses: &IndexMap<String, ResponseOrReference>,
    ) -> Result<Option<Type>, BuildError> {
        let type_name = format!("{name}Responses");
        let mut t = Type::new(type_name.as_str(), TypeKind::Struct, TypeRole::Responses)
            .with_description(format!("{type_name} holds responses of {name}"));

        let explicit = responses.iter().filter(|(code, _)| code.as_str() != "default");
        let default = responses.iter().filter(|(code, _)| code.as_str() == "default");

        for (code, value) in explicit.chain(default) {
            let response = self.resolve_response(value)?;
            for (media_type, content) in &response.content {
                if !is_json_media_type(media_type) {
                    warn!(
                        method = name,
                        status = %code,
                        media_type = %media_type,
                        "unimplemented: response media type; skipping"
                    );
                    continue;
                }
                let Some(schema) = &content.schema else {
                    continue;
                };
                let field_type = self.type_for_schema_or_reference(schema)?;
                if t.field(code).is_some() {
                    warn!(
                        method = name,
                        status = %code,
                        "duplicate response field; only the first is rendered"
                    );
                }
                t.add_field(Field::from_type(code.as_str(), field_type));
            }
        }

        Ok((!t.fields.is_empty()).then_some(t))
    }

    /// Follow a response reference into `components/responses`.
    fn resolve_response<'s>(
        &'s self,
        value: &'s ResponseOrReference,
    ) -> Result<&'s Response, BuildError> {
        let mut current = value;
        for _ in 0..MAX_REFERENCE_DEPTH {
            let reference = match current {
                RefOr::Item(response) => return Ok(response),
                RefOr::Reference(reference) => reference.target(),
            };
            current = self
                .document
                .components
                .as_ref()
                .filter(|_| reference.namespace == Namespace::Responses)
                .and_then(|components| components.responses.get(&reference.name))
                .ok_or_else(|| BuildError::DanglingReference {
                    reference: reference.raw.clone(),
                })?;
        }
        Err(BuildError::DanglingReference {
            reference: value
                .as_reference()
                .map(|r| r.reference.clone())
                .unwrap_or_default(),
        })
    }

    fn type_for_schema_or_reference(
        &self,
        schema_or_reference: &SchemaOrReference,
    ) -> Result<FieldType, BuildError> {
        match schema_or_reference {
            RefOr::Item(schema) => self.type_for_schema(schema),
            RefOr::Reference(reference) => Ok(FieldType::new(
                FieldKind::Reference,
                self.index.type_name(&reference.target())?,
                None,
            )),
        }
    }

    /// Classify an inline schema as a scalar, array or map field type.
    fn type_for_schema(&self, schema: &Schema) -> Result<FieldType, BuildError> {
        match schema.type_name() {
            Some(kind) if SCALAR_TYPES.contains(&kind) => {
                return Ok(FieldType::new(FieldKind::Scalar, kind, schema.format.clone()));
            }
            Some("array") => {
                match schema.items.as_ref().and_then(Items::first) {
                    Some(RefOr::Reference(reference)) => {
                        return Ok(FieldType::new(
                            FieldKind::Array,
                            self.index.type_name(&reference.target())?,
                            None,
                        ));
                    }
                    Some(RefOr::Item(items)) => {
                        if let Some(kind) = items
                            .type_name()
                            .filter(|kind| ARRAY_ITEM_TYPES.contains(kind))
                        {
                            return Ok(FieldType::new(
                                FieldKind::Array,
                                kind,
                                items.format.clone(),
                            ));
                        }
                    }
                    None => {}
                }
                warn!("unimplemented: array items of unrecognized type; using placeholder");
                return Ok(FieldType::placeholder());
            }
            Some("object") if schema.additional_properties.is_none() => {
                if schema.has_properties() {
                    debug!("inline object properties are not modelled; using an untyped map");
                }
                return Ok(FieldType::new(FieldKind::Map, OBJECT_PLACEHOLDER, None));
            }
            _ => {}
        }

        if let Some(additional) = &schema.additional_properties
            && let Some(content_type) = self.additional_properties_type(additional)?
        {
            return Ok(FieldType::new(FieldKind::Map, content_type, None));
        }

        warn!(
            schema_type = schema.type_name().unwrap_or_default(),
            "unimplemented: schema shape; using placeholder"
        );
        Ok(FieldType::placeholder())
    }

    /// Element type of a map: the referenced Type, or an inline scalar.
    /// `None` when the values are untyped.
    fn additional_properties_type(
        &self,
        additional: &AdditionalProperties,
    ) -> Result<Option<String>, BuildError> {
        match additional.schema() {
            Some(RefOr::Reference(reference)) => {
                Ok(Some(self.index.type_name(&reference.target())?))
            }
            Some(RefOr::Item(schema)) => Ok(schema
                .type_name()
                .filter(|kind| SCALAR_TYPES.contains(kind))
                .map(str::to_string)),
            None => Ok(None),
        }
    }
}

/// `application/json`, optionally with parameters such as `charset`.
fn is_json_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
