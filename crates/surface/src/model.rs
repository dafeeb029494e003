//! Surface model: the normalized Types and Methods of an API service.
//!
//! A [`Model`] owns every [`Type`] and [`Method`] in insertion order. Order is
//! load-bearing: renderers emit messages and RPCs in exactly this order, and
//! field order inside a Type is the basis for field numbering.

use std::collections::{HashMap, HashSet};

pub use surface_openapi::HttpMethod;

use crate::builder;
use crate::error::BuildError;
use surface_openapi::Document;

/// Shape of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Fixed set of named fields.
    Struct,
    /// String-keyed map whose values are `content_type`.
    Object,
    /// Wrapper around a single scalar or array value.
    Scalar,
}

/// Which part of the service a [`Type`] was synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRole {
    /// Reusable schema or request body.
    Component,
    /// Parameters of a method, or a reusable parameter set.
    Parameters,
    /// Responses of a method.
    Responses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Array,
    Map,
    /// The field's type is another [`Type`] of the same model, by name.
    Reference,
}

/// Where a parameter-derived field travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Body,
    Header,
    Query,
    Path,
    FormData,
}

impl Position {
    /// Map an OpenAPI `in` value. Cookie parameters have no position.
    pub fn from_location(location: &str) -> Option<Self> {
        match location {
            "body" => Some(Position::Body),
            "header" => Some(Position::Header),
            "formData" | "formdata" => Some(Position::FormData),
            "query" => Some(Position::Query),
            "path" => Some(Position::Path),
            _ => None,
        }
    }
}

/// Kind, type name and format of a field, as classified from a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub type_name: String,
    pub format: Option<String>,
}

impl FieldType {
    pub fn new(kind: FieldKind, type_name: impl Into<String>, format: Option<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            format,
        }
    }

    /// The untyped stand-in used when a schema shape is not understood.
    pub fn placeholder() -> Self {
        Self::new(FieldKind::Scalar, OBJECT_PLACEHOLDER, None)
    }
}

/// Type name used for untyped objects and unrecognized schema shapes.
pub const OBJECT_PLACEHOLDER: &str = "object";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    /// Scalar primitive name (`string`, `integer`, ...) or a Type name.
    pub type_name: String,
    pub format: Option<String>,
    pub position: Option<Position>,
    /// Whether the field is emitted as-is. Parameter references are not:
    /// renderers splice the referenced Type's fields in their place.
    pub serialize: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            format: None,
            position: None,
            serialize: true,
        }
    }

    pub fn from_type(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind: field_type.kind,
            type_name: field_type.type_name,
            format: field_type.format,
            position: None,
            serialize: true,
        }
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_serialize(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    pub fn is_reference(&self) -> bool {
        self.kind == FieldKind::Reference
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub description: String,
    pub kind: TypeKind,
    pub role: TypeRole,
    pub fields: Vec<Field>,
    /// Element type of an [`TypeKind::Object`] map.
    pub content_type: Option<String>,
}

impl Type {
    pub fn new(name: impl Into<String>, kind: TypeKind, role: TypeRole) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            role,
            fields: Vec::new(),
            content_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One API operation, rendered as one RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Source `operationId`, empty when the operation had none.
    pub operation: String,
    /// Sanitized, model-unique RPC name.
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    pub parameters_type_name: Option<String>,
    pub responses_type_name: Option<String>,
}

/// Root of the surface model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    types: Vec<Type>,
    methods: Vec<Method>,
    type_index: HashMap<String, usize>,
    method_names: HashSet<String>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a model from a parsed OpenAPI 3 document.
    pub fn from_openapi(document: &Document) -> Result<Self, BuildError> {
        builder::build_model(document)
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Append a Type. Type names are unique within a model.
    pub fn add_type(&mut self, t: Type) -> Result<(), BuildError> {
        if self.type_index.contains_key(&t.name) {
            return Err(BuildError::DuplicateType { name: t.name });
        }
        self.type_index.insert(t.name.clone(), self.types.len());
        self.types.push(t);
        Ok(())
    }

    /// Append a Method. Method names are unique within a model.
    pub fn add_method(&mut self, method: Method) -> Result<(), BuildError> {
        if !self.method_names.insert(method.name.clone()) {
            return Err(BuildError::DuplicateMethod {
                name: method.name,
                path: method.path,
                method: method.method.as_str(),
            });
        }
        self.methods.push(method);
        Ok(())
    }

    pub fn find_type(&self, name: &str) -> Option<&Type> {
        self.type_index.get(name).and_then(|i| self.types.get(*i))
    }

    /// Look up the Type a reference field points at.
    pub fn resolve(&self, name: &str) -> Result<&Type, BuildError> {
        self.find_type(name)
            .ok_or_else(|| BuildError::DanglingReference {
                reference: name.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn method(name: &str, path: &str) -> Method {
        Method {
            operation: name.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            method: HttpMethod::Get,
            description: String::new(),
            parameters_type_name: None,
            responses_type_name: None,
        }
    }

    #[test]
    fn test_types_keep_insertion_order() {
        let mut model = Model::new("Test");
        for name in ["C", "A", "B"] {
            model
                .add_type(Type::new(name, TypeKind::Struct, TypeRole::Component))
                .unwrap();
        }
        let names: Vec<_> = model.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let mut model = Model::new("Test");
        model
            .add_type(Type::new("Pet", TypeKind::Struct, TypeRole::Component))
            .unwrap();
        let err = model
            .add_type(Type::new("Pet", TypeKind::Object, TypeRole::Component))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateType { name } if name == "Pet"));
        assert_eq!(model.types().len(), 1);
    }

    #[test]
    fn test_duplicate_method_is_rejected() {
        let mut model = Model::new("Test");
        model.add_method(method("listPets", "/pets")).unwrap();
        let err = model.add_method(method("listPets", "/v2/pets")).unwrap_err();
        assert!(err.to_string().contains("listPets"));
        assert_eq!(model.methods().len(), 1);
    }

    #[test]
    fn test_resolve_reports_dangling_reference() {
        let mut model = Model::new("Test");
        model
            .add_type(Type::new("Pet", TypeKind::Struct, TypeRole::Component))
            .unwrap();
        assert_eq!(model.resolve("Pet").unwrap().name, "Pet");
        let err = model.resolve("Owner").unwrap_err();
        assert!(matches!(err, BuildError::DanglingReference { reference } if reference == "Owner"));
    }

    #[test]
    fn test_position_from_location() {
        assert_eq!(Position::from_location("path"), Some(Position::Path));
        assert_eq!(Position::from_location("query"), Some(Position::Query));
        assert_eq!(Position::from_location("header"), Some(Position::Header));
        assert_eq!(Position::from_location("formData"), Some(Position::FormData));
        assert_eq!(Position::from_location("body"), Some(Position::Body));
        assert_eq!(Position::from_location("cookie"), None);
    }
}
