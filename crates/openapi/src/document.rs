//! OpenAPI 3.0 structs for serde deserialization.
//!
//! Only the parts of the OpenAPI object model that the surface builder reads are
//! modelled. Unknown keys are ignored.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::DocumentError;
use crate::reference::Reference;

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    pub components: Option<Components>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// Reusable components, each namespace in source order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaOrReference>,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterOrReference>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBodyOrReference>,
    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrReference>,
}

/// The eight HTTP verbs a path item can carry, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ParameterOrReference>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Operations present on this path item, in [`HttpMethod::ALL`] order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterOrReference>,
    pub request_body: Option<RequestBodyOrReference>,
    /// Keyed by status code (`"200"`, `"4XX"`) or `"default"`.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrReference>,
    #[serde(default)]
    pub deprecated: bool,
}

/// A parameter (query, path, header, cookie, or the Swagger-era body/formData).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<SchemaOrReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<SchemaOrReference>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Format hint (e.g., int64, date-time, byte).
    pub format: Option<String>,

    pub description: Option<String>,

    /// Properties for object types, in declaration order.
    pub properties: Option<IndexMap<String, SchemaOrReference>>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Item schema for array types.
    pub items: Option<Items>,

    /// Additional properties for map-like objects.
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    pub nullable: Option<bool>,

    #[serde(default)]
    pub all_of: Vec<SchemaOrReference>,
    #[serde(default)]
    pub one_of: Vec<SchemaOrReference>,
    #[serde(default)]
    pub any_of: Vec<SchemaOrReference>,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// `items` is a single schema in OpenAPI 3.0; some converters emit a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Many(Vec<SchemaOrReference>),
    One(SchemaOrReference),
}

impl Items {
    /// The schema describing the array elements.
    pub fn first(&self) -> Option<&SchemaOrReference> {
        match self {
            Items::Many(items) => items.first(),
            Items::One(item) => Some(item),
        }
    }
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(SchemaOrReference),
}

impl AdditionalProperties {
    pub fn schema(&self) -> Option<&SchemaOrReference> {
        match self {
            AdditionalProperties::Bool(_) => None,
            AdditionalProperties::Schema(schema) => Some(schema),
        }
    }
}

/// A `{"$ref": "..."}` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferenceObject {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl ReferenceObject {
    pub fn target(&self) -> Reference {
        Reference::parse(&self.reference)
    }
}

/// Either a reference to a reusable component or an inline value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Reference(ReferenceObject),
    Item(T),
}

impl<T> RefOr<T> {
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Reference(_) => None,
            RefOr::Item(item) => Some(item),
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceObject> {
        match self {
            RefOr::Reference(reference) => Some(reference),
            RefOr::Item(_) => None,
        }
    }
}

pub type SchemaOrReference = RefOr<Box<Schema>>;
pub type ParameterOrReference = RefOr<Parameter>;
pub type RequestBodyOrReference = RefOr<RequestBody>;
pub type ResponseOrReference = RefOr<Response>;

impl Schema {
    /// The declared type, ignoring `"null"` in OpenAPI 3.1 style type arrays.
    pub fn type_name(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t.as_str()),
            Some(SchemaType::Multiple(types)) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
            None => None,
        }
    }

    /// Whether the schema declares at least one fixed property.
    pub fn has_properties(&self) -> bool {
        self.properties
            .as_ref()
            .is_some_and(|properties| !properties.is_empty())
    }
}

impl Document {
    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an OpenAPI document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse raw bytes, treating input that starts with `{` as JSON and
    /// anything else as YAML.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let is_json = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{');
        if is_json {
            Ok(serde_json::from_slice(bytes)?)
        } else {
            Ok(serde_yaml::from_slice(bytes)?)
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::reference::Namespace;

    const PETSTORE_JSON: &str = r##"{
  "openapi": "3.0.0",
  "info": { "title": "Swagger Petstore", "version": "1.0.0" },
  "paths": {
    "/pets": {
      "get": {
        "operationId": "listPets",
        "parameters": [
          { "name": "limit", "in": "query", "schema": { "type": "integer", "format": "int32" } }
        ],
        "responses": {
          "200": { "description": "ok", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pets" } } } },
          "default": { "description": "error", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } } }
        }
      },
      "post": { "operationId": "createPets", "responses": { "201": { "description": "created" } } }
    },
    "/pets/{petId}": {
      "parameters": [{ "$ref": "#/components/parameters/petId" }],
      "get": { "operationId": "showPetById", "responses": {} }
    }
  },
  "components": {
    "schemas": {
      "Pet": {
        "required": ["id", "name"],
        "properties": {
          "id": { "type": "integer", "format": "int64" },
          "name": { "type": "string" },
          "tag": { "type": "string" }
        }
      },
      "Pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } },
      "Error": { "properties": { "code": { "type": "integer" }, "message": { "type": "string" } } }
    },
    "parameters": {
      "petId": { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } }
    }
  }
}"##;

    #[test]
    fn test_parse_preserves_source_order() {
        let document = Document::from_json(PETSTORE_JSON).unwrap();
        assert_eq!(document.info.title, "Swagger Petstore");

        let paths: Vec<_> = document.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, ["/pets", "/pets/{petId}"]);

        let components = document.components.as_ref().unwrap();
        let schemas: Vec<_> = components.schemas.keys().map(String::as_str).collect();
        assert_eq!(schemas, ["Pet", "Pets", "Error"]);

        let pet = components.schemas["Pet"].as_item().unwrap();
        let properties: Vec<_> = pet.properties.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(properties, ["id", "name", "tag"]);
    }

    #[test]
    fn test_operations_follow_fixed_verb_order() {
        let document = Document::from_json(PETSTORE_JSON).unwrap();
        let methods: Vec<_> = document.paths["/pets"]
            .operations()
            .map(|(method, _)| method)
            .collect();
        // GET is visited before POST regardless of source order.
        assert_eq!(methods, [HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_references_parse_as_reference_objects() {
        let document = Document::from_json(PETSTORE_JSON).unwrap();
        let item = &document.paths["/pets/{petId}"];
        let reference = item.parameters[0].as_reference().unwrap().target();
        assert_eq!(reference.namespace, Namespace::Parameters);
        assert_eq!(reference.name, "petId");

        let pets = document.components.as_ref().unwrap().schemas["Pets"]
            .as_item()
            .unwrap();
        assert_eq!(pets.type_name(), Some("array"));
        let items = pets.items.as_ref().unwrap().first().unwrap();
        assert_eq!(items.as_reference().unwrap().target().name, "Pet");
    }

    #[test]
    fn test_items_accepts_list_form() {
        let schema: Schema =
            serde_json::from_str(r#"{ "type": "array", "items": [{ "type": "string" }] }"#)
                .unwrap();
        let item = schema.items.as_ref().unwrap().first().unwrap();
        assert_eq!(item.as_item().unwrap().type_name(), Some("string"));
    }

    #[test]
    fn test_additional_properties_forms() {
        let untyped: Schema =
            serde_json::from_str(r#"{ "type": "object", "additionalProperties": true }"#).unwrap();
        assert!(untyped.additional_properties.as_ref().unwrap().schema().is_none());

        let typed: Schema = serde_json::from_str(
            r##"{ "additionalProperties": { "$ref": "#/components/schemas/Pet" } }"##,
        )
        .unwrap();
        let schema = typed.additional_properties.as_ref().unwrap().schema().unwrap();
        assert_eq!(schema.as_reference().unwrap().target().name, "Pet");
    }

    #[test]
    fn test_nullable_type_array() {
        let schema: Schema = serde_json::from_str(r#"{ "type": ["null", "string"] }"#).unwrap();
        assert_eq!(schema.type_name(), Some("string"));
    }

    #[test]
    fn test_from_slice_detects_yaml() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: Pets\n  version: '1'\npaths:\n  /pets:\n    get:\n      operationId: listPets\n      responses: {}\n";
        let document = Document::from_slice(yaml.as_bytes()).unwrap();
        assert_eq!(document.info.title, "Pets");
        assert!(document.paths["/pets"].get.is_some());

        let json = Document::from_slice(format!("  \n{PETSTORE_JSON}").as_bytes()).unwrap();
        assert_eq!(json.paths.len(), 2);
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = Document::from_path(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn test_from_path_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petstore.json");
        std::fs::write(&path, PETSTORE_JSON).unwrap();
        let document = Document::from_path(&path).unwrap();
        assert_eq!(document.info.title, "Swagger Petstore");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = Document::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }
}
