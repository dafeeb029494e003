//! proto3 syntax nodes and their emission via the [`Emit`] trait.
//!
//! Surface fields are mapped onto [`ProtoType`]s here; the renderer only
//! decides which fields appear and in what order.

use surface_model::names::{legalize_field_name, legalize_identifier};
use surface_model::{Field, FieldKind, OBJECT_PLACEHOLDER};

/// Convert a proto syntax node to its textual form.
pub trait Emit {
    fn emit(&self) -> String;
}

pub const EMPTY: &str = "google.protobuf.Empty";
const STRUCT: &str = "google.protobuf.Struct";
const LIST_VALUE: &str = "google.protobuf.ListValue";

/// A proto3 field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoType {
    /// Built-in scalar such as `string` or `int64`.
    Scalar(&'static str),
    /// Message declared in the same file.
    Message(String),
    Struct,
    ListValue,
    /// `map<string, V>`.
    Map(Box<ProtoType>),
}

impl ProtoType {
    /// Map a surface scalar name and format onto a proto type. Unknown names
    /// are taken to be message names.
    pub fn from_surface(type_name: &str, format: Option<&str>) -> Self {
        match type_name {
            "string" => match format {
                Some("byte" | "binary") => Self::Scalar("bytes"),
                _ => Self::Scalar("string"),
            },
            "integer" => Self::Scalar(match format {
                Some("int32") => "int32",
                Some("uint32") => "uint32",
                Some("uint64") => "uint64",
                Some("sint32") => "sint32",
                Some("sint64") => "sint64",
                Some("fixed32") => "fixed32",
                Some("fixed64") => "fixed64",
                Some("sfixed32") => "sfixed32",
                Some("sfixed64") => "sfixed64",
                _ => "int64",
            }),
            "number" => match format {
                Some("float") => Self::Scalar("float"),
                _ => Self::Scalar("double"),
            },
            "boolean" => Self::Scalar("bool"),
            OBJECT_PLACEHOLDER => Self::Struct,
            "array" => Self::ListValue,
            name => Self::Message(legalize_identifier(name)),
        }
    }

    /// The proto type of a surface field, without its `repeated` label.
    pub fn for_field(field: &Field) -> Self {
        let element = Self::from_surface(&field.type_name, field.format.as_deref());
        match field.kind {
            FieldKind::Map => Self::map_of(element),
            FieldKind::Reference => Self::Message(legalize_identifier(&field.type_name)),
            FieldKind::Scalar | FieldKind::Array => element,
        }
    }

    /// `map<string, V>`, or `Struct` when the values are untyped.
    pub fn map_of(value: Self) -> Self {
        match value {
            Self::Struct => Self::Struct,
            value => Self::Map(Box::new(value)),
        }
    }

    /// Whether emitting this type needs `google/protobuf/struct.proto`.
    pub fn needs_struct_import(&self) -> bool {
        match self {
            Self::Struct | Self::ListValue => true,
            Self::Map(value) => value.needs_struct_import(),
            Self::Scalar(_) | Self::Message(_) => false,
        }
    }
}

impl Emit for ProtoType {
    fn emit(&self) -> String {
        match self {
            ProtoType::Scalar(name) => (*name).to_string(),
            ProtoType::Message(name) => name.clone(),
            ProtoType::Struct => STRUCT.to_string(),
            ProtoType::ListValue => LIST_VALUE.to_string(),
            ProtoType::Map(value) => format!("map<string, {}>", value.emit()),
        }
    }
}

/// One numbered message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoField {
    pub repeated: bool,
    pub ty: ProtoType,
    pub name: String,
    pub number: usize,
}

impl ProtoField {
    /// Field for a surface field, with its name legalized and number unset.
    pub fn from_surface(field: &Field) -> Self {
        Self::named(field, &field.name)
    }

    /// Field for a surface field emitted under another name.
    pub fn named(field: &Field, name: &str) -> Self {
        Self {
            repeated: field.kind == FieldKind::Array,
            ty: ProtoType::for_field(field),
            name: legalize_field_name(name),
            number: 0,
        }
    }
}

impl Emit for ProtoField {
    fn emit(&self) -> String {
        let label = if self.repeated { "repeated " } else { "" };
        format!("{label}{} {} = {};", self.ty.emit(), self.name, self.number)
    }
}

/// A `message` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoMessage {
    pub name: String,
    pub fields: Vec<ProtoField>,
}

impl ProtoMessage {
    /// Message with fields numbered 1..N in the given order.
    pub fn new(name: &str, fields: Vec<ProtoField>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(i, field)| ProtoField {
                number: i + 1,
                ..field
            })
            .collect();
        Self {
            name: legalize_identifier(name),
            fields,
        }
    }

    pub fn needs_struct_import(&self) -> bool {
        self.fields.iter().any(|f| f.ty.needs_struct_import())
    }
}

impl Emit for ProtoMessage {
    fn emit(&self) -> String {
        let mut output = format!("message {} {{\n", self.name);
        for field in &self.fields {
            output.push_str("  ");
            output.push_str(&field.emit());
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }
}

/// An `rpc` declaration with its HTTP binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoRpc {
    pub name: String,
    pub request: String,
    pub response: String,
    /// Lower-case HTTP verb.
    pub verb: String,
    pub path: String,
    pub body: Option<String>,
}

impl Emit for ProtoRpc {
    fn emit(&self) -> String {
        let mut output = format!(
            "  rpc {} ({}) returns ({}) {{\n",
            self.name, self.request, self.response
        );
        output.push_str("    option (google.api.http) = {\n");
        output.push_str(&format!("      {}: \"{}\"\n", self.verb, escape(&self.path)));
        if let Some(body) = &self.body {
            output.push_str(&format!("      body: \"{body}\"\n"));
        }
        output.push_str("    };\n");
        output.push_str("  }\n");
        output
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
