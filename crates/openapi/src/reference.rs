//! Parsed `$ref` values.

use std::fmt;

/// The component namespace a local reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Schemas,
    Parameters,
    RequestBodies,
    Responses,
    /// Anything that is not `#/components/<known>/<name>`: external files,
    /// other component kinds, or pointers into paths.
    Other,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Schemas => "schemas",
            Namespace::Parameters => "parameters",
            Namespace::RequestBodies => "requestBodies",
            Namespace::Responses => "responses",
            Namespace::Other => "other",
        }
    }

    fn from_segment(segment: &str) -> Self {
        match segment {
            "schemas" => Namespace::Schemas,
            "parameters" => Namespace::Parameters,
            "requestBodies" => Namespace::RequestBodies,
            "responses" => Namespace::Responses,
            _ => Namespace::Other,
        }
    }
}

/// A `$ref` split into the namespace it targets and the bare component name.
///
/// Parsing is total: a reference that does not point at a known local
/// component namespace gets [`Namespace::Other`] and the last pointer segment
/// as its name. Whether the target exists is decided by whoever resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub namespace: Namespace,
    pub name: String,
    pub raw: String,
}

impl Reference {
    pub fn parse(raw: &str) -> Self {
        let (document, pointer) = match raw.split_once('#') {
            Some((document, pointer)) => (document, pointer),
            None => (raw, ""),
        };

        let segments: Vec<String> = pointer
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(unescape_pointer_segment)
            .collect();

        let namespace = match segments.as_slice() {
            [components, namespace, _] if document.is_empty() && components == "components" => {
                Namespace::from_segment(namespace)
            }
            _ => Namespace::Other,
        };

        let name = segments.last().cloned().unwrap_or_else(|| {
            // "other.yaml" with no pointer: use the file stem.
            document
                .rsplit('/')
                .next()
                .unwrap_or(document)
                .split('.')
                .next()
                .unwrap_or_default()
                .to_string()
        });

        Self {
            namespace,
            name,
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_schema_reference() {
        let reference = Reference::parse("#/components/schemas/Pet");
        assert_eq!(reference.namespace, Namespace::Schemas);
        assert_eq!(reference.name, "Pet");
    }

    #[test]
    fn test_parse_other_namespaces() {
        assert_eq!(
            Reference::parse("#/components/parameters/limit").namespace,
            Namespace::Parameters
        );
        assert_eq!(
            Reference::parse("#/components/requestBodies/NewPet").namespace,
            Namespace::RequestBodies
        );
        assert_eq!(
            Reference::parse("#/components/responses/NotFound").namespace,
            Namespace::Responses
        );
        assert_eq!(
            Reference::parse("#/components/headers/X-Rate-Limit").namespace,
            Namespace::Other
        );
    }

    #[test]
    fn test_parse_external_reference() {
        let reference = Reference::parse("common.yaml#/components/schemas/Error");
        assert_eq!(reference.namespace, Namespace::Other);
        assert_eq!(reference.name, "Error");

        let whole_file = Reference::parse("schemas/Error.yaml");
        assert_eq!(whole_file.namespace, Namespace::Other);
        assert_eq!(whole_file.name, "Error");
    }

    #[test]
    fn test_parse_escaped_segments() {
        let reference = Reference::parse("#/components/schemas/a~1b~0c");
        assert_eq!(reference.name, "a/b~c");
        assert_eq!(reference.to_string(), "#/components/schemas/a~1b~0c");
    }
}
