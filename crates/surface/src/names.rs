//! Identifier normalization.
//!
//! External names (operation ids, property names, status codes, document
//! titles) pass through these functions before they become emitted
//! identifiers. Every function is total: any input yields a legal identifier.

/// Separators that start a new camelCase word in operation ids.
const WORD_SEPARATORS: [char; 5] = ['-', '.', ' ', '/', ':'];

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn replace_illegal_chars(name: &str) -> String {
    name.chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect()
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Sanitize an operation id into an RPC name.
/// - Separators (`-`, `.`, ` `, `/`, `:`) start a new camelCase word
/// - Remaining illegal characters become `_`
/// - A leading digit gets a `_` prefix
///
/// Returns an empty string when nothing usable is left, so callers can fall
/// back to [`generate_operation_name`].
pub fn sanitize_operation_name(operation_id: &str) -> String {
    let mut result = String::new();
    for (i, part) in operation_id.split(WORD_SEPARATORS).enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 || result.is_empty() {
            result.push_str(part);
        } else {
            result.push_str(&capitalize_first(part));
        }
    }

    let mut result = replace_illegal_chars(&result);
    if starts_with_digit(&result) {
        result.insert(0, '_');
    }
    result
}

/// Deterministic RPC name for an operation without an id:
/// `GET /pets/{petId}` becomes `getPetsPetId`.
pub fn generate_operation_name(method: &str, path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| segment.replace(['{', '}'], ""))
        .filter(|segment| !segment.is_empty())
        .collect();

    let id = format!("{} {}", method.to_lowercase(), segments.join(" "));
    sanitize_operation_name(id.trim())
}

/// Make any name a legal proto identifier (message or type name).
pub fn legalize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let mut result = replace_illegal_chars(name);
    if starts_with_digit(&result) {
        result.insert(0, '_');
    }
    result
}

/// Make a field name a legal proto field identifier.
///
/// The success status code `200` becomes `response`; other names that start
/// with a digit (status codes such as `404` or `2XX`) become
/// `response_<name>`.
pub fn legalize_field_name(name: &str) -> String {
    match name {
        "" => "field".to_string(),
        "200" => "response".to_string(),
        _ if starts_with_digit(name) => format!("response_{}", replace_illegal_chars(name)),
        _ => legalize_identifier(name),
    }
}

/// Derive a proto package name from a document title:
/// `"Swagger Petstore"` becomes `swagger_petstore`.
pub fn package_name_from_title(title: &str) -> String {
    let mut package = String::new();
    let mut pending_separator = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !package.is_empty() {
                package.push('_');
            }
            pending_separator = false;
            package.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if package.is_empty() {
        return "api".to_string();
    }
    if starts_with_digit(&package) {
        package.insert(0, '_');
    }
    package
}

/// Legalize each dot-separated segment of a user supplied package name.
pub fn legalize_package_name(package: &str) -> String {
    let segments: Vec<String> = package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(legalize_identifier)
        .collect();
    if segments.is_empty() {
        "api".to_string()
    } else {
        segments.join(".")
    }
}

/// `swagger_petstore` becomes `SwaggerPetstore`.
pub fn pascal_case(name: &str) -> String {
    name.split(['_', '.', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect()
}
