use thiserror::Error;

/// Fatal model-building failures. Everything else degrades to a logged
/// diagnostic and a placeholder.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot determine type for referenced schema `{name}`")]
    UnresolvableSchema { name: String },

    #[error("dangling reference `{reference}`")]
    DanglingReference { reference: String },

    #[error("duplicate type `{name}`")]
    DuplicateType { name: String },

    #[error("duplicate method name `{name}` ({method} {path}); operation names must be unique")]
    DuplicateMethod {
        name: String,
        path: String,
        method: &'static str,
    },
}
