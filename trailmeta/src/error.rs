use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

/// Errors raised while building the type metamodel or loading its configuration.
///
/// Discovery itself never fails; these only surface from registry declaration
/// and configuration loading.
#[derive(Debug, EnumIs, EnumTryAs, Error)]
pub enum MetaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML configuration could not be parsed.
    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    /// A class was declared twice in the same registry.
    #[error(
        "Class `{name}` is already declared in this registry. Declarations are immutable once registered."
    )]
    DuplicateDeclaration { name: String },

    /// A declaration referenced a typeref that is not a nominal class type.
    #[error("Type `{found}` is not a class type and cannot carry a declaration.")]
    NotAClass { found: String },

    /// The universal root is owned by the registry and cannot be re-declared.
    #[error("The root class `{0}` is built into the registry and cannot be re-declared.")]
    RootRedeclared(String),
}

pub type MetaResult<T> = Result<T, MetaError>;
