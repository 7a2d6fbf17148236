//! Error types for stack construction and synthesis

use thiserror::Error;

/// Errors that can occur while declaring stacks or synthesizing the assembly
#[derive(Error, Debug)]
pub enum Error {
    /// A stack with this name was already registered on the app
    #[error("stack already declared: {0}")]
    DuplicateStack(String),

    /// Two resources in the same stack share a logical id
    #[error("duplicate logical id {id:?} in stack {stack:?}")]
    DuplicateLogicalId { stack: String, id: String },

    /// A consumer read a property key its producer never published
    #[error("missing property key: {0}")]
    MissingProp(String),

    /// A property key exists but does not hold a string value
    #[error("property key {0} is not a string")]
    PropNotString(String),

    /// A dependency edge references a stack that was never declared
    #[error("unknown stack in dependency edge: {0}")]
    UnknownStack(String),

    /// A stack was declared to depend on itself
    #[error("stack {0} cannot depend on itself")]
    SelfDependency(String),

    /// The declared dependency edges do not admit a provisioning order
    #[error("dependency cycle involving stack {0}")]
    DependencyCycle(String),

    /// IO error writing the assembly
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template or manifest serialization failed
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for stackkit operations
pub type Result<T> = std::result::Result<T, Error>;
