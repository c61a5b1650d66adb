//! Error handling for the SDK code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! The first three variants are the generation taxonomy. They are fatal only
//! for the entity or target language being rendered; the driver keeps every
//! other language going.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::error::{Error, Result};
//!
//! fn check_parent(found: bool) -> Result<()> {
//!     if !found {
//!         return Err(Error::model_integrity("parent 'Dashboard' is not declared"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_parent(true).is_ok());
//! ```

use thiserror::Error;

use crate::language::Language;

/// Result type for SDK generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SDK generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// A type reference names a type the model does not contain
    #[error("Unresolved type reference '{0}'")]
    UnresolvedType(String),

    /// The type mapper has no native type for a primitive in this language
    #[error("No {language} mapping for primitive type '{name}'")]
    UnknownPrimitive {
        /// Primitive name as declared in the model
        name: String,
        /// Target language that lacks the mapping
        language: Language,
    },

    /// A structural model invariant does not hold
    #[error("Model integrity error: {0}")]
    ModelIntegrity(String),

    /// No in-process generator could be built for a language
    #[error("No code generator available for '{0}'")]
    NoGenerator(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template engine error
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A generation task panicked or was cancelled
    #[error("Generation task failed: {0}")]
    Task(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model integrity error
    pub fn model_integrity<S: Into<String>>(msg: S) -> Self {
        Self::ModelIntegrity(msg.into())
    }

    /// Create a new unresolved type error
    pub fn unresolved<S: Into<String>>(name: S) -> Self {
        Self::UnresolvedType(name.into())
    }

    /// Create a new unknown primitive error
    pub fn unknown_primitive<S: Into<String>>(name: S, language: Language) -> Self {
        Self::UnknownPrimitive {
            name: name.into(),
            language,
        }
    }
}
