//! SDK Codegen Core Library
//!
//! This library renders a normalized API model into client SDK source code
//! for several target languages from a single description of the API.

pub mod config;
pub mod error;
pub mod generate;
pub mod generators;
pub mod language;
pub mod model;
pub mod registry;
pub mod templates;
pub mod type_map;
pub mod utils;

pub use crate::{
    config::{Config, SdkSettings, VersionInfo},
    error::{Error, Result},
    generate::{generate_all, render_sdk, GeneratedFile, LanguageOutput},
    generators::{CodeGen, GenContext},
    language::Language,
    model::{ApiModel, ApiModelBuilder},
    registry::{GeneratorSpec, Registry},
};
