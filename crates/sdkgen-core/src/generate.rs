//! Drives generators over a model to produce whole SDK files.
//!
//! A generator renders fragments; this module calls it in structural order
//! (prologue, entities, epilogue) and collects the text of the `models` and
//! `methods` artifacts. [`generate_all`] runs one blocking task per language
//! so a slow or broken language never holds up the others.

// Internal imports (std, crate)
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{SdkSettings, VersionInfo};
use crate::error::{Error, Result};
use crate::generators::{CodeGen, GenContext};
use crate::model::{ApiModel, Type};
use crate::registry::Registry;

// External imports (alphabetized)
use futures::future::join_all;
use tokio::task;

/// A rendered artifact, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Outcome of generating one language
#[derive(Debug)]
pub struct LanguageOutput {
    /// Language name as requested
    pub language: String,
    pub result: Result<Vec<GeneratedFile>>,
}

/// Renders every enum and object type of the model
pub fn render_models(gen: &dyn CodeGen) -> Result<GeneratedFile> {
    let model = &gen.context().model;
    let mut content = gen.models_prologue("");
    for ty in model.all_types() {
        if matches!(ty, Type::Enum(_) | Type::Object(_)) {
            content.push_str(&gen.declare_type("", ty)?);
            content.push('\n');
        }
    }
    content.push_str(&gen.models_epilogue(""));

    let path = gen.sdk_file_name("models");
    log::debug!("Rendered {} ({} bytes)", path.display(), content.len());
    Ok(GeneratedFile { path, content })
}

/// Renders every method of the model, each inside its own region
pub fn render_methods(gen: &dyn CodeGen) -> Result<GeneratedFile> {
    let model = &gen.context().model;
    let indent = gen.indent_unit();
    let mut content = gen.methods_prologue("")?;
    for method in model.all_methods() {
        content.push('\n');
        content.push_str(&gen.begin_region(indent, &method.operation_id));
        content.push_str(&gen.declare_method(indent, method)?);
        content.push_str(&gen.end_region(indent, &method.operation_id));
    }
    content.push_str(&gen.methods_epilogue(""));

    let path = gen.sdk_file_name("methods");
    log::debug!("Rendered {} ({} bytes)", path.display(), content.len());
    Ok(GeneratedFile { path, content })
}

/// Both artifacts of one SDK, models first
pub fn render_sdk(gen: &dyn CodeGen) -> Result<Vec<GeneratedFile>> {
    Ok(vec![render_models(gen)?, render_methods(gen)?])
}

/// Generates the SDK for each of `languages`, or for every registered
/// generator when `languages` is empty.
///
/// Every language gets its own result. An unknown or legacy-only language,
/// a model the generator cannot render, or a panicking generator fails that
/// language alone.
pub async fn generate_all(
    registry: &Registry,
    languages: &[String],
    model: Arc<ApiModel>,
    versions: Option<VersionInfo>,
    settings: SdkSettings,
) -> Vec<LanguageOutput> {
    let languages = registry.resolve_languages(languages);
    let tasks = languages.iter().map(|language| {
        let ctx = GenContext::new(model.clone(), versions.clone()).with_settings(settings.clone());
        let gen = registry.code_generator(language, ctx);
        let language = language.clone();
        async move {
            let result = match gen {
                Some(gen) => task::spawn_blocking(move || render_sdk(gen.as_ref()))
                    .await
                    .unwrap_or_else(|e| Err(Error::Task(e.to_string()))),
                None => Err(Error::NoGenerator(language.clone())),
            };
            match &result {
                Ok(files) => log::info!("Generated {} files for {}", files.len(), language),
                Err(e) => log::warn!("Skipping {}: {}", language, e),
            }
            LanguageOutput { language, result }
        }
    });
    join_all(tasks).await
}
