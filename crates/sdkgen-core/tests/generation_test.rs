//! End-to-end tests rendering the test model through the registry

mod test_utils;

// Internal imports (std, crate)
use std::path::PathBuf;
use std::sync::Arc;

use test_utils::{brace_counts, create_temp_dir, create_test_model_document, test_model};

// External imports (alphabetized)
use anyhow::{Context, Result};
use sdkgen_core::config::GeneratorOverride;
use sdkgen_core::generate::{render_methods, render_models};
use sdkgen_core::{
    generate_all, ApiModel, Config, Error, GenContext, Registry, SdkSettings, VersionInfo,
};

#[test]
fn test_every_generator_balances_braces() -> Result<()> {
    let model = test_model()?;
    let registry = Registry::builtin();
    for spec in registry.code_generators() {
        let gen = registry
            .get_code_generator(&spec.language, model.clone(), Some(VersionInfo::new("4.0")))
            .context("generator with a factory")?;
        for file in [render_models(gen.as_ref())?, render_methods(gen.as_ref())?] {
            let (open, close) = brace_counts(&file.content);
            assert_eq!(
                open,
                close,
                "unbalanced braces in {} for {}",
                file.path.display(),
                spec.language
            );
        }
    }
    Ok(())
}

#[test]
fn test_methods_are_wrapped_in_matching_regions() -> Result<()> {
    let model = test_model()?;
    let registry = Registry::builtin();
    for spec in registry.code_generators() {
        let gen = registry
            .get_code_generator(&spec.language, model.clone(), None)
            .context("generator with a factory")?;
        let methods = render_methods(gen.as_ref())?.content;
        let unit = gen.indent_unit();
        for method in model.all_methods() {
            let begin = gen.begin_region(unit, &method.operation_id);
            let end = gen.end_region(unit, &method.operation_id);
            let start = methods.find(&begin).context("region start")?;
            let stop = methods.find(&end).context("region end")?;
            assert!(start < stop, "{} region out of order in {}", method.operation_id, spec.language);
        }
    }
    Ok(())
}

#[test]
fn test_registry_lookups() -> Result<()> {
    let model = test_model()?;
    let registry = Registry::builtin();

    assert_eq!(registry.find_generator("c#").map(|s| s.language.as_str()), Some("csharp"));
    assert!(registry.find_generator("rust").is_some());
    assert!(registry.get_code_generator("rust", model.clone(), None).is_none());

    let gen = registry
        .get_code_generator("C#", model, None)
        .context("csharp generator")?;
    assert_eq!(gen.sdk_file_name("models"), PathBuf::from("./csharp/sdk/4.0/models.cs"));
    Ok(())
}

#[test]
fn test_custom_settings_reach_output() -> Result<()> {
    let model = test_model()?;
    let settings = SdkSettings {
        product_name: "Acme".to_string(),
        package_name: "acme_sdk".to_string(),
        default_api_version: "4.0".to_string(),
    };
    let ctx = GenContext::new(model, None).with_settings(settings);
    let gen = Registry::builtin()
        .code_generator("dart", ctx)
        .context("dart generator")?;

    let methods = render_methods(gen.as_ref())?;
    assert_eq!(
        methods.path,
        PathBuf::from("./dart/acme_sdk/lib/src/sdk/methods.dart")
    );
    assert!(methods.content.contains("Acme SDK Codegen"));
    assert!(methods.content.contains("class AcmeSDK extends APIMethods {"));
    Ok(())
}

#[tokio::test]
async fn test_generate_all_isolates_languages() -> Result<()> {
    let model = test_model()?;
    let languages: Vec<String> = ["Dart", "nope", "Go", "Python"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let outputs = generate_all(
        &Registry::builtin(),
        &languages,
        model,
        Some(VersionInfo::new("4.0")),
        SdkSettings::default(),
    )
    .await;

    let names: Vec<_> = outputs.iter().map(|o| o.language.as_str()).collect();
    assert_eq!(names, ["Dart", "nope", "Go", "Python"]);
    assert!(outputs[0].result.is_ok());
    assert!(matches!(outputs[1].result, Err(Error::NoGenerator(_))));
    assert!(matches!(outputs[2].result, Err(Error::NoGenerator(_))));

    let python = outputs[3].result.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;
    let paths: Vec<_> = python.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        [
            PathBuf::from("./python/looker_sdk/sdk/api40/models.py"),
            PathBuf::from("./python/looker_sdk/sdk/api40/methods.py"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_config_driven_generation() -> Result<()> {
    let (_temp_dir, temp_path) = create_temp_dir()?;
    let model_path = create_test_model_document(&temp_path)?;

    let mut config = Config::new(model_path.display().to_string(), "sdk");
    config.languages = vec!["Kotlin".to_string(), "Swift".to_string()];
    config.api_version = Some("4.0".to_string());
    config.overrides = vec![GeneratorOverride {
        language: "swift".to_string(),
        disabled: true,
        ..Default::default()
    }];
    let config_path = temp_path.join("sdkgen.yaml");
    config.save(&config_path).await?;

    let config = Config::from_file(&config_path).await?;
    let model = Arc::new(ApiModel::from_file(&config.model_path).await?);
    let outputs = generate_all(
        &config.registry(),
        &config.selected_languages()?,
        model,
        config.version_info(),
        config.sdk.clone(),
    )
    .await;

    assert!(outputs[0].result.is_ok());
    assert!(matches!(outputs[1].result, Err(Error::NoGenerator(ref name)) if name == "Swift"));
    Ok(())
}
