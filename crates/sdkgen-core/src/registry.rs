//! Registry of the SDK generators this crate knows about.
//!
//! The built-in table is ordered and built once. Entries without a factory
//! are legacy or planned languages: they can be looked up, but no generator
//! can be built for them in-process.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use sdkgen_core::model::ApiModelBuilder;
//! use sdkgen_core::registry::Registry;
//!
//! let registry = Registry::builtin();
//! let model = Arc::new(ApiModelBuilder::new("Example", "4.0").build().unwrap());
//!
//! assert_eq!(registry.find_generator("c#").unwrap().language, "csharp");
//! assert!(registry.get_code_generator("dart", model.clone(), None).is_some());
//! assert!(registry.get_code_generator("go", model, None).is_none());
//! ```

// Internal imports (std, crate)
use std::sync::Arc;

use crate::config::{GeneratorOverride, VersionInfo};
use crate::generators::{
    csharp::CSharpGen, dart::DartGen, kotlin::KotlinGen, python::PythonGen, swift::SwiftGen,
    typescript::TypescriptGen, CodeGen, GenContext,
};
use crate::model::ApiModel;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;

/// Builds a generator bound to a context
pub type Factory = fn(GenContext) -> Box<dyn CodeGen>;

const LEGACY_OPTIONS: &str = "-papiPackage=Looker -ppackageName=looker";

static OPTION_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-p(\w+)=(\S+)").expect("option pair pattern is valid"));

static BUILTIN: Lazy<Registry> = Lazy::new(|| Registry {
    specs: vec![
        GeneratorSpec::new("Python", |ctx| Box::new(PythonGen::new(ctx))),
        GeneratorSpec::new("Typescript", |ctx| Box::new(TypescriptGen::new(ctx))),
        GeneratorSpec::new("Kotlin", |ctx| Box::new(KotlinGen::new(ctx))),
        GeneratorSpec {
            label: Some("C#".to_string()),
            legacy: Some("csharp".to_string()),
            options: Some(LEGACY_OPTIONS.to_string()),
            ..GeneratorSpec::new("csharp", |ctx| Box::new(CSharpGen::new(ctx)))
        },
        GeneratorSpec::new("Swift", |ctx| Box::new(SwiftGen::new(ctx))),
        GeneratorSpec::new("Dart", |ctx| Box::new(DartGen::new(ctx))),
        GeneratorSpec {
            legacy: Some("go".to_string()),
            options: Some(LEGACY_OPTIONS.to_string()),
            ..GeneratorSpec::planned("Go")
        },
        GeneratorSpec {
            options: Some(LEGACY_OPTIONS.to_string()),
            ..GeneratorSpec::planned("Rust")
        },
    ],
});

/// One entry of the generator table
#[derive(Debug, Clone)]
pub struct GeneratorSpec {
    /// Language name, matched case-insensitively
    pub language: String,
    /// Alias for the language, e.g. `C#` for `csharp`
    pub label: Option<String>,
    /// Output folder for the legacy generator; defaults to the language
    pub path: Option<String>,
    pub factory: Option<Factory>,
    /// Options handed unchanged to the legacy generator
    pub options: Option<String>,
    /// Legacy generator tag
    pub legacy: Option<String>,
}

impl GeneratorSpec {
    fn new(language: &str, factory: Factory) -> Self {
        Self {
            factory: Some(factory),
            ..Self::planned(language)
        }
    }

    fn planned(language: &str) -> Self {
        Self {
            language: language.to_string(),
            label: None,
            path: None,
            factory: None,
            options: None,
            legacy: None,
        }
    }

    /// Whether `name` is this entry's language or label, ignoring case
    pub fn matches(&self, name: &str) -> bool {
        self.language.eq_ignore_ascii_case(name)
            || self
                .label
                .as_deref()
                .is_some_and(|label| label.eq_ignore_ascii_case(name))
    }

    /// `-p<key>=<value>` pairs of the legacy option string, in order
    pub fn option_pairs(&self) -> Vec<(String, String)> {
        let Some(options) = &self.options else {
            return Vec::new();
        };
        OPTION_PAIR
            .captures_iter(options)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect()
    }
}

/// Ordered generator table
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<GeneratorSpec>,
}

impl Registry {
    /// The built-in table
    pub fn builtin() -> Registry {
        BUILTIN.clone()
    }

    /// A new table with `overrides` applied to this one
    pub fn with_overrides(&self, overrides: &[GeneratorOverride]) -> Registry {
        let mut specs = self.specs.clone();
        for change in overrides {
            let Some(spec) = specs.iter_mut().find(|s| s.matches(&change.language)) else {
                log::warn!(
                    "Ignoring override for unknown generator '{}'",
                    change.language
                );
                continue;
            };
            if let Some(label) = &change.label {
                spec.label = Some(label.clone());
            }
            if let Some(path) = &change.path {
                spec.path = Some(path.clone());
            }
            if let Some(options) = &change.options {
                spec.options = Some(options.clone());
            }
            if let Some(legacy) = &change.legacy {
                spec.legacy = Some(legacy.clone());
            }
            if change.disabled {
                log::debug!("Disabling generator '{}'", spec.language);
                spec.factory = None;
            }
        }
        Registry { specs }
    }

    /// Every entry, in table order
    pub fn specs(&self) -> &[GeneratorSpec] {
        &self.specs
    }

    /// Entry whose language or label is `name`, ignoring case
    pub fn find_generator(&self, name: &str) -> Option<&GeneratorSpec> {
        let found = self.specs.iter().find(|spec| spec.matches(name));
        log::debug!(
            "Resolved generator '{}' to {:?}",
            name,
            found.map(|spec| spec.language.as_str())
        );
        found
    }

    /// Builds the generator for `name`, or `None` when the entry is unknown or has no factory
    pub fn get_code_generator(
        &self,
        name: &str,
        model: Arc<ApiModel>,
        versions: Option<VersionInfo>,
    ) -> Option<Box<dyn CodeGen>> {
        self.code_generator(name, GenContext::new(model, versions))
    }

    /// Like [`Registry::get_code_generator`] with an explicit context
    pub fn code_generator(&self, name: &str, ctx: GenContext) -> Option<Box<dyn CodeGen>> {
        let factory = self.find_generator(name)?.factory?;
        Some(factory(ctx))
    }

    /// Entries that can build a generator in-process
    pub fn code_generators(&self) -> Vec<&GeneratorSpec> {
        self.specs.iter().filter(|s| s.factory.is_some()).collect()
    }

    /// The requested languages, or every entry with a factory when none are requested
    pub fn resolve_languages(&self, languages: &[String]) -> Vec<String> {
        if languages.is_empty() {
            self.code_generators()
                .iter()
                .map(|spec| spec.language.clone())
                .collect()
        } else {
            languages.to_vec()
        }
    }

    /// Entries with a legacy generator tag
    pub fn legacy_languages(&self) -> Vec<&GeneratorSpec> {
        self.specs.iter().filter(|s| s.legacy.is_some()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::model::ApiModelBuilder;

    fn model() -> Arc<ApiModel> {
        Arc::new(ApiModelBuilder::new("Looker", "4.0").build().unwrap())
    }

    #[test]
    fn test_builtin_order() {
        let registry = Registry::builtin();
        let names: Vec<_> = registry.specs().iter().map(|s| s.language.as_str()).collect();
        assert_eq!(
            names,
            ["Python", "Typescript", "Kotlin", "csharp", "Swift", "Dart", "Go", "Rust"]
        );
        assert_eq!(registry.code_generators().len(), 6);
    }

    #[test]
    fn test_find_generator_by_label() {
        let registry = Registry::builtin();
        assert_eq!(registry.find_generator("c#").unwrap().language, "csharp");
        assert_eq!(registry.find_generator("CSHARP").unwrap().language, "csharp");
        assert_eq!(registry.find_generator("dart").unwrap().language, "Dart");
        assert!(registry.find_generator("cobol").is_none());
    }

    #[test]
    fn test_factory_less_entries() {
        let registry = Registry::builtin();
        assert!(registry.find_generator("rust").is_some());
        assert!(registry.get_code_generator("rust", model(), None).is_none());
        assert!(registry.get_code_generator("cobol", model(), None).is_none());
    }

    #[test]
    fn test_get_code_generator_binds_language() {
        let registry = Registry::builtin();
        for spec in registry.code_generators() {
            let gen = registry
                .get_code_generator(&spec.language, model(), Some(VersionInfo::new("4.0")))
                .unwrap();
            let expected: Language = spec.language.parse().unwrap();
            assert_eq!(gen.language(), expected);
        }
    }

    #[test]
    fn test_resolve_languages_defaults_to_factories() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.resolve_languages(&[]),
            ["Python", "Typescript", "Kotlin", "csharp", "Swift", "Dart"]
        );
        let picked = vec!["go".to_string(), "dart".to_string()];
        assert_eq!(registry.resolve_languages(&picked), picked);
    }

    #[test]
    fn test_legacy_languages() {
        let registry = Registry::builtin();
        let legacy: Vec<_> = registry
            .legacy_languages()
            .iter()
            .map(|s| s.legacy.as_deref().unwrap())
            .collect();
        assert_eq!(legacy, ["csharp", "go"]);
    }

    #[test]
    fn test_option_pairs() {
        let registry = Registry::builtin();
        let go = registry.find_generator("go").unwrap();
        assert_eq!(go.options.as_deref(), Some(LEGACY_OPTIONS));
        assert_eq!(
            go.option_pairs(),
            vec![
                ("apiPackage".to_string(), "Looker".to_string()),
                ("packageName".to_string(), "looker".to_string()),
            ]
        );
        assert!(registry.find_generator("dart").unwrap().option_pairs().is_empty());
    }

    #[test]
    fn test_overrides_build_new_table() {
        let overrides = vec![
            GeneratorOverride {
                language: "swift".to_string(),
                disabled: true,
                ..Default::default()
            },
            GeneratorOverride {
                language: "Go".to_string(),
                path: Some("golang".to_string()),
                ..Default::default()
            },
            GeneratorOverride {
                language: "cobol".to_string(),
                ..Default::default()
            },
        ];
        let changed = Registry::builtin().with_overrides(&overrides);

        assert!(changed.get_code_generator("swift", model(), None).is_none());
        assert_eq!(changed.find_generator("go").unwrap().path.as_deref(), Some("golang"));
        assert_eq!(changed.code_generators().len(), 5);

        let builtin = Registry::builtin();
        assert!(builtin.get_code_generator("swift", model(), None).is_some());
        assert!(builtin.find_generator("go").unwrap().path.is_none());
    }
}
