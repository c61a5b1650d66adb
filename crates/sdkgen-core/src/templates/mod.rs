//! Embedded Tera templates for the multi-line parts of generated code.
//!
//! The templates are compiled into the binary and registered once, on first
//! use, into a process-wide read-only [`Tera`] instance. Templates are written
//! at column zero; generators re-indent the rendered text themselves.

// Internal imports (std, crate)
use crate::error::Result;
use crate::language::Language;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

macro_rules! template {
    ($lang:literal, $name:literal) => {
        (
            concat!($lang, "/", $name),
            include_str!(concat!("../../templates/", $lang, "/", $name, ".tera")),
        )
    };
}

/// Every template shipped with the crate, keyed `<language>/<name>`
const TEMPLATES: &[(&str, &str)] = &[
    template!("dart", "getset"),
    template!("dart", "enum_mapper"),
    template!("dart", "to_json"),
    template!("dart", "from_response"),
    template!("dart", "method"),
    template!("dart", "methods_prologue"),
    template!("python", "getset"),
    template!("python", "enum_mapper"),
    template!("python", "to_json"),
    template!("python", "from_response"),
    template!("python", "method"),
    template!("python", "methods_prologue"),
    template!("typescript", "getset"),
    template!("typescript", "enum_mapper"),
    template!("typescript", "to_json"),
    template!("typescript", "from_response"),
    template!("typescript", "method"),
    template!("typescript", "methods_prologue"),
    template!("kotlin", "getset"),
    template!("kotlin", "enum_mapper"),
    template!("kotlin", "to_json"),
    template!("kotlin", "from_response"),
    template!("kotlin", "method"),
    template!("kotlin", "methods_prologue"),
    template!("csharp", "getset"),
    template!("csharp", "enum_mapper"),
    template!("csharp", "to_json"),
    template!("csharp", "from_response"),
    template!("csharp", "method"),
    template!("csharp", "methods_prologue"),
    template!("swift", "getset"),
    template!("swift", "enum_mapper"),
    template!("swift", "to_json"),
    template!("swift", "from_response"),
    template!("swift", "method"),
    template!("swift", "methods_prologue"),
];

static ENGINE: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    if let Err(e) = tera.add_raw_templates(TEMPLATES.iter().copied()) {
        // Rendering then fails per template with a "not found" error
        log::error!("Failed to register code templates: {}", e);
    }
    tera
});

/// Render `<language>/<name>` with a serializable context.
///
/// Trailing whitespace is normalized to exactly one newline so callers can
/// rely on the shape of the result.
pub fn render<T: Serialize>(language: Language, name: &str, context: &T) -> Result<String> {
    let template_name = format!("{}/{}", language.as_str(), name);
    log::debug!("Rendering template: {}", template_name);
    let context = Context::from_serialize(context)?;
    let rendered = ENGINE.render(&template_name, &context)?;
    Ok(format!("{}\n", rendered.trim_end()))
}

/// Names of all registered templates
pub fn template_names() -> Vec<&'static str> {
    TEMPLATES.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_register() {
        let registered: Vec<&str> = ENGINE.get_template_names().collect();
        for name in template_names() {
            assert!(registered.contains(&name), "missing template {}", name);
        }
    }

    #[test]
    fn test_every_language_ships_the_same_set() {
        for language in Language::all() {
            let count = template_names()
                .iter()
                .filter(|name| name.starts_with(&format!("{}/", language.as_str())))
                .count();
            assert_eq!(count, 6, "{}", language);
        }
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let result = render(Language::Dart, "no_such_template", &json!({}));
        assert!(matches!(result, Err(crate::Error::Template(_))));
    }
}
