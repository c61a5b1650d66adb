//! The generator contract and the per-language generators implementing it.
//!
//! A [`CodeGen`] turns one entity of the model (a type, a property, a method)
//! into a fragment of source text. Fragments take an indentation prefix where
//! nesting matters and never touch the filesystem; the driver in
//! [`crate::generate`] stitches them into whole files.
//!
//! Behaviour shared between languages lives in free functions in this module
//! rather than in a base implementation, so every generator states its own
//! rendering rules explicitly.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use sdkgen_core::generators::{dart::DartGen, CodeGen, GenContext};
//! use sdkgen_core::model::ApiModelBuilder;
//!
//! let model = Arc::new(ApiModelBuilder::new("Example", "4.0").build().unwrap());
//! let gen = DartGen::new(GenContext::new(model, None));
//!
//! assert_eq!(gen.declare_enum_value("", "value_xyz"), "valueXyz");
//! assert_eq!(gen.begin_region("", "Users"), "// #region Users\n");
//! ```

pub mod csharp;
pub mod dart;
pub mod kotlin;
pub mod python;
pub mod swift;
pub mod typescript;

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{SdkSettings, VersionInfo};
use crate::error::{Error, Result};
use crate::language::Language;
use crate::model::{
    ApiModel, EnumType, Method, ObjectType, Parameter, ParameterLocation, Property, Type, TypeRef,
};
use crate::type_map::{map_type, MappedType};
use crate::utils::leading_digit_safe;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// State shared by every fragment a generator renders
#[derive(Debug, Clone)]
pub struct GenContext {
    /// The model being rendered, shared with the other generators of a run
    pub model: Arc<ApiModel>,
    /// Version stamp; the model version is used when absent
    pub versions: Option<VersionInfo>,
    pub settings: SdkSettings,
}

impl GenContext {
    pub fn new(model: Arc<ApiModel>, versions: Option<VersionInfo>) -> Self {
        Self {
            model,
            versions,
            settings: SdkSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SdkSettings) -> Self {
        self.settings = settings;
        self
    }

    /// API version the generator is bound to
    pub fn api_version(&self) -> &str {
        match &self.versions {
            Some(versions) => &versions.api_version,
            None => self.model.version(),
        }
    }

    pub fn is_default_api(&self) -> bool {
        self.api_version() == self.settings.default_api_version
    }

    /// Version folded into a path segment, `4.0` becomes `40`
    pub fn api_folder(&self) -> String {
        self.api_version().replace('.', "")
    }

    /// Do-not-edit notice stamped at the top of generated files
    pub fn edit_note(&self) -> String {
        let mut note = format!(
            "NOTE: Do not edit this file generated by {} SDK Codegen for API {}",
            self.settings.product_name,
            self.api_version()
        );
        if let Some(sdk_version) = self
            .versions
            .as_ref()
            .and_then(|v| v.sdk_version.as_deref())
        {
            note.push_str(&format!(" (SDK {})", sdk_version));
        }
        note
    }
}

/// Rendering contract every target language implements.
///
/// Fragments returned by the `declare_*`, comment and region operations end
/// with a newline. Operations that render a whole member (`to_json`,
/// `from_response`, the constructors and raw accessors) return text at
/// column zero; callers indent it.
pub trait CodeGen: Send + Sync {
    fn context(&self) -> &GenContext;

    fn language(&self) -> Language;

    /// One level of indentation
    fn indent_unit(&self) -> &'static str;

    /// Output path of an artifact, e.g. `methods` or `models`
    fn sdk_file_name(&self, base_name: &str) -> PathBuf;

    fn is_default_api(&self) -> bool {
        self.context().is_default_api()
    }

    /// Whether one SDK package can hold several API versions side by side
    fn supports_multi_api(&self) -> bool;

    fn methods_prologue(&self, indent: &str) -> Result<String>;

    fn methods_epilogue(&self, indent: &str) -> String;

    fn models_prologue(&self, indent: &str) -> String;

    fn models_epilogue(&self, indent: &str) -> String;

    /// Documentation comment for `text`.
    ///
    /// Empty when the text is absent or empty. With a `block_char` the text
    /// is wrapped in the language's block delimiters, each line prefixed with
    /// the character and padded with a blank line above and below.
    fn comment_header(&self, indent: &str, text: Option<&str>, block_char: Option<&str>) -> String;

    fn summary(&self, indent: &str, text: &str) -> String;

    fn begin_region(&self, indent: &str, name: &str) -> String;

    fn end_region(&self, indent: &str, name: &str) -> String;

    /// Member names every generated object declares for itself
    fn reserved_members(&self) -> &'static [&'static str];

    /// Escape `raw` for use inside a quoted string literal
    fn escape_literal(&self, raw: &str) -> String {
        escape_literal(raw)
    }

    /// Accessor, field and flag names of a property plus its conversions
    fn property_view(&self, property: &Property) -> Result<PropertyView>;

    /// Private backing field plus its set flag
    fn declare_property(&self, indent: &str, property: &Property) -> Result<String>;

    /// Lazy getter and flag-setting setter for a property
    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String>;

    /// Identifier of an enum member for a raw value
    fn declare_enum_value(&self, indent: &str, raw: &str) -> String;

    /// Conversions between enum members and their raw strings
    fn enum_mapper(&self, enum_type: &EnumType) -> Result<String>;

    fn default_constructor(&self, ty: &Type) -> String;

    fn get_api_raw_response(&self, ty: &Type) -> String;

    fn get_api_raw_value(&self, ty: &Type) -> String;

    fn get_content_type(&self, ty: &Type) -> String;

    fn to_json(&self, ty: &Type) -> Result<String>;

    fn from_response(&self, ty: &Type) -> Result<String>;

    /// Assignment hydrating a property's backing field from `map_var`
    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String>;

    /// Doc comment and opening line of a type declaration
    fn type_signature(&self, indent: &str, ty: &Type) -> Result<String>;

    fn param_comment(&self, param: &Parameter, mapped: &MappedType) -> String {
        param_comment(param, mapped)
    }

    /// Name of the generated client class
    fn sdk_class_name(&self) -> String;

    fn type_map(&self, type_ref: &TypeRef) -> Result<MappedType> {
        map_type(&self.context().model, type_ref, self.language())
    }

    /// Complete declaration of an enum or object type; empty for other types
    fn declare_type(&self, indent: &str, ty: &Type) -> Result<String>;

    /// Complete client method for an operation
    fn declare_method(&self, indent: &str, method: &Method) -> Result<String>;
}

/// Template context for an enum and its mapper
#[derive(Debug, Clone, Serialize)]
pub struct EnumView {
    pub name: String,
    pub values: Vec<EnumValueView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumValueView {
    /// Member identifier in the target language
    pub ident: String,
    /// Wire value, escaped for a string literal
    pub raw: String,
}

impl EnumView {
    /// Fails when two values render as the same member
    pub fn new<G: CodeGen + ?Sized>(gen: &G, enum_type: &EnumType) -> Result<Self> {
        let values: Vec<EnumValueView> = enum_type
            .values
            .iter()
            .map(|raw| EnumValueView {
                ident: gen.declare_enum_value("", raw),
                raw: gen.escape_literal(raw),
            })
            .collect();
        ensure_distinct(
            &enum_type.name,
            enum_type
                .values
                .iter()
                .zip(&values)
                .map(|(raw, value)| (value.ident.clone(), raw.clone())),
        )?;
        Ok(Self {
            name: enum_type.name.clone(),
            values,
        })
    }
}

/// Template context for one property's accessors and serialization
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    /// Public accessor name
    pub ident: String,
    /// Private backing field
    pub field: String,
    /// Set flag of the backing field
    pub flag: String,
    /// Key in the response map, escaped for a string literal
    pub raw: String,
    /// Native type as written in accessor signatures
    pub native: String,
    /// Statement hydrating the field from the response map
    pub hydrate: String,
    /// Expression producing the JSON value of the property
    pub json_value: String,
}

/// Template context for `from_response`, `to_json` and constructors
#[derive(Debug, Clone, Serialize)]
pub struct ObjectView {
    pub name: String,
    pub properties: Vec<PropertyView>,
}

/// Template context for the methods file prologue
#[derive(Debug, Clone, Serialize)]
pub struct PrologueView {
    pub edit_note: String,
    pub product: String,
    pub package: String,
    pub class_name: String,
    pub api_version: String,
    pub api_folder: String,
    /// Model names the methods file refers to: types plus enum mappers
    pub imports: Vec<String>,
}

impl PrologueView {
    pub fn new<G: CodeGen + ?Sized>(gen: &G) -> Self {
        let ctx = gen.context();
        let mut imports = Vec::new();
        for ty in ctx.model.all_types() {
            match ty {
                Type::Enum(e) => {
                    imports.push(e.name.clone());
                    imports.push(format!("{}Mapper", e.name));
                }
                Type::Object(o) => imports.push(o.name.clone()),
                Type::Primitive(_) | Type::Array(_) | Type::Map(_) => {}
            }
        }
        Self {
            edit_note: ctx.edit_note(),
            product: ctx.settings.product_name.clone(),
            package: ctx.settings.package_name.clone(),
            class_name: gen.sdk_class_name(),
            api_version: ctx.api_version().to_string(),
            api_folder: ctx.api_folder(),
            imports,
        }
    }
}

/// Template context for a client method
#[derive(Debug, Clone, Default, Serialize)]
pub struct MethodView {
    /// Rendered doc comment, ending with a newline when present
    pub doc: String,
    pub name: String,
    pub signature: String,
    pub return_type: String,
    /// HTTP verb in the casing the runtime helper uses
    pub verb: String,
    /// Path expression with parameters substituted
    pub path: String,
    pub path_locals: Vec<PathLocal>,
    /// Query argument expression
    pub query: String,
    /// Body argument expression, if the method sends one
    pub body: Option<String>,
    /// Header mapping expression, if the method sends header parameters
    pub headers: Option<String>,
    /// Expression decoding the response payload
    pub decode: String,
}

/// A path parameter encoded into a local before the request
#[derive(Debug, Clone, Serialize)]
pub struct PathLocal {
    /// Raw placeholder name in the path
    pub raw: String,
    pub name: String,
    pub value: String,
}

/// Coarse classification of primitive types used to pick conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Binary,
    Any,
}

impl PrimitiveKind {
    pub fn of(name: &str) -> Self {
        match name {
            "string" | "password" | "byte" | "uri" | "email" | "uuid" => Self::Text,
            "integer" | "int64" => Self::Integer,
            "number" | "float" | "double" => Self::Float,
            "boolean" => Self::Boolean,
            "date" | "datetime" | "date-time" => Self::DateTime,
            "binary" => Self::Binary,
            _ => Self::Any,
        }
    }
}

/// What a type reference resolves to, as far as conversions care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    Primitive(PrimitiveKind),
    Enum(&'a str),
    Object(&'a str),
    Array(&'a TypeRef),
    Map(&'a TypeRef),
}

/// Resolve the conversion shape of a reference
pub fn shape_of<'a>(model: &'a ApiModel, type_ref: &'a TypeRef) -> Result<Shape<'a>> {
    let shape = match type_ref {
        TypeRef::Named(name) => match model.type_named(name)? {
            Type::Primitive(p) => Shape::Primitive(PrimitiveKind::of(&p.name)),
            Type::Array(a) => Shape::Array(&a.element),
            Type::Map(m) => Shape::Map(&m.value),
            Type::Enum(e) => Shape::Enum(&e.name),
            Type::Object(o) => Shape::Object(&o.name),
        },
        TypeRef::Array { array_of } => Shape::Array(array_of),
        TypeRef::Map { map_of } => Shape::Map(map_of),
    };
    Ok(shape)
}

/// Prefix every non-blank line of `text` with `indent`
pub fn indent_lines(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    out
}

/// One comment line per text line, e.g. `/// text`
pub fn line_comment(indent: &str, text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{}{}\n", indent, prefix)
            } else {
                format!("{}{} {}\n", indent, prefix, line)
            }
        })
        .collect()
}

/// Javadoc-style comment
pub fn star_comment(indent: &str, text: &str) -> String {
    let mut out = format!("{}/**\n", indent);
    out.push_str(&line_comment(indent, text, " *"));
    out.push_str(&format!("{} */\n", indent));
    out
}

/// Block comment with every line prefixed by `block_char` and a blank line
/// of padding after the opener and before the closer
pub fn block_comment(indent: &str, text: &str, block_char: &str, open: &str, close: &str) -> String {
    let mut out = format!("{}{}\n\n", indent, open);
    for line in text.lines() {
        out.push_str(format!("{}{}{}", indent, block_char, line).trim_end());
        out.push('\n');
    }
    out.push_str(&format!("\n{}{}{}\n", indent, block_char, close));
    out
}

/// Backslash-escape quotes, backslashes and control characters
pub fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Fails with the first generated name claimed by two sources.
///
/// `members` pairs each generated name with the raw name it came from.
pub fn ensure_distinct<I>(owner: &str, members: I) -> Result<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    for (name, source) in members {
        if let Some(first) = seen.get(&name) {
            return Err(Error::model_integrity(format!(
                "'{}' and '{}' both render as '{}' in {}",
                first, source, name, owner
            )));
        }
        seen.insert(name, source);
    }
    Ok(())
}

/// Cased identifier for a raw name, suffixed with `Value` when it collides
/// with a reserved word
pub fn member_name(raw: &str, case: fn(&str) -> String, reserved: &[&str]) -> String {
    let ident = leading_digit_safe(case(raw), "v");
    if reserved.contains(&ident.as_str()) {
        format!("{}Value", ident)
    } else {
        ident
    }
}

/// Parameters in call-signature order: required ones first, otherwise in
/// declaration order. A method with a body type but no body parameter gets a
/// required `body` parameter at the end of the required group.
pub fn ordered_params(method: &Method) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = method
        .parameters
        .iter()
        .filter(|p| p.required)
        .cloned()
        .collect();
    if let Some(body_type) = &method.body_type {
        let has_body = method
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Body);
        if !has_body {
            params.push(Parameter::new("body", body_type.clone(), ParameterLocation::Body).required(true));
        }
    }
    params.extend(method.parameters.iter().filter(|p| !p.required).cloned());
    params
}

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path parameter pattern is valid"));

/// Names of the `{placeholders}` in a path, in order
pub fn path_params(path: &str) -> Vec<String> {
    PATH_PARAM
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace every `{placeholder}` in a path with `replace(name)`
pub fn path_template(path: &str, replace: impl Fn(&str) -> String) -> String {
    PATH_PARAM
        .replace_all(path, |caps: &Captures| replace(&caps[1]))
        .into_owned()
}

/// `@param {<native>} <name> <description>`
pub fn param_comment(param: &Parameter, mapped: &MappedType) -> String {
    format!(
        "@param {{{}}} {} {}",
        mapped.native_name, param.name, param.description
    )
    .trim_end()
    .to_string()
}

/// Documentation of a type: its description plus the owner, if any
pub fn type_doc(model: &ApiModel, ty: &Type) -> Result<String> {
    let mut doc = ty.description().trim().to_string();
    if let Type::Object(object) = ty {
        if let Some(owner) = model.parent_of(object)? {
            if !doc.is_empty() {
                doc.push_str("\n\n");
            }
            doc.push_str(&format!("Owned by {}", owner.name));
        }
    }
    Ok(doc)
}

/// Documentation of a method: summary, route and parameters
pub fn method_doc<G: CodeGen + ?Sized>(gen: &G, method: &Method) -> Result<String> {
    let mut sections = Vec::new();
    if !method.summary.trim().is_empty() {
        sections.push(method.summary.trim().to_string());
    }
    let returns = match &method.response_type {
        Some(response) => gen.type_map(response)?.native_name,
        None => "void".to_string(),
    };
    sections.push(format!("{} {} -> {}", method.http_verb, method.path, returns));

    let mut params = Vec::new();
    for param in ordered_params(method) {
        let mapped = gen.type_map(&param.type_ref)?;
        params.push(gen.param_comment(&param, &mapped));
    }
    if !params.is_empty() {
        sections.push(params.join("\n"));
    }
    Ok(sections.join("\n\n"))
}

/// Object declaration assembled from the contract operations.
///
/// `raw_fields` declares the raw payload storage; `close` ends the type.
pub fn compose_object<G: CodeGen + ?Sized>(
    gen: &G,
    indent: &str,
    ty: &Type,
    object: &ObjectType,
    raw_fields: &str,
    close: &str,
) -> Result<String> {
    let mut members: Vec<(String, String)> = gen
        .reserved_members()
        .iter()
        .map(|name| (name.to_string(), format!("generated member {}", name)))
        .collect();
    for property in object.properties.values() {
        let view = gen.property_view(property)?;
        for name in [view.ident, view.field, view.flag] {
            members.push((name, property.name.clone()));
        }
    }
    ensure_distinct(&object.name, members)?;

    let inner = format!("{}{}", indent, gen.indent_unit());
    let mut out = gen.type_signature(indent, ty)?;
    out.push_str(&indent_lines(raw_fields, &inner));
    for property in object.properties.values() {
        out.push_str(&gen.declare_property(&inner, property)?);
    }
    out.push('\n');

    let members = [gen.default_constructor(ty), gen.from_response(ty)?];
    for member in members.iter().filter(|m| !m.is_empty()) {
        out.push_str(&indent_lines(member, &inner));
        out.push('\n');
    }
    for property in object.properties.values() {
        out.push_str(&gen.declare_property_get_set(&inner, property)?);
        out.push('\n');
    }
    let accessors = [
        gen.get_api_raw_response(ty),
        gen.get_api_raw_value(ty),
        gen.get_content_type(ty),
    ];
    for accessor in accessors.iter().filter(|a| !a.is_empty()) {
        out.push_str(&indent_lines(accessor, &inner));
        out.push('\n');
    }
    out.push_str(&indent_lines(&gen.to_json(ty)?, &inner));
    out.push_str(close);
    Ok(out)
}
