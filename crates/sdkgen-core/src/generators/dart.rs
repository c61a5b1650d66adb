//! Dart generator, targeting null-safe Dart.

// Internal imports (std, crate)
use std::path::PathBuf;

use super::{
    block_comment, compose_object, escape_literal, indent_lines, line_comment, member_name,
    method_doc, ordered_params, path_template, shape_of, type_doc, CodeGen, EnumView, GenContext,
    MethodView, ObjectView, PathLocal, PrimitiveKind, PrologueView, PropertyView, Shape,
};
use crate::error::Result;
use crate::language::Language;
use crate::model::{EnumType, Method, ObjectType, ParameterLocation, Property, Type, TypeRef};
use crate::templates;
use crate::utils::{to_lower_camel_case, to_upper_camel_case};

const RESERVED: &[&str] = &[
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void", "while",
    "with",
];

const RAW_FIELDS: &str = "\
Object? _apiRawResponse;
Map<String, dynamic> _apiMapResponse = {};
String _apiResponseContentType = '';
";

const INTERNAL_MEMBERS: &[&str] = &[
    "_apiRawResponse",
    "_apiMapResponse",
    "_apiResponseContentType",
    "apiRawResponse",
    "getApiRawValue",
    "apiResponseContentType",
    "toJson",
    "fromResponse",
];

/// Code generator for the Dart SDK
#[derive(Debug, Clone)]
pub struct DartGen {
    ctx: GenContext,
}

impl DartGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    fn ident(raw: &str) -> String {
        member_name(raw, to_lower_camel_case, RESERVED)
    }

    /// `dynamic` already admits null
    fn nullable(native: &str) -> String {
        if native == "dynamic" {
            native.to_string()
        } else {
            format!("{}?", native)
        }
    }

    /// Expression converting the JSON value `value` into the native type
    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => match kind {
                PrimitiveKind::Text => format!("{}?.toString()", value),
                PrimitiveKind::Integer => format!("{} as int?", value),
                PrimitiveKind::Float => format!("({} as num?)?.toDouble()", value),
                PrimitiveKind::Boolean => format!("{} as bool?", value),
                PrimitiveKind::DateTime => {
                    format!("{0} == null ? null : DateTime.parse({0} as String)", value)
                }
                PrimitiveKind::Binary | PrimitiveKind::Any => value.to_string(),
            },
            Shape::Enum(name) => format!("{}Mapper.fromStringValue({})", name, value),
            Shape::Object(name) => format!(
                "{0} == null ? null : {1}.fromResponse({0}, {2})",
                value, name, content_type
            ),
            Shape::Array(element) => {
                let native = self.type_map(element)?.native_name;
                let item = self.decode(element, "i", content_type)?;
                format!(
                    "{0} == null ? null : ({0} as List).map((i) => {1}).whereType<{2}>().toList()",
                    value, item, native
                )
            }
            Shape::Map(inner) => {
                let native = self.type_map(inner)?.native_name;
                let item = self.decode(inner, "v", content_type)?;
                format!(
                    "{0} == null ? null : Map<String, {1}>.from(({0} as Map).map((k, v) => MapEntry(k, {2})))",
                    value, native, item
                )
            }
        };
        Ok(expr)
    }

    /// Expression converting the native value `value` into JSON
    fn encode(&self, type_ref: &TypeRef, value: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) => format!("{}?.toIso8601String()", value),
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.toStringValue({})", name, value),
            Shape::Object(_) => format!("{}?.toJson()", value),
            Shape::Array(element) => match self.encode(element, "i")? {
                item if item == "i" => value.to_string(),
                item => format!("{}?.map((i) => {}).toList()", value, item),
            },
            Shape::Map(inner) => match self.encode(inner, "v")? {
                item if item == "v" => value.to_string(),
                item => format!("{}?.map((k, v) => MapEntry(k, {}))", value, item),
            },
        };
        Ok(expr)
    }

    fn object_view(&self, object: &ObjectType) -> Result<ObjectView> {
        let properties = object
            .properties
            .values()
            .map(|p| self.property_view(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(ObjectView {
            name: object.name.clone(),
            properties,
        })
    }
}

impl CodeGen for DartGen {
    fn context(&self) -> &GenContext {
        &self.ctx
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        INTERNAL_MEMBERS
    }

    /// Also escapes `$`, which starts string interpolation
    fn escape_literal(&self, raw: &str) -> String {
        escape_literal(raw).replace('$', "\\$")
    }

    fn property_view(&self, property: &Property) -> Result<PropertyView> {
        let ident = Self::ident(&property.name);
        let native = self.type_map(&property.type_ref)?.native_name;
        Ok(PropertyView {
            field: format!("_{}", ident),
            flag: format!("_{}Set", ident),
            raw: self.escape_literal(&property.name),
            native: Self::nullable(&native),
            hydrate: self.property_from_json(property, "_apiMapResponse")?,
            json_value: self.encode(&property.type_ref, &ident)?,
            ident,
        })
    }

    fn language(&self) -> Language {
        Language::Dart
    }

    fn indent_unit(&self) -> &'static str {
        "  "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./dart/{}/lib/src/sdk/{}.dart",
            self.ctx.settings.package_name, base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        false
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue = templates::render(Language::Dart, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, indent: &str) -> String {
        format!("{}}}\n", indent)
    }

    fn models_prologue(&self, indent: &str) -> String {
        format!("\n{}// {}\n", indent, self.ctx.edit_note())
    }

    fn models_epilogue(&self, _indent: &str) -> String {
        String::new()
    }

    fn comment_header(&self, indent: &str, text: Option<&str>, block_char: Option<&str>) -> String {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return String::new();
        };
        match block_char {
            Some(block_char) => block_comment(indent, text, block_char, "/*", "*/"),
            None => line_comment(indent, text, "///"),
        }
    }

    fn summary(&self, _indent: &str, _text: &str) -> String {
        String::new()
    }

    fn begin_region(&self, indent: &str, name: &str) -> String {
        format!("{}// #region {}\n", indent, name)
    }

    fn end_region(&self, indent: &str, name: &str) -> String {
        format!("{}// #endregion {}\n", indent, name)
    }

    fn declare_property(&self, indent: &str, property: &Property) -> Result<String> {
        let view = self.property_view(property)?;
        Ok(format!(
            "{0}{1} {2};\n{0}bool {3} = false;\n",
            indent, view.native, view.field, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors = templates::render(Language::Dart, "getset", &self.property_view(property)?)?;
        Ok(format!(
            "{}{}",
            self.comment_header(indent, Some(&property.description), None),
            indent_lines(&accessors, indent)
        ))
    }

    fn declare_enum_value(&self, indent: &str, raw: &str) -> String {
        format!("{}{}", indent, Self::ident(raw))
    }

    fn enum_mapper(&self, enum_type: &EnumType) -> Result<String> {
        templates::render(Language::Dart, "enum_mapper", &EnumView::new(self, enum_type)?)
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(object) => format!("{}() {{\n  _apiMapResponse = {{}};\n}}\n", object.name),
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "Object? get apiRawResponse {\n  return _apiRawResponse;\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "Object? getApiRawValue(String valueName) {\n  return _apiMapResponse[valueName];\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "String get apiResponseContentType {\n  return _apiResponseContentType;\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => templates::render(Language::Dart, "to_json", &self.object_view(object)?),
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Dart, "from_response", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String> {
        let value = format!("{}['{}']", map_var, self.escape_literal(&property.name));
        Ok(format!(
            "_{} = {}",
            Self::ident(&property.name),
            self.decode(&property.type_ref, &value, "apiResponseContentType")?
        ))
    }

    fn type_signature(&self, indent: &str, ty: &Type) -> Result<String> {
        let keyword = match ty {
            Type::Object(_) => "class",
            Type::Enum(_) => "enum",
            _ => return Ok(String::new()),
        };
        let doc = type_doc(&self.ctx.model, ty)?;
        Ok(format!(
            "{}{}{} {} {{\n",
            self.comment_header(indent, Some(&doc), None),
            indent,
            keyword,
            ty.name()
        ))
    }

    fn sdk_class_name(&self) -> String {
        format!("{}SDK", self.ctx.settings.product_name)
    }

    fn declare_type(&self, indent: &str, ty: &Type) -> Result<String> {
        match ty {
            Type::Enum(enum_type) => {
                let inner = format!("{}{}", indent, self.indent_unit());
                let members: Vec<String> = enum_type
                    .values
                    .iter()
                    .map(|raw| self.declare_enum_value(&inner, raw))
                    .collect();
                let mut out = self.type_signature(indent, ty)?;
                out.push_str(&members.join(",\n"));
                out.push_str(&format!("\n{}}}\n\n", indent));
                out.push_str(&indent_lines(&self.enum_mapper(enum_type)?, indent));
                Ok(out)
            }
            Type::Object(object) => {
                compose_object(self, indent, ty, object, RAW_FIELDS, &format!("{}}}\n", indent))
            }
            _ => Ok(String::new()),
        }
    }

    fn declare_method(&self, indent: &str, method: &Method) -> Result<String> {
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut view = MethodView {
            doc: self.comment_header("", Some(&method_doc(self, method)?), None),
            name: Self::ident(&method.operation_id),
            verb: method.http_verb.to_lowercase(),
            ..Default::default()
        };
        let mut query = Vec::new();
        let mut headers = Vec::new();

        for param in ordered_params(method) {
            let ident = Self::ident(&param.name);
            let native = self.type_map(&param.type_ref)?.native_name;
            if param.required {
                required.push(format!("{} {}", native, ident));
            } else {
                optional.push(format!("{} {}", Self::nullable(&native), ident));
            }
            match param.location {
                ParameterLocation::Path => view.path_locals.push(PathLocal {
                    name: format!("path{}", to_upper_camel_case(&param.name)),
                    raw: param.name.clone(),
                    value: ident,
                }),
                ParameterLocation::Query | ParameterLocation::Header => {
                    let entry = format!(
                        "'{}': {}",
                        self.escape_literal(&param.name),
                        self.encode(&param.type_ref, &ident)?
                    );
                    match param.location {
                        ParameterLocation::Header => headers.push(entry),
                        _ => query.push(entry),
                    }
                }
                ParameterLocation::Body => view.body = Some(self.encode(&param.type_ref, &ident)?),
            }
        }

        view.signature = required.join(", ");
        if !optional.is_empty() {
            if !view.signature.is_empty() {
                view.signature.push_str(", ");
            }
            view.signature.push_str(&format!("{{{}}}", optional.join(", ")));
        }
        view.path = format!(
            "'{}'",
            path_template(&method.path, |name| {
                match view.path_locals.iter().find(|local| local.raw == name) {
                    Some(local) => format!("${{{}}}", local.name),
                    None => format!("{{{}}}", name),
                }
            })
        );
        view.query = if query.is_empty() {
            "null".to_string()
        } else {
            format!("{{{}}}", query.join(", "))
        };
        if !headers.is_empty() {
            view.headers = Some(format!("{{{}}}", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = self.type_map(response)?.native_name;
                view.decode = self.decode(response, "json", "contentType")?;
            }
            None => {
                view.return_type = "dynamic".to_string();
                view.decode = "json".to_string();
            }
        }

        let rendered = templates::render(Language::Dart, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}
