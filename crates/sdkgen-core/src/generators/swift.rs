//! Swift generator.

// Internal imports (std, crate)
use std::path::PathBuf;

use super::{
    block_comment, compose_object, indent_lines, line_comment, member_name, method_doc,
    ordered_params, path_template, shape_of, type_doc, CodeGen, EnumView, GenContext, MethodView,
    ObjectView, PathLocal, PrimitiveKind, PrologueView, PropertyView, Shape,
};
use crate::error::Result;
use crate::language::Language;
use crate::model::{EnumType, Method, ObjectType, ParameterLocation, Property, Type, TypeRef};
use crate::templates;
use crate::utils::{to_lower_camel_case, to_upper_camel_case};

const RESERVED: &[&str] = &[
    "associatedtype", "break", "case", "catch", "class", "continue", "default", "defer", "deinit",
    "do", "else", "enum", "extension", "fallthrough", "false", "fileprivate", "for", "func",
    "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil", "open",
    "operator", "private", "protocol", "public", "repeat", "rethrows", "return", "self", "static",
    "struct", "subscript", "super", "switch", "throw", "throws", "true", "try", "typealias", "var",
    "where", "while",
];

const RAW_FIELDS: &str = "\
private var _apiRawResponse: Any? = nil
private var _apiMapResponse: [String: Any] = [:]
private var _apiResponseContentType: String = \"\"
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

/// Code generator for the Swift SDK
#[derive(Debug, Clone)]
pub struct SwiftGen {
    ctx: GenContext,
}

impl SwiftGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    fn ident(raw: &str) -> String {
        member_name(raw, to_lower_camel_case, RESERVED)
    }

    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => match kind {
                PrimitiveKind::Text => format!("{} as? String", value),
                PrimitiveKind::Integer => format!("({} as? NSNumber)?.int64Value", value),
                PrimitiveKind::Float => {
                    let native = self.type_map(type_ref)?.native_name;
                    format!("({} as? NSNumber)?.{}Value", value, native.to_lowercase())
                }
                PrimitiveKind::Boolean => format!("{} as? Bool", value),
                PrimitiveKind::DateTime => format!(
                    "({} as? String).flatMap {{ ISO8601DateFormatter().date(from: $0) }}",
                    value
                ),
                PrimitiveKind::Binary => format!("{} as? Data", value),
                PrimitiveKind::Any => value.to_string(),
            },
            Shape::Enum(name) => format!("{}Mapper.fromStringValue({} as? String)", name, value),
            Shape::Object(name) => format!(
                "{}.map {{ {}.fromResponse($0, {}) }}",
                value, name, content_type
            ),
            Shape::Array(element) => {
                let item = self.decode(element, "i", content_type)?;
                format!(
                    "({} as? [Any]).map {{ $0.compactMap {{ i in {} }} }}",
                    value, item
                )
            }
            Shape::Map(inner) => {
                let item = self.decode(inner, "v", content_type)?;
                format!(
                    "({} as? [String: Any]).map {{ $0.compactMapValues {{ v in {} }} }}",
                    value, item
                )
            }
        };
        Ok(expr)
    }

    /// `optional` tells whether `value` may be nil; elements of collections are not
    fn encode(&self, type_ref: &TypeRef, value: &str, optional: bool) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) if optional => format!(
                "{}.map {{ ISO8601DateFormatter().string(from: $0) }}",
                value
            ),
            Shape::Primitive(PrimitiveKind::DateTime) => {
                format!("ISO8601DateFormatter().string(from: {})", value)
            }
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.toStringValue({})", name, value),
            Shape::Object(_) if optional => format!("{}?.toJson()", value),
            Shape::Object(_) => format!("{}.toJson()", value),
            Shape::Array(element) => {
                let access = if optional { "?." } else { "." };
                match self.encode(element, "i", false)? {
                    item if item == "i" => value.to_string(),
                    item => format!("{}{}map {{ i in {} }}", value, access, item),
                }
            }
            Shape::Map(inner) => {
                let access = if optional { "?." } else { "." };
                match self.encode(inner, "v", false)? {
                    item if item == "v" => value.to_string(),
                    item => format!("{}{}mapValues {{ v in {} }}", value, access, item),
                }
            }
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

impl CodeGen for SwiftGen {
    fn context(&self) -> &GenContext {
        &self.ctx
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        INTERNAL_MEMBERS
    }

    fn property_view(&self, property: &Property) -> Result<PropertyView> {
        let ident = Self::ident(&property.name);
        let native = self.type_map(&property.type_ref)?.native_name;
        Ok(PropertyView {
            field: format!("_{}", ident),
            flag: format!("_{}Set", ident),
            raw: self.escape_literal(&property.name),
            native: format!("{}?", native),
            hydrate: self.property_from_json(property, "_apiMapResponse")?,
            json_value: self.encode(&property.type_ref, &ident, true)?,
            ident,
        })
    }

    fn language(&self) -> Language {
        Language::Swift
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./swift/{}/sdk/{}.swift",
            self.ctx.settings.product_name.to_lowercase(),
            base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        false
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue =
            templates::render(Language::Swift, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, indent: &str) -> String {
        format!("{}}}\n", indent)
    }

    fn models_prologue(&self, indent: &str) -> String {
        let header = format!("\n// {}\n\nimport Foundation\n\n", self.ctx.edit_note());
        indent_lines(&header, indent)
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

    fn summary(&self, indent: &str, text: &str) -> String {
        match text.lines().next().map(str::trim) {
            Some(line) if !line.is_empty() => format!("{}/// {}\n", indent, line),
            _ => String::new(),
        }
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
            "{0}private var {1}: {2} = nil\n{0}private var {3}: Bool = false\n",
            indent, view.field, view.native, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors =
            templates::render(Language::Swift, "getset", &self.property_view(property)?)?;
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
        templates::render(Language::Swift, "enum_mapper", &EnumView::new(self, enum_type)?)
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "public init() {\n    _apiMapResponse = [:]\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => {
                "public var apiRawResponse: Any? {\n    return _apiRawResponse\n}\n".to_string()
            }
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "public func getApiRawValue(_ valueName: String) -> Any? {\n    return _apiMapResponse[valueName]\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "public var apiResponseContentType: String {\n    return _apiResponseContentType\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Swift, "to_json", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Swift, "from_response", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String> {
        let value = format!("{}[\"{}\"]", map_var, self.escape_literal(&property.name));
        Ok(format!(
            "_{} = {}",
            Self::ident(&property.name),
            self.decode(&property.type_ref, &value, "_apiResponseContentType")?
        ))
    }

    fn type_signature(&self, indent: &str, ty: &Type) -> Result<String> {
        let header = match ty {
            Type::Object(object) => format!("public final class {}", object.name),
            Type::Enum(enum_type) => format!("public enum {}: String, Codable", enum_type.name),
            _ => return Ok(String::new()),
        };
        let doc = type_doc(&self.ctx.model, ty)?;
        Ok(format!(
            "{}{}{} {{\n",
            self.comment_header(indent, Some(&doc), None),
            indent,
            header
        ))
    }

    fn sdk_class_name(&self) -> String {
        format!("{}SDK", self.ctx.settings.product_name)
    }

    fn declare_type(&self, indent: &str, ty: &Type) -> Result<String> {
        match ty {
            Type::Enum(enum_type) => {
                let inner = format!("{}{}", indent, self.indent_unit());
                let mut out = self.type_signature(indent, ty)?;
                for raw in &enum_type.values {
                    let member = self.declare_enum_value("", raw);
                    let literal = self.escape_literal(raw);
                    out.push_str(&format!("{}case {} = \"{}\"\n", inner, member, literal));
                }
                out.push_str(&format!("{}}}\n\n", indent));
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
        let mut view = MethodView {
            doc: self.comment_header("", Some(&method_doc(self, method)?), None),
            name: Self::ident(&method.operation_id),
            verb: method.http_verb.to_lowercase(),
            ..Default::default()
        };
        let mut args = Vec::new();
        let mut query = Vec::new();
        let mut headers = Vec::new();
        for param in ordered_params(method) {
            let ident = Self::ident(&param.name);
            let native = self.type_map(&param.type_ref)?.native_name;
            if param.required {
                args.push(format!("_ {}: {}", ident, native));
            } else {
                args.push(format!("{}: {}? = nil", ident, native));
            }
            match param.location {
                ParameterLocation::Path => view.path_locals.push(PathLocal {
                    name: format!("path{}", to_upper_camel_case(&param.name)),
                    raw: param.name.clone(),
                    value: ident,
                }),
                ParameterLocation::Query | ParameterLocation::Header => {
                    let entry = format!(
                        "\"{}\": {}",
                        self.escape_literal(&param.name),
                        self.encode(&param.type_ref, &ident, !param.required)?
                    );
                    match param.location {
                        ParameterLocation::Header => headers.push(entry),
                        _ => query.push(entry),
                    }
                }
                ParameterLocation::Body => {
                    view.body = Some(self.encode(&param.type_ref, &ident, !param.required)?)
                }
            }
        }
        view.signature = args.join(", ");
        view.path = path_template(&method.path, |name| {
            match view.path_locals.iter().find(|local| local.raw == name) {
                Some(local) => format!("\\({})", local.name),
                None => format!("{{{}}}", name),
            }
        });
        view.query = if query.is_empty() {
            "nil".to_string()
        } else {
            format!("[{}]", query.join(", "))
        };
        if !headers.is_empty() {
            view.headers = Some(format!("[{}]", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = self.type_map(response)?.native_name;
                view.decode = self.decode(response, "json", "contentType")?;
            }
            None => {
                view.return_type = "Voidish".to_string();
                view.decode = "nil".to_string();
            }
        }

        let rendered = templates::render(Language::Swift, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}
