//! C# generator, targeting C# 10 with nullable reference types enabled.

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
use crate::utils::{to_lower_camel_case, to_snake_case, to_upper_camel_case};

const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

const RAW_FIELDS: &str = "\
private object? _apiRawResponse = null;
private IDictionary<string, object?> _apiMapResponse = new Dictionary<string, object?>();
private string _apiResponseContentType = \"\";
";

const INTERNAL_MEMBERS: &[&str] = &[
    "_apiRawResponse",
    "_apiMapResponse",
    "_apiResponseContentType",
    "ApiRawResponse",
    "GetApiRawValue",
    "ApiResponseContentType",
    "ToJson",
    "FromResponse",
];

/// Code generator for the C# SDK
#[derive(Debug, Clone)]
pub struct CSharpGen {
    ctx: GenContext,
}

impl CSharpGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    /// Private field and parameter name
    fn ident(raw: &str) -> String {
        member_name(raw, to_lower_camel_case, RESERVED)
    }

    /// Public property name
    fn public_name(raw: &str) -> String {
        to_upper_camel_case(&Self::ident(raw))
    }

    fn namespace(&self) -> String {
        format!(
            "{}.SDK.API{}",
            self.ctx.settings.product_name,
            self.ctx.api_folder()
        )
    }

    /// Lambda parameters may not shadow an enclosing one
    fn lambda_var(base: &str, depth: usize) -> String {
        if depth == 0 {
            base.to_string()
        } else {
            format!("{}{}", base, depth)
        }
    }

    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str, depth: usize) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => {
                let native = self.type_map(type_ref)?.native_name;
                match kind {
                    PrimitiveKind::Text => format!("{}?.ToString()", value),
                    PrimitiveKind::Integer => {
                        format!("{0} == null ? null : ({1}?)Convert.ToInt64({0})", value, native)
                    }
                    PrimitiveKind::Float if native == "float" => {
                        format!("{0} == null ? null : (float?)Convert.ToSingle({0})", value)
                    }
                    PrimitiveKind::Float => {
                        format!("{0} == null ? null : (double?)Convert.ToDouble({0})", value)
                    }
                    PrimitiveKind::Boolean => {
                        format!("{0} == null ? null : (bool?)Convert.ToBoolean({0})", value)
                    }
                    PrimitiveKind::DateTime => format!(
                        "{0} == null ? null : (DateTime?)DateTime.Parse({0}.ToString()!)",
                        value
                    ),
                    PrimitiveKind::Binary => format!("{} as byte[]", value),
                    PrimitiveKind::Any => value.to_string(),
                }
            }
            Shape::Enum(name) => format!("{}Mapper.FromStringValue({}?.ToString())", name, value),
            Shape::Object(name) => format!(
                "{0} == null ? null : {1}.FromResponse({0}, {2})",
                value, name, content_type
            ),
            Shape::Array(element) => {
                let native = self.type_map(element)?.native_name;
                let var = Self::lambda_var("i", depth);
                let item = self.decode(element, &var, content_type, depth + 1)?;
                format!(
                    "({0} as IEnumerable<object?>)?.Select({1} => ({2})({3})!).ToArray()",
                    value, var, native, item
                )
            }
            Shape::Map(inner) => {
                let native = self.type_map(inner)?.native_name;
                let var = Self::lambda_var("e", depth);
                let item = self.decode(inner, &format!("{}.Value", var), content_type, depth + 1)?;
                format!(
                    "({0} as IDictionary<string, object?>)?.ToDictionary({1} => {1}.Key, {1} => ({2})({3})!)",
                    value, var, native, item
                )
            }
        };
        Ok(expr)
    }

    /// `optional` tells whether `value` may be null; elements of collections are not
    fn encode(&self, type_ref: &TypeRef, value: &str, optional: bool, depth: usize) -> Result<String> {
        let access = if optional { "?." } else { "." };
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) => {
                format!("{}{}ToString(\"o\")", value, access)
            }
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.ToStringValue({})", name, value),
            Shape::Object(_) => format!("{}{}ToJson()", value, access),
            Shape::Array(element) => {
                let var = Self::lambda_var("i", depth);
                match self.encode(element, &var, false, depth + 1)? {
                    item if item == var => value.to_string(),
                    item => format!("{}{}Select({} => {}).ToArray()", value, access, var, item),
                }
            }
            Shape::Map(inner) => {
                let var = Self::lambda_var("e", depth);
                let entry = format!("{}.Value", var);
                match self.encode(inner, &entry, false, depth + 1)? {
                    item if item == entry => value.to_string(),
                    item => format!(
                        "{0}{1}ToDictionary({2} => {2}.Key, {2} => {3})",
                        value, access, var, item
                    ),
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

impl CodeGen for CSharpGen {
    fn context(&self) -> &GenContext {
        &self.ctx
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        INTERNAL_MEMBERS
    }

    fn property_view(&self, property: &Property) -> Result<PropertyView> {
        let ident = Self::ident(&property.name);
        let public = Self::public_name(&property.name);
        let native = self.type_map(&property.type_ref)?.native_name;
        Ok(PropertyView {
            field: format!("_{}", ident),
            flag: format!("_{}Set", ident),
            raw: self.escape_literal(&property.name),
            native: format!("{}?", native),
            hydrate: self.property_from_json(property, "_apiMapResponse")?,
            json_value: self.encode(&property.type_ref, &public, true, 0)?,
            ident: public,
        })
    }

    fn language(&self) -> Language {
        Language::CSharp
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./csharp/sdk/{}/{}.cs",
            self.ctx.api_version(),
            base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        false
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue =
            templates::render(Language::CSharp, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, indent: &str) -> String {
        format!("{}}}\n", indent)
    }

    fn models_prologue(&self, indent: &str) -> String {
        let header = format!(
            "\n// {}\n\n#nullable enable\nusing System;\nusing System.Collections.Generic;\n\
             using System.Linq;\n\nnamespace {};\n\n",
            self.ctx.edit_note(),
            self.namespace()
        );
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
            Some(line) if !line.is_empty() => {
                format!("{}/// <summary>{}</summary>\n", indent, line)
            }
            _ => String::new(),
        }
    }

    fn begin_region(&self, indent: &str, name: &str) -> String {
        format!("{}#region {}\n", indent, name)
    }

    fn end_region(&self, indent: &str, name: &str) -> String {
        format!("{}#endregion {}\n", indent, name)
    }

    fn declare_property(&self, indent: &str, property: &Property) -> Result<String> {
        let view = self.property_view(property)?;
        Ok(format!(
            "{0}private {1} {2} = null;\n{0}private bool {3} = false;\n",
            indent, view.native, view.field, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors =
            templates::render(Language::CSharp, "getset", &self.property_view(property)?)?;
        Ok(format!(
            "{}{}",
            self.comment_header(indent, Some(&property.description), None),
            indent_lines(&accessors, indent)
        ))
    }

    fn declare_enum_value(&self, indent: &str, raw: &str) -> String {
        format!("{}{}", indent, member_name(raw, to_upper_camel_case, RESERVED))
    }

    fn enum_mapper(&self, enum_type: &EnumType) -> Result<String> {
        templates::render(Language::CSharp, "enum_mapper", &EnumView::new(self, enum_type)?)
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(object) => format!(
                "public {}()\n{{\n    _apiMapResponse = new Dictionary<string, object?>();\n}}\n",
                object.name
            ),
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "public object? ApiRawResponse => _apiRawResponse;\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "public object? GetApiRawValue(string valueName)\n{\n    return _apiMapResponse.TryGetValue(valueName, out var value) ? value : null;\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => {
                "public string ApiResponseContentType => _apiResponseContentType;\n".to_string()
            }
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::CSharp, "to_json", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::CSharp, "from_response", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String> {
        let value = format!("{}[\"{}\"]", map_var, self.escape_literal(&property.name));
        Ok(format!(
            "_{} = {}",
            Self::ident(&property.name),
            self.decode(&property.type_ref, &value, "_apiResponseContentType", 0)?
        ))
    }

    fn type_signature(&self, indent: &str, ty: &Type) -> Result<String> {
        let keyword = match ty {
            Type::Object(_) => "public class",
            Type::Enum(_) => "public enum",
            _ => return Ok(String::new()),
        };
        let doc = type_doc(&self.ctx.model, ty)?;
        Ok(format!(
            "{0}{1}{2} {3}\n{1}{{\n",
            self.comment_header(indent, Some(&doc), None),
            indent,
            keyword,
            ty.name()
        ))
    }

    fn sdk_class_name(&self) -> String {
        format!(
            "{}{}SDK",
            self.ctx.settings.product_name,
            self.ctx.api_folder()
        )
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
        let name = member_name(&method.operation_id, to_snake_case, RESERVED);
        let mut view = MethodView {
            doc: self.comment_header("", Some(&method_doc(self, method)?), None),
            name,
            verb: to_upper_camel_case(&method.http_verb.to_lowercase()),
            ..Default::default()
        };
        let mut args = Vec::new();
        let mut query = Vec::new();
        let mut headers = Vec::new();
        for param in ordered_params(method) {
            let ident = Self::ident(&param.name);
            let mapped = self.type_map(&param.type_ref)?;
            if param.required {
                args.push(format!("{} {}", mapped.native_name, ident));
            } else {
                args.push(format!("{}? {} = null", mapped.native_name, ident));
            }
            match param.location {
                ParameterLocation::Path => view.path_locals.push(PathLocal {
                    name: format!("path{}", to_upper_camel_case(&param.name)),
                    raw: param.name.clone(),
                    value: ident,
                }),
                ParameterLocation::Query | ParameterLocation::Header => {
                    let entry = format!(
                        "{{ \"{}\", {} }}",
                        self.escape_literal(&param.name),
                        self.encode(&param.type_ref, &ident, !param.required, 0)?
                    );
                    match param.location {
                        ParameterLocation::Header => headers.push(entry),
                        _ => query.push(entry),
                    }
                }
                ParameterLocation::Body => {
                    view.body = Some(self.encode(&param.type_ref, &ident, !param.required, 0)?)
                }
            }
        }
        view.signature = args.join(", ");
        view.path = path_template(&method.path, |name| {
            match view.path_locals.iter().find(|local| local.raw == name) {
                Some(local) => format!("{{{}}}", local.name),
                None => format!("{{{{{}}}}}", name),
            }
        });
        view.query = if query.is_empty() {
            "null".to_string()
        } else {
            format!("new Values {{ {} }}", query.join(", "))
        };
        if !headers.is_empty() {
            view.headers = Some(format!("new Values {{ {} }}", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = self.type_map(response)?.native_name;
                view.decode = self.decode(response, "json", "contentType", 0)?;
            }
            None => {
                view.return_type = "string".to_string();
                view.decode = "null".to_string();
            }
        }

        let rendered = templates::render(Language::CSharp, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}
