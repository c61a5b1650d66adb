//! TypeScript generator.

// Internal imports (std, crate)
use std::path::PathBuf;

use super::{
    block_comment, compose_object, indent_lines, member_name, method_doc, ordered_params,
    path_template, shape_of, star_comment, type_doc, CodeGen, EnumView, GenContext, MethodView,
    ObjectView, PathLocal, PrimitiveKind, PrologueView, PropertyView, Shape,
};
use crate::error::Result;
use crate::language::Language;
use crate::model::{EnumType, Method, ObjectType, ParameterLocation, Property, Type, TypeRef};
use crate::templates;
use crate::utils::{to_lower_camel_case, to_upper_camel_case};

const RESERVED: &[&str] = &[
    "as", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "new", "null", "package",
    "private", "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

const RAW_FIELDS: &str = "\
private _apiRawResponse: any
private _apiMapResponse: Record<string, any> = {}
private _apiResponseContentType = ''
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

/// Code generator for the TypeScript SDK
#[derive(Debug, Clone)]
pub struct TypescriptGen {
    ctx: GenContext,
}

impl TypescriptGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    fn ident(raw: &str) -> String {
        member_name(raw, to_lower_camel_case, RESERVED)
    }

    fn unless_null(value: &str, expr: String) -> String {
        format!("{} == null ? undefined : {}", value, expr)
    }

    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => match kind {
                PrimitiveKind::Text => Self::unless_null(value, format!("String({})", value)),
                PrimitiveKind::Integer | PrimitiveKind::Float => {
                    Self::unless_null(value, format!("Number({})", value))
                }
                PrimitiveKind::Boolean => Self::unless_null(value, format!("Boolean({})", value)),
                PrimitiveKind::DateTime => {
                    Self::unless_null(value, format!("new Date({})", value))
                }
                PrimitiveKind::Binary | PrimitiveKind::Any => value.to_string(),
            },
            Shape::Enum(name) => format!("{}Mapper.fromStringValue({})", name, value),
            Shape::Object(name) => Self::unless_null(
                value,
                format!("{}.fromResponse({}, {})", name, value, content_type),
            ),
            Shape::Array(element) => {
                let native = self.type_map(&TypeRef::array(element.clone()))?.native_name;
                let item = self.decode(element, "i", content_type)?;
                Self::unless_null(
                    value,
                    format!("({} as any[]).map((i: any) => {}) as {}", value, item, native),
                )
            }
            Shape::Map(inner) => {
                let native = self.type_map(&TypeRef::map(inner.clone()))?.native_name;
                let item = self.decode(inner, "v", content_type)?;
                Self::unless_null(
                    value,
                    format!(
                        "Object.fromEntries(Object.entries({}).map(([k, v]: [string, any]) => [k, {}])) as {}",
                        value, item, native
                    ),
                )
            }
        };
        Ok(expr)
    }

    fn encode(&self, type_ref: &TypeRef, value: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) => format!("{}?.toISOString()", value),
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.toStringValue({})", name, value),
            Shape::Object(_) => format!("{}?.toJson()", value),
            Shape::Array(element) => match self.encode(element, "i")? {
                item if item == "i" => value.to_string(),
                item => format!("{}?.map((i) => {})", value, item),
            },
            Shape::Map(inner) => match self.encode(inner, "v")? {
                item if item == "v" => value.to_string(),
                item => Self::unless_null(
                    value,
                    format!(
                        "Object.fromEntries(Object.entries({}).map(([k, v]) => [k, {}]))",
                        value, item
                    ),
                ),
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

impl CodeGen for TypescriptGen {
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
            native,
            hydrate: self.property_from_json(property, "this._apiMapResponse")?,
            json_value: self.encode(&property.type_ref, &format!("this.{}", ident))?,
            ident,
        })
    }

    fn language(&self) -> Language {
        Language::Typescript
    }

    fn indent_unit(&self) -> &'static str {
        "  "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./packages/sdk/src/{}/{}.ts",
            self.ctx.api_version(),
            base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        true
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue =
            templates::render(Language::Typescript, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, indent: &str) -> String {
        format!("{}}}\n", indent)
    }

    fn models_prologue(&self, indent: &str) -> String {
        format!("\n{}// {}\n\n", indent, self.ctx.edit_note())
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
            None => star_comment(indent, text),
        }
    }

    fn summary(&self, indent: &str, text: &str) -> String {
        match text.lines().next().map(str::trim) {
            Some(line) if !line.is_empty() => format!("{}// {}\n", indent, line),
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
            "{0}private {1}?: {2}\n{0}private {3} = false\n",
            indent, view.field, view.native, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors =
            templates::render(Language::Typescript, "getset", &self.property_view(property)?)?;
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
        templates::render(
            Language::Typescript,
            "enum_mapper",
            &EnumView::new(self, enum_type)?,
        )
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "constructor() {\n  this._apiMapResponse = {}\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => {
                "get apiRawResponse(): any {\n  return this._apiRawResponse\n}\n".to_string()
            }
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "getApiRawValue(valueName: string): any {\n  return this._apiMapResponse[valueName]\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "get apiResponseContentType(): string {\n  return this._apiResponseContentType\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Typescript, "to_json", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => templates::render(
                Language::Typescript,
                "from_response",
                &self.object_view(object)?,
            ),
            _ => Ok(String::new()),
        }
    }

    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String> {
        let value = format!("{}['{}']", map_var, self.escape_literal(&property.name));
        Ok(format!(
            "this._{} = {}",
            Self::ident(&property.name),
            self.decode(&property.type_ref, &value, "this._apiResponseContentType")?
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
            "{}{}export {} {} {{\n",
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
                let mut out = self.type_signature(indent, ty)?;
                for raw in &enum_type.values {
                    out.push_str(&format!(
                        "{} = '{}',\n",
                        self.declare_enum_value(&inner, raw),
                        self.escape_literal(raw)
                    ));
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
                args.push(format!("{}: {}", ident, native));
            } else {
                args.push(format!("{}?: {}", ident, native));
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
        view.signature = args.join(", ");
        view.path = path_template(&method.path, |name| {
            match view.path_locals.iter().find(|local| local.raw == name) {
                Some(local) => format!("${{{}}}", local.name),
                None => format!("{{{}}}", name),
            }
        });
        view.query = if query.is_empty() {
            "undefined".to_string()
        } else {
            format!("{{ {} }}", query.join(", "))
        };
        if !headers.is_empty() {
            view.headers = Some(format!("{{ {} }}", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = self.type_map(response)?.native_name;
                view.decode = self.decode(response, "json", "contentType")?;
            }
            None => {
                view.return_type = "void".to_string();
                view.decode = "undefined".to_string();
            }
        }

        let rendered = templates::render(Language::Typescript, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}
