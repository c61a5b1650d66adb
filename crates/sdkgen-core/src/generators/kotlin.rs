//! Kotlin generator, targeting the JVM.

// Internal imports (std, crate)
use std::path::PathBuf;

use super::{
    block_comment, compose_object, escape_literal, indent_lines, member_name, method_doc,
    ordered_params, path_template, shape_of, star_comment, type_doc, CodeGen, EnumView, GenContext,
    MethodView, ObjectView, PathLocal, PrimitiveKind, PrologueView, PropertyView, Shape,
};
use crate::error::Result;
use crate::language::Language;
use crate::model::{EnumType, Method, ObjectType, ParameterLocation, Property, Type, TypeRef};
use crate::templates;
use crate::utils::{to_lower_camel_case, to_upper_camel_case};

const RESERVED: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

const RAW_FIELDS: &str = "\
private var _apiRawResponse: Any? = null
private var _apiMapResponse: Map<String, Any?> = emptyMap()
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

/// Code generator for the Kotlin SDK
#[derive(Debug, Clone)]
pub struct KotlinGen {
    ctx: GenContext,
}

impl KotlinGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    fn ident(raw: &str) -> String {
        member_name(raw, to_lower_camel_case, RESERVED)
    }

    fn package(&self) -> String {
        format!("com.{}.sdk", self.ctx.settings.product_name.to_lowercase())
    }

    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => match kind {
                PrimitiveKind::Text => format!("{}?.toString()", value),
                PrimitiveKind::Integer | PrimitiveKind::Float => {
                    // Number conversion named after the native type, e.g. toLong
                    let native = self.type_map(type_ref)?.native_name;
                    format!("({} as? Number)?.to{}()", value, native)
                }
                PrimitiveKind::Boolean => format!("{} as? Boolean", value),
                PrimitiveKind::DateTime => format!(
                    "({} as? String)?.let {{ Date.from(Instant.parse(it)) }}",
                    value
                ),
                PrimitiveKind::Binary => format!("{} as? ByteArray", value),
                PrimitiveKind::Any => value.to_string(),
            },
            Shape::Enum(name) => format!("{}Mapper.fromStringValue({} as? String)", name, value),
            Shape::Object(name) => format!(
                "{}?.let {{ {}.fromResponse(it, {}) }}",
                value, name, content_type
            ),
            Shape::Array(element) => {
                let item = self.decode(element, "i", content_type)?;
                format!(
                    "({} as? List<*>)?.mapNotNull {{ i -> {} }}?.toTypedArray()",
                    value, item
                )
            }
            Shape::Map(inner) => {
                let item = self.decode(inner, "v", content_type)?;
                format!(
                    "({} as? Map<*, *>)?.entries?.mapNotNull {{ (k, v) -> ({})?.let {{ k.toString() to it }} }}?.toMap()",
                    value, item
                )
            }
        };
        Ok(expr)
    }

    fn encode(&self, type_ref: &TypeRef, value: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) => {
                format!("{}?.toInstant()?.toString()", value)
            }
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.toStringValue({})", name, value),
            Shape::Object(_) => format!("{}?.toJson()", value),
            Shape::Array(element) => match self.encode(element, "i")? {
                item if item == "i" => value.to_string(),
                item => format!("{}?.map {{ i -> {} }}", value, item),
            },
            Shape::Map(inner) => match self.encode(inner, "v")? {
                item if item == "v" => value.to_string(),
                item => format!("{}?.mapValues {{ (_, v) -> {} }}", value, item),
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

impl CodeGen for KotlinGen {
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
            native: format!("{}?", native),
            hydrate: self.property_from_json(property, "_apiMapResponse")?,
            json_value: self.encode(&property.type_ref, &ident)?,
            ident,
        })
    }

    fn language(&self) -> Language {
        Language::Kotlin
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./kotlin/src/main/com/{}/sdk/{}/{}.kt",
            self.ctx.settings.product_name.to_lowercase(),
            self.ctx.api_version(),
            base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        true
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue =
            templates::render(Language::Kotlin, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, indent: &str) -> String {
        format!("{}}}\n", indent)
    }

    fn models_prologue(&self, indent: &str) -> String {
        let header = format!(
            "\n// {}\n\npackage {}\n\nimport java.time.Instant\nimport java.util.Date\n\n",
            self.ctx.edit_note(),
            self.package()
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
        format!("{}// region {}\n", indent, name)
    }

    fn end_region(&self, indent: &str, name: &str) -> String {
        format!("{}// endregion {}\n", indent, name)
    }

    fn declare_property(&self, indent: &str, property: &Property) -> Result<String> {
        let view = self.property_view(property)?;
        Ok(format!(
            "{0}private var {1}: {2} = null\n{0}private var {3}: Boolean = false\n",
            indent, view.field, view.native, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors =
            templates::render(Language::Kotlin, "getset", &self.property_view(property)?)?;
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
        templates::render(Language::Kotlin, "enum_mapper", &EnumView::new(self, enum_type)?)
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "init {\n    _apiMapResponse = emptyMap()\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "val apiRawResponse: Any?\n    get() = _apiRawResponse\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "fun getApiRawValue(valueName: String): Any? {\n    return _apiMapResponse[valueName]\n}\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => {
                "val apiResponseContentType: String\n    get() = _apiResponseContentType\n"
                    .to_string()
            }
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Kotlin, "to_json", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Kotlin, "from_response", &self.object_view(object)?)
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
        let keyword = match ty {
            Type::Object(_) => "class",
            Type::Enum(_) => "enum class",
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
                args.push(format!("{}: {}? = null", ident, native));
            }
            match param.location {
                ParameterLocation::Path => view.path_locals.push(PathLocal {
                    name: format!("path{}", to_upper_camel_case(&param.name)),
                    raw: param.name.clone(),
                    value: ident,
                }),
                ParameterLocation::Query | ParameterLocation::Header => {
                    let entry = format!(
                        "\"{}\" to {}",
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
        view.query = format!("mapOf({})", query.join(", "));
        if !headers.is_empty() {
            view.headers = Some(format!("mapOf({})", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = self.type_map(response)?.native_name;
                view.decode = self.decode(response, "json", "contentType")?;
            }
            None => {
                view.return_type = "Unit".to_string();
                view.decode = "Unit".to_string();
            }
        }

        let rendered = templates::render(Language::Kotlin, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiModelBuilder, Parameter};
    use std::sync::Arc;

    fn gen() -> KotlinGen {
        let model = ApiModelBuilder::new("Looker", "4.0")
            .enum_type(EnumType::new("Format", ["csv", "json"]))
            .object(
                ObjectType::new("Query")
                    .with_property(Property::new("id", TypeRef::named("int64")))
                    .with_property(Property::new("limit", TypeRef::named("integer")))
                    .with_property(Property::new("object", TypeRef::named("string"))),
            )
            .method(
                Method::new("run_query", "GET", "/queries/{query_id}/run/{result_format}")
                    .param(Parameter::new("query_id", TypeRef::named("int64"), ParameterLocation::Path))
                    .param(Parameter::new("result_format", TypeRef::named("Format"), ParameterLocation::Path))
                    .param(Parameter::new("limit", TypeRef::named("integer"), ParameterLocation::Query))
                    .returns(TypeRef::named("string")),
            )
            .build()
            .unwrap();
        KotlinGen::new(GenContext::new(Arc::new(model), None))
    }

    #[test]
    fn test_identity() {
        let gen = gen();
        assert_eq!(
            gen.sdk_file_name("models"),
            PathBuf::from("./kotlin/src/main/com/looker/sdk/4.0/models.kt")
        );
        assert_eq!(gen.sdk_class_name(), "Looker40SDK");
        assert_eq!(gen.begin_region("    ", "Query"), "    // region Query\n");
        assert_eq!(gen.end_region("    ", "Query"), "    // endregion Query\n");
    }

    #[test]
    fn test_numbers_convert_to_native_width() {
        let gen = gen();
        let id = Property::new("id", TypeRef::named("int64"));
        let limit = Property::new("limit", TypeRef::named("integer"));
        assert_eq!(
            gen.property_from_json(&id, "_apiMapResponse").unwrap(),
            "_id = (_apiMapResponse[\"id\"] as? Number)?.toLong()"
        );
        assert_eq!(
            gen.property_from_json(&limit, "m").unwrap(),
            "_limit = (m[\"limit\"] as? Number)?.toInt()"
        );
    }

    #[test]
    fn test_reserved_property() {
        let gen = gen();
        let prop = Property::new("object", TypeRef::named("string"));
        assert_eq!(
            gen.declare_property("", &prop).unwrap(),
            "private var _objectValue: String? = null\nprivate var _objectValueSet: Boolean = false\n"
        );
        let accessors = gen.declare_property_get_set("", &prop).unwrap();
        assert!(accessors.starts_with("var objectValue: String?\n    get() {\n"));
        assert!(accessors.contains("if (!_objectValueSet && _apiMapResponse.containsKey(\"object\")) {"));
    }

    #[test]
    fn test_enum_declaration() {
        let gen = gen();
        let format = gen.ctx.model.type_named("Format").unwrap();
        let declared = gen.declare_type("", format).unwrap();
        assert!(declared.starts_with("enum class Format {\n    csv,\n    json\n}\n\nobject FormatMapper {\n"));
        assert!(declared.contains("            Format.json -> \"json\"\n            else -> null\n"));
    }

    #[test]
    fn test_declare_method_encodes_path_params() {
        let gen = gen();
        let method = gen.ctx.model.method("run_query").unwrap();
        let rendered = gen.declare_method("", method).unwrap();
        assert!(rendered.contains(
            "fun runQuery(queryId: Long, resultFormat: Format, limit: Int? = null): SDKResponse {\n"
        ));
        assert!(rendered.contains("    val pathQueryId = encodeParam(queryId)\n"));
        assert!(rendered.contains("\"/queries/${pathQueryId}/run/${pathResultFormat}\""));
        assert!(rendered.contains("mapOf(\"limit\" to limit)"));
    }

    #[test]
    fn test_declare_method_sends_headers() {
        let model = ApiModelBuilder::new("Looker", "4.0")
            .method(Method::new("me", "GET", "/me").param(
                Parameter::new("x_trace_id", TypeRef::named("string"), ParameterLocation::Header)
                    .required(true),
            ))
            .build()
            .unwrap();
        let model = Arc::new(model);
        let gen = KotlinGen::new(GenContext::new(model.clone(), None));
        let rendered = gen.declare_method("", model.method("me").unwrap()).unwrap();
        assert!(rendered.contains("fun me(xTraceId: String): SDKResponse {\n"));
        assert!(rendered.contains(
            "this.get<Unit>(\"/me\", mapOf(), headers = mapOf(\"x_trace_id\" to xTraceId))"
        ));
    }

    #[test]
    fn test_literals_escape_interpolation() {
        let gen = gen();
        let mapper = gen.enum_mapper(&EnumType::new("Price", ["$cost", "say \"hi\""])).unwrap();
        assert!(mapper.contains("if (s == \"\\$cost\") {"));
        assert!(mapper.contains("-> \"say \\\"hi\\\"\"\n"));

        let prop = Property::new("$ref", TypeRef::named("string"));
        assert!(gen
            .property_from_json(&prop, "m")
            .unwrap()
            .contains("m[\"\\$ref\"]"));
    }
}
