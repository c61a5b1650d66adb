//! Python generator, targeting Python 3 with type hints.

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
use crate::utils::to_snake_case;

const RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "false", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "none", "nonlocal", "not", "or", "pass", "raise", "return", "true", "try", "while",
    "with", "yield",
];

const RAW_FIELDS: &str = "\
_api_raw_response: Any = None
_api_map_response: MutableMapping[str, Any] = {}
_api_response_content_type: str = ''
";

const INTERNAL_MEMBERS: &[&str] = &[
    "_api_raw_response",
    "_api_map_response",
    "_api_response_content_type",
    "api_raw_response",
    "get_api_raw_value",
    "api_response_content_type",
    "to_json",
    "from_response",
];

/// Code generator for the Python SDK
#[derive(Debug, Clone)]
pub struct PythonGen {
    ctx: GenContext,
}

impl PythonGen {
    pub fn new(ctx: GenContext) -> Self {
        Self { ctx }
    }

    fn ident(raw: &str) -> String {
        member_name(raw, to_snake_case, RESERVED)
    }

    fn optional(native: &str) -> String {
        format!("Optional[{}]", native)
    }

    fn unless_none(value: &str, expr: String) -> String {
        format!("None if {} is None else {}", value, expr)
    }

    fn decode(&self, type_ref: &TypeRef, value: &str, content_type: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(kind) => match kind {
                PrimitiveKind::Text => Self::unless_none(value, format!("str({})", value)),
                PrimitiveKind::Integer => Self::unless_none(value, format!("int({})", value)),
                PrimitiveKind::Float => Self::unless_none(value, format!("float({})", value)),
                PrimitiveKind::Boolean => Self::unless_none(value, format!("bool({})", value)),
                PrimitiveKind::DateTime => Self::unless_none(
                    value,
                    format!("datetime.datetime.fromisoformat({})", value),
                ),
                PrimitiveKind::Binary | PrimitiveKind::Any => value.to_string(),
            },
            Shape::Enum(name) => format!("{}Mapper.from_string_value({})", name, value),
            Shape::Object(name) => Self::unless_none(
                value,
                format!("{}.from_response({}, {})", name, value, content_type),
            ),
            Shape::Array(element) => {
                let item = self.decode(element, "i", content_type)?;
                Self::unless_none(value, format!("[{} for i in {}]", item, value))
            }
            Shape::Map(inner) => {
                let item = self.decode(inner, "v", content_type)?;
                Self::unless_none(value, format!("{{k: {} for k, v in {}.items()}}", item, value))
            }
        };
        Ok(expr)
    }

    fn encode(&self, type_ref: &TypeRef, value: &str) -> Result<String> {
        let expr = match shape_of(&self.ctx.model, type_ref)? {
            Shape::Primitive(PrimitiveKind::DateTime) => {
                Self::unless_none(value, format!("{}.isoformat()", value))
            }
            Shape::Primitive(_) => value.to_string(),
            Shape::Enum(name) => format!("{}Mapper.to_string_value({})", name, value),
            Shape::Object(_) => Self::unless_none(value, format!("{}.to_json()", value)),
            Shape::Array(element) => match self.encode(element, "i")? {
                item if item == "i" => value.to_string(),
                item => Self::unless_none(value, format!("[{} for i in {}]", item, value)),
            },
            Shape::Map(inner) => match self.encode(inner, "v")? {
                item if item == "v" => value.to_string(),
                item => Self::unless_none(
                    value,
                    format!("{{k: {} for k, v in {}.items()}}", item, value),
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

impl CodeGen for PythonGen {
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
            flag: format!("_{}_set", ident),
            raw: self.escape_literal(&property.name),
            native: Self::optional(&native),
            hydrate: self.property_from_json(property, "self._api_map_response")?,
            json_value: self.encode(&property.type_ref, &format!("self.{}", ident))?,
            ident,
        })
    }

    fn language(&self) -> Language {
        Language::Python
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn sdk_file_name(&self, base_name: &str) -> PathBuf {
        PathBuf::from(format!(
            "./python/{}/sdk/api{}/{}.py",
            self.ctx.settings.package_name,
            self.ctx.api_folder(),
            base_name
        ))
    }

    fn supports_multi_api(&self) -> bool {
        true
    }

    fn methods_prologue(&self, indent: &str) -> Result<String> {
        let prologue =
            templates::render(Language::Python, "methods_prologue", &PrologueView::new(self))?;
        Ok(format!("\n{}", indent_lines(&prologue, indent)))
    }

    fn methods_epilogue(&self, _indent: &str) -> String {
        String::new()
    }

    fn models_prologue(&self, indent: &str) -> String {
        let header = format!(
            "\n# {}\nfrom __future__ import annotations\n\nimport datetime\nimport enum\n\
             from typing import Any, Mapping, MutableMapping, Optional, Sequence\n\n",
            self.ctx.edit_note()
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
            Some(block_char) => block_comment(indent, text, block_char, "\"\"\"", "\"\"\""),
            None => line_comment(indent, text, "#"),
        }
    }

    fn summary(&self, indent: &str, text: &str) -> String {
        match text.lines().next().map(str::trim) {
            Some(line) if !line.is_empty() => format!("{}# {}\n", indent, line),
            _ => String::new(),
        }
    }

    fn begin_region(&self, indent: &str, name: &str) -> String {
        format!("{}# region {}\n", indent, name)
    }

    fn end_region(&self, indent: &str, name: &str) -> String {
        format!("{}# endregion {}\n", indent, name)
    }

    fn declare_property(&self, indent: &str, property: &Property) -> Result<String> {
        let view = self.property_view(property)?;
        Ok(format!(
            "{0}{1}: {2} = None\n{0}{3}: bool = False\n",
            indent, view.field, view.native, view.flag
        ))
    }

    fn declare_property_get_set(&self, indent: &str, property: &Property) -> Result<String> {
        let accessors =
            templates::render(Language::Python, "getset", &self.property_view(property)?)?;
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
        templates::render(Language::Python, "enum_mapper", &EnumView::new(self, enum_type)?)
    }

    fn default_constructor(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => {
                "def __init__(self) -> None:\n    self._api_map_response = {}\n".to_string()
            }
            _ => String::new(),
        }
    }

    fn get_api_raw_response(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "@property\ndef api_raw_response(self) -> Any:\n    return self._api_raw_response\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_api_raw_value(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "def get_api_raw_value(self, value_name: str) -> Any:\n    return self._api_map_response.get(value_name)\n".to_string(),
            _ => String::new(),
        }
    }

    fn get_content_type(&self, ty: &Type) -> String {
        match ty {
            Type::Object(_) => "@property\ndef api_response_content_type(self) -> str:\n    return self._api_response_content_type\n".to_string(),
            _ => String::new(),
        }
    }

    fn to_json(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Python, "to_json", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn from_response(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Object(object) => {
                templates::render(Language::Python, "from_response", &self.object_view(object)?)
            }
            _ => Ok(String::new()),
        }
    }

    fn property_from_json(&self, property: &Property, map_var: &str) -> Result<String> {
        let value = format!("{}['{}']", map_var, self.escape_literal(&property.name));
        Ok(format!(
            "self._{} = {}",
            Self::ident(&property.name),
            self.decode(&property.type_ref, &value, "self._api_response_content_type")?
        ))
    }

    fn type_signature(&self, indent: &str, ty: &Type) -> Result<String> {
        let header = match ty {
            Type::Object(object) => format!("class {}:", object.name),
            Type::Enum(enum_type) => format!("class {}(enum.Enum):", enum_type.name),
            _ => return Ok(String::new()),
        };
        let doc = type_doc(&self.ctx.model, ty)?;
        Ok(format!(
            "{}{}{}\n",
            self.comment_header(indent, Some(&doc), None),
            indent,
            header
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
                        "{} = '{}'\n",
                        self.declare_enum_value(&inner, raw),
                        self.escape_literal(raw)
                    ));
                }
                out.push_str("\n\n");
                out.push_str(&indent_lines(&self.enum_mapper(enum_type)?, indent));
                Ok(out)
            }
            Type::Object(object) => compose_object(self, indent, ty, object, RAW_FIELDS, ""),
            _ => Ok(String::new()),
        }
    }

    fn declare_method(&self, indent: &str, method: &Method) -> Result<String> {
        let mut view = MethodView {
            name: Self::ident(&method.operation_id),
            verb: method.http_verb.to_lowercase(),
            ..Default::default()
        };
        let doc = format!("\"\"\"\n{}\n\"\"\"", method_doc(self, method)?);
        view.doc = indent_lines(&doc, self.indent_unit());

        let mut args = vec!["self".to_string()];
        let mut query = Vec::new();
        let mut headers = Vec::new();
        for param in ordered_params(method) {
            let ident = Self::ident(&param.name);
            let native = self.type_map(&param.type_ref)?.native_name;
            if param.required {
                args.push(format!("{}: {}", ident, native));
            } else {
                args.push(format!("{}: {} = None", ident, Self::optional(&native)));
            }
            match param.location {
                ParameterLocation::Path => view.path_locals.push(PathLocal {
                    name: format!("path_{}", to_snake_case(&param.name)),
                    raw: param.name.clone(),
                    value: ident,
                }),
                ParameterLocation::Query | ParameterLocation::Header => {
                    let entry = format!(
                        "\"{}\": {}",
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
                Some(local) => format!("{{{}}}", local.name),
                None => format!("{{{{{}}}}}", name),
            }
        });
        view.query = if query.is_empty() {
            "None".to_string()
        } else {
            format!("{{{}}}", query.join(", "))
        };
        if !headers.is_empty() {
            view.headers = Some(format!("{{{}}}", headers.join(", ")));
        }
        match &method.response_type {
            Some(response) => {
                view.return_type = Self::optional(&self.type_map(response)?.native_name);
                view.decode = self.decode(response, "response", "self.content_type")?;
            }
            None => {
                view.return_type = "None".to_string();
                view.decode = "None".to_string();
            }
        }

        let rendered = templates::render(Language::Python, "method", &view)?;
        Ok(indent_lines(&rendered, indent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{ApiModelBuilder, Parameter};
    use std::sync::Arc;

    fn gen() -> PythonGen {
        let model = ApiModelBuilder::new("Looker", "4.0")
            .enum_type(EnumType::new("Color", ["red", "dark-blue"]))
            .object(
                ObjectType::new("Widget")
                    .with_property(Property::new("my_prop", TypeRef::named("string")))
                    .with_property(Property::new("color", TypeRef::named("Color"))),
            )
            .method(
                Method::new("widget", "GET", "/widgets/{widget_id}")
                    .param(Parameter::new("widget_id", TypeRef::named("integer"), ParameterLocation::Path))
                    .returns(TypeRef::named("Widget")),
            )
            .build()
            .unwrap();
        PythonGen::new(GenContext::new(Arc::new(model), None))
    }

    #[test]
    fn test_identity() {
        let gen = gen();
        assert_eq!(
            gen.sdk_file_name("models"),
            PathBuf::from("./python/looker_sdk/sdk/api40/models.py")
        );
        assert!(gen.supports_multi_api());
        assert_eq!(gen.sdk_class_name(), "Looker40SDK");
        assert_eq!(gen.begin_region("", "Widgets"), "# region Widgets\n");
        assert_eq!(gen.end_region("", "Widgets"), "# endregion Widgets\n");
    }

    #[test]
    fn test_methods_prologue_imports_model_names() {
        let gen = gen();
        let prologue = gen.methods_prologue("").unwrap();
        assert!(prologue.contains(
            "from looker_sdk.sdk.api40.models import (\n    Color,\n    ColorMapper,\n    Widget,\n)\n"
        ));
        assert!(prologue.contains("class Looker40SDK(api_methods.APIMethods):\n"));
        assert_eq!(gen.methods_epilogue(""), "");
    }

    #[test]
    fn test_property_accessors() {
        let gen = gen();
        let prop = Property::new("my_prop", TypeRef::named("string"));
        assert_eq!(
            gen.declare_property("    ", &prop).unwrap(),
            "    _my_prop: Optional[str] = None\n    _my_prop_set: bool = False\n"
        );
        let expected = "\
@property
def my_prop(self) -> Optional[str]:
    if not self._my_prop_set and 'my_prop' in self._api_map_response:
        self._my_prop = None if self._api_map_response['my_prop'] is None else str(self._api_map_response['my_prop'])
        self._my_prop_set = True
    return self._my_prop

@my_prop.setter
def my_prop(self, v: Optional[str]) -> None:
    self._my_prop = v
    self._my_prop_set = True
";
        assert_eq!(gen.declare_property_get_set("", &prop).unwrap(), expected);
    }

    #[test]
    fn test_reserved_names() {
        let gen = gen();
        let prop = Property::new("from", TypeRef::named("date"));
        let declared = gen.declare_property("", &prop).unwrap();
        assert!(declared.contains("_fromValue: Optional[datetime.datetime] = None\n"));
        assert!(declared.contains("_fromValue_set: bool = False\n"));
    }

    #[test]
    fn test_enum_mapper_order() {
        let gen = gen();
        let mapper = gen
            .enum_mapper(&EnumType::new("Color", ["red", "dark-blue"]))
            .unwrap();
        let red = mapper.find("return 'red'").unwrap();
        let blue = mapper.find("return 'dark-blue'").unwrap();
        assert!(red < blue);
        assert!(mapper.contains("if s == 'dark-blue':\n            return Color.dark_blue\n"));
        assert_eq!(mapper.matches("return None").count(), 2);
    }

    #[test]
    fn test_to_json_and_from_response() {
        let gen = gen();
        let widget = gen.ctx.model.type_named("Widget").unwrap();
        let json = gen.to_json(widget).unwrap();
        assert!(json.contains(
            "    if self._color_set or 'color' in self._api_map_response:\n        json['color'] = ColorMapper.to_string_value(self.color)\n"
        ));
        let from_response = gen.from_response(widget).unwrap();
        assert!(from_response.contains("if isinstance(api_raw_response, Mapping):"));
        assert!(from_response.contains("api_response_content_type or ''"));
    }

    #[test]
    fn test_declare_method() {
        let gen = gen();
        let method = gen.ctx.model.method("widget").unwrap();
        let expected = "\
def widget(self, widget_id: int) -> Optional[Widget]:
    \"\"\"
    GET /widgets/{widget_id} -> Widget

    @param {int} widget_id
    \"\"\"
    path_widget_id = self.encode_path_param(widget_id)
    response = self.get(
        f\"/widgets/{path_widget_id}\",
        query_params=None,
    )
    return None if response is None else Widget.from_response(response, self.content_type)
";
        assert_eq!(gen.declare_method("", method).unwrap(), expected);
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
        let gen = PythonGen::new(GenContext::new(model.clone(), None));
        let rendered = gen.declare_method("", model.method("me").unwrap()).unwrap();
        assert!(rendered.contains("def me(self, x_trace_id: str)"));
        assert!(rendered.contains(
            "        query_params=None,\n        headers={\"x_trace_id\": x_trace_id},\n    )\n"
        ));
    }

    #[test]
    fn test_literals_are_escaped() {
        let gen = gen();
        let mapper = gen.enum_mapper(&EnumType::new("Quote", ["it's"])).unwrap();
        assert!(mapper.contains("return 'it\\'s'"));
        assert!(mapper.contains("if s == 'it\\'s':"));
    }

    #[test]
    fn test_member_collisions_are_rejected() {
        let gen = gen();
        let enum_type = EnumType::new("Case", ["ValueOne", "value_one"]);
        assert!(matches!(gen.enum_mapper(&enum_type), Err(Error::ModelIntegrity(_))));

        let object = Type::Object(
            ObjectType::new("Shadow")
                .with_property(Property::new("api_map_response", TypeRef::named("string"))),
        );
        let err = gen.declare_type("", &object).unwrap_err();
        assert!(matches!(err, Error::ModelIntegrity(ref msg) if msg.contains("'_api_map_response'")));
    }
}
