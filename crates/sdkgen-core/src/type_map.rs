//! Mapping from model type references to native type names.
//!
//! [`map_type`] is a pure function of the model, the reference and the
//! target language: calling it twice with the same inputs yields the same
//! [`MappedType`], so generators call it freely instead of caching results.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::language::Language;
//! use sdkgen_core::model::{ApiModelBuilder, TypeRef};
//! use sdkgen_core::type_map::map_type;
//!
//! let model = ApiModelBuilder::new("Example", "4.0").build().unwrap();
//! let names = TypeRef::array(TypeRef::named("string"));
//!
//! let mapped = map_type(&model, &names, Language::Dart).unwrap();
//! assert_eq!(mapped.native_name, "List<String>");
//! assert!(mapped.is_collection);
//! ```

use crate::error::{Error, Result};
use crate::language::Language;
use crate::model::{ApiModel, Type, TypeRef};

/// A type reference translated into a target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Native spelling of the type, e.g. `List<String>`
    pub native_name: String,
    /// Whether the native type can hold null without extra wrapping
    pub is_nullable: bool,
    /// Whether the type is an array or map
    pub is_collection: bool,
}

impl MappedType {
    fn new(native_name: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            native_name: native_name.into(),
            is_nullable,
            is_collection: false,
        }
    }

    fn collection(native_name: String) -> Self {
        Self {
            native_name,
            is_nullable: true,
            is_collection: true,
        }
    }
}

/// Map a type reference to its native type in `language`
pub fn map_type(model: &ApiModel, type_ref: &TypeRef, language: Language) -> Result<MappedType> {
    match type_ref {
        TypeRef::Named(name) => map_named(model, model.type_named(name)?, language),
        TypeRef::Array { array_of } => {
            let element = map_type(model, array_of, language)?;
            Ok(MappedType::collection(array_of_native(
                language,
                &element.native_name,
            )))
        }
        TypeRef::Map { map_of } => {
            let value = map_type(model, map_of, language)?;
            Ok(MappedType::collection(map_of_native(
                language,
                &value.native_name,
            )))
        }
    }
}

fn map_named(model: &ApiModel, ty: &Type, language: Language) -> Result<MappedType> {
    match ty {
        Type::Primitive(p) => primitive(language, &p.name)
            .map(|(native, nullable)| MappedType::new(native, nullable))
            .ok_or_else(|| Error::unknown_primitive(&p.name, language)),
        Type::Array(a) => map_type(model, &TypeRef::array(a.element.clone()), language),
        Type::Map(m) => map_type(model, &TypeRef::map(m.value.clone()), language),
        Type::Enum(e) => Ok(MappedType::new(&e.name, true)),
        Type::Object(o) => Ok(MappedType::new(&o.name, true)),
    }
}

fn array_of_native(language: Language, element: &str) -> String {
    match language {
        Language::Python => format!("Sequence[{}]", element),
        Language::Typescript => format!("{}[]", element),
        Language::Kotlin => format!("Array<{}>", element),
        Language::CSharp => format!("{}[]", element),
        Language::Swift => format!("[{}]", element),
        Language::Dart => format!("List<{}>", element),
    }
}

fn map_of_native(language: Language, value: &str) -> String {
    match language {
        Language::Python => format!("MutableMapping[str, {}]", value),
        Language::Typescript => format!("Record<string, {}>", value),
        Language::Kotlin => format!("Map<String, {}>", value),
        Language::CSharp => format!("IDictionary<string, {}>", value),
        Language::Swift => format!("[String: {}]", value),
        Language::Dart => format!("Map<String, {}>", value),
    }
}

/// Native primitive name and nullability
fn primitive(language: Language, name: &str) -> Option<(&'static str, bool)> {
    match language {
        Language::Python => python_primitive(name),
        Language::Typescript => typescript_primitive(name),
        Language::Kotlin => kotlin_primitive(name),
        Language::CSharp => csharp_primitive(name),
        Language::Swift => swift_primitive(name),
        Language::Dart => dart_primitive(name),
    }
}

fn python_primitive(name: &str) -> Option<(&'static str, bool)> {
    let native = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => "str",
        "boolean" => "bool",
        "integer" | "int64" => "int",
        "number" | "float" | "double" => "float",
        "date" | "datetime" | "date-time" => "datetime.datetime",
        "binary" => "bytes",
        "any" => "Any",
        _ => return None,
    };
    Some((native, true))
}

fn typescript_primitive(name: &str) -> Option<(&'static str, bool)> {
    let native = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => "string",
        "boolean" => "boolean",
        "integer" | "int64" | "number" | "float" | "double" => "number",
        "date" | "datetime" | "date-time" => "Date",
        "binary" => "Blob",
        "any" => "any",
        _ => return None,
    };
    Some((native, true))
}

fn kotlin_primitive(name: &str) -> Option<(&'static str, bool)> {
    let native = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => "String",
        "boolean" => "Boolean",
        "integer" => "Int",
        "int64" => "Long",
        "number" | "double" => "Double",
        "float" => "Float",
        "date" | "datetime" | "date-time" => "Date",
        "binary" => "ByteArray",
        "any" => "Any",
        _ => return None,
    };
    Some((native, false))
}

fn csharp_primitive(name: &str) -> Option<(&'static str, bool)> {
    let mapped = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => ("string", true),
        "boolean" => ("bool", false),
        "integer" | "int64" => ("long", false),
        "number" | "double" => ("double", false),
        "float" => ("float", false),
        "date" | "datetime" | "date-time" => ("DateTime", false),
        "binary" => ("byte[]", true),
        "any" => ("object", true),
        _ => return None,
    };
    Some(mapped)
}

fn swift_primitive(name: &str) -> Option<(&'static str, bool)> {
    let native = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => "String",
        "boolean" => "Bool",
        "integer" | "int64" => "Int64",
        "number" | "double" => "Double",
        "float" => "Float",
        "date" | "datetime" | "date-time" => "Date",
        "binary" => "Data",
        "any" => "Any",
        _ => return None,
    };
    Some((native, false))
}

fn dart_primitive(name: &str) -> Option<(&'static str, bool)> {
    let native = match name {
        "string" | "password" | "byte" | "uri" | "email" | "uuid" => "String",
        "boolean" => "bool",
        "integer" | "int64" => "int",
        "number" | "float" | "double" => "double",
        "date" | "datetime" | "date-time" => "DateTime",
        "binary" => "dynamic",
        "any" => "dynamic",
        _ => return None,
    };
    Some((native, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiModelBuilder, EnumType, ObjectType};

    fn model() -> ApiModel {
        ApiModelBuilder::new("Test", "4.0")
            .primitive("decimal")
            .enum_type(EnumType::new("Role", ["admin"]))
            .object(ObjectType::new("User"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_primitives_per_language() {
        let model = model();
        let string = TypeRef::named("string");
        let expected = [
            (Language::Python, "str"),
            (Language::Typescript, "string"),
            (Language::Kotlin, "String"),
            (Language::CSharp, "string"),
            (Language::Swift, "String"),
            (Language::Dart, "String"),
        ];
        for (language, native) in expected {
            let mapped = map_type(&model, &string, language).unwrap();
            assert_eq!(mapped.native_name, native, "{}", language);
            assert!(!mapped.is_collection);
        }

        let date = map_type(&model, &TypeRef::named("date"), Language::Dart).unwrap();
        assert_eq!(date.native_name, "DateTime");
    }

    #[test]
    fn test_collections_wrap_mapped_element() {
        let model = model();
        let users = TypeRef::array(TypeRef::named("User"));
        let tags = TypeRef::map(TypeRef::named("string"));

        assert_eq!(
            map_type(&model, &users, Language::Python).unwrap().native_name,
            "Sequence[User]"
        );
        assert_eq!(
            map_type(&model, &users, Language::Swift).unwrap().native_name,
            "[User]"
        );
        assert_eq!(
            map_type(&model, &tags, Language::CSharp).unwrap().native_name,
            "IDictionary<string, string>"
        );
        let nested = TypeRef::array(TypeRef::array(TypeRef::named("integer")));
        let mapped = map_type(&model, &nested, Language::Kotlin).unwrap();
        assert_eq!(mapped.native_name, "Array<Array<Int>>");
        assert!(mapped.is_collection);
        assert!(mapped.is_nullable);
    }

    #[test]
    fn test_enums_and_objects_keep_their_names() {
        let model = model();
        for language in Language::all() {
            let role = map_type(&model, &TypeRef::named("Role"), language).unwrap();
            let user = map_type(&model, &TypeRef::named("User"), language).unwrap();
            assert_eq!(role.native_name, "Role");
            assert_eq!(user.native_name, "User");
        }
    }

    #[test]
    fn test_value_types_are_not_nullable_in_csharp() {
        let model = model();
        let long = map_type(&model, &TypeRef::named("integer"), Language::CSharp).unwrap();
        let string = map_type(&model, &TypeRef::named("string"), Language::CSharp).unwrap();
        assert_eq!(long.native_name, "long");
        assert!(!long.is_nullable);
        assert!(string.is_nullable);
    }

    #[test]
    fn test_unknown_primitive() {
        let model = model();
        let err = map_type(&model, &TypeRef::named("decimal"), Language::Swift).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownPrimitive { ref name, language: Language::Swift } if name == "decimal"
        ));
        let wrapped = map_type(
            &model,
            &TypeRef::array(TypeRef::named("decimal")),
            Language::Dart,
        );
        assert!(matches!(wrapped, Err(Error::UnknownPrimitive { .. })));
    }

    #[test]
    fn test_referentially_transparent() {
        let model = model();
        let type_ref = TypeRef::map(TypeRef::array(TypeRef::named("date")));
        let first = map_type(&model, &type_ref, Language::Typescript).unwrap();
        let second = map_type(&model, &type_ref, Language::Typescript).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.native_name, "Record<string, Date[]>");
    }
}
