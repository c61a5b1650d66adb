//! Entity types of the API model: type references, types, properties,
//! parameters and methods.

// Internal imports (std, crate)
use std::fmt;

// External imports (alphabetized)
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reference to a model type from a property, parameter or method.
///
/// Serialized untagged: `"string"`, `{"array_of": "User"}`,
/// `{"map_of": "string"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// A named primitive, enum or object type
    Named(String),
    /// A list of the referenced element type
    Array { array_of: Box<TypeRef> },
    /// A string-keyed map of the referenced value type
    Map { map_of: Box<TypeRef> },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn array(element: TypeRef) -> Self {
        Self::Array {
            array_of: Box::new(element),
        }
    }

    pub fn map(value: TypeRef) -> Self {
        Self::Map {
            map_of: Box::new(value),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Array { array_of } => write!(f, "{}[]", array_of),
            Self::Map { map_of } => write!(f, "Map<{}>", map_of),
        }
    }
}

/// A type declared in (or synthesized from) the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveType),
    Array(ArrayType),
    Map(MapType),
    Enum(EnumType),
    Object(ObjectType),
}

impl Type {
    /// Display name of the type
    pub fn name(&self) -> String {
        match self {
            Self::Primitive(p) => p.name.clone(),
            Self::Array(a) => format!("{}[]", a.element),
            Self::Map(m) => format!("Map<{}>", m.value),
            Self::Enum(e) => e.name.clone(),
            Self::Object(o) => o.name.clone(),
        }
    }

    /// Declared description, empty for anonymous and primitive types
    pub fn description(&self) -> &str {
        match self {
            Self::Enum(e) => &e.description,
            Self::Object(o) => &o.description,
            Self::Primitive(_) | Self::Array(_) | Self::Map(_) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapType {
    pub value: TypeRef,
}

/// An enumeration whose `values` order is the rendering order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: String::new(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A structured type with named properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Properties keyed by raw name, in declaration order
    #[serde(
        default,
        serialize_with = "serialize_properties",
        deserialize_with = "deserialize_properties"
    )]
    pub properties: IndexMap<String, Property>,
    /// Name of the owning object type, if this type is nested in another
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            properties: IndexMap::new(),
            parent: None,
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }
}

/// A property of an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Raw name as written in the API description (usually snake_case)
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: String::new(),
            required: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Where a parameter travels in the HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_ref: TypeRef, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: String::new(),
            required: location == ParameterLocation::Path,
            location,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An API operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub operation_id: String,
    /// HTTP verb in upper case, e.g. `GET`
    pub http_verb: String,
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<TypeRef>,
}

impl Method {
    pub fn new(
        operation_id: impl Into<String>,
        http_verb: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            http_verb: http_verb.into().to_uppercase(),
            path: path.into(),
            summary: String::new(),
            parameters: Vec::new(),
            body_type: None,
            response_type: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body(mut self, body_type: TypeRef) -> Self {
        self.body_type = Some(body_type);
        self
    }

    pub fn returns(mut self, response_type: TypeRef) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Every type reference the method uses, in signature order
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.parameters
            .iter()
            .map(|p| &p.type_ref)
            .chain(self.body_type.iter())
            .chain(self.response_type.iter())
    }
}

/// Properties are written as a list in model documents and keyed by name in memory
fn deserialize_properties<'de, D>(deserializer: D) -> Result<IndexMap<String, Property>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = Vec::<Property>::deserialize(deserializer)?;
    let mut properties = IndexMap::with_capacity(list.len());
    for property in list {
        let name = property.name.clone();
        if properties.insert(name.clone(), property).is_some() {
            return Err(serde::de::Error::custom(format!(
                "duplicate property '{}'",
                name
            )));
        }
    }
    Ok(properties)
}

fn serialize_properties<S>(
    properties: &IndexMap<String, Property>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(properties.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_ref_untagged_forms() {
        let parsed: Vec<TypeRef> = serde_json::from_value(json!([
            "string",
            { "array_of": "User" },
            { "map_of": { "array_of": "integer" } }
        ]))
        .unwrap();

        assert_eq!(parsed[0], TypeRef::named("string"));
        assert_eq!(parsed[1], TypeRef::array(TypeRef::named("User")));
        assert_eq!(
            parsed[2],
            TypeRef::map(TypeRef::array(TypeRef::named("integer")))
        );
        assert_eq!(parsed[2].to_string(), "Map<integer[]>");
    }

    #[test]
    fn test_object_properties_keep_declaration_order() {
        let object: Type = serde_json::from_value(json!({
            "kind": "object",
            "name": "User",
            "properties": [
                { "name": "zeta", "type": "string" },
                { "name": "alpha", "type": "integer", "required": true }
            ]
        }))
        .unwrap();

        let Type::Object(object) = object else {
            panic!("expected an object type");
        };
        let names: Vec<_> = object.properties.keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(object.properties["alpha"].required);
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let result: Result<Type, _> = serde_json::from_value(json!({
            "kind": "object",
            "name": "User",
            "properties": [
                { "name": "id", "type": "string" },
                { "name": "id", "type": "integer" }
            ]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_path_parameters_default_to_required() {
        let id = Parameter::new("user_id", TypeRef::named("integer"), ParameterLocation::Path);
        let fields = Parameter::new("fields", TypeRef::named("string"), ParameterLocation::Query);
        assert!(id.required);
        assert!(!fields.required);
    }
}
