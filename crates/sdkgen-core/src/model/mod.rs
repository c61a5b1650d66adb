//! The in-memory API model consumed by every generator.
//!
//! An [`ApiModel`] is built once per generation run, either through
//! [`ApiModelBuilder`] or from a normalized model document, and is read-only
//! afterwards. Building validates the invariants the generators rely on:
//! unique type names, resolvable references, non-empty enums and an acyclic
//! chain of owner (`parent`) references.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::model::{ApiModelBuilder, EnumType, Method, TypeRef};
//!
//! let model = ApiModelBuilder::new("Example", "4.0")
//!     .enum_type(EnumType::new("Color", ["red", "green"]))
//!     .method(Method::new("list_colors", "GET", "/colors")
//!         .returns(TypeRef::array(TypeRef::named("Color"))))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(model.enum_values_of("Color").unwrap(), ["red", "green"]);
//! assert_eq!(model.all_methods().count(), 1);
//! ```

pub mod types;

// Internal imports (std, crate)
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};

// External imports (alphabetized)
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::fs;

pub use types::{
    ArrayType, EnumType, MapType, Method, ObjectType, Parameter, ParameterLocation,
    PrimitiveType, Property, Type, TypeRef,
};

/// Primitive names every model understands without declaring them
pub const STANDARD_PRIMITIVES: &[&str] = &[
    "string",
    "boolean",
    "integer",
    "int64",
    "number",
    "float",
    "double",
    "date",
    "datetime",
    "date-time",
    "binary",
    "byte",
    "password",
    "uri",
    "email",
    "uuid",
    "any",
];

/// Resolved description of one API version
#[derive(Debug, Clone)]
pub struct ApiModel {
    title: String,
    version: String,
    types: IndexMap<String, Type>,
    methods: IndexMap<String, Method>,
}

/// Serialized form of a normalized model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub types: Vec<Type>,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl ApiModel {
    /// Load a model document from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        log::debug!("Loaded model document from {}", path.display());
        Self::from_str(&content)
    }

    /// Parse a model document, trying JSON first and then YAML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let document: ModelDocument = match serde_json::from_str(content) {
            Ok(document) => document,
            Err(_) => serde_yaml::from_str(content)?,
        };
        Self::from_document(document)
    }

    /// Validate a document and build the model from it
    pub fn from_document(document: ModelDocument) -> Result<Self> {
        let mut builder = ApiModelBuilder::new(document.title, document.version);
        for ty in document.types {
            builder = builder.declare(ty);
        }
        for method in document.methods {
            builder = builder.method(method);
        }
        builder.build()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// API version the model describes, e.g. `4.0`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a named type
    pub fn type_named(&self, name: &str) -> Result<&Type> {
        self.types
            .get(name)
            .ok_or_else(|| Error::unresolved(name))
    }

    /// Resolve a reference to a type. Named references borrow the declared
    /// type; array and map references are synthesized once their element
    /// resolves.
    pub fn resolve_type(&self, type_ref: &TypeRef) -> Result<Cow<'_, Type>> {
        match type_ref {
            TypeRef::Named(name) => self.type_named(name).map(Cow::Borrowed),
            TypeRef::Array { array_of } => {
                self.resolve_type(array_of)?;
                Ok(Cow::Owned(Type::Array(ArrayType {
                    element: (**array_of).clone(),
                })))
            }
            TypeRef::Map { map_of } => {
                self.resolve_type(map_of)?;
                Ok(Cow::Owned(Type::Map(MapType {
                    value: (**map_of).clone(),
                })))
            }
        }
    }

    /// All declared types in insertion order, primitives included
    pub fn all_types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    /// All methods in insertion order
    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn method(&self, operation_id: &str) -> Option<&Method> {
        self.methods.get(operation_id)
    }

    /// Declared values of an enum type, in declaration order
    pub fn enum_values_of(&self, type_name: &str) -> Result<&[String]> {
        match self.type_named(type_name)? {
            Type::Enum(e) => Ok(&e.values),
            other => Err(Error::model_integrity(format!(
                "'{}' is not an enum type",
                other.name()
            ))),
        }
    }

    /// Resolve the owner of an object type
    pub fn parent_of(&self, object: &ObjectType) -> Result<Option<&ObjectType>> {
        let Some(parent) = object.parent.as_deref() else {
            return Ok(None);
        };
        match self.types.get(parent) {
            Some(Type::Object(owner)) => Ok(Some(owner)),
            Some(_) => Err(Error::model_integrity(format!(
                "parent '{}' of '{}' is not an object type",
                parent, object.name
            ))),
            None => Err(Error::model_integrity(format!(
                "parent '{}' of '{}' is not declared",
                parent, object.name
            ))),
        }
    }
}

/// Incremental construction of an [`ApiModel`]
#[derive(Debug, Clone)]
pub struct ApiModelBuilder {
    title: String,
    version: String,
    types: Vec<Type>,
    methods: Vec<Method>,
}

impl ApiModelBuilder {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        let types = STANDARD_PRIMITIVES
            .iter()
            .map(|name| {
                Type::Primitive(PrimitiveType {
                    name: (*name).to_string(),
                })
            })
            .collect();
        Self {
            title: title.into(),
            version: version.into(),
            types,
            methods: Vec::new(),
        }
    }

    /// Declare an additional primitive type
    pub fn primitive(self, name: impl Into<String>) -> Self {
        self.declare(Type::Primitive(PrimitiveType { name: name.into() }))
    }

    pub fn enum_type(self, enum_type: EnumType) -> Self {
        self.declare(Type::Enum(enum_type))
    }

    pub fn object(self, object: ObjectType) -> Self {
        self.declare(Type::Object(object))
    }

    /// Declare any type. Re-declaring a standard primitive is a no-op.
    pub fn declare(mut self, ty: Type) -> Self {
        if let Type::Primitive(p) = &ty {
            if STANDARD_PRIMITIVES.contains(&p.name.as_str()) {
                return self;
            }
        }
        self.types.push(ty);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Validate the model invariants and freeze the model
    pub fn build(self) -> Result<ApiModel> {
        let mut types = IndexMap::with_capacity(self.types.len());
        for ty in self.types {
            let name = ty.name();
            if let Type::Enum(e) = &ty {
                if e.values.is_empty() {
                    return Err(Error::model_integrity(format!(
                        "enum '{}' declares no values",
                        e.name
                    )));
                }
            }
            if types.insert(name.clone(), ty).is_some() {
                return Err(Error::model_integrity(format!(
                    "type '{}' is declared more than once",
                    name
                )));
            }
        }

        let mut methods = IndexMap::with_capacity(self.methods.len());
        for method in self.methods {
            let id = method.operation_id.clone();
            if methods.insert(id.clone(), method).is_some() {
                return Err(Error::model_integrity(format!(
                    "operation '{}' is declared more than once",
                    id
                )));
            }
        }

        let model = ApiModel {
            title: self.title,
            version: self.version,
            types,
            methods,
        };
        model.validate()?;
        log::debug!(
            "Built model '{}' {} with {} types and {} methods",
            model.title,
            model.version,
            model.types.len(),
            model.methods.len()
        );
        Ok(model)
    }
}

impl ApiModel {
    fn validate(&self) -> Result<()> {
        for ty in self.types.values() {
            match ty {
                Type::Array(a) => {
                    self.resolve_type(&a.element)?;
                }
                Type::Map(m) => {
                    self.resolve_type(&m.value)?;
                }
                Type::Object(object) => {
                    for property in object.properties.values() {
                        self.resolve_type(&property.type_ref)?;
                    }
                    self.check_owner_chain(object)?;
                }
                Type::Primitive(_) | Type::Enum(_) => {}
            }
        }
        for method in self.methods.values() {
            for type_ref in method.type_refs() {
                self.resolve_type(type_ref)?;
            }
        }
        Ok(())
    }

    fn check_owner_chain(&self, object: &ObjectType) -> Result<()> {
        let mut seen = HashSet::new();
        seen.insert(object.name.as_str());
        let mut current = object;
        while let Some(owner) = self.parent_of(current)? {
            if !seen.insert(owner.name.as_str()) {
                return Err(Error::model_integrity(format!(
                    "cyclic parent chain through '{}'",
                    owner.name
                )));
            }
            current = owner;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user() -> ObjectType {
        ObjectType::new("User")
            .with_property(Property::new("id", TypeRef::named("integer")))
            .with_property(Property::new("role", TypeRef::named("Role")))
    }

    #[test]
    fn test_resolve_and_order() -> Result<()> {
        let model = ApiModelBuilder::new("Test", "4.0")
            .enum_type(EnumType::new("Role", ["admin", "viewer"]))
            .object(user())
            .build()?;

        let names: Vec<_> = model
            .all_types()
            .filter(|t| !matches!(t, Type::Primitive(_)))
            .map(Type::name)
            .collect();
        assert_eq!(names, vec!["Role", "User"]);

        let resolved = model.resolve_type(&TypeRef::array(TypeRef::named("User")))?;
        assert_eq!(
            resolved.as_ref(),
            &Type::Array(ArrayType {
                element: TypeRef::named("User")
            })
        );
        assert_eq!(model.enum_values_of("Role")?, ["admin", "viewer"]);
        Ok(())
    }

    #[test]
    fn test_unresolved_type() {
        let err = ApiModelBuilder::new("Test", "4.0")
            .object(user())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType(name) if name == "Role"));
    }

    #[test]
    fn test_unresolved_method_reference() {
        let err = ApiModelBuilder::new("Test", "4.0")
            .method(Method::new("me", "GET", "/user").returns(TypeRef::named("User")))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType(_)));
    }

    #[test]
    fn test_enum_values_of_non_enum() -> Result<()> {
        let model = ApiModelBuilder::new("Test", "4.0").build()?;
        assert!(matches!(
            model.enum_values_of("string"),
            Err(Error::ModelIntegrity(_))
        ));
        assert!(matches!(
            model.enum_values_of("Missing"),
            Err(Error::UnresolvedType(_))
        ));
        Ok(())
    }

    #[test]
    fn test_integrity_violations() {
        let empty_enum = ApiModelBuilder::new("Test", "4.0")
            .enum_type(EnumType::new("Empty", Vec::<String>::new()))
            .build();
        assert!(matches!(empty_enum, Err(Error::ModelIntegrity(_))));

        let duplicate = ApiModelBuilder::new("Test", "4.0")
            .object(ObjectType::new("A"))
            .object(ObjectType::new("A"))
            .build();
        assert!(matches!(duplicate, Err(Error::ModelIntegrity(_))));

        let mut a = ObjectType::new("A");
        a.parent = Some("B".to_string());
        let mut b = ObjectType::new("B");
        b.parent = Some("A".to_string());
        let cycle = ApiModelBuilder::new("Test", "4.0").object(a).object(b).build();
        assert!(matches!(cycle, Err(Error::ModelIntegrity(msg)) if msg.contains("cyclic")));

        let mut orphan = ObjectType::new("Orphan");
        orphan.parent = Some("Nowhere".to_string());
        let dangling = ApiModelBuilder::new("Test", "4.0").object(orphan).build();
        assert!(matches!(dangling, Err(Error::ModelIntegrity(_))));
    }

    #[test]
    fn test_parent_of() -> Result<()> {
        let mut credentials = ObjectType::new("UserCredentials");
        credentials.parent = Some("User".to_string());
        let model = ApiModelBuilder::new("Test", "4.0")
            .enum_type(EnumType::new("Role", ["admin"]))
            .object(user())
            .object(credentials.clone())
            .build()?;

        let owner = model.parent_of(&credentials)?;
        assert_eq!(owner.map(|o| o.name.as_str()), Some("User"));
        assert!(model.parent_of(&user())?.is_none());
        Ok(())
    }

    #[test]
    fn test_from_str_yaml() -> Result<()> {
        let model = ApiModel::from_str(
            r#"
title: Test API
version: "4.0"
types:
  - kind: enum
    name: Role
    values: [admin, viewer]
  - kind: object
    name: User
    properties:
      - name: id
        type: integer
        required: true
      - name: roles
        type: { array_of: Role }
methods:
  - operation_id: user
    http_verb: GET
    path: /users/{user_id}
    parameters:
      - name: user_id
        type: integer
        in: path
        required: true
    response_type: User
"#,
        )?;

        assert_eq!(model.title(), "Test API");
        assert_eq!(model.version(), "4.0");
        let method = model.method("user").expect("method is declared");
        assert_eq!(method.parameters[0].location, ParameterLocation::Path);
        assert!(matches!(model.type_named("User")?, Type::Object(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.json");
        let document = ModelDocument {
            title: "Test".to_string(),
            version: "3.1".to_string(),
            types: vec![Type::Enum(EnumType::new("Role", ["admin"]))],
            methods: Vec::new(),
        };
        tokio::fs::write(&path, serde_json::to_string_pretty(&document)?).await?;

        let model = ApiModel::from_file(&path).await?;
        assert_eq!(model.version(), "3.1");
        assert_eq!(model.enum_values_of("Role")?, ["admin"]);
        Ok(())
    }
}
