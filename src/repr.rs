//! Serialized type representations.
//!
//! A type travels as a `[category, name, params]` triple. Params stay as raw,
//! insertion-ordered JSON and are decoded on demand through the accessors on
//! [`TypeRepr`], so a malformed shape surfaces as a [`RenderError`] at the
//! strategy that needs it instead of failing the whole document.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::RenderError;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Builtin,
    /// `typing` aliases such as `list` and `Union`.
    #[serde(rename = "typing")]
    Alias,
    /// Declared-fields types (`dataclass`).
    #[serde(rename = "dataclass")]
    Record,
    Generic,
    /// A plain class referenced by import path.
    #[serde(rename = "class")]
    ClassRef,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTypeRepr", into = "RawTypeRepr")]
pub struct TypeRepr {
    pub category: TypeCategory,
    pub name: String,
    pub params: Value,
}

#[derive(Serialize, Deserialize)]
struct RawTypeRepr(TypeCategory, String, #[serde(default)] Value);

/// `{ "type": TypeRepr }`, the wrapper used for alias args and record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    #[serde(rename = "type")]
    pub ty: TypeRepr,
}

/// One positional parameter of a generic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Type {
        #[serde(rename = "type")]
        ty: TypeRepr,
    },
    Value {
        value: Value,
    },
}

/// Type name -> the representations it is also known as. The first entry wins.
pub type TypeRegistry = IndexMap<String, Vec<TypeRepr>>;

/// The bundle a producer attaches to every value summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSerialization {
    #[serde(rename = "type")]
    pub ty: TypeRepr,
    #[serde(default)]
    pub registry: TypeRegistry,
}

/// A stored run artifact: a value summary and the bundle describing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub type_serialization: TypeSerialization,
    pub json_summary: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Alias => "typing",
            Self::Record => "dataclass",
            Self::Generic => "generic",
            Self::ClassRef => "class",
            Self::Unknown => "unknown",
        }
    }
}

impl From<RawTypeRepr> for TypeRepr {
    fn from(RawTypeRepr(category, name, params): RawTypeRepr) -> Self {
        Self { category, name, params }
    }
}

impl From<TypeRepr> for RawTypeRepr {
    fn from(repr: TypeRepr) -> Self {
        RawTypeRepr(repr.category, repr.name, repr.params)
    }
}

impl TypeRepr {
    pub fn new(category: TypeCategory, name: impl Into<String>, params: Value) -> Self {
        Self { category, name: name.into(), params }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(TypeCategory::Builtin, name, Value::Object(Map::new()))
    }

    pub fn alias(name: impl Into<String>, args: impl IntoIterator<Item = TypeRepr>) -> Self {
        let args: Vec<Value> = args.into_iter().map(|ty| json!({ "type": ty.to_value() })).collect();
        Self::new(TypeCategory::Alias, name, json!({ "args": args }))
    }

    pub fn record<I, K>(name: impl Into<String>, import_path: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeRepr)>,
        K: Into<String>,
    {
        let mut field_map = Map::new();
        for (field, ty) in fields {
            field_map.insert(field.into(), json!({ "type": ty.to_value() }));
        }
        Self::new(
            TypeCategory::Record,
            name,
            json!({ "import_path": import_path, "fields": field_map }),
        )
    }

    pub fn class(name: impl Into<String>, import_path: &str) -> Self {
        Self::new(TypeCategory::ClassRef, name, json!({ "import_path": import_path }))
    }

    /// Generic type whose parameters are all plain values.
    pub fn generic<I, K>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let parameters: Vec<Value> = parameters
            .into_iter()
            .map(|(param, value)| json!([param.into(), { "value": value }]))
            .collect();
        Self::new(TypeCategory::Generic, name, json!({ "parameters": parameters }))
    }

    /// Wire form, `[category, name, params]`.
    pub fn to_value(&self) -> Value {
        json!([self.category.as_str(), self.name, self.params])
    }

    /// Key used to find a strategy pair: `import_path.name` for class
    /// references, the bare name otherwise.
    pub fn strategy_key(&self) -> String {
        match (self.category, self.import_path()) {
            (TypeCategory::ClassRef, Some(import_path)) => format!("{import_path}.{}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn has_params(&self) -> bool {
        self.params.as_object().is_some_and(|params| !params.is_empty())
    }

    pub fn import_path(&self) -> Option<&str> {
        self.params.get("import_path").and_then(Value::as_str)
    }

    /// Alias arguments, in order.
    pub fn args(&self) -> Result<Vec<TypeRepr>, RenderError> {
        let args: Vec<TypeParam> = self.decode("args")?;
        Ok(args.into_iter().map(|arg| arg.ty).collect())
    }

    /// Declared record fields, in declaration order.
    pub fn fields(&self) -> Result<IndexMap<String, TypeRepr>, RenderError> {
        let fields: IndexMap<String, TypeParam> = self.decode("fields")?;
        Ok(fields.into_iter().map(|(name, param)| (name, param.ty)).collect())
    }

    pub fn generic_parameters(&self) -> Result<Vec<(String, ParamValue)>, RenderError> {
        self.decode("parameters")
    }

    fn param(&self, parameter: &'static str) -> Result<&Value, RenderError> {
        self.params
            .get(parameter)
            .filter(|value| !value.is_null())
            .ok_or_else(|| RenderError::MissingParameter {
                type_name: self.name.clone(),
                parameter,
            })
    }

    fn decode<T: DeserializeOwned>(&self, parameter: &'static str) -> Result<T, RenderError> {
        let value = self.param(parameter)?;
        crate::path_de::from_value_with_path(value).map_err(|detail| {
            RenderError::MalformedParameter {
                type_name: self.name.clone(),
                parameter,
                detail,
            }
        })
    }
}

impl ParamValue {
    /// The plain value, if this parameter carries one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value { value } => Some(value),
            Self::Type { .. } => None,
        }
    }
}

impl TypeSerialization {
    pub fn new(ty: TypeRepr) -> Self {
        Self { ty, registry: TypeRegistry::new() }
    }

    pub fn with_alias(mut self, name: impl Into<String>, chain: Vec<TypeRepr>) -> Self {
        self.registry.insert(name.into(), chain);
        self
    }

    /// First entry of the alias chain registered for `name`, if any.
    pub fn parent_of(&self, name: &str) -> Option<&TypeRepr> {
        self.registry.get(name).and_then(|chain| chain.first())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
