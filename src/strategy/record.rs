//! Declared-fields (`dataclass`) types.
//!
//! A record value summary looks like
//! `{ "values": { field: summary }, "types": { field: TypeSerialization } }`,
//! where `types` may be absent or only cover some fields.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::element::{Element, Row};
use crate::error::RenderError;
use crate::path_de::from_value_with_path;
use crate::render::{TypeCx, ValueCx};
use crate::repr::{TypeRegistry, TypeRepr, TypeSerialization};

#[derive(Debug, Deserialize)]
struct RecordSummary {
    values: IndexMap<String, Value>,
    #[serde(default)]
    types: IndexMap<String, Value>,
}

/// A `types[field]` entry. Either half may be missing.
#[derive(Debug, Deserialize)]
struct FieldOverride {
    #[serde(rename = "type", default)]
    ty: Option<TypeRepr>,
    #[serde(default)]
    registry: TypeRegistry,
}

/// Where one field's type (and the bundle it resolves against) comes from.
///
/// | override `type` | override bundle | declared field | renders with                           |
/// |-----------------|-----------------|----------------|----------------------------------------|
/// | yes             | yes             | any            | override type, override bundle         |
/// | no              | yes             | present        | declared type, override registry       |
/// | no              | no              | present        | declared type, ambient bundle          |
/// | no              | any             | absent         | ambient bundle's own type              |
#[derive(Debug, PartialEq)]
enum FieldSource<'a> {
    Override(TypeSerialization),
    OverrideRegistry(TypeSerialization),
    Declared(&'a TypeRepr),
    Ambient,
}

impl<'a> FieldSource<'a> {
    fn pick(field: &str, override_: Option<&Value>, declared: &'a IndexMap<String, TypeRepr>) -> Self {
        let parsed = override_.and_then(|raw| match from_value_with_path::<FieldOverride>(raw) {
            Ok(parsed) => Some(parsed),
            Err(detail) => {
                warn!(field, %detail, "ignoring malformed field type override");
                None
            }
        });
        match (parsed, declared.get(field)) {
            (Some(FieldOverride { ty: Some(ty), registry }), _) => {
                Self::Override(TypeSerialization { ty, registry })
            }
            (Some(FieldOverride { ty: None, registry }), Some(ty)) => {
                Self::OverrideRegistry(TypeSerialization { ty: ty.clone(), registry })
            }
            (None, Some(ty)) => Self::Declared(ty),
            (_, None) => Self::Ambient,
        }
    }
}

/// `@dataclass`, `Name:`, then one `field: type` row per declared field.
pub fn record_type(cx: &TypeCx<'_>) -> Element {
    let fields = match cx.repr.fields() {
        Ok(fields) => fields,
        Err(err) => return err.into(),
    };
    let rows = fields
        .iter()
        .map(|(name, ty)| {
            Row::new(name.clone(), vec![Element::code_text(format!("{name}: ")), cx.render_type(ty)])
        })
        .collect();
    Element::code(vec![
        Element::block(vec![Element::text("@dataclass")]),
        Element::block(vec![Element::text(format!("{}:", cx.repr.name))]),
        Element::table(rows),
    ])
}

/// One row per field in the summary's own order: bold name, rendered value.
pub fn record_value(cx: &ValueCx<'_>) -> Element {
    let declared = match cx.repr.fields() {
        Ok(fields) => fields,
        Err(err) => return err.into(),
    };
    let summary: RecordSummary = match from_value_with_path(cx.summary) {
        Ok(summary) => summary,
        Err(detail) => {
            warn!(type_name = %cx.repr.name, %detail, "record summary has the wrong shape");
            return RenderError::UnexpectedSummary {
                type_name: cx.repr.name.clone(),
                expected: "`values` and `types` maps",
            }
            .into();
        }
    };

    let rows = summary
        .values
        .iter()
        .map(|(name, value)| {
            let rendered = match FieldSource::pick(name, summary.types.get(name), &declared) {
                FieldSource::Override(bundle) | FieldSource::OverrideRegistry(bundle) => {
                    cx.render_value(&bundle, value, Some(&bundle.ty), None)
                }
                FieldSource::Declared(ty) => cx.render_value(cx.bundle, value, Some(ty), None),
                FieldSource::Ambient => cx.render_value(cx.bundle, value, None, None),
            };
            Row::new(name.clone(), vec![Element::bold(name.clone()), rendered])
        })
        .collect();
    Element::table(rows)
}
