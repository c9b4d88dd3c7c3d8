//! `list`, `Union` and `FloatInRange`.
use serde_json::Value;

use crate::element::Element;
use crate::error::RenderError;
use crate::render::{TypeCx, ValueCx};
use crate::repr::TypeRepr;

use super::primitive::{display_number, truthy};

const RANGE_LABELS: [&str; 4] = ["Lower bound", "Upper bound", "Lower inclusive", "Upper inclusive"];

// ------------------------------- list ------------------------------------ //

fn element_type(repr: &TypeRepr) -> Result<TypeRepr, RenderError> {
    repr.args()?.into_iter().next().ok_or_else(|| RenderError::MissingParameter {
        type_name: repr.name.clone(),
        parameter: "args[0]",
    })
}

pub fn list_type(cx: &TypeCx<'_>) -> Element {
    let element = match element_type(cx.repr) {
        Ok(element) => element,
        Err(err) => return err.into(),
    };
    Element::code(vec![
        Element::text("list["),
        cx.render_type(&element),
        Element::text("]"),
    ])
}

/// `[a, b, c]`, each entry keyed by its index (or object key).
pub fn list_value(cx: &ValueCx<'_>) -> Element {
    let element = match element_type(cx.repr) {
        Ok(element) => element,
        Err(err) => return err.into(),
    };
    let entries: Vec<(String, &Value)> = match cx.summary {
        Value::Array(items) => items.iter().enumerate().map(|(i, item)| (i.to_string(), item)).collect(),
        Value::Object(map) => map.iter().map(|(key, item)| (key.clone(), item)).collect(),
        _ => {
            return RenderError::UnexpectedSummary {
                type_name: cx.repr.name.clone(),
                expected: "a sequence of element summaries",
            }
            .into();
        }
    };

    let mut children = Vec::with_capacity(entries.len() * 2 + 1);
    children.push(Element::text("["));
    for (i, (key, item)) in entries.iter().enumerate() {
        if i > 0 {
            children.push(Element::text(", "));
        }
        children.push(cx.render_value(cx.bundle, item, Some(&element), Some(key.as_str())));
    }
    children.push(Element::text("]"));
    Element::fragment(children)
}

// ------------------------------- Union ----------------------------------- //

pub fn union_type(cx: &TypeCx<'_>) -> Element {
    let members = match cx.repr.args() {
        Ok(members) => members,
        Err(err) => return err.into(),
    };
    let mut children = vec![Element::block(vec![Element::text("Union[")])];
    children.extend(
        members
            .iter()
            .map(|member| Element::indent(vec![cx.render_type(member), Element::text(", ")])),
    );
    children.push(Element::block(vec![Element::text("]")]));
    Element::code(children)
}

// ---------------------------- FloatInRange ------------------------------- //

/// `FloatInRange[lower, upper, True, False]`, each component annotated.
pub fn float_in_range_type(cx: &TypeCx<'_>) -> Element {
    match range_components(cx.repr) {
        Ok([lower, upper, lower_inclusive, upper_inclusive]) => {
            let parts = [
                display_number(&lower),
                display_number(&upper),
                python_bool(&lower_inclusive).to_owned(),
                python_bool(&upper_inclusive).to_owned(),
            ];
            let mut children = vec![Element::text("FloatInRange[")];
            for (i, (label, part)) in RANGE_LABELS.iter().zip(parts).enumerate() {
                if i > 0 {
                    children.push(Element::text(", "));
                }
                children.push(Element::annotated(*label, Element::text(part)));
            }
            children.push(Element::text("]"));
            Element::code(children)
        }
        Err(err) => err.into(),
    }
}

fn range_components(repr: &TypeRepr) -> Result<[Value; 4], RenderError> {
    let malformed = |detail: String| RenderError::MalformedParameter {
        type_name: repr.name.clone(),
        parameter: "parameters",
        detail,
    };
    let parameters = repr.generic_parameters()?;
    if parameters.len() != 4 {
        return Err(malformed(format!("expected 4 parameters, found {}", parameters.len())));
    }
    let mut values = parameters.into_iter().map(|(name, param)| {
        param
            .value()
            .cloned()
            .ok_or_else(|| malformed(format!("parameter `{name}` has no value")))
    });
    let mut next = || values.next().unwrap_or(Ok(Value::Null));
    Ok([next()?, next()?, next()?, next()?])
}

fn python_bool(flag: &Value) -> &'static str {
    if truthy(flag) { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use crate::repr::{TypeCategory, TypeSerialization};
    use serde_json::json;

    fn range(params: Value) -> TypeRepr {
        TypeRepr::new(TypeCategory::Generic, "FloatInRange", json!({ "parameters": params }))
    }

    #[test]
    fn list_type_wraps_element() {
        let repr = TypeRepr::alias("list", [TypeRepr::builtin("int")]);
        assert_eq!(
            Renderer::default().render_type(&repr),
            Element::code(vec![
                Element::text("list["),
                Element::code_text("int"),
                Element::text("]"),
            ])
        );
    }

    #[test]
    fn list_value_joins_in_order() {
        let bundle = TypeSerialization::new(TypeRepr::alias("list", [TypeRepr::builtin("int")]));
        let out = Renderer::default().render(&bundle, &json!([3, 1, 2]));
        assert_eq!(
            out,
            Element::fragment(vec![
                Element::text("["),
                Element::keyed("0", Element::text("3")),
                Element::text(", "),
                Element::keyed("1", Element::text("1")),
                Element::text(", "),
                Element::keyed("2", Element::text("2")),
                Element::text("]"),
            ])
        );
    }

    #[test]
    fn list_value_accepts_keyed_maps() {
        let bundle = TypeSerialization::new(TypeRepr::alias("list", [TypeRepr::builtin("int")]));
        let out = Renderer::default().render(&bundle, &json!({"b": 1, "a": 2}));
        let Element::Fragment { children } = out else { panic!("expected fragment") };
        assert_eq!(children[1], Element::keyed("b", Element::text("1")));
        assert_eq!(children[3], Element::keyed("a", Element::text("2")));
    }

    #[test]
    fn empty_list_is_brackets() {
        let bundle = TypeSerialization::new(TypeRepr::alias("list", [TypeRepr::builtin("int")]));
        let out = Renderer::default().render(&bundle, &json!([]));
        assert_eq!(out, Element::fragment(vec![Element::text("["), Element::text("]")]));
    }

    #[test]
    fn list_without_args_is_soft_error_both_ways() {
        let repr = TypeRepr::new(TypeCategory::Alias, "list", json!({}));
        let bundle = TypeSerialization::new(repr.clone());
        assert!(Renderer::default().render_type(&repr).is_error());
        assert!(Renderer::default().render(&bundle, &json!([1])).is_error());
    }

    #[test]
    fn list_value_rejects_scalars() {
        let bundle = TypeSerialization::new(TypeRepr::alias("list", [TypeRepr::builtin("int")]));
        let out = Renderer::default().render(&bundle, &json!(5));
        assert!(matches!(out, Element::Error { ref code, .. } if code == "unexpected_summary"));
    }

    #[test]
    fn union_type_indents_members() {
        let repr = TypeRepr::alias("Union", [TypeRepr::builtin("int"), TypeRepr::builtin("str")]);
        let out = Renderer::default().render_type(&repr);
        assert_eq!(
            out,
            Element::code(vec![
                Element::block(vec![Element::text("Union[")]),
                Element::indent(vec![Element::code_text("int"), Element::text(", ")]),
                Element::indent(vec![Element::code_text("str"), Element::text(", ")]),
                Element::block(vec![Element::text("]")]),
            ])
        );
    }

    #[test]
    fn union_value_is_literal() {
        let repr = TypeRepr::alias("Union", [TypeRepr::builtin("int"), TypeRepr::builtin("str")]);
        let out = Renderer::default().render(&TypeSerialization::new(repr), &json!(4));
        assert_eq!(out, Element::code_text("4"));
    }

    #[test]
    fn float_in_range_annotates_components() {
        let repr = range(json!([
            ["lower_bound", {"value": 0.0}],
            ["upper_bound", {"value": 1.5}],
            ["lower_inclusive", {"value": true}],
            ["upper_inclusive", {"value": false}],
        ]));
        let out = Renderer::default().render_type(&repr);
        let Element::Code { children } = out else { panic!("expected code") };
        assert_eq!(children.len(), 9);
        assert_eq!(children[1], Element::annotated("Lower bound", Element::text("0")));
        assert_eq!(children[3], Element::annotated("Upper bound", Element::text("1.5")));
        assert_eq!(children[5], Element::annotated("Lower inclusive", Element::text("True")));
        assert_eq!(children[7], Element::annotated("Upper inclusive", Element::text("False")));
    }

    #[test]
    fn float_in_range_value_is_float() {
        let repr = range(json!([]));
        let out = Renderer::default().render(&TypeSerialization::new(repr), &json!(0.123456));
        assert_eq!(out, Element::text("0.1235"));
    }

    #[test]
    fn float_in_range_needs_four_values() {
        assert!(Renderer::default().render_type(&range(json!([["a", {"value": 1}]]))).is_error());
        let missing = TypeRepr::new(TypeCategory::Generic, "FloatInRange", json!({}));
        assert!(Renderer::default().render_type(&missing).is_error());
    }
}
