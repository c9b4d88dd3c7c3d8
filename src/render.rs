//! Recursive dispatch from `(type, value summary)` to an [`Element`] tree.
//!
//! Resolution order for a value:
//! 1. a strategy registered for the type's key,
//! 2. the first entry of the type's alias chain in the bundle registry (repeat),
//! 3. a `repr` field on the summary, shown as pre-formatted text,
//! 4. the summary as a JSON literal.
//!
//! Alias chains are followed iteratively with a visited set and a hop bound;
//! structural recursion is bounded by [`RenderOptions::max_depth`]. Both limits
//! fail closed with a visible error element.

use serde_json::Value;
use tracing::debug;

use crate::element::Element;
use crate::error::RenderError;
use crate::repr::{TypeRepr, TypeSerialization};
use crate::strategy::{primitive, StrategyTable};

// ------------------------------- Policy ---------------------------------- //

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_ALIAS_HOPS: usize = 16;

// ------------------------------- Types ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Deepest nesting of composite types/values rendered before giving up.
    pub max_depth: usize,
    /// Longest alias chain followed for a single value.
    pub max_alias_hops: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, max_alias_hops: DEFAULT_MAX_ALIAS_HOPS }
    }
}

/// Borrowing, stateless renderer. Cheap to copy; safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'t> {
    table: &'t StrategyTable,
    options: RenderOptions,
}

/// What a type strategy sees.
pub struct TypeCx<'a> {
    pub renderer: Renderer<'a>,
    pub repr: &'a TypeRepr,
    depth: usize,
}

/// What a value strategy sees.
pub struct ValueCx<'a> {
    pub renderer: Renderer<'a>,
    pub bundle: &'a TypeSerialization,
    /// The resolved type, after alias hops.
    pub repr: &'a TypeRepr,
    pub summary: &'a Value,
    depth: usize,
}

// ------------------------------ Front API -------------------------------- //

impl Default for Renderer<'static> {
    fn default() -> Self {
        Renderer::new(StrategyTable::builtin())
    }
}

impl<'t> Renderer<'t> {
    pub fn new(table: &'t StrategyTable) -> Self {
        Self { table, options: RenderOptions::default() }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Descriptive rendering of a type.
    pub fn render_type(&self, repr: &TypeRepr) -> Element {
        self.type_at(repr, 0)
    }

    /// Renders `summary` as `repr`, or as the bundle's own type when `repr`
    /// is `None`. A `key` wraps the result in [`Element::Keyed`].
    pub fn render_value(
        &self,
        bundle: &TypeSerialization,
        summary: &Value,
        repr: Option<&TypeRepr>,
        key: Option<&str>,
    ) -> Element {
        self.value_at(bundle, summary, repr, key, 0)
    }

    /// Shorthand for the top-level call: the bundle's type, no key.
    pub fn render(&self, bundle: &TypeSerialization, summary: &Value) -> Element {
        self.render_value(bundle, summary, None, None)
    }

    fn type_at(&self, repr: &TypeRepr, depth: usize) -> Element {
        if depth > self.options.max_depth {
            return RenderError::DepthExceeded { limit: self.options.max_depth }.into();
        }
        match self.table.lookup(repr) {
            Some(pair) => {
                let cx = TypeCx { renderer: *self, repr, depth };
                pair.type_view.render(&cx)
            }
            None => primitive::plain_type(repr),
        }
    }

    fn value_at(
        &self,
        bundle: &TypeSerialization,
        summary: &Value,
        repr: Option<&TypeRepr>,
        key: Option<&str>,
        depth: usize,
    ) -> Element {
        let element = self.resolve_value(bundle, summary, repr.unwrap_or(&bundle.ty), depth);
        match key {
            Some(key) => Element::keyed(key, element),
            None => element,
        }
    }

    fn resolve_value<'b>(
        &self,
        bundle: &'b TypeSerialization,
        summary: &Value,
        repr: &'b TypeRepr,
        depth: usize,
    ) -> Element {
        if depth > self.options.max_depth {
            return RenderError::DepthExceeded { limit: self.options.max_depth }.into();
        }

        let mut current = repr;
        let mut visited: Vec<&str> = Vec::new();
        loop {
            if let Some(pair) = self.table.lookup(current) {
                debug!(key = %current.strategy_key(), view = ?pair.value_view, "value strategy");
                let cx = ValueCx { renderer: *self, bundle, repr: current, summary, depth };
                return pair.value_view.render(&cx);
            }
            let Some(parent) = bundle.parent_of(&current.name) else {
                break;
            };
            if visited.contains(&current.name.as_str()) {
                let mut chain: Vec<String> = visited.iter().map(|name| name.to_string()).collect();
                chain.push(current.name.clone());
                return RenderError::AliasCycle { chain }.into();
            }
            visited.push(&current.name);
            if visited.len() > self.options.max_alias_hops {
                return RenderError::AliasChainTooLong {
                    name: repr.name.clone(),
                    limit: self.options.max_alias_hops,
                }
                .into();
            }
            debug!(from = %current.name, to = %parent.name, "following type alias");
            current = parent;
        }

        debug!(name = %current.name, "no strategy, falling back");
        primitive::fallback_value(summary)
    }
}

impl TypeCx<'_> {
    /// Renders a nested type one level deeper.
    pub fn render_type(&self, repr: &TypeRepr) -> Element {
        self.renderer.type_at(repr, self.depth + 1)
    }
}

impl ValueCx<'_> {
    /// Renders a nested value one level deeper.
    pub fn render_value(
        &self,
        bundle: &TypeSerialization,
        summary: &Value,
        repr: Option<&TypeRepr>,
        key: Option<&str>,
    ) -> Element {
        self.renderer.value_at(bundle, summary, repr, key, self.depth + 1)
    }

    /// Renders a nested type one level deeper.
    pub fn render_type(&self, repr: &TypeRepr) -> Element {
        self.renderer.type_at(repr, self.depth + 1)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::TypeCategory;
    use serde_json::json;

    fn bundle(ty: TypeRepr) -> TypeSerialization {
        TypeSerialization::new(ty)
    }

    #[test]
    fn registered_strategy_wins() {
        let out = Renderer::default().render(&bundle(TypeRepr::builtin("float")), &json!(2.5));
        assert_eq!(out, Element::text("2.5000"));
    }

    #[test]
    fn explicit_repr_overrides_bundle_type() {
        let b = bundle(TypeRepr::builtin("float"));
        let out = Renderer::default().render_value(&b, &json!(7), Some(&TypeRepr::builtin("int")), None);
        assert_eq!(out, Element::text("7"));
    }

    #[test]
    fn key_wraps_result() {
        let b = bundle(TypeRepr::builtin("int"));
        let out = Renderer::default().render_value(&b, &json!(1), None, Some("0"));
        assert_eq!(out, Element::keyed("0", Element::text("1")));
    }

    #[test]
    fn alias_chain_resolves_to_parent() {
        let foo = TypeRepr::new(TypeCategory::ClassRef, "Foo", json!({"import_path": "app"}));
        let b = bundle(foo).with_alias("Foo", vec![TypeRepr::builtin("float")]);
        let aliased = Renderer::default().render(&b, &json!(1.0));
        let direct = Renderer::default().render(&bundle(TypeRepr::builtin("float")), &json!(1.0));
        assert_eq!(aliased, direct);
    }

    #[test]
    fn alias_chain_follows_multiple_hops() {
        let b = bundle(TypeRepr::builtin("Meters"))
            .with_alias("Meters", vec![TypeRepr::builtin("Length")])
            .with_alias("Length", vec![TypeRepr::builtin("int")]);
        assert_eq!(Renderer::default().render(&b, &json!(12)), Element::text("12"));
    }

    #[test]
    fn empty_alias_chain_falls_through() {
        let b = bundle(TypeRepr::builtin("Opaque")).with_alias("Opaque", vec![]);
        let out = Renderer::default().render(&b, &json!({"a": 1}));
        assert_eq!(out, Element::code_text(r#"{"a":1}"#));
    }

    #[test]
    fn alias_cycle_is_reported() {
        let b = bundle(TypeRepr::builtin("A"))
            .with_alias("A", vec![TypeRepr::builtin("B")])
            .with_alias("B", vec![TypeRepr::builtin("A")]);
        let out = Renderer::default().render(&b, &json!(1));
        match out {
            Element::Error { code, message } => {
                assert_eq!(code, "alias_cycle");
                assert_eq!(message, "Type alias cycle: A -> B -> A");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn alias_hop_limit_is_enforced() {
        let mut b = bundle(TypeRepr::builtin("T0"));
        for i in 0..10 {
            b = b.with_alias(format!("T{i}"), vec![TypeRepr::builtin(format!("T{}", i + 1))]);
        }
        let renderer = Renderer::default()
            .with_options(RenderOptions { max_alias_hops: 3, ..RenderOptions::default() });
        let out = renderer.render(&b, &json!(1));
        assert!(matches!(out, Element::Error { ref code, .. } if code == "alias_chain_too_long"));
    }

    #[test]
    fn repr_fallback_splits_lines() {
        let b = bundle(TypeRepr::builtin("Mystery"));
        let out = Renderer::default().render(&b, &json!({"repr": "line1\n  line2"}));
        assert_eq!(out, Element::Preformatted { lines: vec!["line1".into(), "  line2".into()] });
    }

    #[test]
    fn literal_fallback_serializes_summary() {
        let b = bundle(TypeRepr::builtin("str"));
        assert_eq!(Renderer::default().render(&b, &json!("hi")), Element::code_text("\"hi\""));
    }

    #[test]
    fn depth_limit_stops_deep_lists() {
        let mut ty = TypeRepr::builtin("int");
        let mut summary = json!(1);
        for _ in 0..8 {
            ty = TypeRepr::alias("list", [ty]);
            summary = json!([summary]);
        }
        let renderer = Renderer::default()
            .with_options(RenderOptions { max_depth: 4, ..RenderOptions::default() });
        let out = renderer.render(&bundle(ty), &summary);
        let errors = out.errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Element::Error { code, .. } if code == "depth_exceeded"));
    }

    #[test]
    fn empty_table_uses_fallbacks_only() {
        let table = StrategyTable::new();
        let out = Renderer::new(&table).render(&bundle(TypeRepr::builtin("int")), &json!(3));
        assert_eq!(out, Element::code_text("3"));
    }
}
