//! Strategy pairs and the table they are looked up in.
//!
//! Built-in strategies are plain enum variants so the full set is visible in
//! one place. New domain types plug in through [`StrategyTable::register`],
//! usually with the `Custom` variants wrapping a [`TypeStrategy`] or
//! [`ValueStrategy`] implementation. The dispatcher never changes.
pub mod composite;
pub mod domain;
pub mod primitive;
pub mod record;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::element::Element;
use crate::render::{TypeCx, ValueCx};
use crate::repr::{TypeCategory, TypeRepr};

pub const RECORD_KEY: &str = "dataclass";
pub const DATA_LOADER_KEY: &str = "torch.utils.data.dataloader.DataLoader";
pub const PLOTLY_FIGURE_KEY: &str = "plotly.graph_objs._figure.Figure";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Renders a type descriptively.
pub trait TypeStrategy: Send + Sync {
    fn render_type(&self, cx: &TypeCx<'_>) -> Element;
}

/// Renders a value summary of some type.
pub trait ValueStrategy: Send + Sync {
    fn render_value(&self, cx: &ValueCx<'_>) -> Element;
}

#[derive(Clone)]
pub enum TypeView {
    /// Name as code, params appended as JSON when present.
    Plain,
    List,
    Union,
    FloatInRange,
    Record,
    Custom(Arc<dyn TypeStrategy>),
}

#[derive(Clone)]
pub enum ValueView {
    /// Summary as a JSON literal.
    Literal,
    Float,
    Int,
    Bool,
    List,
    Record,
    DataLoader,
    PlotlyFigure,
    Custom(Arc<dyn ValueStrategy>),
}

#[derive(Debug, Clone)]
pub struct StrategyPair {
    pub type_view: TypeView,
    pub value_view: ValueView,
}

#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    entries: IndexMap<String, StrategyPair>,
}

static BUILTIN: Lazy<StrategyTable> = Lazy::new(StrategyTable::with_builtins);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeView {
    pub(crate) fn render(&self, cx: &TypeCx<'_>) -> Element {
        match self {
            Self::Plain => primitive::plain_type(cx.repr),
            Self::List => composite::list_type(cx),
            Self::Union => composite::union_type(cx),
            Self::FloatInRange => composite::float_in_range_type(cx),
            Self::Record => record::record_type(cx),
            Self::Custom(strategy) => strategy.render_type(cx),
        }
    }
}

impl ValueView {
    pub(crate) fn render(&self, cx: &ValueCx<'_>) -> Element {
        match self {
            Self::Literal => primitive::literal_value(cx.summary),
            Self::Float => primitive::float_value(cx.summary),
            Self::Int => primitive::int_value(cx.summary),
            Self::Bool => primitive::bool_value(cx.summary),
            Self::List => composite::list_value(cx),
            Self::Record => record::record_value(cx),
            Self::DataLoader => domain::data_loader_value(cx),
            Self::PlotlyFigure => domain::plotly_figure_value(cx),
            Self::Custom(strategy) => strategy.render_value(cx),
        }
    }
}

impl fmt::Debug for TypeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::List => f.write_str("List"),
            Self::Union => f.write_str("Union"),
            Self::FloatInRange => f.write_str("FloatInRange"),
            Self::Record => f.write_str("Record"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for ValueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("Literal"),
            Self::Float => f.write_str("Float"),
            Self::Int => f.write_str("Int"),
            Self::Bool => f.write_str("Bool"),
            Self::List => f.write_str("List"),
            Self::Record => f.write_str("Record"),
            Self::DataLoader => f.write_str("DataLoader"),
            Self::PlotlyFigure => f.write_str("PlotlyFigure"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl StrategyPair {
    pub fn new(type_view: TypeView, value_view: ValueView) -> Self {
        Self { type_view, value_view }
    }

    /// Plain type view paired with a custom value strategy, the common case
    /// for domain objects.
    pub fn custom_value(strategy: impl ValueStrategy + 'static) -> Self {
        Self::new(TypeView::Plain, ValueView::Custom(Arc::new(strategy)))
    }
}

impl StrategyTable {
    /// Empty table. Every lookup misses, so rendering falls back to aliases,
    /// `repr` text and JSON literals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared table holding the built-in strategies.
    pub fn builtin() -> &'static StrategyTable {
        &BUILTIN
    }

    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("float", StrategyPair::new(TypeView::Plain, ValueView::Float));
        table.register("int", StrategyPair::new(TypeView::Plain, ValueView::Int));
        table.register("bool", StrategyPair::new(TypeView::Plain, ValueView::Bool));
        table.register("FloatInRange", StrategyPair::new(TypeView::FloatInRange, ValueView::Float));
        table.register("list", StrategyPair::new(TypeView::List, ValueView::List));
        table.register(RECORD_KEY, StrategyPair::new(TypeView::Record, ValueView::Record));
        // union values are shown without resolving the active member
        table.register("Union", StrategyPair::new(TypeView::Union, ValueView::Literal));
        table.register(DATA_LOADER_KEY, StrategyPair::new(TypeView::Plain, ValueView::DataLoader));
        table.register(PLOTLY_FIGURE_KEY, StrategyPair::new(TypeView::Plain, ValueView::PlotlyFigure));
        table
    }

    /// Adds or replaces the pair for `key` (a type name, or
    /// `import_path.name` for class references). Returns the replaced pair.
    pub fn register(&mut self, key: impl Into<String>, pair: StrategyPair) -> Option<StrategyPair> {
        self.entries.insert(key.into(), pair)
    }

    pub fn get(&self, key: &str) -> Option<&StrategyPair> {
        self.entries.get(key)
    }

    /// Pair for `repr`; records without a dedicated entry share the generic
    /// record pair.
    pub fn lookup(&self, repr: &TypeRepr) -> Option<&StrategyPair> {
        self.entries.get(&repr.strategy_key()).or_else(|| match repr.category {
            TypeCategory::Record => self.entries.get(RECORD_KEY),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
