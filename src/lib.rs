//! Typed-value rendering for pipeline run artifacts.
//!
//! Producers attach a [`TypeSerialization`](repr::TypeSerialization) bundle to
//! every value summary they store. [`Renderer`](render::Renderer) walks the
//! pair and produces an [`Element`](element::Element) tree, resolving type
//! aliases through the bundle registry and degrading to `repr` text or JSON
//! literals when no strategy applies.
//!
//! ```
//! use runlens::render::Renderer;
//! use runlens::repr::{TypeRepr, TypeSerialization};
//! use runlens::output::{to_text, Style};
//!
//! let bundle = TypeSerialization::new(TypeRepr::alias("list", [TypeRepr::builtin("float")]));
//! let summary = serde_json::json!([1.0, 3.14159]);
//! let element = Renderer::default().render(&bundle, &summary);
//! assert_eq!(to_text(&element, Style::Plain), "[1.0000, 3.1416]");
//! ```
pub mod cli;
pub mod element;
pub mod error;
pub mod jq_exec;
pub mod output;
pub mod path_de;
pub mod render;
pub mod repr;
pub mod run;
pub mod strategy;

pub use element::Element;
pub use error::{LoadError, RenderError};
pub use render::{RenderOptions, Renderer};
pub use repr::{Artifact, TypeRepr, TypeSerialization};
pub use strategy::{StrategyPair, StrategyTable};
