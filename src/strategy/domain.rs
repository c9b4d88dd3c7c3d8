//! Domain objects presented by their meaning rather than their fields.
use serde_json::Value;

use crate::element::{Element, Row};
use crate::error::RenderError;
use crate::render::ValueCx;

use super::primitive::{bool_value, display_scalar, repr_value};

/// Fixed summary table for a torch `DataLoader`.
pub fn data_loader_value(cx: &ValueCx<'_>) -> Element {
    let Value::Object(summary) = cx.summary else {
        return RenderError::UnexpectedSummary {
            type_name: cx.repr.name.clone(),
            expected: "an object of loader attributes",
        }
        .into();
    };
    let attr = |name: &str| summary.get(name).unwrap_or(&Value::Null);

    let dataset = match attr("dataset").get("repr") {
        Some(repr) => repr_value(repr),
        None => RenderError::UnexpectedSummary {
            type_name: format!("{}.dataset", cx.repr.name),
            expected: "a `repr` description",
        }
        .into(),
    };

    Element::table(vec![
        Row::new("batch-size", vec![
            Element::bold("Batch size"),
            Element::text(display_scalar(attr("batch_size"))),
        ]),
        Row::new("num_workers", vec![
            Element::bold("Number of subprocesses"),
            Element::text(display_scalar(attr("num_workers"))),
        ]),
        Row::new("pin_memory", vec![
            Element::bold("Copy tensors into pinned memory"),
            bool_value(attr("pin_memory")),
        ]),
        Row::new("timeout", vec![
            Element::bold("Timeout"),
            Element::text(format!("{} sec.", display_scalar(attr("timeout")))),
        ]),
        Row::new("dataset", vec![Element::bold("Dataset"), dataset]),
    ])
}

/// Hands a plotly figure's `data`, `layout` and `config` to the chart consumer.
pub fn plotly_figure_value(cx: &ValueCx<'_>) -> Element {
    let Some(figure) = cx.summary.get("figure").filter(|figure| figure.is_object()) else {
        return RenderError::UnexpectedSummary {
            type_name: cx.repr.name.clone(),
            expected: "a `figure` object",
        }
        .into();
    };
    let part = |name: &str| figure.get(name).cloned().unwrap_or(Value::Null);
    Element::Chart { data: part("data"), layout: part("layout"), config: part("config") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Tone;
    use crate::render::Renderer;
    use crate::repr::{TypeRepr, TypeSerialization};
    use crate::strategy::{DATA_LOADER_KEY, PLOTLY_FIGURE_KEY};
    use serde_json::json;

    fn loader() -> TypeSerialization {
        TypeSerialization::new(TypeRepr::class("DataLoader", "torch.utils.data.dataloader"))
    }

    #[test]
    fn keys_match_class_reprs() {
        assert_eq!(loader().ty.strategy_key(), DATA_LOADER_KEY);
        assert_eq!(
            TypeRepr::class("Figure", "plotly.graph_objs._figure").strategy_key(),
            PLOTLY_FIGURE_KEY
        );
    }

    #[test]
    fn data_loader_table() {
        let summary = json!({
            "batch_size": 64,
            "num_workers": 2,
            "pin_memory": true,
            "timeout": 0,
            "dataset": {"repr": "MNIST\n    Number of datapoints: 60000"}
        });
        let out = Renderer::default().render(&loader(), &summary);
        let Element::Table { rows } = out else { panic!("expected table") };
        let keys: Vec<_> = rows.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, ["batch-size", "num_workers", "pin_memory", "timeout", "dataset"]);
        assert_eq!(rows[0].cells[1], Element::text("64"));
        assert_eq!(rows[2].cells[1], Element::chip("TRUE", Tone::Success));
        assert_eq!(rows[3].cells[1], Element::text("0 sec."));
        assert_eq!(
            rows[4].cells[1],
            Element::Preformatted {
                lines: vec!["MNIST".into(), "    Number of datapoints: 60000".into()]
            }
        );
    }

    #[test]
    fn data_loader_without_dataset_repr_marks_the_cell() {
        let out = Renderer::default().render(&loader(), &json!({"batch_size": 1}));
        let Element::Table { rows } = out else { panic!("expected table") };
        assert_eq!(
            rows[4].cells[1],
            Element::Error {
                code: "unexpected_summary".into(),
                message: "Unexpected value summary for DataLoader.dataset: expected a `repr` description"
                    .into(),
            }
        );
        assert_eq!(rows[2].cells[1], Element::chip("FALSE", Tone::Error));
    }

    #[test]
    fn plotly_figure_passes_through() {
        let bundle = TypeSerialization::new(TypeRepr::class("Figure", "plotly.graph_objs._figure"));
        let summary = json!({"figure": {"data": [{"type": "bar", "y": [1, 2]}], "layout": {"title": "t"}}});
        let out = Renderer::default().render(&bundle, &summary);
        assert_eq!(
            out,
            Element::Chart {
                data: json!([{"type": "bar", "y": [1, 2]}]),
                layout: json!({"title": "t"}),
                config: Value::Null,
            }
        );
    }

    #[test]
    fn plotly_without_figure_is_error() {
        let bundle = TypeSerialization::new(TypeRepr::class("Figure", "plotly.graph_objs._figure"));
        assert!(Renderer::default().render(&bundle, &json!({})).is_error());
    }
}
