//! CLI: load artifacts or runs → render → text | ansi | html | json
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::element::Element;
use crate::error::LoadError;
use crate::output::{to_html, to_text, Style};
use crate::render::{RenderOptions, Renderer, DEFAULT_MAX_ALIAS_HOPS, DEFAULT_MAX_DEPTH};
use crate::repr::{Artifact, TypeSerialization};
use crate::run::{function_section, Run};
use crate::strategy::StrategyTable;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// render pipeline run artifacts (typed value summaries) and run metadata
#[derive(Parser, Debug)]
#[command(name = "runlens", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// log dispatch decisions at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render artifact values (`type_serialization` + `json_summary`)
    Value(RenderOut),
    /// render only the declared type of each artifact or bare type bundle
    Type(RenderOut),
    /// render the function-run section of run metadata documents
    Run(RunOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/artifact)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone, Copy)]
struct LimitSettings {
    /// deepest nesting rendered before an error element is shown instead
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// longest type alias chain followed for one value
    #[arg(long, default_value_t = DEFAULT_MAX_ALIAS_HOPS)]
    max_alias_hops: usize,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Ansi,
    Html,
    Json,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    limits: LimitSettings,

    #[command(flatten)]
    output: OutputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct RunOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output: OutputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One JSON document after pointer/jq selection, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub origin: String,
    pub value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>, LoadError> {
        let mut documents = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let origin = source_path.to_string_lossy().to_string();
            let source = read_source(&source_path)?;
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let origin = format!("{origin}:{}", line_no + 1);
                    let value = parse_json(line, &origin)?;
                    documents.extend(self.select(value, &origin)?);
                }
            } else {
                let value = parse_json(&source, &origin)?;
                documents.extend(self.select(value, &origin)?);
            }
        }
        debug!(count = documents.len(), "loaded documents");
        Ok(documents)
    }

    /// Applies `--json-pointer`, then `--jq-expr`.
    fn select(&self, value: Value, origin: &str) -> Result<Vec<Document>, LoadError> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value.pointer(pointer).cloned().ok_or_else(|| LoadError::PointerMiss {
                origin: origin.to_owned(),
                pointer: pointer.to_owned(),
            })?,
        };
        let values = match self.jq_expr.as_deref() {
            None => vec![value],
            Some(jq_expr) => crate::jq_exec::apply_filter(jq_expr, &value).map_err(|error| {
                LoadError::Jq { origin: origin.to_owned(), detail: format!("{error:#}") }
            })?,
        };
        Ok(values
            .into_iter()
            .map(|value| Document { origin: origin.to_owned(), value })
            .collect())
    }
}

impl LimitSettings {
    fn options(&self) -> RenderOptions {
        RenderOptions { max_depth: self.max_depth, max_alias_hops: self.max_alias_hops }
    }
}

impl OutputSettings {
    fn emit(&self, elements: &[Element]) -> Result<()> {
        let rendered = match self.format {
            Format::Text => join_text(elements, Style::Plain),
            Format::Ansi => {
                colored::control::set_override(true);
                join_text(elements, Style::Ansi)
            }
            Format::Html => elements.iter().map(to_html).collect::<Vec<_>>().join("\n"),
            Format::Json => match elements {
                [single] => serde_json::to_string_pretty(single)?,
                many => serde_json::to_string_pretty(many)?,
            },
        };
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                std::fs::write(out, &rendered).with_context(|| format!("writing {}", out.display()))?;
                info!(path = %out.display(), "wrote output");
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let default = if self.verbose { "runlens=debug" } else { "runlens=warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Value(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let documents = target.input_settings.load()?;
                let renderer = Renderer::new(StrategyTable::builtin()).with_options(target.limits.options());
                let elements = documents
                    .par_iter()
                    .map(|doc| {
                        let artifact: Artifact = decode(doc)?;
                        Ok(renderer.render(&artifact.type_serialization, &artifact.json_summary))
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                target.output.emit(&elements)
            }
            Command::Type(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let documents = target.input_settings.load()?;
                let renderer = Renderer::new(StrategyTable::builtin()).with_options(target.limits.options());
                let elements = documents
                    .iter()
                    .map(|doc| {
                        // artifacts carry the bundle one level down
                        let bundle: TypeSerialization = match doc.value.get("type_serialization") {
                            Some(inner) => decode(&Document { origin: doc.origin.clone(), value: inner.clone() })?,
                            None => decode(doc)?,
                        };
                        Ok(renderer.render_type(&bundle.ty))
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                target.output.emit(&elements)
            }
            Command::Run(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let documents = target.input_settings.load()?;
                let elements = documents
                    .iter()
                    .map(|doc| decode::<Run>(doc).map(|run| function_section(&run)))
                    .collect::<Result<Vec<_>, LoadError>>()?;
                target.output.emit(&elements)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn decode<T: DeserializeOwned>(doc: &Document) -> Result<T, LoadError> {
    crate::path_de::from_value_with_path(&doc.value)
        .map_err(|detail| LoadError::Parse { origin: doc.origin.clone(), detail })
}

fn parse_json(source: &str, origin: &str) -> Result<Value, LoadError> {
    crate::path_de::from_str_with_path(source)
        .map_err(|detail| LoadError::Parse { origin: origin.to_owned(), detail })
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    let read_error = |source| LoadError::Read { path: path.to_path_buf(), source };
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source).map_err(read_error)?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(read_error)
}

fn join_text(elements: &[Element], style: Style) -> String {
    elements
        .iter()
        .map(|element| to_text(element, style))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern)? {
                out.push(entry?);
            }
            if out.len() == before {
                // explicit glob that matched nothing
                return Err(LoadError::NoMatches(pattern.to_owned()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(pointer: Option<&str>, jq: Option<&str>) -> InputSettings {
        InputSettings {
            ndjson: false,
            json_pointer: pointer.map(str::to_owned),
            jq_expr: jq.map(str::to_owned),
            input: vec![],
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn parses_value_subcommand() {
        let cli = CommandLineInterface::try_parse_from([
            "runlens", "value", "-i", "a.json", "--format", "html", "--max-depth", "8",
        ])
        .unwrap();
        let Command::Value(target) = cli.cmd else { panic!("expected value") };
        assert_eq!(target.output.format, Format::Html);
        assert_eq!(target.limits.options().max_depth, 8);
        assert_eq!(target.limits.options().max_alias_hops, DEFAULT_MAX_ALIAS_HOPS);
    }

    #[test]
    fn pointer_selects_subnode() {
        let docs = settings(Some("/data/artifact"), None)
            .select(json!({"data": {"artifact": {"x": 1}}}), "mem")
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].value, json!({"x": 1}));
    }

    #[test]
    fn pointer_miss_is_reported() {
        let err = settings(Some("/nope"), None).select(json!({}), "mem").unwrap_err();
        assert!(matches!(err, LoadError::PointerMiss { .. }));
    }

    #[test]
    fn jq_can_fan_out() {
        let docs = settings(None, Some(".[]")).select(json!([1, 2, 3]), "mem").unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["a.json", "-"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("-")]);
    }

    #[test]
    fn decode_reports_path() {
        let doc = Document { origin: "mem".into(), value: json!({"type_serialization": {}}) };
        let err = decode::<Artifact>(&doc).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse mem: at JSON path"), "{err}");
    }
}
