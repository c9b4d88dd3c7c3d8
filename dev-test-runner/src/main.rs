//! Golden-output runner: renders every fixture and compares the plain-text
//! output against the fixture's `expected` field.
//!
//! usage: dev-test-runner [FIXTURE_GLOB]   (default: fixtures/*.json)
use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use serde::Deserialize;

use runlens::output::{to_text, Style};
use runlens::{Artifact, Renderer};

#[derive(Debug, Deserialize)]
struct Fixture {
    artifact: Artifact,
    expected: String,
}

enum Outcome {
    Pass,
    Fail { actual: String, expected: String },
    Broken(String),
}

fn check(path: &Path) -> Outcome {
    let source = match std::fs::read(path) {
        Ok(x) => x,
        Err(error) => return Outcome::Broken(format!("failed to read: {error}")),
    };
    let fixture = match runlens::path_de::from_slice_with_path::<Fixture>(&source) {
        Ok(x) => x,
        Err(error) => return Outcome::Broken(error),
    };
    let element = Renderer::default().render(
        &fixture.artifact.type_serialization,
        &fixture.artifact.json_summary,
    );
    let actual = to_text(&element, Style::Plain);
    if actual == fixture.expected {
        Outcome::Pass
    } else {
        Outcome::Fail { actual, expected: fixture.expected }
    }
}

fn main() -> ExitCode {
    let pattern = std::env::args().nth(1).unwrap_or_else(|| "fixtures/*.json".to_owned());
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(error) => {
            eprintln!("invalid pattern {pattern}: {error}");
            return ExitCode::FAILURE;
        }
    };
    if paths.is_empty() {
        eprintln!("no fixtures match {pattern}");
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;
    for path in &paths {
        let name = path.display();
        match check(path) {
            Outcome::Pass => eprintln!("{} {name}", "pass".green()),
            Outcome::Fail { actual, expected } => {
                failures += 1;
                eprintln!("{} {name}", "FAIL".red().bold());
                eprintln!("  expected:\n{}", indent(&expected));
                eprintln!("  actual:\n{}", indent(&actual));
            }
            Outcome::Broken(reason) => {
                failures += 1;
                eprintln!("{} {name}: {reason}", "BROKEN".yellow().bold());
            }
        }
    }

    eprintln!("{} fixtures, {} failed", paths.len(), failures);
    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n")
}
