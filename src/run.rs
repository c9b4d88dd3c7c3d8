//! Run metadata and the function-run summary shown above a run's values.
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::element::{Element, Tone};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub name: String,
    pub function_path: String,
    pub future_state: FutureState,
    #[serde(default)]
    pub original_run_id: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FutureState {
    Created,
    Retrying,
    Scheduled,
    Ran,
    Resolved,
    Failed,
    NestedFailed,
    Canceled,
    #[serde(other)]
    Unknown,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl FutureState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed | Self::NestedFailed | Self::Canceled)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Retrying => "Retrying",
            Self::Scheduled => "Scheduled",
            Self::Ran => "Running",
            Self::Resolved => "Completed",
            Self::Failed => "Failed",
            Self::NestedFailed => "Nested run failed",
            Self::Canceled => "Canceled",
            Self::Unknown => "Unknown state",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Resolved => Tone::Success,
            Self::Failed | Self::NestedFailed => Tone::Error,
            Self::Canceled | Self::Retrying => Tone::Warning,
            Self::Scheduled | Self::Ran => Tone::Info,
            Self::Created | Self::Unknown => Tone::Neutral,
        }
    }
}

impl Run {
    /// Resolved from a previous run's output rather than executed.
    pub fn is_cached(&self) -> bool {
        self.future_state == FutureState::Resolved && self.original_run_id.is_some()
    }

    pub fn state_label(&self) -> &'static str {
        if self.is_cached() { "Cached" } else { self.future_state.label() }
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at.or(self.failed_at).or(self.ended_at)
    }

    /// `Completed in 1m 5s on 2024-03-01T10:00:05Z`, or just the state label
    /// while the run is still going.
    pub fn status_text(&self) -> String {
        let Some(completed_at) = self.completed_at() else {
            return self.state_label().to_owned();
        };
        let elapsed = format_duration(completed_at - self.created_at);
        let state = if self.is_cached() {
            "Cached".to_owned()
        } else {
            match self.future_state {
                FutureState::Resolved => format!("Completed in {elapsed}"),
                FutureState::Failed | FutureState::NestedFailed => format!("Failed after {elapsed}"),
                FutureState::Canceled => format!("Canceled after {elapsed}"),
                other => format!("{} after {elapsed}", other.label()),
            }
        };
        format!("{state} on {}", completed_at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// `1h 2m 3s`, dropping leading zero units. Negative spans clamp to `0s`.
pub fn format_duration(span: TimeDelta) -> String {
    let total = span.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m {seconds}s"),
        _ => format!("{hours}h {minutes}m {seconds}s"),
    }
}

/// Headline, state chip and name, id and status, import path, tags.
pub fn function_section(run: &Run) -> Element {
    let mut blocks = vec![
        Element::block(vec![Element::bold("Function Run")]),
        Element::block(vec![
            Element::chip(run.state_label(), run.future_state.tone()),
            Element::text(" "),
            Element::bold(run.name.clone()),
        ]),
        Element::block(vec![
            Element::code_text(run.id.clone()),
            Element::text(" "),
            Element::text(run.status_text()),
        ]),
        Element::block(vec![Element::code_text(run.function_path.clone())]),
    ];
    if !run.tags.is_empty() {
        let tags = run
            .tags
            .iter()
            .map(|tag| Element::chip(tag.clone(), Tone::Neutral))
            .collect();
        blocks.push(Element::block(tags));
    }
    Element::block(blocks)
}

// ------------------------------- Helpers --------------------------------- //

/// RFC 3339, or a naive ISO timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp {raw:?}: {err}"))
}

fn timestamp<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(de)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn optional_timestamp<'de, D: Deserializer<'de>>(de: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(de)? {
        Some(raw) => parse_timestamp(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
