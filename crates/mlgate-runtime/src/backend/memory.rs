//! In-memory logging backend.
//!
//! Holds log groups, streams and events in insertion order. Used by tests
//! and by the CLI when replaying a recorded fixture.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use mlgate_core::{LogEventDescriptor, LogStreamDescriptor};

use super::{BackendError, LogBackend};

/// A filter pattern for unstructured log text.
///
/// An empty pattern matches every event. Otherwise every term must occur in
/// the message, case-sensitively; a double-quoted phrase is one term. An
/// unterminated quote makes the rest of the pattern one phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPattern {
    terms: Vec<String>,
}

fn term_regex() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| Regex::new(r#""(?P<phrase>[^"]*)"?|(?P<word>[^\s"]+)"#).expect("Invalid regex"))
}

impl FilterPattern {
    pub fn parse(pattern: &str) -> Self {
        let terms = term_regex()
            .captures_iter(pattern)
            .filter_map(|caps| {
                caps.name("phrase")
                    .or_else(|| caps.name("word"))
                    .map(|m| m.as_str().to_string())
            })
            .filter(|term| !term.is_empty())
            .collect();

        Self { terms }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.terms.iter().all(|term| message.contains(term.as_str()))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// One stream in a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStream {
    pub name: String,

    #[serde(default)]
    pub events: Vec<String>,
}

/// Recorded log content: group name to ordered streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFixture {
    #[serde(default)]
    pub log_groups: BTreeMap<String, Vec<FixtureStream>>,
}

impl LogFixture {
    /// Read a fixture from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            BackendError::NotConfigured(format!(
                "Cannot read log fixture {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

#[derive(Debug, Clone)]
struct StoredEvent {
    sequence: u64,
    event: LogEventDescriptor,
}

#[derive(Debug, Clone)]
struct StoredStream {
    descriptor: LogStreamDescriptor,
    events: Vec<StoredEvent>,
}

/// Logging backend backed by process memory.
///
/// Filter results come back in insertion order across all streams of a
/// group, whatever the event timestamps say.
#[derive(Debug, Default)]
pub struct InMemoryLogBackend {
    groups: RwLock<BTreeMap<String, Vec<StoredStream>>>,
    next_sequence: AtomicU64,
}

impl InMemoryLogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend holding the fixture's content.
    pub fn from_fixture(fixture: &LogFixture) -> Self {
        let backend = Self::new();
        for (group, streams) in &fixture.log_groups {
            backend.create_log_group(group);
            for stream in streams {
                backend.put_log_events(group, &stream.name, stream.events.iter().cloned());
            }
        }
        backend
    }

    /// Create an empty log group. Existing groups are left untouched.
    pub fn create_log_group(&self, log_group: &str) {
        self.groups.write().entry(log_group.to_string()).or_default();
    }

    /// Append messages to a stream, creating the group and stream as needed.
    pub fn put_log_events<I, S>(&self, log_group: &str, log_stream: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.put_log_events_at(log_group, log_stream, Utc::now().timestamp_millis(), messages);
    }

    /// Append messages stamped with `timestamp` (epoch milliseconds).
    pub fn put_log_events_at<I, S>(
        &self,
        log_group: &str,
        log_stream: &str,
        timestamp: i64,
        messages: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups = self.groups.write();
        let streams = groups.entry(log_group.to_string()).or_default();

        let index = match streams
            .iter()
            .position(|s| s.descriptor.log_stream_name == log_stream)
        {
            Some(index) => index,
            None => {
                streams.push(StoredStream {
                    descriptor: LogStreamDescriptor {
                        log_stream_name: log_stream.to_string(),
                        creation_time: Some(timestamp),
                        last_event_timestamp: None,
                    },
                    events: Vec::new(),
                });
                streams.len() - 1
            }
        };

        let stream = &mut streams[index];
        for message in messages {
            stream.events.push(StoredEvent {
                sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
                event: LogEventDescriptor {
                    message: message.into(),
                    timestamp: Some(timestamp),
                    log_stream_name: Some(log_stream.to_string()),
                },
            });
            stream.descriptor.last_event_timestamp = Some(timestamp);
        }
    }

    /// Number of streams in a group, if the group exists.
    pub fn stream_count(&self, log_group: &str) -> Option<usize> {
        self.groups.read().get(log_group).map(Vec::len)
    }
}

#[async_trait]
impl LogBackend for InMemoryLogBackend {
    async fn describe_log_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStreamDescriptor>, BackendError> {
        let groups = self.groups.read();
        let streams = groups.get(log_group).ok_or_else(|| {
            BackendError::ResourceNotFound(format!("log group '{}' does not exist", log_group))
        })?;

        Ok(streams
            .iter()
            .filter(|s| s.descriptor.log_stream_name.starts_with(prefix))
            .map(|s| s.descriptor.clone())
            .collect())
    }

    async fn filter_log_events(
        &self,
        log_group: &str,
        log_stream_names: &[String],
        filter_pattern: &str,
    ) -> Result<Vec<LogEventDescriptor>, BackendError> {
        let pattern = FilterPattern::parse(filter_pattern);
        let groups = self.groups.read();
        let streams = groups.get(log_group).ok_or_else(|| {
            BackendError::ResourceNotFound(format!("log group '{}' does not exist", log_group))
        })?;

        let mut events: Vec<&StoredEvent> = streams
            .iter()
            .filter(|s| {
                log_stream_names.is_empty()
                    || log_stream_names.contains(&s.descriptor.log_stream_name)
            })
            .flat_map(|s| s.events.iter())
            .filter(|e| pattern.matches(&e.event.message))
            .collect();

        events.sort_by_key(|e| e.sequence);
        Ok(events.into_iter().map(|e| e.event.clone()).collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
