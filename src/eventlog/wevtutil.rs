//! Event source backed by `wevtutil qe`.
//!
//! Each lookup asks for the single newest record with the given event id as
//! rendered XML. The `System/EventID`, `System/TimeCreated` and
//! `RenderingInfo/Message` elements are named the same on every display
//! language, unlike the labels of the text format.

use std::borrow::Cow;
use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tokio::process::Command;

use crate::domain::{EventRecord, RegistrationEventKind};
use crate::error::{JoinWatchError, Result};
use crate::eventlog::traits::EventSource;

/// Fields pulled from one rendered event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub event_id: u32,
    pub date: Option<String>,
    pub description: String,
}

pub struct WevtutilEventSource {
    channel: String,
}

impl WevtutilEventSource {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Arguments for a newest-first, single-record query
    pub fn query_args(&self, event_id: u32) -> Vec<String> {
        vec![
            "qe".to_string(),
            self.channel.clone(),
            format!("/q:*[System[(EventID={})]]", event_id),
            "/c:1".to_string(),
            "/rd:true".to_string(),
            "/f:RenderedXml".to_string(),
        ]
    }
}

#[async_trait]
impl EventSource for WevtutilEventSource {
    async fn latest(&self, kind: RegistrationEventKind) -> Result<Option<EventRecord>> {
        let output = Command::new("wevtutil")
            .args(self.query_args(kind.event_id()))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| JoinWatchError::EventLog(format!("wevtutil could not run: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JoinWatchError::EventLog(format!(
                "wevtutil exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(parsed) = parse_rendered_xml(&stdout)? else {
            debug!("No {} record in {}", kind, self.channel);
            return Ok(None);
        };

        if RegistrationEventKind::from_event_id(parsed.event_id) != Some(kind) {
            debug!("Ignoring event {} returned for {}", parsed.event_id, kind);
            return Ok(None);
        }

        let mut record = EventRecord::new(kind, parsed.description);
        if let Some(date) = parsed.date {
            record = record.with_time(date);
        }
        Ok(Some(record))
    }
}

/// Parse the first `<Event>` of `wevtutil qe /f:RenderedXml` output.
///
/// Empty output means no matching record. An event without an `EventID`
/// is skipped the same way.
pub fn parse_rendered_xml(output: &str) -> Result<Option<ParsedEvent>> {
    let mut reader = Reader::from_str(output);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut event_id = None;
    let mut date = None;
    let mut description = String::new();

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        match event {
            Event::Start(start) => {
                let name = element_name(&start);
                if name == "TimeCreated" {
                    date = system_time(&start)?.or(date);
                }
                path.push(name);
            }
            Event::Empty(empty) => {
                if element_name(&empty) == "TimeCreated" {
                    date = system_time(&empty)?.or(date);
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                if path_ends_with(&path, &["System", "EventID"]) {
                    event_id = text.trim().parse::<u32>().ok();
                } else if path_ends_with(&path, &["RenderingInfo", "Message"]) {
                    description.push_str(text.trim());
                }
            }
            Event::End(_) => {
                path.pop();
                // Only the first event counts
                if path.is_empty() {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(event_id.map(|event_id| ParsedEvent {
        event_id,
        date,
        description,
    }))
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn system_time(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == b"SystemTime" {
            let value: Cow<'_, str> = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn path_ends_with(path: &[String], tail: &[&str]) -> bool {
    path.len() >= tail.len()
        && path[path.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(name, expected)| name.as_str() == *expected)
}

fn xml_error(e: impl fmt::Display) -> JoinWatchError {
    JoinWatchError::EventLog(format!("Malformed event XML: {}", e))
}
