use log::debug;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::record::{JobId, JobRecord};

/// The job posting's JSON-LD block. Only searched for inside the `<head>` span.
const LINKED_DATA_SELECTOR: &str = r#"script[id="linkeddata"]"#;

/// Pulls job attributes out of the structured-data block of a job detail page.
///
/// Holds no per-document state: every call to [`JobInfoExtractor::extract`] parses
/// its own document and returns a fresh record.
pub struct JobInfoExtractor {
    selector: Selector,
}

impl JobInfoExtractor {
    pub fn new() -> Self {
        JobInfoExtractor {
            selector: Selector::parse(LINKED_DATA_SELECTOR).expect("linked-data selector is valid"),
        }
    }

    /// Extracts a record for `jobid` from `html`.
    ///
    /// A page without the block yields a record with only `jobid` set. A block whose
    /// text is not a JSON object fails with [`ExtractError::MalformedPayload`].
    pub fn extract(&self, jobid: JobId, html: &str) -> Result<JobRecord, ExtractError> {
        let Some(head) = head_region(html) else {
            debug!("No <head> in page for job {}", jobid);
            return Ok(JobRecord::missing(jobid));
        };

        // Parsed on its own so body-only markup inside <head> cannot end the region early.
        let document = Html::parse_fragment(head);

        // Later blocks overwrite earlier ones.
        let Some(script) = document.select(&self.selector).last() else {
            debug!("No linked data block for job {}", jobid);
            return Ok(JobRecord::missing(jobid));
        };

        let payload: String = script.text().collect();
        if payload.trim().is_empty() {
            return Ok(JobRecord::missing(jobid));
        }

        let data = match serde_json::from_str::<Value>(&payload)? {
            Value::Object(data) => data,
            other => {
                return Err(ExtractError::MalformedPayload(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self::decode(jobid, &data))
    }

    fn decode(jobid: JobId, data: &Map<String, Value>) -> JobRecord {
        let mut record = JobRecord::missing(jobid);

        record.title = text_field(data, "title");

        // A bare string organisation carries no name we can trust.
        if let Some(Value::Object(org)) = data.get("hiringOrganization") {
            record.company = org.get("name").and_then(Value::as_str).map(one_line);
        }

        // Guarded by the lowercase key while the value lives under `jobLocation`.
        // Pages seen so far only carry `jobLocation`, so this is usually missing.
        if data.contains_key("joblocation") {
            record.joblocation = data
                .get("jobLocation")
                .and_then(|location| location.get("address"))
                .and_then(|address| address.get("addressLocality"))
                .and_then(Value::as_str)
                .map(one_line);
        }

        record.industry = text_field(data, "industry");

        record.employment_type = match data.get("employmentType") {
            Some(Value::Array(entries)) => Some(
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(one_line)
                    .collect(),
            ),
            Some(Value::String(single)) => Some(vec![one_line(single)]),
            Some(other) => {
                debug!("Ignoring employmentType of kind {}", json_kind(other));
                None
            }
            None => None,
        };

        record.category = text_field(data, "occupationalCategory");

        record
    }
}

impl Default for JobInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw text between the `<head>` open tag and `</head>`, running to the end of the
/// document when the head is never closed.
fn head_region(html: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets valid for `html`.
    let lower = html.to_ascii_lowercase();

    let mut from = 0;
    let open = loop {
        let at = lower[from..].find("<head")? + from;
        let after = at + "<head".len();
        match lower.as_bytes().get(after) {
            Some(b) if *b == b'>' || *b == b'/' || b.is_ascii_whitespace() => break after,
            // `<header>` and friends
            _ => from = after,
        }
    };

    let start = lower[open..].find('>')? + open + 1;
    let end = lower[start..].find("</head").map_or(html.len(), |i| start + i);
    Some(&html[start..end])
}

fn text_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(one_line(s)),
        other => {
            debug!("Ignoring {} of kind {}", key, json_kind(other));
            None
        }
    }
}

fn one_line(s: &str) -> String {
    s.replace('\n', " ")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
