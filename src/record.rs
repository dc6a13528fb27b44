use serde::Serialize;
use std::fmt;

/// Column order of the output table.
pub const COLUMNS: [&str; 7] = [
    "jobid",
    "title",
    "company",
    "joblocation",
    "industry",
    "employmentType",
    "category",
];

/// Opaque key of one job posting, as it appears in the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        JobId::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        JobId(id)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        JobId(id.to_string())
    }
}

/// Metadata scraped for one job. Every field but `jobid` may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub jobid: JobId,
    pub title: Option<String>,
    pub company: Option<String>,
    pub joblocation: Option<String>,
    pub industry: Option<String>,
    pub employment_type: Option<Vec<String>>,
    pub category: Option<String>,
}

/// One output table row. Field order and names match `COLUMNS`.
#[derive(Debug, Serialize)]
pub struct JobRow<'a> {
    pub jobid: &'a str,
    pub title: Option<&'a str>,
    pub company: Option<&'a str>,
    pub joblocation: Option<&'a str>,
    pub industry: Option<&'a str>,
    #[serde(rename = "employmentType")]
    pub employment_type: Option<String>,
    pub category: Option<&'a str>,
}

impl JobRecord {
    /// A record that only knows its id.
    pub fn missing(jobid: JobId) -> Self {
        JobRecord {
            jobid,
            title: None,
            company: None,
            joblocation: None,
            industry: None,
            employment_type: None,
            category: None,
        }
    }

    /// True when nothing beyond the id could be recovered.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.joblocation.is_none()
            && self.industry.is_none()
            && self.employment_type.is_none()
            && self.category.is_none()
    }

    /// Borrowed row for the output table. `employmentType` is rendered as a JSON array.
    pub fn row(&self) -> JobRow<'_> {
        JobRow {
            jobid: self.jobid.as_str(),
            title: self.title.as_deref(),
            company: self.company.as_deref(),
            joblocation: self.joblocation.as_deref(),
            industry: self.industry.as_deref(),
            employment_type: self
                .employment_type
                .as_ref()
                .and_then(|types| serde_json::to_string(types).ok()),
            category: self.category.as_deref(),
        }
    }

    /// Cell values in `COLUMNS` order.
    pub fn values(&self) -> [Option<String>; 7] {
        let row = self.row();
        [
            Some(row.jobid.to_string()),
            row.title.map(str::to_string),
            row.company.map(str::to_string),
            row.joblocation.map(str::to_string),
            row.industry.map(str::to_string),
            row.employment_type,
            row.category.map(str::to_string),
        ]
    }
}
