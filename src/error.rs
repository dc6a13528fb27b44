use thiserror::Error;

/// Failure to obtain a document from the remote host.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid base url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("structured-data block is not decodable: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::MalformedPayload(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read input {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid Excel input: {0}")]
    Excel(#[from] calamine::Error),

    #[error("input has no `{0}` column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}
