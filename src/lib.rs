pub mod record;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod job_manager;
pub mod input_loader;
pub mod output_writer;
pub mod config;
pub mod logger;

// Exporting types for convenience
pub use record::{JobId, JobRecord, COLUMNS};
pub use error::{ExtractError, FetchError, InputError, OutputError};
pub use extractor::JobInfoExtractor;
pub use fetcher::{Fetcher, HttpFetcher};
pub use job_manager::{BatchReport, FailureKind, JobManager, TaskFailure};
pub use config::Config;
