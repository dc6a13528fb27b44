use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use log::warn;

use crate::job_manager::DEFAULT_WORKERS;

pub const DEFAULT_BASE_URL: &str = "https://www.jobs.ch/de/stellenangebote";
pub const DEFAULT_INPUT: &str = "jobcloud_interview_challenge.csv";
pub const DEFAULT_OUTPUT: &str = "jobinfo.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub workers: usize,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Defaults, overridden by any `JOBINFO_*` variables that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(url) = lookup("JOBINFO_BASE_URL") {
            config.base_url = url;
        }
        if let Some(input) = lookup("JOBINFO_INPUT") {
            config.input = PathBuf::from(input);
        }
        if let Some(output) = lookup("JOBINFO_OUTPUT") {
            config.output = PathBuf::from(output);
        }
        if let Some(workers) = parsed::<usize, _>(&lookup, "JOBINFO_WORKERS") {
            config.workers = workers.max(1);
        }
        if let Some(secs) = parsed::<u64, _>(&lookup, "JOBINFO_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }
}

fn parsed<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}
