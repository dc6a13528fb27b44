use jobinfo_collector_lib::{config::Config, input_loader, logger, output_writer};
use jobinfo_collector_lib::{HttpFetcher, JobManager};

use std::error::Error;
use log::{error, info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting job info collector...");

    let config = Config::from_env();

    // 1. Load the job ids of the click dataset
    let jobids = match input_loader::load_job_ids(&config.input) {
        Ok(ids) => ids,
        Err(e) => {
            error!("Could not load job ids from {:?}: {}", config.input, e);
            return Err(e.into());
        }
    };
    if jobids.is_empty() {
        warn!("No job ids found in {:?}. Nothing to collect.", config.input);
        return Ok(());
    }

    // 2. Fetch + extract on the worker pool
    let fetcher = HttpFetcher::new(&config.base_url, config.timeout)?;
    let manager = JobManager::new(fetcher, config.workers);
    let report = manager.collect(&jobids);

    if !report.failures.is_empty() {
        warn!(
            "{} of {} jobs could not be enriched and keep only their id",
            report.failures.len(),
            report.records.len()
        );
    }

    // 3. Persist the whole table at once
    output_writer::write_records(&config.output, &report.records)?;

    info!("took {:.3}s", report.elapsed.as_secs_f64());
    Ok(())
}
