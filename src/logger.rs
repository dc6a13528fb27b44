use log::LevelFilter;
use env_logger::{Builder, Env};
use std::io::Write;
use chrono::Local;

/// Sets up collector logging: `Info` by default, `RUST_LOG` overrides it.
///
/// Lines carry the emitting module without the crate prefix, so per-job
/// `debug` output from the worker pool reads as `job_manager` or `fetcher`.
pub fn init() {
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .map(|path| path.trim_start_matches("jobinfo_collector_lib::"))
                .unwrap_or("main");
            writeln!(buf,
                "{} [{:<5}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                module,
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env(Env::default())
        .init();

    log::debug!("Logger initialized.");
}
