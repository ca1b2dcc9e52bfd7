//! Logging and the per-cycle CSV record.
//!
//! Diagnostics go to stderr through `tracing`; stdout stays untouched. The
//! CSV interaction log is a data artifact, not a log stream: one row per
//! agent/environment cycle, written through [`CycleLog`] to the path the
//! driver was given.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Error;

/// Initialise the tracing subscriber. Safe to call more than once (later
/// calls are no-ops), which keeps tests that exercise the driver honest.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aixi_core=info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// One row of the interaction log.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    pub cycle: u64,
    pub observation: u64,
    pub reward: u64,
    pub action: u64,
    pub explored: bool,
    pub explore_rate: f64,
    pub total_reward: f64,
    pub average_reward: f64,
    pub cycle_time_seconds: f64,
    /// Context tree node count.
    pub model_size: usize,
}

/// Writer for the comma-separated interaction log.
#[derive(Debug)]
pub struct CycleLog {
    writer: BufWriter<File>,
}

impl CycleLog {
    /// Create the log file and write the header row.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        let mut log = Self {
            writer: BufWriter::new(file),
        };
        log.write_header()
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(log)
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(
            self.writer,
            "cycle,observation,reward,action,explored,explore_rate,\
             total_reward,average_reward,cycle_time_seconds,model_size"
        )
    }

    pub fn record(&mut self, row: &CycleRecord) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{}",
            row.cycle,
            row.observation,
            row.reward,
            row.action,
            u8::from(row.explored),
            row.explore_rate,
            row.total_reward,
            row.average_reward,
            row.cycle_time_seconds,
            row.model_size
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
