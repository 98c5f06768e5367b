//! Fixed schema for one stats record, as dumped by the job runner.
//!
//! One JSONL line per invocation:
//! {
//!   "host_submit_tstamp": 1716912000.113,      // required
//!   "host_result_done_tstamp": 1716912014.902, // required
//!   "host_job_create_tstamp": 1716911999.871,
//!   "host_status_done_tstamp": 1716912013.544,
//!   "worker_start_tstamp": 1716912001.002,
//!   "worker_end_tstamp": 1716912012.310,
//!   "worker_exec_time": 11.308,
//!   "worker_func_exec_time": 10.871,
//!   "worker_cold_start": true
//! }
//!
//! The schema is closed: a line carrying a key outside this set fails to
//! deserialize, as does a line missing either required host timestamp.

use serde::Deserialize;

/// One parsed line from an `output-*.jsonl` dump.
///
/// Timestamps are epoch seconds. The two host timestamps bracket the whole
/// invocation as seen from the submitting host and are the only fields the
/// runtime aggregation reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsRecord {
    pub host_submit_tstamp: f64,
    pub host_result_done_tstamp: f64,

    #[serde(default)]
    pub host_job_create_tstamp: Option<f64>,

    #[serde(default)]
    pub host_status_done_tstamp: Option<f64>,

    #[serde(default)]
    pub worker_start_tstamp: Option<f64>,

    #[serde(default)]
    pub worker_end_tstamp: Option<f64>,

    #[serde(default)]
    pub worker_exec_time: Option<f64>,

    #[serde(default)]
    pub worker_func_exec_time: Option<f64>,

    #[serde(default)]
    pub worker_cold_start: Option<bool>,
}
