//! Mean end-to-end runtime per worker count.

use crate::Result;
use crate::load::Dataset;
use anyhow::bail;
use serde::Serialize;
use std::collections::BTreeMap;

/// One output row: mean elapsed seconds across all runs at this worker count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRuntime {
    pub nlambdas: u64,
    pub time: f64,
}

/// Compute mean end-to-end runtime grouped by `nlambdas`, ascending.
///
/// A run is one `(nlambdas, nrun)` pair. Its start is the earliest
/// `host_submit_tstamp` over every record of the run; its end is the latest
/// `host_result_done_tstamp` over the run's reducer records, or over all of
/// its records when the dataset contains no reducer at all.
pub fn mean_runtime_per_nlambdas(dataset: &Dataset) -> Result<Vec<MeanRuntime>> {
    let mut starts: BTreeMap<(u64, usize), f64> = BTreeMap::new();
    for rec in dataset {
        let start = starts.entry((rec.nlambdas, rec.nrun)).or_insert(f64::INFINITY);
        *start = start.min(rec.stats.host_submit_tstamp);
    }

    let has_reducers = dataset.iter().any(|r| !r.is_worker);
    let mut ends: BTreeMap<(u64, usize), f64> = BTreeMap::new();
    for rec in dataset.iter().filter(|r| !has_reducers || !r.is_worker) {
        let end = ends
            .entry((rec.nlambdas, rec.nrun))
            .or_insert(f64::NEG_INFINITY);
        *end = end.max(rec.stats.host_result_done_tstamp);
    }

    // Join start and end per run on the (nlambdas, nrun) key, then average
    // the elapsed times per worker count.
    let mut sums: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for ((nlambdas, nrun), start) in &starts {
        let end = match ends.get(&(*nlambdas, *nrun)) {
            Some(end) => end,
            None => bail!(
                "run {}/{} has no completion record (workers without a reducer)",
                nlambdas,
                nrun
            ),
        };
        let (sum, count) = sums.entry(*nlambdas).or_insert((0.0, 0));
        *sum += end - start;
        *count += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(nlambdas, (sum, count))| MeanRuntime {
            nlambdas,
            time: sum / count as f64,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::TaggedRecord;
    use crate::schema::StatsRecord;
    use pretty_assertions::assert_eq;

    fn rec(nlambdas: u64, nrun: usize, is_worker: bool, submit: f64, done: f64) -> TaggedRecord {
        TaggedRecord {
            nlambdas,
            nrun,
            is_worker,
            stats: StatsRecord {
                host_submit_tstamp: submit,
                host_result_done_tstamp: done,
                host_job_create_tstamp: None,
                host_status_done_tstamp: None,
                worker_start_tstamp: None,
                worker_end_tstamp: None,
                worker_exec_time: None,
                worker_func_exec_time: None,
                worker_cold_start: None,
            },
        }
    }

    fn row(nlambdas: u64, time: f64) -> MeanRuntime {
        MeanRuntime { nlambdas, time }
    }

    #[test]
    fn one_run_per_worker_count() {
        let ds = vec![rec(3, 0, true, 0.0, 10.0), rec(5, 0, true, 0.0, 10.0)];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(3, 10.0), row(5, 10.0)]);
    }

    #[test]
    fn start_is_min_submit_across_the_whole_run() {
        // Reducer submits later but finishes the run; elapsed spans from the
        // earliest worker submission.
        let ds = vec![rec(2, 0, true, 0.0, 5.0), rec(2, 0, false, 1.0, 20.0)];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(2, 20.0)]);
    }

    #[test]
    fn reducer_end_wins_over_worker_end() {
        // A worker reporting a later done timestamp than the reducer is
        // ignored for the end time once any reducer exists.
        let ds = vec![rec(2, 0, true, 0.0, 30.0), rec(2, 0, false, 0.0, 20.0)];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(2, 20.0)]);
    }

    #[test]
    fn averages_across_runs_of_one_worker_count() {
        let ds = vec![rec(4, 0, true, 0.0, 10.0), rec(4, 1, true, 0.0, 20.0)];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(4, 15.0)]);
    }

    #[test]
    fn output_is_sorted_ascending_without_duplicates() {
        let ds = vec![
            rec(8, 0, true, 0.0, 1.0),
            rec(2, 0, true, 0.0, 1.0),
            rec(2, 1, true, 0.0, 3.0),
        ];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(2, 2.0), row(8, 1.0)]);
    }

    #[test]
    fn falls_back_to_all_records_when_no_reducer_exists() {
        let ds = vec![rec(2, 0, true, 0.0, 7.0), rec(2, 0, true, 1.0, 9.0)];

        let rows = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(rows, vec![row(2, 9.0)]);
    }

    #[test]
    fn run_without_a_reducer_errors_when_others_have_one() {
        let ds = vec![rec(2, 0, false, 0.0, 5.0), rec(2, 1, true, 0.0, 5.0)];

        let err = mean_runtime_per_nlambdas(&ds).unwrap_err();
        assert!(err.to_string().contains("run 2/1"));
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        let rows = mean_runtime_per_nlambdas(&Vec::new()).unwrap();
        assert_eq!(rows, Vec::new());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let ds = vec![rec(3, 0, true, 0.0, 4.0), rec(3, 0, false, 1.0, 6.0)];

        let first = mean_runtime_per_nlambdas(&ds).unwrap();
        let second = mean_runtime_per_nlambdas(&ds).unwrap();

        assert_eq!(first, second);
    }
}
