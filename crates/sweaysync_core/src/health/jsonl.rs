//! JSON-lines health sink backed by one worker thread.
//!
//! # Invariants
//! - Summaries are appended in submission order, one JSON object per line.
//! - `record_workout` never blocks on file I/O.
//! - Dropping the sink lets the worker drain queued jobs and exit.

use super::{HealthSink, SinkCallback, SinkError, SinkResult, WorkoutSummary};
use log::{error, info};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

struct Job {
    summary: WorkoutSummary,
    on_complete: SinkCallback,
}

/// Appends workout summaries to a local export file.
pub struct JsonlHealthSink {
    path: PathBuf,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl JsonlHealthSink {
    /// Starts the worker. The file is created lazily on the first write.
    ///
    /// # Errors
    /// - Returns `SinkError::Io` when the worker thread cannot be spawned.
    pub fn spawn(path: impl AsRef<Path>) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker_path = path.clone();

        let worker = thread::Builder::new()
            .name("sweaysync-health-sink".to_string())
            .spawn(move || {
                let mut file: Option<File> = None;
                for job in receiver {
                    let outcome = append_summary(&worker_path, &mut file, &job.summary);
                    (job.on_complete)(outcome);
                }
            })?;

        info!("event=health_sink_start module=health status=ok kind=jsonl");
        Ok(Self {
            path,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HealthSink for JsonlHealthSink {
    fn record_workout(&self, summary: WorkoutSummary, on_complete: SinkCallback) {
        let job = Job {
            summary,
            on_complete,
        };

        let rejected = match self.sender.as_ref() {
            Some(sender) => sender.send(job).err().map(|err| err.0),
            None => Some(job),
        };

        if let Some(job) = rejected {
            (job.on_complete)(Err(SinkError::Closed));
        }
    }
}

impl Drop for JsonlHealthSink {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue drains.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=health_sink_stop module=health status=error error_code=worker_panicked");
            }
        }
    }
}

fn append_summary(
    path: &Path,
    file: &mut Option<File>,
    summary: &WorkoutSummary,
) -> SinkResult<()> {
    let mut line = serde_json::to_vec(summary)?;
    line.push(b'\n');

    if file.is_none() {
        *file = Some(OpenOptions::new().create(true).append(true).open(path)?);
    }
    match file.as_mut() {
        Some(handle) => {
            handle.write_all(&line)?;
            handle.flush()?;
            Ok(())
        }
        None => Err(SinkError::Closed),
    }
}

#[cfg(test)]
mod tests {
    use super::JsonlHealthSink;
    use crate::health::{HealthSink, SinkError, WorkoutSummary};
    use chrono::{TimeZone, Utc};
    use std::sync::mpsc;

    #[test]
    fn summaries_are_appended_as_json_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.jsonl");
        let (tx, rx) = mpsc::channel();

        {
            let sink = JsonlHealthSink::spawn(&path).unwrap();
            assert_eq!(sink.path(), path.as_path());
            for hour in [8, 9] {
                let tx = tx.clone();
                let start = Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap();
                sink.record_workout(
                    WorkoutSummary::placeholder(start),
                    Box::new(move |outcome| tx.send(outcome.is_ok()).unwrap()),
                );
            }
        }

        assert!(rx.recv().unwrap());
        assert!(rx.recv().unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let summaries: Vec<WorkoutSummary> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].start < summaries[1].start);
        assert_eq!(summaries[0].duration_seconds, 300);
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("health.jsonl");
        let (tx, rx) = mpsc::channel();

        let sink = JsonlHealthSink::spawn(&path).unwrap();
        sink.record_workout(
            WorkoutSummary::placeholder(Utc::now()),
            Box::new(move |outcome| {
                tx.send(matches!(outcome, Err(SinkError::Io(_)))).unwrap();
            }),
        );

        assert!(rx.recv().unwrap());
    }
}
