//! Background worker: serialized job execution with a UI-facing
//! event stream.
//!
//! One worker thread processes at most one job at a time; submitting
//! while a job is in flight is refused rather than queued, mirroring
//! the transcoder's and buffers' single-job design. Events flow one way
//! (worker → presentation layer) and are pure notifications - the
//! pipeline never blocks on a slow consumer.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::config::Settings;
use crate::logging::GuiLogCallback;
use crate::models::JobSpec;
use crate::orchestrator::{
    CancelHandle, ErrorKind, JobProcessor, ProgressCallback,
};

/// Event stream from the worker to the presentation layer.
///
/// Progress events may be duplicated or coalesced; only the terminal
/// `Finished`/`Failed` event is load-bearing, and exactly one is sent
/// per job.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Job processing began.
    Started { job_id: String },
    /// A stage boundary was reached.
    Progress {
        job_id: String,
        stage: String,
        fraction: f32,
        message: String,
    },
    /// A per-job log line.
    Log { job_id: String, line: String },
    /// The job succeeded; the output file is in place.
    Finished { job_id: String, output: PathBuf },
    /// The job failed or was cancelled; no output file was created.
    Failed {
        job_id: String,
        kind: ErrorKind,
        message: String,
    },
}

impl WorkerEvent {
    /// Whether this is a terminal event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerEvent::Finished { .. } | WorkerEvent::Failed { .. })
    }

    /// The job this event belongs to.
    pub fn job_id(&self) -> &str {
        match self {
            WorkerEvent::Started { job_id }
            | WorkerEvent::Progress { job_id, .. }
            | WorkerEvent::Log { job_id, .. }
            | WorkerEvent::Finished { job_id, .. }
            | WorkerEvent::Failed { job_id, .. } => job_id,
        }
    }
}

/// Errors from submitting a job.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// A job is already being processed; try again after its terminal event.
    #[error("a job is already being processed")]
    Busy,

    /// The worker thread has shut down.
    #[error("the worker has shut down")]
    Disconnected,
}

/// Handle to a submitted job.
pub struct JobTicket {
    /// Identifier carried by all of the job's events.
    pub job_id: String,
    cancel: CancelHandle,
}

impl JobTicket {
    /// Request cooperative cancellation at the next stage boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

enum Command {
    Run {
        job_id: String,
        spec: JobSpec,
        cancel: CancelHandle,
    },
    Shutdown,
}

/// Handle to the background worker thread.
pub struct Worker {
    commands: Sender<Command>,
    pending: Arc<AtomicUsize>,
    next_seq: AtomicU64,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the worker thread.
    ///
    /// Returns the worker handle and the receiving end of its event
    /// stream.
    pub fn spawn(
        settings: Settings,
        log_dir: PathBuf,
        temp_root: PathBuf,
    ) -> io::Result<(Self, Receiver<WorkerEvent>)> {
        let (commands, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let pending_in_thread = Arc::clone(&pending);
        let thread = thread::Builder::new()
            .name("psh-worker".to_string())
            .spawn(move || {
                let processor = JobProcessor::new(settings, log_dir, temp_root);
                worker_loop(processor, command_rx, event_tx, pending_in_thread);
            })?;

        Ok((
            Self {
                commands,
                pending,
                next_seq: AtomicU64::new(0),
                thread: Some(thread),
            },
            event_rx,
        ))
    }

    /// Submit a job for processing.
    ///
    /// Refuses with `SubmitError::Busy` while another job is in flight;
    /// jobs are strictly serialized, never run concurrently.
    pub fn submit(&self, spec: JobSpec) -> Result<JobTicket, SubmitError> {
        if self
            .pending
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let job_id = format!("{}-{:03}", spec.job_name(), seq);
        let cancel = CancelHandle::new();

        let command = Command::Run {
            job_id: job_id.clone(),
            spec,
            cancel: cancel.clone(),
        };
        if self.commands.send(command).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(SubmitError::Disconnected);
        }

        Ok(JobTicket { job_id, cancel })
    }

    /// Whether a job is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Shut the worker down, waiting for the thread to exit.
    pub fn shutdown(self) {
        // Drop runs the shutdown sequence
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    processor: JobProcessor,
    commands: Receiver<Command>,
    events: Sender<WorkerEvent>,
    pending: Arc<AtomicUsize>,
) {
    while let Ok(command) = commands.recv() {
        let Command::Run {
            job_id,
            spec,
            cancel,
        } = command
        else {
            break;
        };

        tracing::info!(job_id = %job_id, "worker picked up job");
        let _ = events.send(WorkerEvent::Started {
            job_id: job_id.clone(),
        });

        let log_events = events.clone();
        let log_job_id = job_id.clone();
        let gui_callback: GuiLogCallback = Box::new(move |line| {
            let _ = log_events.send(WorkerEvent::Log {
                job_id: log_job_id.clone(),
                line: line.to_string(),
            });
        });

        let progress_events = events.clone();
        let progress_job_id = job_id.clone();
        let progress_callback: ProgressCallback = Box::new(move |stage, percent, message| {
            let _ = progress_events.send(WorkerEvent::Progress {
                job_id: progress_job_id.clone(),
                stage: stage.to_string(),
                fraction: percent as f32 / 100.0,
                message: message.to_string(),
            });
        });

        let output_fallback = spec.output.clone();
        let result = processor.process_job(
            &job_id,
            &spec,
            Some(gui_callback),
            Some(progress_callback),
            Some(cancel),
        );

        let terminal = if result.success {
            WorkerEvent::Finished {
                job_id: job_id.clone(),
                output: result.output_path.unwrap_or(output_fallback),
            }
        } else {
            let failure = result.error.unwrap_or_else(|| crate::orchestrator::JobFailure {
                kind: ErrorKind::Cancelled,
                message: "job ended without a recorded failure".to_string(),
            });
            WorkerEvent::Failed {
                job_id: job_id.clone(),
                kind: failure.kind,
                message: failure.message,
            }
        };
        // Free the worker before the terminal event goes out, so a
        // consumer reacting to it can immediately submit the next job
        pending.fetch_sub(1, Ordering::SeqCst);
        let _ = events.send(terminal);
    }
}
