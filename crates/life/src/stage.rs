//! Two-stage, multi-process map-reduce over a scratch directory.
//!
//! Grounded on `predictors/species_richness.py` and
//! `predictors/endemism.py`: stage one fans a list of per-species jobs
//! out across a pool of OS processes, each writing its partial result
//! to a scratch raster; stage two reduces those partials into the
//! final output. The reference implementation uses
//! `multiprocessing.Manager`/`Process`/`Queue` with a bounded work
//! queue and aborts every sibling as soon as one worker's exit code is
//! non-zero. Here the "worker" is the current binary re-invoked with
//! an internal subcommand (`std::process::Command`), since Rust has no
//! direct equivalent of `multiprocessing.Process` for an arbitrary
//! closure across OS processes.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};
use tempfile::TempDir;

use crate::error::{Error, Result};

/// One unit of work for a stage: arguments appended to the worker
/// subcommand invocation, plus the scratch file it is expected to
/// produce.
#[derive(Debug, Clone)]
pub struct Job {
    pub args: Vec<String>,
    pub output: PathBuf,
}

/// Runs `jobs` through the current executable, re-invoked as
/// `<exe> <subcommand> <job.args...>`, using up to `worker_count`
/// concurrent OS processes. Returns the list of scratch outputs in
/// job order once every job has exited zero.
///
/// As soon as any worker exits non-zero, every other in-flight worker
/// is killed (`Child::kill`) and no further jobs are started, before
/// returning `Error::WorkerFailed`: a partially-written scratch raster
/// is discarded wholesale by `ScratchSpace`'s drop, so there is
/// nothing to gain from letting siblings run to completion.
pub fn run_stage(subcommand: &str, jobs: Vec<Job>, worker_count: usize) -> Result<Vec<PathBuf>> {
    if jobs.is_empty() {
        return Ok(Vec::new());
    }
    let worker_count = worker_count.max(1).min(jobs.len());
    let exe = std::env::current_exe().map_err(Error::Io)?;
    let cancelled = Arc::new(AtomicBool::new(false));
    let slots: Vec<Arc<Mutex<Option<Child>>>> = (0..worker_count).map(|_| Arc::new(Mutex::new(None))).collect();
    let (tx, rx) = mpsc::channel::<(usize, Result<PathBuf>)>();

    let job_queue: Arc<std::sync::Mutex<std::vec::IntoIter<(usize, Job)>>> =
        Arc::new(std::sync::Mutex::new(jobs.clone().into_iter().enumerate().collect::<Vec<_>>().into_iter()));

    std::thread::scope(|scope| {
        for worker_id in 0..worker_count {
            let job_queue = job_queue.clone();
            let cancelled = cancelled.clone();
            let slot = slots[worker_id].clone();
            let all_slots = slots.clone();
            let tx = tx.clone();
            let exe = exe.clone();
            let subcommand = subcommand.to_string();
            scope.spawn(move || {
                loop {
                    if cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    let next = job_queue.lock().unwrap().next();
                    let Some((index, job)) = next else { return };

                    info!("stage worker {worker_id} running job {index}: {subcommand} {:?}", job.args);
                    let result = spawn_worker(&exe, &subcommand, &job, &slot, &cancelled);
                    if result.is_err() && !cancelled.swap(true, Ordering::SeqCst) {
                        warn!("stage job {index} failed, killing sibling workers");
                        kill_all(&all_slots);
                    }
                    if tx.send((index, result)).is_err() {
                        return;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut outputs: Vec<Option<PathBuf>> = vec![None; jobs.len()];
    let mut first_error = None;
    for (index, result) in rx {
        match result {
            Ok(path) => outputs[index] = Some(path),
            Err(err) => {
                warn!("stage job {index} failed: {err}");
                first_error.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    Ok(outputs.into_iter().map(|o| o.expect("every non-cancelled job produced an output")).collect())
}

/// Kills every worker currently holding a child process, ignoring
/// workers that are between jobs (`None`) or whose process has
/// already exited.
fn kill_all(slots: &[Arc<Mutex<Option<Child>>>]) {
    for slot in slots {
        if let Ok(mut guard) = slot.lock() {
            if let Some(child) = guard.as_mut() {
                let _ = child.kill();
            }
        }
    }
}

/// Spawns one job, retaining the `Child` handle in `slot` for the
/// duration of the run so a sibling's failure can kill it, and polling
/// rather than blocking on `wait()` so `cancelled` is noticed promptly.
fn spawn_worker(exe: &Path, subcommand: &str, job: &Job, slot: &Mutex<Option<Child>>, cancelled: &AtomicBool) -> Result<PathBuf> {
    let child = Command::new(exe).arg(subcommand).args(&job.args).spawn().map_err(Error::Io)?;
    *slot.lock().unwrap() = Some(child);

    let status = loop {
        {
            let mut guard = slot.lock().unwrap();
            let child = guard.as_mut().expect("slot holds the child this worker just spawned");
            if let Some(status) = child.try_wait().map_err(Error::Io)? {
                break status;
            }
            if cancelled.load(Ordering::SeqCst) {
                let _ = child.kill();
            }
        }
        std::thread::sleep(Duration::from_millis(20));
    };
    *slot.lock().unwrap() = None;

    if !status.success() {
        return Err(Error::WorkerFailed {
            exit_code: status.code().unwrap_or(-1),
        });
    }
    Ok(job.output.clone())
}

/// A scratch directory for a stage run, removed on drop so partial
/// outputs from a cancelled run never linger.
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    pub fn new(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir().map_err(Error::Io)?;
        Ok(ScratchSpace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn job_output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
