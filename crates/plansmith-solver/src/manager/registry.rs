//! Bounded job storage shared between the manager and its solver threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use plansmith_core::{Problem, Score};
use tracing::{debug, info};

use super::SolverStatus;
use crate::error::{ManagerError, SolverError};

struct Job<S: Score> {
    created: Instant,
    /// Submission order, breaking ties between equal creation instants.
    sequence: u64,
    status: SolverStatus,
    best: Arc<Problem<S>>,
    error: Option<SolverError>,
    terminated_early: bool,
    terminate_flag: Arc<AtomicBool>,
}

/// A consistent copy of one job's state.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct JobSnapshot<S: Score> {
    pub problem_id: String,
    pub created: Instant,
    pub status: SolverStatus,
    pub best: Arc<Problem<S>>,
    pub error: Option<SolverError>,
    pub terminated_early: bool,
}

struct Jobs<S: Score> {
    by_id: HashMap<String, Job<S>>,
    next_sequence: u64,
}

/// Jobs keyed by problem id.
///
/// At most `capacity` completed jobs are retained; once exceeded, the
/// completed jobs created first are evicted. Scheduled and active jobs are
/// never evicted and do not count towards the capacity.
pub struct JobRegistry<S: Score> {
    jobs: Mutex<Jobs<S>>,
    capacity: usize,
}

impl<S: Score> JobRegistry<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(Jobs {
                by_id: HashMap::new(),
                next_sequence: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a scheduled job, replacing a completed job with the same id.
    ///
    /// Fails with [`ManagerError::Conflict`] while that id is still solving.
    pub fn insert(
        &self,
        problem_id: &str,
        problem: Arc<Problem<S>>,
        terminate_flag: Arc<AtomicBool>,
    ) -> Result<(), ManagerError> {
        let mut jobs = self.jobs.lock();
        if jobs.by_id.get(problem_id).is_some_and(|job| job.status.is_solving()) {
            return Err(ManagerError::Conflict(problem_id.to_string()));
        }
        let sequence = jobs.next_sequence;
        jobs.next_sequence += 1;
        jobs.by_id.insert(
            problem_id.to_string(),
            Job {
                created: Instant::now(),
                sequence,
                status: SolverStatus::SolvingScheduled,
                best: problem,
                error: None,
                terminated_early: false,
                terminate_flag,
            },
        );
        info!(event = "job_submitted", problem_id = %problem_id, sequence = sequence);
        Ok(())
    }

    /// Drops a scheduled job whose thread never started.
    pub(crate) fn remove(&self, problem_id: &str) {
        self.jobs.lock().by_id.remove(problem_id);
    }

    pub(crate) fn mark_active(&self, problem_id: &str) {
        if let Some(job) = self.jobs.lock().by_id.get_mut(problem_id) {
            job.status = SolverStatus::SolvingActive;
        }
    }

    pub(crate) fn update_best(&self, problem_id: &str, best: Arc<Problem<S>>) {
        if let Some(job) = self.jobs.lock().by_id.get_mut(problem_id) {
            job.best = best;
        }
    }

    /// Records the final solution and applies the retention limit.
    pub(crate) fn complete(&self, problem_id: &str, best: Arc<Problem<S>>, terminated_early: bool) {
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.by_id.get_mut(problem_id) {
            job.status = SolverStatus::NotSolving;
            job.best = best;
            job.terminated_early = terminated_early;
        }
        self.evict(&mut jobs);
    }

    /// Records a failure; the last best solution stays retrievable.
    pub(crate) fn fail(&self, problem_id: &str, error: SolverError) {
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.by_id.get_mut(problem_id) {
            job.status = SolverStatus::NotSolving;
            job.error = Some(error);
        }
        self.evict(&mut jobs);
    }

    fn evict(&self, jobs: &mut Jobs<S>) {
        let mut completed: Vec<(Instant, u64, String)> = jobs
            .by_id
            .iter()
            .filter(|(_, job)| !job.status.is_solving())
            .map(|(id, job)| (job.created, job.sequence, id.clone()))
            .collect();
        if completed.len() <= self.capacity {
            return;
        }
        completed.sort();
        let excess = completed.len() - self.capacity;
        for (_, sequence, id) in completed.into_iter().take(excess) {
            jobs.by_id.remove(&id);
            info!(event = "job_evicted", problem_id = %id, sequence = sequence);
        }
    }

    /// Status of a job; unknown ids are not solving.
    pub fn status(&self, problem_id: &str) -> SolverStatus {
        self.jobs
            .lock()
            .by_id
            .get(problem_id)
            .map_or(SolverStatus::NotSolving, |job| job.status)
    }

    pub fn best(&self, problem_id: &str) -> Result<Arc<Problem<S>>, ManagerError> {
        self.with_job(problem_id, |job| Arc::clone(&job.best))
    }

    pub fn error(&self, problem_id: &str) -> Result<Option<SolverError>, ManagerError> {
        self.with_job(problem_id, |job| job.error.clone())
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self, problem_id: &str) -> Result<JobSnapshot<S>, ManagerError> {
        self.with_job(problem_id, |job| JobSnapshot {
            problem_id: problem_id.to_string(),
            created: job.created,
            status: job.status,
            best: Arc::clone(&job.best),
            error: job.error.clone(),
            terminated_early: job.terminated_early,
        })
    }

    fn with_job<T>(&self, problem_id: &str, f: impl FnOnce(&Job<S>) -> T) -> Result<T, ManagerError> {
        self.jobs
            .lock()
            .by_id
            .get(problem_id)
            .map(f)
            .ok_or_else(|| ManagerError::NotFound(problem_id.to_string()))
    }

    /// Requests cancellation. A no-op for completed jobs.
    pub fn terminate(&self, problem_id: &str) -> Result<SolverStatus, ManagerError> {
        self.with_job(problem_id, |job| {
            if job.status.is_solving() {
                job.terminate_flag.store(true, Ordering::SeqCst);
                debug!(event = "job_terminate", problem_id = %problem_id);
            }
            job.status
        })
    }

    /// Requests cancellation of every scheduled or active job.
    pub fn terminate_all(&self) -> usize {
        let jobs = self.jobs.lock();
        jobs.by_id
            .values()
            .filter(|job| job.status.is_solving())
            .inspect(|job| job.terminate_flag.store(true, Ordering::SeqCst))
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.jobs
            .lock()
            .by_id
            .values()
            .filter(|job| job.status.is_solving())
            .count()
    }

    /// Ids of every retained job, oldest first.
    #[cfg(test)]
    pub(crate) fn problem_ids(&self) -> Vec<String> {
        let jobs = self.jobs.lock();
        let mut ids: Vec<(Instant, u64, &String)> = jobs
            .by_id
            .iter()
            .map(|(id, job)| (job.created, job.sequence, id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, _, id)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Score> std::fmt::Debug for JobRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("capacity", &self.capacity)
            .field("jobs", &self.len())
            .finish()
    }
}
