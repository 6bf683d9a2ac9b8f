use crate::models::Job;

/// How [`JobStore::apply_update`] changed the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobChange {
    Inserted,
    Updated,
}

/// Client-held job list, most recent first.
///
/// Holds at most one entry per `job_id`: updates replace in place, unseen
/// ids are prepended.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Vec<Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_update(&mut self, job: Job) -> JobChange {
        match self.jobs.iter_mut().find(|j| j.job_id == job.job_id) {
            Some(existing) => {
                *existing = job;
                JobChange::Updated
            }
            None => {
                self.jobs.insert(0, job);
                JobChange::Inserted
            }
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }
}
