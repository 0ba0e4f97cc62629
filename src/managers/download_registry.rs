//! Download Registry for Video Hunter.
//!
//! In-memory cache of backend-owned job records keyed by id. The renderer
//! reads from it; only the reconciler and the App write to it.

use std::collections::HashMap;

use crate::types::job::Job;

/// Trait defining registry operations.
pub trait DownloadRegistryTrait {
    fn get(&self, id: &str) -> Option<&Job>;
    /// Inserts or replaces a record, returning the previous one.
    fn upsert(&mut self, job: Job) -> Option<Job>;
    fn contains(&self, id: &str) -> bool;
    /// Drops every record and refills from `jobs`.
    fn replace_all(&mut self, jobs: Vec<Job>);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    /// All records, newest `created` first.
    fn sorted_by_created_desc(&self) -> Vec<&Job>;
}

/// Registry backed by a `HashMap`.
#[derive(Debug, Default, Clone)]
pub struct DownloadRegistry {
    jobs: HashMap<String, Job>,
}

impl DownloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadRegistryTrait for DownloadRegistry {
    fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    fn upsert(&mut self, job: Job) -> Option<Job> {
        self.jobs.insert(job.id.clone(), job)
    }

    fn contains(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    fn replace_all(&mut self, jobs: Vec<Job>) {
        self.jobs.clear();
        for job in jobs {
            self.jobs.insert(job.id.clone(), job);
        }
    }

    fn clear(&mut self) {
        self.jobs.clear();
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }

    fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn sorted_by_created_desc(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.jobs.values().collect();
        // id as tie-breaker keeps equal timestamps in a stable order
        jobs.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        jobs
    }
}
