use std::sync::Arc;

use crate::{
    define_index_newtype,
    problem::{coordinate::Coordinate, order::Order},
};

/// An order the solver may place, with the location it's sent at.
#[derive(Debug, Clone)]
pub struct Job {
    pub order: Arc<Order>,
    pub location: Coordinate,
}

define_index_newtype!(JobIdx, Job);

/// Arena of the jobs sent in one solver call.
///
/// The solver only understands small integers: job `i` goes out as `i + 1`
/// and is resolved back through this map. A map is built per call and
/// dropped with it, so ids are never shared between calls.
#[derive(Debug, Clone, Default)]
pub struct JobIdMap {
    jobs: Vec<Job>,
}

impl JobIdMap {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn job(&self, index: JobIdx) -> &Job {
        &self.jobs[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobIdx, &Job)> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, job)| (JobIdx::new(index), job))
    }

    pub fn wire_id(index: JobIdx) -> u64 {
        index.get() as u64 + 1
    }

    pub fn resolve(&self, wire_id: u64) -> Option<JobIdx> {
        let index = usize::try_from(wire_id.checked_sub(1)?).ok()?;
        (index < self.jobs.len()).then_some(JobIdx::new(index))
    }

    /// First id free for vehicles in the same request.
    pub fn next_wire_id(&self) -> u64 {
        self.jobs.len() as u64 + 1
    }
}
