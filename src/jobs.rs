use super::*;

/// Jobs received but not yet mined. Only the newest job is ever worked on;
/// a clean job also drops everything queued before it.
#[derive(Debug, Default)]
pub(crate) struct Jobs {
    queue: VecDeque<Arc<Job>>,
}

impl Jobs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, job: Job) {
        if job.clean {
            self.queue.clear();
        }

        self.queue.push_back(Arc::new(job));
    }

    /// Takes the newest job and discards older ones.
    pub(crate) fn take_latest(&mut self) -> Option<Arc<Job>> {
        let latest = self.queue.pop_back();
        self.queue.clear();
        latest
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}
