use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

use super::RenderJob;

/// Default mailbox size.
pub const JOB_QUEUE_CAPACITY: usize = 100;

/// Creates a bounded job mailbox.
pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    assert!(capacity > 0, "job queue needs a capacity of at least one");
    let (tx, rx) = bounded(capacity);
    (JobSender { tx }, JobReceiver { rx })
}

/// Submitting side of the job mailbox. Clone it into every producer thread.
#[derive(Debug, Clone)]
pub struct JobSender {
    tx: Sender<RenderJob>,
}

impl JobSender {
    /// Queues `job` without blocking.
    ///
    /// Returns false when the mailbox is full or the renderer is gone; the
    /// job is dropped and retrying is up to the caller.
    pub fn submit(&self, job: RenderJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                log::debug!("job queue full, rejected {} job", job.kind());
                false
            }
            Err(TrySendError::Disconnected(job)) => {
                log::debug!("renderer gone, dropped {} job", job.kind());
                false
            }
        }
    }

    /// Jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }
}

/// Draining side, owned by the renderer.
#[derive(Debug)]
pub struct JobReceiver {
    rx: Receiver<RenderJob>,
}

impl JobReceiver {
    /// Next job in submission order, if any. Never blocks.
    pub fn try_next(&self) -> Option<RenderJob> {
        match self.rx.try_recv() {
            Ok(job) => Some(job),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use super::*;

    fn noop() -> RenderJob {
        RenderJob::new(|_| {})
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (tx, _rx) = job_queue(JOB_QUEUE_CAPACITY);
        for _ in 0..JOB_QUEUE_CAPACITY {
            assert!(tx.submit(noop()));
        }

        let start = Instant::now();
        assert!(!tx.submit(noop()));
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(tx.pending(), JOB_QUEUE_CAPACITY);
    }

    #[test]
    fn draining_frees_a_slot() {
        let (tx, rx) = job_queue(1);
        assert!(tx.submit(noop()));
        assert!(!tx.submit(noop()));
        assert!(rx.try_next().is_some());
        assert!(tx.submit(noop()));
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let (_tx, rx) = job_queue(4);
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn submit_after_renderer_drop_fails() {
        let (tx, rx) = job_queue(4);
        drop(rx);
        assert!(!tx.submit(noop()));
    }

    #[test]
    fn jobs_come_out_in_submission_order() {
        let (tx, rx) = job_queue(8);
        for kind in ["a", "b", "c"] {
            let mut job = noop();
            job.kind = kind;
            assert!(tx.submit(job));
        }
        let order: Vec<_> = std::iter::from_fn(|| rx.try_next())
            .map(|j| j.kind())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn producers_on_many_threads_never_exceed_capacity() {
        let (tx, rx) = job_queue(10);
        let accepted = Arc::new(AtomicUsize::new(0));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let tx = tx.clone();
                let accepted = accepted.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if tx.submit(noop()) {
                            accepted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(accepted.load(Ordering::Relaxed), 10);
        assert_eq!(rx.pending(), 10);
    }
}
