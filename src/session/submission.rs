use moka::sync::Cache;
use std::time::Duration;

const SUBMISSION_TTL: Duration = Duration::from_secs(120);

/// Forms with a submission in flight, keyed `"{session}:{form}"`.
#[derive(Clone)]
pub struct Submissions {
    in_flight: Cache<String, ()>,
}

impl Default for Submissions {
    fn default() -> Self {
        Self {
            in_flight: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(SUBMISSION_TTL)
                .build(),
        }
    }
}

impl Submissions {
    /// Marks `form` of this session as submitting. `None` when a submission
    /// of the same form is already in flight.
    ///
    /// The mark is released when the returned guard drops, including when
    /// the request future is cancelled mid-submission.
    pub fn begin(&self, session_id: &str, form: &str) -> Option<SubmissionGuard> {
        let key = format!("{session_id}:{form}");
        let entry = self.in_flight.entry(key.clone()).or_insert(());
        entry.is_fresh().then(|| SubmissionGuard {
            in_flight: self.in_flight.clone(),
            key,
        })
    }
}

#[must_use = "the submission is released as soon as the guard drops"]
pub struct SubmissionGuard {
    in_flight: Cache<String, ()>,
    key: String,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.in_flight.invalidate(&self.key);
    }
}
