use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock budget shared by every step of one request
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts the clock now
    pub fn start(budget: Duration) -> Self {
        Self::starting_at(Instant::now(), budget)
    }

    pub fn starting_at(started: Instant, budget: Duration) -> Self {
        Self { started, budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the budget runs out (zero once spent)
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// True when no more than `margin` of the budget is left
    pub fn within(&self, margin: Duration) -> bool {
        self.remaining() <= margin
    }

    pub fn spent(&self) -> bool {
        self.remaining().is_zero()
    }
}
