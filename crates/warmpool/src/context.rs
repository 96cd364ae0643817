//! Remaining-time estimate of the current invocation

use lambda_runtime::{Context, LambdaEvent};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Host-provided view of the current invocation
pub trait InvocationContext {
    /// Approximate time left before the host forcibly ends the invocation
    fn remaining_time(&self) -> Duration;
}

/// Time left until `deadline_ms` (Unix epoch milliseconds), measured from `now`
pub fn remaining_until(deadline_ms: u64, now: SystemTime) -> Duration {
    let now_ms = now
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    Duration::from_millis(deadline_ms.saturating_sub(now_ms))
}

impl InvocationContext for Context {
    fn remaining_time(&self) -> Duration {
        remaining_until(self.deadline, SystemTime::now())
    }
}

impl<T> InvocationContext for LambdaEvent<T> {
    fn remaining_time(&self) -> Duration {
        self.context.remaining_time()
    }
}

/// A fixed budget, for local runs and tests
impl InvocationContext for Duration {
    fn remaining_time(&self) -> Duration {
        *self
    }
}

impl<C: InvocationContext + ?Sized> InvocationContext for &C {
    fn remaining_time(&self) -> Duration {
        (**self).remaining_time()
    }
}
