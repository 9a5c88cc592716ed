/// Tiingo API rate limiter - 10 requests per second globally
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

lazy_static! {
    static ref TIINGO_RATE_LIMITER: Mutex<ApiRateLimiter> = Mutex::new(ApiRateLimiter::new(10));
}

pub struct ApiRateLimiter {
    /// Queue of request timestamps inside the window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl ApiRateLimiter {
    fn new(max_requests: usize) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests,
            window: Duration::from_secs(1),
        }
    }

    /// Record a request and return how long the caller must wait first.
    /// The recorded slot is the moment the request is allowed to go out.
    fn check_and_record(&mut self, now: Instant) -> Duration {
        while let Some(&front) = self.request_times.front() {
            if now.saturating_duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        let mut wait_time = Duration::ZERO;
        if self.request_times.len() >= self.max_requests {
            let busy_index = self.request_times.len() - self.max_requests;
            let frees_at = self.request_times[busy_index] + self.window;
            wait_time = frees_at.saturating_duration_since(now);
        }

        self.request_times.push_back(now + wait_time);
        wait_time
    }
}

/// Wait if necessary to respect the Tiingo request rate
pub async fn rate_limit_tiingo_api() {
    let wait_duration = {
        let mut limiter = match TIINGO_RATE_LIMITER.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        limiter.check_and_record(Instant::now())
    };

    if !wait_duration.is_zero() {
        tracing::debug!("Tiingo rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}
