use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

lazy_static! {
    static ref COMMAND_LIMITER: Mutex<CommandLimiter> = Mutex::new(CommandLimiter::default());
}

const COOLDOWN_SECONDS: u64 = 5;
const GLOBAL_RATE_LIMIT: usize = 50;  // commands per second
const RATE_WINDOW_MS: u64 = 1000;

/// Cooldown per (user, command) plus a global sliding window
#[derive(Default)]
pub struct CommandLimiter {
    cooldowns: HashMap<(UserId, String), u64>,
    // Last time a user was told about a cooldown, to avoid message spam
    warnings: HashMap<(UserId, String), u64>,
    requests: VecDeque<u64>,
}

impl CommandLimiter {
    /// `Err((remaining_seconds, should_warn))` while the cooldown is active.
    /// `should_warn` is true only on the first rejected attempt.
    fn check_cooldown(&mut self, user_id: UserId, command: &str, now_secs: u64) -> Result<(), (u64, bool)> {
        let key = (user_id, command.to_string());

        if let Some(&last_time) = self.cooldowns.get(&key) {
            let elapsed = now_secs.saturating_sub(last_time);
            if elapsed < COOLDOWN_SECONDS {
                let should_warn = self
                    .warnings
                    .get(&key)
                    .map_or(true, |&last_warning| last_warning < last_time);
                if should_warn {
                    self.warnings.insert(key, now_secs);
                }
                return Err((COOLDOWN_SECONDS - elapsed, should_warn));
            }
        }

        self.cooldowns.insert(key, now_secs);
        Ok(())
    }

    /// `Err(remaining_ms)` when the global limit is exceeded
    fn check_global(&mut self, now_ms: u64) -> Result<(), u64> {
        let window_start = now_ms.saturating_sub(RATE_WINDOW_MS);
        while self.requests.front().is_some_and(|&ts| ts <= window_start) {
            self.requests.pop_front();
        }

        if self.requests.len() >= GLOBAL_RATE_LIMIT {
            let oldest_leaves_at = self.requests[0] + RATE_WINDOW_MS;
            return Err(oldest_leaves_at.saturating_sub(now_ms));
        }

        self.requests.push_back(now_ms);
        Ok(())
    }
}

fn now() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Check if a user can execute a command (cooldown not active)
pub async fn check_cooldown(user_id: UserId, command: &str) -> Result<(), (u64, bool)> {
    COMMAND_LIMITER
        .lock()
        .await
        .check_cooldown(user_id, command, now().as_secs())
}

/// Check the global command rate limit across all users
pub async fn check_global_rate_limit() -> Result<(), u64> {
    COMMAND_LIMITER
        .lock()
        .await
        .check_global(now().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_blocks_repeat_and_warns_once() {
        let mut limiter = CommandLimiter::default();
        let user = UserId::new(42);

        assert!(limiter.check_cooldown(user, "$chart", 100).is_ok());
        assert_eq!(limiter.check_cooldown(user, "$chart", 102), Err((3, true)));
        assert_eq!(limiter.check_cooldown(user, "$chart", 103), Err((2, false)));
        // Other commands are independent
        assert!(limiter.check_cooldown(user, "$watchlist", 103).is_ok());
        assert!(limiter.check_cooldown(user, "$chart", 105).is_ok());
    }

    #[test]
    fn global_limit_rejects_burst() {
        let mut limiter = CommandLimiter::default();
        for _ in 0..GLOBAL_RATE_LIMIT {
            assert!(limiter.check_global(10_000).is_ok());
        }
        assert_eq!(limiter.check_global(10_400), Err(600));
        assert!(limiter.check_global(11_000).is_ok());
    }
}
