use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory limiter for failed login attempts, keyed by client IP.
/// Only failures count; a successful login clears the key.
pub struct RateLimiter {
    max_failures: u64,
    window: Duration,
    failures: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_failures: u64, window: Duration) -> Self {
        RateLimiter {
            max_failures: max_failures.max(1),
            window,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Fifteen-minute window, as used for the admin login.
    pub fn for_login(max_failures: u64) -> Self {
        Self::new(max_failures, Duration::from_secs(15 * 60))
    }

    /// True while `key` is still under the failure limit.
    pub fn allows(&self, key: &str) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let cutoff = Instant::now().checked_sub(self.window);
        let count = match (map.get_mut(key), cutoff) {
            (Some(attempts), Some(cutoff)) => {
                attempts.retain(|t| *t > cutoff);
                attempts.len()
            }
            (Some(attempts), None) => attempts.len(),
            (None, _) => return true,
        };
        if count == 0 {
            map.remove(key);
        }
        (count as u64) < self.max_failures
    }

    /// Drop failures older than the window and any key left with none.
    pub fn cleanup(&self) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cutoff) = Instant::now().checked_sub(self.window) {
            map.retain(|_, attempts| {
                attempts.retain(|t| *t > cutoff);
                !attempts.is_empty()
            });
        }
    }

    #[cfg(test)]
    pub fn tracked_keys(&self) -> usize {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn record_failure(&self, key: &str) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(key.to_string()).or_default().push(Instant::now());
    }

    pub fn reset(&self, key: &str) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }
}
