use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::error::GatewayError;

// Per-client window state. Created lazily on first request, mutated in
// place on every admission, never evicted (accepted growth risk).
#[derive(Debug)]
pub struct ClientWindow {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

// Admission result attached to successful responses as
// x-ratelimit-limit / -remaining / -reset headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub limit: u32,
    pub remaining: u32,
    // epoch seconds at which the current window resets
    pub reset_at: i64,
}

// Fixed-window rate limiter keyed by client identifier.
// DashMap's entry API holds a per-key lock for the whole read-modify-write,
// so concurrent requests from one identifier serialize while different
// identifiers proceed independently.
pub struct RateLimiter {
    entries: DashMap<String, ClientWindow>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window: Duration::seconds(window_secs as i64),
        }
    }

    // Admit or reject one request, called before any upstream work
    pub fn admit(&self, identifier: &str) -> Result<Admission, GatewayError> {
        self.admit_at(identifier, Utc::now())
    }

    // Clock-explicit variant so tests can drive window rollover
    pub fn admit_at(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<Admission, GatewayError> {
        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert(ClientWindow {
                count: 0,
                window_start: now,
            });

        // Window expired? Reset it. Strict greater-than: a request landing
        // exactly on the boundary still belongs to the old window.
        if now > entry.window_start + self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        let reset_at = (entry.window_start + self.window).timestamp();

        if entry.count >= self.max_requests {
            return Err(GatewayError::RateLimited { reset_at });
        }

        entry.count += 1;
        Ok(Admission {
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_at,
        })
    }
}
