//! Sliding-window rate limiting for outbound inference calls.
//!
//! The window of call timestamps is shared by every caller in the process.
//! Checking capacity and recording the call happen under one lock, so
//! concurrent callers can never exceed the limit together.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Rate limiting error.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The window is full.
    #[error("rate limit exceeded; retry after {retry_after:?}")]
    Exceeded {
        /// Time until the oldest call leaves the window.
        retry_after: Duration,
    },
}

/// Process-wide sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_calls` per `window`.
    #[must_use]
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls.min(1_024))),
        }
    }

    /// Admits and records a call made now.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] when the window is full.
    pub fn try_acquire(&self) -> Result<(), RateLimitError> {
        self.try_acquire_at(Instant::now())
    }

    /// Admits and records a call made at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] when the window is full.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), RateLimitError> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        evict_expired(&mut calls, now, self.window);

        if calls.len() >= self.max_calls {
            let retry_after = calls.front().map_or(self.window, |&oldest| {
                self.window.saturating_sub(now.saturating_duration_since(oldest))
            });
            return Err(RateLimitError::Exceeded { retry_after });
        }

        calls.push_back(now);
        Ok(())
    }

    /// Returns how many calls would currently be admitted at `now`.
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        evict_expired(&mut calls, now, self.window);
        self.max_calls.saturating_sub(calls.len())
    }
}

fn evict_expired(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = calls.front() {
        if now.saturating_duration_since(oldest) >= window {
            calls.pop_front();
        } else {
            break;
        }
    }
}
