//! Sliding-window rate limiter tests.

use crate::enrichment::services::{RateLimitError, RateLimiter};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[rstest]
fn admits_up_to_limit_within_window() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    let start = Instant::now();

    for offset in 0..3 {
        assert_eq!(
            limiter.try_acquire_at(start + Duration::from_secs(offset)),
            Ok(())
        );
    }
    let refused = limiter.try_acquire_at(start + Duration::from_secs(10));
    assert_eq!(
        refused,
        Err(RateLimitError::Exceeded {
            retry_after: Duration::from_secs(50)
        })
    );
    assert_eq!(limiter.remaining_at(start + Duration::from_secs(10)), 0);
}

#[rstest]
fn old_calls_slide_out_of_window() {
    let limiter = RateLimiter::new(2, Duration::from_secs(60));
    let start = Instant::now();

    assert!(limiter.try_acquire_at(start).is_ok());
    assert!(limiter.try_acquire_at(start + Duration::from_secs(30)).is_ok());
    assert!(limiter.try_acquire_at(start + Duration::from_secs(59)).is_err());
    assert!(limiter.try_acquire_at(start + Duration::from_secs(60)).is_ok());
    assert_eq!(limiter.remaining_at(start + Duration::from_secs(60)), 0);
    assert_eq!(limiter.remaining_at(start + Duration::from_secs(121)), 2);
}

#[rstest]
fn refused_calls_are_not_recorded() {
    let limiter = RateLimiter::new(1, Duration::from_secs(10));
    let start = Instant::now();

    assert!(limiter.try_acquire_at(start).is_ok());
    for second in 1..10 {
        assert!(limiter.try_acquire_at(start + Duration::from_secs(second)).is_err());
    }
    assert!(limiter.try_acquire_at(start + Duration::from_secs(10)).is_ok());
}

#[rstest]
fn zero_limit_admits_nothing() {
    let limiter = RateLimiter::new(0, Duration::from_secs(60));
    assert!(limiter.try_acquire().is_err());
}

#[rstest]
fn concurrent_callers_never_exceed_limit() {
    let limiter = Arc::new(RateLimiter::new(10, Duration::from_secs(60)));
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let shared = Arc::clone(&limiter);
            let counter = Arc::clone(&admitted);
            std::thread::spawn(move || {
                if shared.try_acquire().is_ok() {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("limiter thread completes");
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 10);
}
