use crate::interrupt::InterruptFlag;
use std::time::{Duration, Instant};

#[test]
fn test_clones_share_state() {
    let flag = InterruptFlag::new();
    let other = flag.clone();

    assert!(!flag.is_raised());
    other.raise();
    assert!(flag.is_raised());
}

#[test]
fn test_take_clears() {
    let flag = InterruptFlag::new();
    assert!(!flag.take());

    flag.raise();
    assert!(flag.take());
    assert!(!flag.is_raised());
}

#[test]
fn test_sleep_completes_when_not_raised() {
    let flag = InterruptFlag::new();
    assert!(flag.sleep(Duration::from_millis(20)));
}

#[test]
fn test_sleep_returns_early_when_raised() {
    let flag = InterruptFlag::new();
    flag.raise();

    let start = Instant::now();
    assert!(!flag.sleep(Duration::from_secs(30)));
    assert!(start.elapsed() < Duration::from_secs(5));
}
