//! Bounded fan-out over sub-targets.
//!
//! One primitive covers both macro strategies: `scan`'s sequential paced
//! iteration (max one in flight, fixed gap between call starts) and
//! `dossier`'s parallel batch (bounded width, no gap). Per-item failures
//! are values returned by the mapped closure, never aborts.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep_until};

/// Fan-out policy: how many lookups may be in flight, and the minimum gap
/// between successive call starts.
pub struct FanOut {
    max_in_flight: usize,
    min_interval: Option<Duration>,
}

impl FanOut {
    /// One call at a time, with at least `min_interval` between starts.
    /// Upstream rate-limit pacing for `scan`.
    pub fn serial(min_interval: Duration) -> Self {
        Self {
            max_in_flight: 1,
            min_interval: Some(min_interval),
        }
    }

    /// Up to `max_in_flight` concurrent calls, no pacing gap.
    pub fn concurrent(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            min_interval: None,
        }
    }

    /// Map `f` over `items`, respecting the policy. Results come back in
    /// item order. `f` receives the item's index for labelling.
    pub async fn run<T, U, F, Fut>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = U>,
    {
        let gate = IntervalGate::new(self.min_interval);
        stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let gate = &gate;
                let f = &f;
                async move {
                    gate.pass().await;
                    f(index, item).await
                }
            })
            .buffered(self.max_in_flight)
            .collect()
            .await
    }
}

/// Fixed-interval admission gate. The first caller passes immediately;
/// each subsequent caller is admitted no earlier than `interval` after the
/// previous admission.
struct IntervalGate {
    interval: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl IntervalGate {
    fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    async fn pass(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        let admit_at = {
            let mut slot = self.next_slot.lock().await;
            let now = Instant::now();
            let at = slot.map_or(now, |s| s.max(now));
            *slot = Some(at + interval);
            at
        };
        sleep_until(admit_at).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn results_preserve_item_order() {
        let fan = FanOut::concurrent(4);
        let out = fan
            .run(vec![10u64, 5, 1], |index, delay_ms| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                index
            })
            .await;
        assert_eq!(out, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn serial_pacing_spaces_call_starts() {
        let fan = FanOut::serial(Duration::from_millis(25));
        let started = Instant::now();
        let out = fan
            .run(vec!["a", "b", "c"], |_, item| async move { item })
            .await;
        assert_eq!(out, vec!["a", "b", "c"]);
        // Three starts, two enforced gaps.
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn concurrent_respects_max_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let fan = FanOut::concurrent(2);
        fan.run(vec![(); 6], |_, ()| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn per_item_failure_is_a_value_not_an_abort() {
        let fan = FanOut::serial(Duration::from_millis(1));
        let out: Vec<Result<u32, String>> = fan
            .run(vec![1u32, 2, 3], |_, n| async move {
                if n == 2 {
                    Err("unreachable host".to_string())
                } else {
                    Ok(n * 10)
                }
            })
            .await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], Ok(10));
        assert!(out[1].is_err());
        assert_eq!(out[2], Ok(30));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let fan = FanOut::concurrent(8);
        let out: Vec<u8> = fan.run(Vec::new(), |_, item| async move { item }).await;
        assert!(out.is_empty());
    }
}
