//! Event counts and their split into chunks
//!
//! Each run is simulated by one master job split into `chunks` sub jobs of `events_per_chunk`
//! events each.

use crate::config::settings::EventCount;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunks: u64,
    pub events_per_chunk: u64,
}

impl ChunkPlan {
    /// Events that will actually be generated, which can be a bit more than requested
    pub fn total_events(&self) -> u64 {
        self.chunks * self.events_per_chunk
    }
}

/// Number of events to generate for a run
///
/// With a ratio, `trigger_count` must be known; the result is rounded to the nearest integer
/// (ties to even). Returns `None` when the ratio policy has no trigger count.
pub fn events_for_run(policy: &EventCount, trigger_count: Option<u64>) -> Option<u64> {
    match policy {
        EventCount::Fixed(n) => Some(*n),
        EventCount::PropToTrigger { ratio, .. } => {
            trigger_count.map(|count| (ratio * count as f64).round_ties_even() as u64)
        }
    }
}

/// Split `events` into the fewest chunks of at most `max_per_chunk` events
///
/// `chunks` is the smallest `n >= 1` with `events / n <= max_per_chunk`. The events per chunk
/// are `floor(events / chunks) + 0.5` rounded ties to even, so an odd quotient rounds up.
pub fn plan_chunks(events: u64, max_per_chunk: u64) -> ChunkPlan {
    let max_per_chunk = max_per_chunk.max(1);
    let chunks = events.div_ceil(max_per_chunk).max(1);
    let events_per_chunk = ((events / chunks) as f64 + 0.5).round_ties_even() as u64;
    ChunkPlan { chunks, events_per_chunk }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(r: f64) -> EventCount {
        EventCount::PropToTrigger { trigger: "CMUL7-B-NOPF-MUON".to_string(), ratio: r }
    }

    #[test]
    fn test_ratio_scenario() {
        let events = events_for_run(&ratio(2.0), Some(500)).unwrap();
        assert_eq!(events, 1000);
        assert_eq!(plan_chunks(events, 600), ChunkPlan { chunks: 2, events_per_chunk: 500 });

        let events = events_for_run(&ratio(2.0), Some(800)).unwrap();
        assert_eq!(events, 1600);
        assert_eq!(plan_chunks(events, 600), ChunkPlan { chunks: 3, events_per_chunk: 534 });
    }

    #[test]
    fn test_exact_multiple_does_not_add_a_chunk() {
        assert_eq!(plan_chunks(1200, 600), ChunkPlan { chunks: 2, events_per_chunk: 600 });
        assert_eq!(plan_chunks(600, 600), ChunkPlan { chunks: 1, events_per_chunk: 600 });
        assert_eq!(plan_chunks(601, 600).chunks, 2);
    }

    #[test]
    fn test_chunks_are_minimal() {
        for events in [0u64, 1, 599, 600, 601, 1199, 1200, 1201, 10_000, 123_457] {
            for max in [1u64, 7, 600, 5000] {
                let plan = plan_chunks(events, max);
                assert!(events <= plan.chunks * max, "{events}/{max}");
                if plan.chunks > 1 {
                    assert!(events > (plan.chunks - 1) * max, "{events}/{max}");
                }
            }
        }
    }

    #[test]
    fn test_no_events() {
        assert_eq!(plan_chunks(0, 600), ChunkPlan { chunks: 1, events_per_chunk: 0 });
    }

    #[test]
    fn test_fixed_events_ignore_scalers() {
        assert_eq!(events_for_run(&EventCount::Fixed(10000), None), Some(10000));
        assert_eq!(events_for_run(&ratio(1.5), None), None);
        assert_eq!(events_for_run(&ratio(0.5), Some(5)), Some(2));
    }
}
