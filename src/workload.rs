//! Random workload generation.
//!
//! Produces process sets for experiments and property tests. Generated
//! sets are always valid input: arrivals in `[0, max_arrival]`, bursts in
//! `[min_burst, max_burst]` with `min_burst >= 1`, and pids `1..=count`
//! assigned in arrival order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::ProcessSpec;

/// Random process-set generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadGenerator {
    /// Number of processes.
    pub count: usize,
    /// Latest possible arrival time.
    pub max_arrival: i64,
    /// Shortest burst.
    pub min_burst: i64,
    /// Longest burst.
    pub max_burst: i64,
    /// Inclusive priority range, `None` = no priorities.
    pub priority_range: Option<(i64, i64)>,
}

impl WorkloadGenerator {
    /// Creates a generator for `count` processes with arrivals in
    /// `[0, 10]` and bursts in `[1, 10]`.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            max_arrival: 10,
            min_burst: 1,
            max_burst: 10,
            priority_range: None,
        }
    }

    /// Sets the latest arrival time (negative values become 0).
    pub fn with_max_arrival(mut self, max_arrival: i64) -> Self {
        self.max_arrival = max_arrival.max(0);
        self
    }

    /// Sets the burst range. Bounds are clamped to at least 1 and put in
    /// order.
    pub fn with_burst_range(mut self, min: i64, max: i64) -> Self {
        let (min, max) = (min.max(1), max.max(1));
        self.min_burst = min.min(max);
        self.max_burst = min.max(max);
        self
    }

    /// Gives every process a priority drawn from `[low, high]`.
    pub fn with_priority_range(mut self, low: i64, high: i64) -> Self {
        self.priority_range = Some((low.min(high), low.max(high)));
        self
    }

    /// Generates a process set with the given RNG.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<ProcessSpec> {
        let mut rows: Vec<(i64, i64, Option<i64>)> = (0..self.count)
            .map(|_| {
                let arrival = rng.random_range(0..=self.max_arrival);
                let burst = rng.random_range(self.min_burst..=self.max_burst);
                let priority = self
                    .priority_range
                    .map(|(low, high)| rng.random_range(low..=high));
                (arrival, burst, priority)
            })
            .collect();
        rows.sort_by_key(|&(arrival, _, _)| arrival);

        rows.into_iter()
            .zip(1i64..)
            .map(|((arrival, burst, priority), pid)| {
                let spec = ProcessSpec::new(arrival, burst).with_pid(pid);
                match priority {
                    Some(p) => spec.with_priority(p),
                    None => spec,
                }
            })
            .collect()
    }

    /// Generates a reproducible process set from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Vec<ProcessSpec> {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }
}

impl Default for WorkloadGenerator {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_processes, Requirements};

    #[test]
    fn test_generated_sets_are_valid() {
        let gen = WorkloadGenerator::new(10)
            .with_max_arrival(15)
            .with_burst_range(2, 6)
            .with_priority_range(5, 1);
        for seed in 0..20 {
            let specs = gen.generate_seeded(seed);
            assert_eq!(specs.len(), 10);
            assert!(validate_processes(&specs, &Requirements::new().with_priority(true)).is_ok());
            for s in &specs {
                assert!((0..=15).contains(&s.arrival_time));
                assert!((2..=6).contains(&s.burst_time));
                assert!((1..=5).contains(&s.priority.unwrap()));
            }
        }
    }

    #[test]
    fn test_sorted_by_arrival_with_sequential_pids() {
        let specs = WorkloadGenerator::new(8).generate_seeded(42);
        assert!(specs.windows(2).all(|w| w[0].arrival_time <= w[1].arrival_time));
        let pids: Vec<Option<i64>> = specs.iter().map(|s| s.pid).collect();
        assert_eq!(pids, (1..=8).map(Some).collect::<Vec<_>>());
        assert!(specs.iter().all(|s| s.priority.is_none()));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let gen = WorkloadGenerator::default();
        assert_eq!(gen.generate_seeded(7), gen.generate_seeded(7));
    }

    #[test]
    fn test_burst_range_clamped() {
        let gen = WorkloadGenerator::new(3).with_burst_range(-4, 0);
        assert_eq!((gen.min_burst, gen.max_burst), (1, 1));
        assert!(gen.generate_seeded(1).iter().all(|s| s.burst_time == 1));
    }
}
