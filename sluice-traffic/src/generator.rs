//! Parameterized synthetic traffic.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sluice_core::packet::{PacketArrival, PacketId};
use tracing::debug;

/// How inter-arrival gaps are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrafficModel {
    /// Exponential inter-arrival times: a Poisson arrival process.
    Poisson,
    /// Packets arrive in clumps: `burst_size` packets spaced `intra_gap`
    /// apart, with an exponential gap between clumps.
    Bursty {
        /// Packets per burst.
        burst_size: usize,
        /// Spacing between packets inside a burst, in simulated seconds.
        intra_gap: f64,
    },
}

/// Traffic shape: how many packets, how fast, and with what mix.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Number of packets to generate.
    pub packets: usize,
    /// Average packets per simulated second (Poisson rate, or burst rate
    /// for bursty traffic).
    pub arrival_rate: f64,
    /// Priority levels and their relative weights.
    pub priority_weights: Vec<(u8, f64)>,
    /// `(min_size, max_size, weight)` buckets packets are drawn from.
    pub size_buckets: Vec<(u32, u32, f64)>,
    /// Uniform range service times are drawn from.
    pub service_time_range: (f64, f64),
    /// Arrival process.
    pub model: TrafficModel,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            packets: 100,
            arrival_rate: 1.0,
            priority_weights: vec![(1, 0.5), (2, 0.3), (3, 0.2)],
            size_buckets: vec![
                (500, 1000, 0.3),   // small packets
                (1000, 2000, 0.5),  // medium packets
                (2000, 5000, 0.2),  // large packets
            ],
            service_time_range: (0.5, 2.0),
            model: TrafficModel::Poisson,
        }
    }
}

impl TrafficConfig {
    /// Default mix with the given share of high-priority packets; the rest
    /// splits 60/40 between low and medium priority.
    pub fn with_high_priority_ratio(mut self, ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        self.priority_weights = vec![
            (1, (1.0 - ratio) * 0.6),
            (2, (1.0 - ratio) * 0.4),
            (3, ratio),
        ];
        self
    }
}

/// Seeded packet-sequence generator.
///
/// Ids are assigned from a per-generator counter, so consecutive `generate`
/// calls on one generator produce sequences that can be concatenated
/// without id collisions.
#[derive(Debug)]
pub struct TrafficGenerator {
    rng: ChaCha8Rng,
    next_id: PacketId,
}

impl TrafficGenerator {
    /// Creates a generator for the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    /// Generates an arrival-time-ordered packet sequence.
    ///
    /// # Panics
    ///
    /// Panics if `arrival_rate` is not positive or the configured weight or
    /// range tables are empty.
    pub fn generate(&mut self, config: &TrafficConfig) -> Vec<PacketArrival> {
        assert!(config.arrival_rate > 0.0, "arrival rate must be positive");
        assert!(!config.priority_weights.is_empty(), "no priority weights");
        assert!(!config.size_buckets.is_empty(), "no size buckets");

        let mut packets = Vec::with_capacity(config.packets);
        let mut clock = 0.0;

        for sequence in 0..config.packets {
            clock += self.next_gap(&config.model, config.arrival_rate, sequence);

            let priority = self.pick_priority(&config.priority_weights);
            let (min_size, max_size) = self.pick_size_bucket(&config.size_buckets);
            let size = self.rng.random_range(min_size..=max_size);
            let (min_service, max_service) = config.service_time_range;
            let service_time = self.rng.random_range(min_service..=max_service);

            packets.push(PacketArrival {
                id: self.next_id,
                arrival_time: clock,
                size,
                priority,
                flow_key: None,
                service_time,
            });
            self.next_id += 1;
        }

        debug!(
            packets = packets.len(),
            span = clock,
            "generated traffic sequence"
        );
        packets
    }

    fn next_gap(&mut self, model: &TrafficModel, rate: f64, sequence: usize) -> f64 {
        match model {
            TrafficModel::Poisson => self.expovariate(rate),
            TrafficModel::Bursty {
                burst_size,
                intra_gap,
            } => {
                let burst_size = (*burst_size).max(1);
                if sequence % burst_size == 0 {
                    // New burst; the rate governs burst spacing.
                    self.expovariate(rate / burst_size as f64)
                } else {
                    *intra_gap
                }
            }
        }
    }

    /// Exponential variate with the given rate.
    fn expovariate(&mut self, rate: f64) -> f64 {
        let uniform: f64 = self.rng.random();
        -(1.0 - uniform).ln() / rate
    }

    fn pick_priority(&mut self, weights: &[(u8, f64)]) -> u8 {
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return weights[0].0;
        }
        let mut remaining = self.rng.random_range(0.0..total);
        for &(priority, weight) in weights {
            if remaining < weight {
                return priority;
            }
            remaining -= weight;
        }
        weights[weights.len() - 1].0
    }

    fn pick_size_bucket(&mut self, buckets: &[(u32, u32, f64)]) -> (u32, u32) {
        let total: f64 = buckets.iter().map(|(_, _, w)| w).sum();
        if total <= 0.0 {
            return (buckets[0].0, buckets[0].1);
        }
        let mut remaining = self.rng.random_range(0.0..total);
        for &(min, max, weight) in buckets {
            if remaining < weight {
                return (min, max);
            }
            remaining -= weight;
        }
        let last = buckets[buckets.len() - 1];
        (last.0, last.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let config = TrafficConfig::default();
        let first = TrafficGenerator::new(42).generate(&config);
        let second = TrafficGenerator::new(42).generate(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = TrafficConfig::default();
        let first = TrafficGenerator::new(42).generate(&config);
        let second = TrafficGenerator::new(43).generate(&config);
        assert_ne!(first, second);
    }

    #[test]
    fn test_sequence_is_well_formed() {
        let config = TrafficConfig {
            packets: 200,
            ..TrafficConfig::default()
        };
        let packets = TrafficGenerator::new(7).generate(&config);
        assert_eq!(packets.len(), 200);

        let mut previous_arrival = 0.0;
        for (position, packet) in packets.iter().enumerate() {
            assert_eq!(packet.id, position as PacketId);
            assert!(packet.arrival_time >= previous_arrival);
            assert!(packet.size > 0);
            assert!(packet.service_time > 0.0);
            previous_arrival = packet.arrival_time;
        }
    }

    #[test]
    fn test_priority_weights_are_respected() {
        let config = TrafficConfig {
            packets: 100,
            priority_weights: vec![(1, 1.0), (2, 0.0), (3, 0.0)],
            ..TrafficConfig::default()
        };
        let packets = TrafficGenerator::new(42).generate(&config);
        assert!(packets.iter().all(|p| p.priority == 1));
    }

    #[test]
    fn test_high_priority_ratio_helper() {
        let config = TrafficConfig::default().with_high_priority_ratio(0.2);
        let high = config
            .priority_weights
            .iter()
            .find(|(p, _)| *p == 3)
            .unwrap()
            .1;
        assert!((high - 0.2).abs() < 1e-12);
        let total: f64 = config.priority_weights.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bursty_traffic_clusters_arrivals() {
        let config = TrafficConfig {
            packets: 64,
            arrival_rate: 2.0,
            model: TrafficModel::Bursty {
                burst_size: 8,
                intra_gap: 0.01,
            },
            ..TrafficConfig::default()
        };
        let packets = TrafficGenerator::new(42).generate(&config);

        // Gaps inside a burst are exactly the configured spacing.
        let intra_gaps = packets
            .windows(2)
            .enumerate()
            .filter(|(i, _)| (i + 1) % 8 != 0)
            .map(|(_, pair)| pair[1].arrival_time - pair[0].arrival_time);
        for gap in intra_gaps {
            assert!((gap - 0.01).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ids_continue_across_generate_calls() {
        let config = TrafficConfig {
            packets: 10,
            ..TrafficConfig::default()
        };
        let mut generator = TrafficGenerator::new(42);
        let first = generator.generate(&config);
        let second = generator.generate(&config);
        assert_eq!(first.last().unwrap().id, 9);
        assert_eq!(second.first().unwrap().id, 10);
    }
}
