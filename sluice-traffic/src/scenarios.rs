//! Pre-built traffic shapes modelling recognizable workloads.
//!
//! Each scenario produces a deterministic packet sequence for a seed. The
//! priority field doubles as the flow identity (one priority level per
//! traffic source), matching the default priority-as-flow classifier.

use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sluice_core::packet::PacketArrival;

/// A canned traffic scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Three users exchanging small, very bursty text messages.
    MessageTexting,
    /// An HD and an SD stream demanding continuous bandwidth.
    VideoStreaming,
    /// Three conference participants mixing small audio and larger video
    /// packets, all latency sensitive.
    OnlineMeeting,
    /// One aggressive bulk download competing with two background tasks.
    FileDownload,
    /// Two elephant downloads against ten sporadic mice flows; the shape
    /// least-attained-service scheduling is built for.
    MiceAndElephants,
}

impl Scenario {
    /// All scenarios, in presentation order.
    pub fn all() -> [Scenario; 5] {
        [
            Scenario::MessageTexting,
            Scenario::VideoStreaming,
            Scenario::OnlineMeeting,
            Scenario::FileDownload,
            Scenario::MiceAndElephants,
        ]
    }

    /// Short identifier used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::MessageTexting => "message-texting",
            Scenario::VideoStreaming => "video-streaming",
            Scenario::OnlineMeeting => "online-meeting",
            Scenario::FileDownload => "file-download",
            Scenario::MiceAndElephants => "mice-and-elephants",
        }
    }

    /// Buffer capacity the scenario is tuned to stress.
    pub fn recommended_capacity(&self) -> usize {
        match self {
            Scenario::MessageTexting => 15,
            Scenario::VideoStreaming => 25,
            Scenario::OnlineMeeting => 30,
            Scenario::FileDownload => 20,
            Scenario::MiceAndElephants => 25,
        }
    }

    /// Generates the scenario's packet sequence for a seed.
    pub fn traffic(&self, seed: u64) -> Vec<PacketArrival> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut draft: Vec<(f64, u8, u32, f64)> = Vec::new();

        match self {
            Scenario::MessageTexting => {
                // Three users; each sends 5-15 small messages in a burst.
                for user in 1..=3u8 {
                    let messages = rng.random_range(5..=15);
                    let base = rng.random_range(0.0..2.0);
                    let mut at = base;
                    for _ in 0..messages {
                        at += rng.random_range(0.1..0.5);
                        draft.push((
                            at,
                            user,
                            rng.random_range(100..=500),
                            rng.random_range(0.01..0.05),
                        ));
                    }
                }
            }
            Scenario::VideoStreaming => {
                // HD stream: more packets, larger chunks.
                for i in 0..50 {
                    draft.push((
                        i as f64 * 0.1,
                        1,
                        rng.random_range(3000..=5000),
                        rng.random_range(0.3..0.5),
                    ));
                }
                // SD stream: fewer, smaller, offset slightly.
                for i in 0..30 {
                    draft.push((
                        i as f64 * 0.15 + 0.05,
                        2,
                        rng.random_range(1000..=2000),
                        rng.random_range(0.1..0.2),
                    ));
                }
            }
            Scenario::OnlineMeeting => {
                for participant in 1..=3u8 {
                    // Audio: small and frequent.
                    for i in 0..30 {
                        draft.push((
                            i as f64 * 0.05 + f64::from(participant) * 0.01,
                            participant,
                            rng.random_range(200..=400),
                            rng.random_range(0.02..0.05),
                        ));
                    }
                    // Video: larger, less frequent.
                    for i in 0..15 {
                        draft.push((
                            i as f64 * 0.2 + f64::from(participant) * 0.02,
                            participant,
                            rng.random_range(1500..=3000),
                            rng.random_range(0.1..0.2),
                        ));
                    }
                }
            }
            Scenario::FileDownload => {
                // The download: aggressive, large, fast-arriving.
                for i in 0..60 {
                    draft.push((
                        i as f64 * 0.05,
                        1,
                        rng.random_range(4000..=5000),
                        rng.random_range(0.4..0.6),
                    ));
                }
                // Two occasional background tasks.
                for i in 0..15 {
                    draft.push((
                        i as f64 * 0.3 + 0.1,
                        2,
                        rng.random_range(500..=1000),
                        rng.random_range(0.05..0.1),
                    ));
                }
                for i in 0..10 {
                    draft.push((
                        i as f64 * 0.4 + 0.2,
                        3,
                        rng.random_range(500..=1000),
                        rng.random_range(0.05..0.1),
                    ));
                }
            }
            Scenario::MiceAndElephants => {
                // Elephant 1: continuous from the start.
                for i in 0..40 {
                    draft.push((
                        i as f64 * 0.08,
                        1,
                        rng.random_range(4000..=5000),
                        rng.random_range(0.4..0.6),
                    ));
                }
                // Elephant 2: joins half a second later.
                for i in 0..35 {
                    draft.push((
                        i as f64 * 0.09 + 0.5,
                        2,
                        rng.random_range(4000..=5000),
                        rng.random_range(0.4..0.6),
                    ));
                }
                // Ten mice, each a handful of tiny requests.
                for mouse in 3..=12u8 {
                    let requests = rng.random_range(2..=4);
                    let start = rng.random_range(0.2..2.5);
                    for i in 0..requests {
                        draft.push((
                            start + i as f64 * 0.02,
                            mouse,
                            rng.random_range(200..=500),
                            rng.random_range(0.02..0.05),
                        ));
                    }
                }
            }
        }

        // Interleave the sources into arrival order, then number
        // sequentially so ids satisfy the engine's monotonicity checks.
        draft.sort_by(|a, b| a.0.total_cmp(&b.0));
        draft
            .into_iter()
            .enumerate()
            .map(|(id, (arrival_time, priority, size, service_time))| PacketArrival {
                id: id as u64,
                arrival_time,
                size,
                priority,
                flow_key: None,
                service_time,
            })
            .collect()
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "message-texting" | "texting" => Ok(Scenario::MessageTexting),
            "video-streaming" | "streaming" => Ok(Scenario::VideoStreaming),
            "online-meeting" | "meeting" => Ok(Scenario::OnlineMeeting),
            "file-download" | "download" => Ok(Scenario::FileDownload),
            "mice-and-elephants" | "mice" => Ok(Scenario::MiceAndElephants),
            _ => Err(format!("unknown scenario: {s}")),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenarios_produce_well_formed_sequences() {
        for scenario in Scenario::all() {
            let packets = scenario.traffic(42);
            assert!(!packets.is_empty(), "{scenario} generated nothing");

            let mut previous = 0.0;
            for (position, packet) in packets.iter().enumerate() {
                assert_eq!(packet.id, position as u64);
                assert!(packet.arrival_time >= previous);
                assert!(packet.size > 0);
                assert!(packet.service_time > 0.0);
                previous = packet.arrival_time;
            }
        }
    }

    #[test]
    fn test_scenarios_are_deterministic() {
        for scenario in Scenario::all() {
            assert_eq!(scenario.traffic(42), scenario.traffic(42));
        }
    }

    #[test]
    fn test_mice_and_elephants_flow_mix() {
        let packets = Scenario::MiceAndElephants.traffic(42);
        let elephants = packets.iter().filter(|p| p.priority <= 2).count();
        let mice = packets.iter().filter(|p| p.priority >= 3).count();
        assert_eq!(elephants, 75);
        assert!((20..=40).contains(&mice));
    }

    #[test]
    fn test_name_round_trips() {
        for scenario in Scenario::all() {
            let parsed: Scenario = scenario.name().parse().unwrap();
            assert_eq!(parsed, scenario);
        }
    }
}
