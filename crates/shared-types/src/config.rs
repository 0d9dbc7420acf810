//! # Shared Configuration Enums
//!
//! Settings threaded through subsystem constructors. There is no ambient
//! configuration: a validator holds exactly the settings it was built with,
//! which keeps behavior deterministic and testable in isolation.

use serde::{Deserialize, Serialize};

/// How many worker threads CPU-heavy verification may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThreadParallelism {
    Single,
    Half,
    ThreeQuarter,
    #[default]
    Full,
}

impl ThreadParallelism {
    /// Resolve to a concrete thread count for the given number of cores.
    /// Always at least one.
    pub fn thread_count(self, available_cores: usize) -> usize {
        let cores = available_cores.max(1);
        match self {
            Self::Single => 1,
            Self::Half => (cores / 2).max(1),
            Self::ThreeQuarter => (cores * 3 / 4).max(1),
            Self::Full => cores,
        }
    }
}

/// Whether presentation envelopes are accepted from gossip peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GossipPresentationPolicy {
    #[default]
    Allow,
    Deny,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_counts_never_zero() {
        for parallelism in [
            ThreadParallelism::Single,
            ThreadParallelism::Half,
            ThreadParallelism::ThreeQuarter,
            ThreadParallelism::Full,
        ] {
            assert!(parallelism.thread_count(1) >= 1);
            assert!(parallelism.thread_count(0) >= 1);
        }
    }

    #[test]
    fn thread_counts_scale_with_cores() {
        assert_eq!(ThreadParallelism::Single.thread_count(8), 1);
        assert_eq!(ThreadParallelism::Half.thread_count(8), 4);
        assert_eq!(ThreadParallelism::ThreeQuarter.thread_count(8), 6);
        assert_eq!(ThreadParallelism::Full.thread_count(8), 8);
    }
}
