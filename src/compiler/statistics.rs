use std::fmt;
use std::time::Duration;

/// Statistics of a compilation or rewriting run
///
/// The field order is part of the engine boundary and must not change.
/// Timings are in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct CompilerStatistics {
    /// Number of e-classes after saturation
    pub egraph_classes: u64,
    /// Number of e-nodes after saturation
    pub egraph_nodes: u64,
    /// Size of the e-graph hashcons after saturation
    pub egraph_size: u64,

    /// Length of the compiled program, or [`CompilerStatistics::NO_PROGRAM`] in rewrite mode
    pub instruction_count: u64,

    /// Time spent saturating the e-graph
    pub t_runner: u64,
    /// Time spent extracting the best network from the e-graph
    pub t_extractor: u64,
    /// Time spent in the whole engine call
    pub t_compiler: u64,
}

/// Size metrics of an e-graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EGraphMetrics {
    /// Number of e-classes
    pub classes: usize,
    /// Number of e-nodes
    pub nodes: usize,
    /// Size of the hashcons
    pub size: usize,
}

/// Time spent in each phase of an engine call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Saturation
    pub runner: Duration,
    /// Extraction
    pub extractor: Duration,
    /// Whole call
    pub compiler: Duration,
}

fn to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl CompilerStatistics {
    /// Value of `instruction_count` when no program was compiled
    pub const NO_PROGRAM: u64 = u64::MAX;

    /// Gather e-graph metrics and phase timings in a single record
    ///
    /// The instruction count is None in rewrite mode.
    pub fn aggregate(
        metrics: EGraphMetrics,
        instruction_count: Option<usize>,
        timings: PhaseTimings,
    ) -> CompilerStatistics {
        CompilerStatistics {
            egraph_classes: metrics.classes as u64,
            egraph_nodes: metrics.nodes as u64,
            egraph_size: metrics.size as u64,
            instruction_count: instruction_count.map_or(Self::NO_PROGRAM, |n| n as u64),
            t_runner: to_nanos(timings.runner),
            t_extractor: to_nanos(timings.extractor),
            t_compiler: to_nanos(timings.compiler),
        }
    }

    /// Length of the compiled program, if one was compiled
    pub fn instructions(&self) -> Option<u64> {
        if self.instruction_count == Self::NO_PROGRAM {
            None
        } else {
            Some(self.instruction_count)
        }
    }

    /// Time spent saturating the e-graph
    pub fn runner_time(&self) -> Duration {
        Duration::from_nanos(self.t_runner)
    }

    /// Time spent extracting the best network
    pub fn extractor_time(&self) -> Duration {
        Duration::from_nanos(self.t_extractor)
    }

    /// Time spent in the whole engine call
    pub fn compiler_time(&self) -> Duration {
        Duration::from_nanos(self.t_compiler)
    }
}

impl fmt::Display for CompilerStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Compiler statistics:")?;
        writeln!(f, "  E-classes: {}", self.egraph_classes)?;
        writeln!(f, "  E-nodes: {}", self.egraph_nodes)?;
        writeln!(f, "  E-graph size: {}", self.egraph_size)?;
        if let Some(n) = self.instructions() {
            writeln!(f, "  Instructions: {}", n)?;
        }
        writeln!(f, "  t_runner: {:?}", self.runner_time())?;
        writeln!(f, "  t_extractor: {:?}", self.extractor_time())?;
        writeln!(f, "  t_compiler: {:?}", self.compiler_time())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CompilerStatistics, EGraphMetrics, PhaseTimings};

    #[test]
    fn test_aggregate() {
        let s = CompilerStatistics::aggregate(
            EGraphMetrics {
                classes: 3,
                nodes: 5,
                size: 6,
            },
            Some(12),
            PhaseTimings {
                runner: Duration::from_micros(2),
                extractor: Duration::from_nanos(300),
                compiler: Duration::from_millis(1),
            },
        );
        assert_eq!(s.egraph_classes, 3);
        assert_eq!(s.egraph_nodes, 5);
        assert_eq!(s.egraph_size, 6);
        assert_eq!(s.instruction_count, 12);
        assert_eq!(s.t_runner, 2_000);
        assert_eq!(s.t_extractor, 300);
        assert_eq!(s.t_compiler, 1_000_000);
        assert_eq!(s.extractor_time(), Duration::from_nanos(300));
        assert_eq!(s.instructions(), Some(12));

        let r = CompilerStatistics::aggregate(
            EGraphMetrics::default(),
            None,
            PhaseTimings::default(),
        );
        assert_eq!(r.instruction_count, CompilerStatistics::NO_PROGRAM);
        assert_eq!(r.instructions(), None);
        assert!(!r.to_string().contains("Instructions"));
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<CompilerStatistics>(), 7 * 8);
        assert_eq!(CompilerStatistics::default().t_compiler, 0);
    }
}
