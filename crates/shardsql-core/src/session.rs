use crate::trace::CompileTraceSink;
use serde::{Deserialize, Serialize};

///
/// PartitionConfig
///
/// Partition counts supplied by session/deployment configuration.
/// The router never defaults these; an unconstrained sharded table is
/// a route error, not partition 0.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PartitionConfig {
    /// Number of physical databases.
    pub db_count: usize,
    /// Number of physical tables per database for sharded tables.
    pub tables_per_db: usize,
}

impl PartitionConfig {
    #[must_use]
    pub const fn new(db_count: usize, tables_per_db: usize) -> Self {
        Self {
            db_count,
            tables_per_db,
        }
    }

    /// Single database, single table: the unsharded deployment.
    #[must_use]
    pub const fn single() -> Self {
        Self::new(1, 1)
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self::single()
    }
}

///
/// SessionOptions
///
/// Per-session compilation inputs: partition layout plus the optional
/// compile trace sink. Cheap to copy; one instance may serve many
/// concurrent compilations.
///

#[derive(Clone, Copy, Default)]
pub struct SessionOptions {
    pub partitions: PartitionConfig,
    pub trace: Option<&'static dyn CompileTraceSink>,
}

impl SessionOptions {
    #[must_use]
    pub const fn new(partitions: PartitionConfig) -> Self {
        Self {
            partitions,
            trace: None,
        }
    }

    #[must_use]
    pub const fn with_trace(mut self, sink: &'static dyn CompileTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }
}
