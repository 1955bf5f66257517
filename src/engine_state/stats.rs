//! Counters reported by the streaming driver.

use std::time::Duration;

use super::streaming::ReconcileReport;

/// What a single [`tick`](super::StreamingEngine::tick) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Meshes uploaded to their renderers
    pub meshes_applied: usize,
    /// Results dropped because their renderer or chunk moved on
    pub stale_results: usize,
    /// Failed builds queued to run again
    pub retries_queued: usize,
    /// Builds given up on after repeated failures
    pub builds_abandoned: usize,
    /// The reconciliation run this tick, if any
    pub cycle: Option<ReconcileReport>,
    /// Mesh tasks still outstanding after the tick
    pub in_flight: usize,
}

/// Totals since the engine was created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Reconciliation cycles run
    pub cycles: u64,
    /// Chunks generated
    pub chunks_created: u64,
    /// Chunks evicted
    pub chunks_evicted: u64,
    /// Renderers reassigned from the pool
    pub renderers_recycled: u64,
    /// Renderers created
    pub renderers_spawned: u64,
    /// Renderers hidden for lack of a chunk
    pub renderers_parked: u64,
    /// Kept chunks re-meshed because a face neighbour came or went
    pub chunks_rebuilt: u64,
    /// Meshes built and applied
    pub meshes_built: u64,
    /// Mesh builds retried after a transient failure
    pub mesh_retries: u64,
    /// Mesh builds abandoned after exhausting their retries
    pub meshes_abandoned: u64,
    /// Wall time of the most recent plan and reconcile
    pub last_cycle_duration: Duration,
}

impl StreamingStats {
    /// Folds one reconciliation into the totals.
    pub fn record_cycle(&mut self, report: &ReconcileReport, duration: Duration) {
        self.cycles += 1;
        self.chunks_created += report.created as u64;
        self.chunks_evicted += report.evicted as u64;
        self.renderers_recycled += report.recycled as u64;
        self.renderers_spawned += report.spawned as u64;
        self.renderers_parked += report.parked as u64;
        self.chunks_rebuilt += report.rebuilt as u64;
        self.last_cycle_duration = duration;
    }
}
