//! `monitor` crate — execution lifecycle recording and read-side analytics.
//!
//! [`WorkflowMonitor`] keeps a bounded in-memory history of workflow
//! executions and answers queries over it; [`WorkflowAnalytics`] derives
//! aggregate metrics from that history on demand. Nothing here is persisted.

pub mod execution;
pub mod monitor;
pub mod analytics;

pub use execution::{
    ExecutionContextInfo, ExecutionFilter, ExecutionStatus, WorkflowExecution, WorkflowStatistics,
};
pub use monitor::WorkflowMonitor;
pub use analytics::{
    EventActivity, FailurePattern, PerformanceMetrics, RuleActivity, RuleEfficiency,
    WorkflowAnalytics,
};
