//! Background job scheduler and job implementations.

mod auto_escalate;
mod pool_metrics;
mod scheduler;

pub use auto_escalate::AutoEscalateJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::JobScheduler;
