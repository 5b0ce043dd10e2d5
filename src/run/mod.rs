//! 运行收尾：运行结果类型、统计计算与费用估算

pub mod items;
pub mod pricing;
pub mod stats;

pub use items::{RunItem, RunResult, Usage};
pub use pricing::{CostEstimator, PriceTable};
pub use stats::{
    compute_run_stats, finalize_run, FinalizedRun, RunFinalizer, RunStats, DEFAULT_MODEL,
    RUN_STATS_STEP_ID,
};
