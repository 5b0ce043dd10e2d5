//! 步骤错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 StepError 决定交给编排器重试（Retry）还是直接终止（Abort）。

use thiserror::Error;

/// 持久化步骤执行过程中可能出现的错误（工具失败、超时、序列化等）
#[derive(Error, Debug)]
pub enum StepError {
    /// 不可重试：编排器收到后直接让本次运行失败，避免无限重试
    #[error("{0}")]
    NonRetriable(String),

    /// 可重试：交由编排器按其策略重新调度
    #[error("Retriable step failure: {0}")]
    Retriable(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// 步骤结果无法序列化 / 反序列化为 JSON
    #[error("Step serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl StepError {
    pub fn is_non_retriable(&self) -> bool {
        matches!(self, StepError::NonRetriable(_))
    }
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// 让编排器重新执行本次运行（已完成的步骤会被回放而不是重跑）
    Retry,
    /// 终止本次运行
    Abort,
}
