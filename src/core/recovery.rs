//! 错误恢复引擎
//!
//! 根据 StepError 类型返回 RecoveryAction，供宿主决定是把失败交给编排器重试，还是直接终止。

use crate::core::{RecoveryAction, StepError};

/// 语义化错误恢复：将步骤错误映射为重试 / 终止
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, err: &StepError) -> RecoveryAction {
        match err {
            StepError::Retriable(_) | StepError::ToolTimeout(_) => RecoveryAction::Retry,
            StepError::NonRetriable(_)
            | StepError::UnknownTool(_)
            | StepError::Serialization(_)
            | StepError::Config(_) => RecoveryAction::Abort,
        }
    }
}
