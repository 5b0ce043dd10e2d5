//! 测试用的编排器替身：一个总是报错，一个总是回放固定记录（从不执行 op）

use async_trait::async_trait;
use serde_json::Value;

use crate::core::StepError;
use crate::step::{StepFuture, StepRunner};

/// 编排器自身失败（如被抢占、连接中断），返回可重试错误
pub(crate) struct FailingRunner {
    message: String,
}

impl FailingRunner {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl StepRunner for FailingRunner {
    fn run_id(&self) -> &str {
        "run_failing"
    }

    async fn run(&self, _step_id: &str, _op: StepFuture) -> Result<Option<Value>, StepError> {
        Err(StepError::Retriable(self.message.clone()))
    }
}

/// 每个步骤都已有记录：直接返回 recorded，op 被丢弃
pub(crate) struct ReplayRunner {
    recorded: Value,
}

impl ReplayRunner {
    pub(crate) fn new(recorded: Value) -> Self {
        Self { recorded }
    }
}

#[async_trait]
impl StepRunner for ReplayRunner {
    fn run_id(&self) -> &str {
        "run_replay"
    }

    async fn run(&self, _step_id: &str, _op: StepFuture) -> Result<Option<Value>, StepError> {
        Ok(Some(self.recorded.clone()))
    }
}
