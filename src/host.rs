//! 宿主调用流程
//!
//! 编排器函数处理器的典型写法：安装步骤句柄 → 调用外部 Agent 运行时（其工具已用 as_step 包装）
//! → 对运行结果收尾并记录统计步骤。

use async_trait::async_trait;

use crate::context::with_step;
use crate::core::StepError;
use crate::run::{FinalizedRun, RunFinalizer, RunResult};
use crate::step::StepHandle;

/// 外部 Agent 运行时
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// 起始 Agent 名称
    fn starting_agent(&self) -> &str;

    async fn run(&self, input: &str) -> Result<RunResult, StepError>;
}

/// 在步骤句柄下运行 Agent 并收尾
pub async fn run_durable(
    step: StepHandle,
    runner: &dyn AgentRunner,
    input: &str,
    finalizer: &RunFinalizer,
) -> Result<FinalizedRun, StepError> {
    with_step(step, async {
        tracing::debug!(agent = %runner.starting_agent(), "agent run started");
        let result = runner.run(input).await?;
        finalizer.finalize(&result, runner.starting_agent()).await
    })
    .await
}
