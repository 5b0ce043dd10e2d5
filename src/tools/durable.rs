//! 持久化工具包装
//!
//! as_step(tool) 返回同名、同描述、同 schema 的 DurableTool：
//! 有步骤句柄时，整次工具调用作为步骤 `tool_{name}` 执行，编排器保存 {input, output} 完整记录，
//! Agent 只拿到 output；重试时已完成的调用直接回放。没有句柄时直接执行。
//! 工具的任何失败都转为不可重试错误，防止编排器无限重试带副作用的调用；
//! 编排器步骤能力自身返回的错误不属于工具失败，原样透传。

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::Value;

use crate::context::get_step;
use crate::core::StepError;
use crate::tools::{shape_value, Tool, ToolError, ToolOutput, ToolStepRecord};

/// 默认步骤 ID 前缀
pub const DEFAULT_STEP_PREFIX: &str = "tool_";

/// 把工具包装为持久化步骤
pub fn as_step(tool: impl Tool + 'static) -> DurableTool {
    DurableTool::from_arc(Arc::new(tool))
}

/// 持久化工具：Tool 的装饰器
pub struct DurableTool {
    inner: Arc<dyn Tool>,
    step_prefix: String,
}

impl DurableTool {
    pub fn from_arc(inner: Arc<dyn Tool>) -> Self {
        Self {
            inner,
            step_prefix: DEFAULT_STEP_PREFIX.to_string(),
        }
    }

    pub fn with_step_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.step_prefix = prefix.into();
        self
    }

    pub fn step_id(&self) -> String {
        format!("{}{}", self.step_prefix, self.inner.name())
    }

    /// 执行工具并返回 output；错误以 StepError 形式交给宿主 / 编排器
    pub async fn invoke(&self, args: Value) -> Result<ToolOutput, StepError> {
        let op = execute_recorded(Arc::clone(&self.inner), args);

        match get_step() {
            Some(step) => {
                let step_id = self.step_id();
                let op = async move { Ok::<_, StepError>(serde_json::to_value(op.await?)?) }.boxed();
                let stored = step.run(&step_id, op).await?;
                let output = match stored {
                    Some(value) => serde_json::from_value::<ToolStepRecord>(value)?.output,
                    None => Value::Null,
                };
                Ok(ToolOutput::from_value(output))
            }
            None => Ok(ToolOutput::from_value(op.await?.output)),
        }
    }
}

/// 执行内部工具并整形为 {input, output}；失败统一转为不可重试错误
async fn execute_recorded(tool: Arc<dyn Tool>, args: Value) -> Result<ToolStepRecord, StepError> {
    let input = shape_value(args.clone());
    match tool.execute(args).await {
        Ok(output) => Ok(ToolStepRecord {
            input,
            output: output.into_value(),
        }),
        Err(e) => Err(translate_tool_error(tool.name(), e)),
    }
}

/// 工具错误 → 步骤错误：已是 NonRetriable 的原样透传，编排器自身的错误原样交回，
/// 其余包装为不可重试的 "{name} failed: {e}"
pub fn translate_tool_error(tool_name: &str, err: ToolError) -> StepError {
    match err {
        ToolError::NonRetriable(msg) => StepError::NonRetriable(msg),
        ToolError::Step(step_err) => step_err,
        other => StepError::NonRetriable(format!("{tool_name} failed: {other}")),
    }
}

impl From<StepError> for ToolError {
    fn from(err: StepError) -> Self {
        match err {
            StepError::NonRetriable(msg) => ToolError::NonRetriable(msg),
            other => ToolError::Step(other),
        }
    }
}

#[async_trait]
impl Tool for DurableTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> Value {
        self.inner.parameters_schema()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.invoke(args).await.map_err(ToolError::from)
    }
}
