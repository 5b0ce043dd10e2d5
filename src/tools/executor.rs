//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时，execute(tool_name, args) 在超时内调用工具，
//! 超时或失败时转为 StepError（ToolTimeout / NonRetriable），编排器自身的错误原样返回；
//! 每次调用输出结构化审计日志（JSON）。
//! execute_all 在当前执行内并发调用一批工具，所有调用都能看到已安装的步骤句柄。

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::config::AppConfig;
use crate::core::StepError;
use crate::tools::{translate_tool_error, ToolOutput, ToolRegistry};

/// 一次待执行的工具调用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// 工具执行器：对每次调用施加超时，并将结果映射为 StepError
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 按配置把注册表内工具全部包装为持久化步骤，并使用配置中的超时
    pub fn from_config(registry: ToolRegistry, cfg: &AppConfig) -> Self {
        Self::new(
            registry.into_durable(&cfg.steps.tool_step_prefix),
            cfg.tools.tool_timeout_secs,
        )
    }

    pub async fn execute(
        &self,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Result<ToolOutput, StepError> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| StepError::UnknownTool(tool_name.to_string()))?;

        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, tool.execute(args)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "durable": crate::context::get_step().is_some(),
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(translate_tool_error(tool_name, e)),
            Err(_) => Err(StepError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 并发执行一批调用，结果顺序与输入一致
    pub async fn execute_all(
        &self,
        calls: Vec<ToolInvocation>,
    ) -> Vec<Result<ToolOutput, StepError>> {
        join_all(
            calls
                .into_iter()
                .map(|call| async move { self.execute(&call.name, call.arguments).await }),
        )
        .await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
