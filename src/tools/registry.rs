//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / execute），由 ToolRegistry 按名注册与查找；
//! into_durable 把注册表内的全部工具包装为持久化步骤。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::StepError;
use crate::tools::{DurableTool, ToolOutput};

/// 工具报告的错误
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// 已明确不可重试，包装器原样透传，不再二次包装
    #[error("{0}")]
    NonRetriable(String),

    /// 编排器步骤能力自身的错误（不是工具失败），原样交回编排器
    #[error(transparent)]
    Step(StepError),
}

impl PartialEq for ToolError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ToolError::Failed(a), ToolError::Failed(b))
            | (ToolError::InvalidArgs(a), ToolError::InvalidArgs(b))
            | (ToolError::NonRetriable(a), ToolError::NonRetriable(b)) => a == b,
            (ToolError::Step(a), ToolError::Step(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<String> for ToolError {
    fn from(msg: String) -> Self {
        ToolError::Failed(msg)
    }
}

impl From<&str> for ToolError {
    fn from(msg: &str) -> Self {
        ToolError::Failed(msg.to_string())
    }
}

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称，也是步骤 ID 的后缀
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认返回空对象，表示无参数或参数格式不限
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// 返回 (name, description) 列表
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| {
                let description = self.tools.get(&name)?.description().to_string();
                Some((name, description))
            })
            .collect()
    }

    /// 工具 schema JSON（name / description / parameters），交给外部 Agent 运行时
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .tool_names()
            .into_iter()
            .filter_map(|name| self.tools.get(&name).map(|tool| (name, tool)))
            .map(|(name, tool)| {
                serde_json::json!({
                    "name": name,
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }

    /// 将所有工具包装为持久化步骤，步骤 ID 为 `{prefix}{name}`
    pub fn into_durable(self, step_prefix: &str) -> ToolRegistry {
        let tools = self
            .tools
            .into_iter()
            .map(|(name, tool)| {
                let wrapped: Arc<dyn Tool> =
                    Arc::new(DurableTool::from_arc(tool).with_step_prefix(step_prefix));
                (name, wrapped)
            })
            .collect();
        ToolRegistry { tools }
    }
}
