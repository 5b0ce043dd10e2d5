//! Agent 运行结果：外部 Agent 运行时完成一次运行后交回的条目列表与用量

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolOutput;

/// 运行中产生的单个条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunItem {
    /// 模型发起的工具调用
    ToolCall {
        agent: String,
        name: String,
        arguments: Value,
    },
    /// 工具调用的返回
    ToolCallOutput { agent: String, output: Value },
    /// 面向用户的消息
    Message { agent: String, content: String },
    /// 推理摘要
    Reasoning { agent: String, summary: String },
    /// Agent 之间的交接
    Handoff { from: String, to: String },
}

/// Token 用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct RunResult {
    pub final_output: ToolOutput,
    pub new_items: Vec<RunItem>,
    /// 最后处理的 Agent（发生交接时与起始 Agent 不同）
    pub last_agent: Option<String>,
    pub usage: Usage,
}
