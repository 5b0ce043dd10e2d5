//! 工具结果与步骤记录整形
//!
//! 编排器只存 JSON：文本结果若本身是合法 JSON 则解析后存储（在编排器界面中更易读），
//! 结构化结果（任意 serde 数据模型）直接转为 JSON 值。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolError;

/// 工具返回值
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
}

impl ToolOutput {
    /// 由任意可序列化的数据模型构造结构化结果
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_value(value)
            .map(ToolOutput::Json)
            .map_err(|e| ToolError::Failed(format!("unserializable tool result: {e}")))
    }

    /// 转为步骤中存储的 JSON 值
    pub fn into_value(self) -> Value {
        match self {
            ToolOutput::Text(s) => shape_text(s),
            ToolOutput::Json(v) => v,
        }
    }

    /// 从步骤记录还原：JSON 字符串还原为 Text，其余为 Json
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => ToolOutput::Text(s),
            other => ToolOutput::Json(other),
        }
    }

    /// 交给 Agent 的文本形式
    pub fn to_text(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            ToolOutput::Json(v) => v.to_string(),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(s: String) -> Self {
        ToolOutput::Text(s)
    }
}

impl From<&str> for ToolOutput {
    fn from(s: &str) -> Self {
        ToolOutput::Text(s.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(v: Value) -> Self {
        ToolOutput::Json(v)
    }
}

/// 一次工具调用在编排器中的完整记录：输入与输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStepRecord {
    pub input: Value,
    pub output: Value,
}

/// 整形任意 JSON 值：字符串尝试按 JSON 解析，解析失败保持原样，其它值不变
pub fn shape_value(value: Value) -> Value {
    match value {
        Value::String(s) => shape_text(s),
        other => other,
    }
}

fn shape_text(s: String) -> Value {
    serde_json::from_str(&s).unwrap_or(Value::String(s))
}
