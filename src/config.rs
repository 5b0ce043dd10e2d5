//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `DURABLE__*` 覆盖（双下划线表示嵌套，如 `DURABLE__RUN__DEFAULT_MODEL=gpt-4o-mini`）。

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub steps: StepsSection,
    pub run: RunSection,
    pub tools: ToolsSection,
    pub pricing: PricingSection,
}

/// [steps] 段：步骤 ID 命名
#[derive(Debug, Clone, Deserialize)]
pub struct StepsSection {
    /// 工具步骤 ID 前缀，步骤 ID 为 `{prefix}{tool name}`
    #[serde(default = "default_tool_step_prefix")]
    pub tool_step_prefix: String,
    /// 运行统计步骤 ID
    #[serde(default = "default_run_stats_step_id")]
    pub run_stats_step_id: String,
}

impl Default for StepsSection {
    fn default() -> Self {
        Self {
            tool_step_prefix: default_tool_step_prefix(),
            run_stats_step_id: default_run_stats_step_id(),
        }
    }
}

fn default_tool_step_prefix() -> String {
    "tool_".to_string()
}

fn default_run_stats_step_id() -> String {
    "run_stats".to_string()
}

/// [run] 段：统计与计费使用的模型名
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            default_model: default_model(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

/// [tools] 段
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// [pricing] 段：按模型的 token 单价；为空时不计算费用
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PricingSection {
    #[serde(default)]
    pub models: HashMap<String, ModelPrice>,
}

/// 单个模型的价格（美元 / 百万 token）
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// 从 config 目录加载配置，环境变量 DURABLE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 DURABLE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        if std::path::Path::new(&format!("{name}.toml")).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("DURABLE")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
