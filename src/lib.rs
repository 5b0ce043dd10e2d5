//! durable-agents - Agent 工具调用的持久化执行
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **context**: 环境执行上下文（task_local 步骤句柄）
//! - **core**: 步骤错误与恢复动作
//! - **host**: 宿主调用流程（安装句柄 → 运行 Agent → 收尾）
//! - **observability**: tracing 日志初始化
//! - **run**: 运行结果、统计与费用估算
//! - **step**: 编排器步骤能力抽象、durable()、进程内步骤日志
//! - **tools**: 工具 trait、持久化包装、注册表与执行器

pub mod config;
pub mod context;
pub mod core;
pub mod host;
pub mod observability;
pub mod run;
pub mod step;
pub mod tools;

pub use crate::context::{get_step, spawn_with_step, with_step};
pub use crate::core::{RecoveryAction, RecoveryEngine, StepError};
pub use crate::host::{run_durable, AgentRunner};
pub use crate::run::{finalize_run, FinalizedRun, RunFinalizer, RunStats};
pub use crate::step::{durable, MemoStepRunner, StepHandle, StepRunner};
pub use crate::tools::{as_step, DurableTool, Tool, ToolError, ToolOutput};
