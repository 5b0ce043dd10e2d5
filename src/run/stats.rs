//! 运行统计与收尾
//!
//! Agent 运行结束后调用 finalize：汇总工具调用、消息、推理步数、Token 与费用，
//! 在有步骤句柄时额外记录一个 `run_stats` 步骤，便于在编排器中查看整次运行的概况。

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AppConfig;
use crate::context::get_step;
use crate::core::StepError;
use crate::run::{CostEstimator, PriceTable, RunItem, RunResult};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const RUN_STATS_STEP_ID: &str = "run_stats";

/// 一次运行的汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_tool_calls: usize,
    pub total_messages: usize,
    pub total_reasoning_steps: usize,
    pub total_items: usize,
    pub agents_involved: Vec<String>,
    pub num_agents: usize,
    pub starting_agent: String,
    pub final_agent: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: Option<f64>,
    pub model: String,
}

/// 收尾后的运行：最终输出（已整形为 JSON）+ 统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedRun {
    pub final_output: Value,
    pub stats: RunStats,
}

/// 计算统计；pricing 缺省时费用为 None
pub fn compute_run_stats(
    result: &RunResult,
    starting_agent: &str,
    model: &str,
    pricing: Option<&dyn CostEstimator>,
) -> RunStats {
    let mut tool_calls = 0;
    let mut messages = 0;
    let mut reasoning_steps = 0;
    for item in &result.new_items {
        match item {
            RunItem::ToolCall { .. } => tool_calls += 1,
            RunItem::Message { .. } => messages += 1,
            RunItem::Reasoning { .. } => reasoning_steps += 1,
            RunItem::ToolCallOutput { .. } | RunItem::Handoff { .. } => {}
        }
    }

    let final_agent = result
        .last_agent
        .clone()
        .unwrap_or_else(|| starting_agent.to_string());
    let agents: BTreeSet<&str> = [starting_agent, final_agent.as_str()].into_iter().collect();
    let agents_involved: Vec<String> = agents.into_iter().map(str::to_string).collect();

    let input_tokens = result.usage.input_tokens;
    let output_tokens = result.usage.output_tokens;

    RunStats {
        total_tool_calls: tool_calls,
        total_messages: messages,
        total_reasoning_steps: reasoning_steps,
        total_items: result.new_items.len(),
        num_agents: agents_involved.len(),
        agents_involved,
        starting_agent: starting_agent.to_string(),
        final_agent,
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
        total_cost_usd: pricing.and_then(|p| p.estimate(model, input_tokens, output_tokens)),
        model: model.to_string(),
    }
}

/// 运行收尾器：模型名、统计步骤 ID、可选的费用估算
#[derive(Clone)]
pub struct RunFinalizer {
    model: String,
    step_id: String,
    pricing: Option<Arc<dyn CostEstimator>>,
}

impl Default for RunFinalizer {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            step_id: RUN_STATS_STEP_ID.to_string(),
            pricing: None,
        }
    }
}

impl RunFinalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置构建；价格表为空时不估算费用
    pub fn from_config(cfg: &AppConfig) -> Self {
        let table = PriceTable::from_config(&cfg.pricing);
        let pricing: Option<Arc<dyn CostEstimator>> = if table.is_empty() {
            None
        } else {
            Some(Arc::new(table))
        };
        Self {
            model: cfg.run.default_model.clone(),
            step_id: cfg.steps.run_stats_step_id.clone(),
            pricing,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_step_id(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = step_id.into();
        self
    }

    pub fn with_pricing(mut self, pricing: Arc<dyn CostEstimator>) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn compute_stats(&self, result: &RunResult, starting_agent: &str) -> RunStats {
        compute_run_stats(result, starting_agent, &self.model, self.pricing.as_deref())
    }

    /// 计算统计、在有句柄时记录统计步骤，返回 FinalizedRun
    pub async fn finalize(
        &self,
        result: &RunResult,
        starting_agent: &str,
    ) -> Result<FinalizedRun, StepError> {
        let stats = self.compute_stats(result, starting_agent);

        if let Some(step) = get_step() {
            let record = serde_json::to_value(&stats)?;
            step.run(&self.step_id, async move { Ok::<_, StepError>(record) }.boxed())
                .await?;
        }

        tracing::info!(
            starting_agent = %stats.starting_agent,
            final_agent = %stats.final_agent,
            tool_calls = stats.total_tool_calls,
            total_tokens = stats.total_tokens,
            cost_usd = ?stats.total_cost_usd,
            "run finalized"
        );

        Ok(FinalizedRun {
            final_output: result.final_output.clone().into_value(),
            stats,
        })
    }
}

/// 使用默认设置（gpt-4o、无费用估算）收尾
pub async fn finalize_run(
    result: &RunResult,
    starting_agent: &str,
) -> Result<FinalizedRun, StepError> {
    RunFinalizer::default().finalize(result, starting_agent).await
}
