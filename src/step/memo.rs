//! 进程内步骤日志
//!
//! MemoStepRunner 按步骤 ID 记录已完成步骤的 JSON 输出，供本地运行与测试使用：
//! 重试时由 next_attempt() 派生新的 runner，共享日志、重置出现次数计数，
//! 已记录的步骤直接回放，不再执行。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::core::StepError;
use crate::step::{StepFuture, StepRunner};

/// 日志中的一条步骤记录
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub step_id: String,
    pub output: Value,
    /// 完成时间（毫秒时间戳）
    pub completed_at: i64,
}

/// 内存步骤日志；同一次 attempt 内重复的步骤 ID 依次编号为 id、id:1、id:2 ...
pub struct MemoStepRunner {
    run_id: String,
    journal: Arc<Mutex<Vec<JournalEntry>>>,
    occurrences: Mutex<HashMap<String, usize>>,
    executed: AtomicUsize,
}

impl Default for MemoStepRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoStepRunner {
    pub fn new() -> Self {
        Self {
            run_id: format!("run_{}", uuid::Uuid::new_v4()),
            journal: Arc::new(Mutex::new(Vec::new())),
            occurrences: Mutex::new(HashMap::new()),
            executed: AtomicUsize::new(0),
        }
    }

    /// 重试：同一 run_id 与日志，新的出现次数计数
    pub fn next_attempt(&self) -> Self {
        Self {
            run_id: self.run_id.clone(),
            journal: Arc::clone(&self.journal),
            occurrences: Mutex::new(HashMap::new()),
            executed: AtomicUsize::new(0),
        }
    }

    /// 已记录的步骤 ID（按完成顺序）
    pub async fn step_ids(&self) -> Vec<String> {
        self.journal
            .lock()
            .await
            .iter()
            .map(|e| e.step_id.clone())
            .collect()
    }

    pub async fn output(&self, step_id: &str) -> Option<Value> {
        self.journal
            .lock()
            .await
            .iter()
            .find(|e| e.step_id == step_id)
            .map(|e| e.output.clone())
    }

    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.journal.lock().await.clone()
    }

    /// 本次 attempt 中实际执行（未命中记忆）的步骤数
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    async fn occurrence_key(&self, step_id: &str) -> String {
        let mut occurrences = self.occurrences.lock().await;
        let n = occurrences.entry(step_id.to_string()).or_insert(0);
        let key = if *n == 0 {
            step_id.to_string()
        } else {
            format!("{step_id}:{n}")
        };
        *n += 1;
        key
    }
}

#[async_trait]
impl StepRunner for MemoStepRunner {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    async fn run(&self, step_id: &str, op: StepFuture) -> Result<Option<Value>, StepError> {
        let key = self.occurrence_key(step_id).await;

        if let Some(output) = self.output(&key).await {
            tracing::debug!(run_id = %self.run_id, step = %key, "step memoized");
            return Ok(Some(output));
        }

        let output = match op.await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(run_id = %self.run_id, step = %key, error = %e, "step failed");
                return Err(e);
            }
        };

        self.journal.lock().await.push(JournalEntry {
            step_id: key.clone(),
            output: output.clone(),
            completed_at: chrono::Utc::now().timestamp_millis(),
        });
        self.executed.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(run_id = %self.run_id, step = %key, "step executed");

        Ok(Some(output))
    }
}
