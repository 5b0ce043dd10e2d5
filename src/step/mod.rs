//! 持久化调用适配
//!
//! StepRunner 是外部编排器「步骤记忆化」能力的抽象：给定步骤 ID 与一个无参异步操作，
//! 编排器首次执行时运行并记录结果，重试回放时直接返回记录。durable() 在有句柄时走 StepRunner，
//! 否则直接执行。

pub mod memo;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::context::get_step;
use crate::core::StepError;

pub use memo::{JournalEntry, MemoStepRunner};

/// 交给编排器执行的无参操作，产出可存储的 JSON
pub type StepFuture = BoxFuture<'static, Result<Value, StepError>>;

/// 编排器步骤能力
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// 当前运行的标识（同一次运行的所有重试共享）
    fn run_id(&self) -> &str;

    /// 以 step_id 为幂等键执行 op；已记录过的步骤直接返回记录值。
    /// 返回 None 属于编排器的边缘情况（如步骤被跳过）
    async fn run(&self, step_id: &str, op: StepFuture) -> Result<Option<Value>, StepError>;
}

/// 步骤句柄：安装在执行上下文中，被所有工具共享
pub type StepHandle = Arc<dyn StepRunner>;

/// 有句柄时作为持久化步骤执行 f，否则直接执行
///
/// step_id 必须是确定性的，重试时才能命中记忆。f 只在编排器决定执行时才被调用，
/// 命中记录时完全不会运行。结果经 JSON 往返，因此 T 需要可序列化；
/// 步骤返回 None 时按 JSON null 反序列化。
pub async fn durable<T, E, F, Fut>(step_id: &str, f: F) -> Result<T, StepError>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    E: Into<StepError> + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    match get_step() {
        Some(step) => {
            let op = async move {
                let value = f().await.map_err(Into::<StepError>::into)?;
                Ok::<_, StepError>(serde_json::to_value(value)?)
            }
            .boxed();
            let stored = step.run(step_id, op).await?;
            Ok(serde_json::from_value(stored.unwrap_or(Value::Null))?)
        }
        None => f().await.map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_step;
    use crate::step::testing::{FailingRunner, ReplayRunner};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Weather {
        city: String,
        temp: i32,
    }

    async fn fetch_weather(city: &str, calls: Arc<AtomicUsize>) -> Result<Weather, StepError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Weather {
            city: city.to_string(),
            temp: 72,
        })
    }

    #[tokio::test]
    async fn test_durable_runs_directly_without_handle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let w = durable("weather_sf", move || fetch_weather("sf", c)).await.unwrap();
        assert_eq!(w.temp, 72);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_durable_records_step() {
        let runner = Arc::new(MemoStepRunner::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let w = with_step(runner.clone(), durable("weather_sf", move || fetch_weather("sf", c)))
            .await
            .unwrap();
        assert_eq!(w.city, "sf");
        assert_eq!(runner.step_ids().await, vec!["weather_sf".to_string()]);
        assert_eq!(
            runner.output("weather_sf").await,
            Some(serde_json::json!({"city": "sf", "temp": 72}))
        );
    }

    #[tokio::test]
    async fn test_durable_replays_on_retry() {
        let first = Arc::new(MemoStepRunner::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        with_step(first.clone(), durable("weather_sf", move || fetch_weather("sf", c)))
            .await
            .unwrap();

        let retry = Arc::new(first.next_attempt());
        let c = calls.clone();
        let w = with_step(retry.clone(), durable("weather_sf", move || fetch_weather("sf", c)))
            .await
            .unwrap();

        assert_eq!(w.city, "sf");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(retry.executed(), 0);
    }

    #[tokio::test]
    async fn test_durable_propagates_error() {
        let runner = Arc::new(MemoStepRunner::new());
        let result: Result<Weather, StepError> = with_step(
            runner.clone(),
            durable("weather_x", || async {
                Err::<Weather, _>(StepError::Retriable("upstream 503".to_string()))
            }),
        )
        .await;
        assert!(matches!(result, Err(StepError::Retriable(_))));
        assert!(runner.step_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_closure_not_called_on_replay() {
        let first = Arc::new(MemoStepRunner::new());
        let invocations = Arc::new(AtomicUsize::new(0));

        let c = invocations.clone();
        let a: i32 = with_step(
            first.clone(),
            durable("charge", move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, StepError>(1) }
            }),
        )
        .await
        .unwrap();

        let retry = Arc::new(first.next_attempt());
        let c = invocations.clone();
        let b: i32 = with_step(
            retry,
            durable("charge", move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, StepError>(1) }
            }),
        )
        .await
        .unwrap();

        assert_eq!((a, b), (1, 1));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_runner_error_propagates_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let result: Result<Weather, StepError> = with_step(
            Arc::new(FailingRunner::new("orchestrator busy")),
            durable("weather_sf", move || fetch_weather("sf", c)),
        )
        .await;
        assert!(matches!(result, Err(StepError::Retriable(msg)) if msg == "orchestrator busy"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recorded_value_used_without_calling_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let runner = Arc::new(ReplayRunner::new(serde_json::json!({"city": "nyc", "temp": 40})));
        let w = with_step(runner, durable("weather_sf", move || fetch_weather("sf", c)))
            .await
            .unwrap();
        assert_eq!(
            w,
            Weather {
                city: "nyc".to_string(),
                temp: 40
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
