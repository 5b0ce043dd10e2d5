//! 环境执行上下文
//!
//! 宿主在处理一次编排器调用时用 with_step 安装步骤句柄，之后任意深度的工具函数都可以通过
//! get_step 取到它，无需在调用链上逐层传参。句柄存放在 tokio task_local 中：
//! 同一任务内并发 poll 的 future（如 join_all）共享句柄，不同的执行互不可见。

use std::future::Future;

use tokio::task::JoinHandle;

use crate::step::StepHandle;

tokio::task_local! {
    /// 当前逻辑执行的步骤句柄，由 with_step 设置
    static CURRENT_STEP: StepHandle;
}

/// 当前执行的步骤句柄；不在编排器上下文中时返回 None
pub fn get_step() -> Option<StepHandle> {
    CURRENT_STEP.try_with(|step| step.clone()).ok()
}

/// 在 future 执行期间安装步骤句柄；嵌套安装时内层覆盖外层，退出后恢复外层
pub async fn with_step<F>(step: StepHandle, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_STEP.scope(step, fut).await
}

/// spawn 一个继承当前步骤句柄的任务；没有句柄时等同于 tokio::spawn
///
/// task_local 不会自动跨 spawn 传递，工具调用被分发到其它任务时用它代替 tokio::spawn。
pub fn spawn_with_step<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match get_step() {
        Some(step) => tokio::spawn(CURRENT_STEP.scope(step, fut)),
        None => tokio::spawn(fut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{MemoStepRunner, StepRunner};
    use std::sync::Arc;

    fn handle() -> (Arc<MemoStepRunner>, StepHandle) {
        let runner = Arc::new(MemoStepRunner::new());
        let step: StepHandle = runner.clone();
        (runner, step)
    }

    #[tokio::test]
    async fn test_get_step_outside_context() {
        assert!(get_step().is_none());
    }

    #[tokio::test]
    async fn test_with_step_installs_handle() {
        let (runner, step) = handle();
        let run_id = with_step(step, async {
            let current = get_step().expect("handle installed");
            current.run_id().to_string()
        })
        .await;
        assert_eq!(run_id, runner.run_id());
        assert!(get_step().is_none());
    }

    #[tokio::test]
    async fn test_nested_with_step_shadows_outer() {
        let (outer, outer_step) = handle();
        let (inner, inner_step) = handle();
        with_step(outer_step, async {
            let seen = with_step(inner_step, async { get_step().unwrap().run_id().to_string() }).await;
            assert_eq!(seen, inner.run_id());
            assert_eq!(get_step().unwrap().run_id(), outer.run_id());
        })
        .await;
    }

    #[tokio::test]
    async fn test_spawn_with_step_propagates() {
        let (runner, step) = handle();
        let seen = with_step(step, async {
            spawn_with_step(async { get_step().map(|s| s.run_id().to_string()) })
                .await
                .unwrap()
        })
        .await;
        assert_eq!(seen.as_deref(), Some(runner.run_id()));
    }

    #[tokio::test]
    async fn test_plain_spawn_does_not_inherit() {
        let (_, step) = handle();
        let seen = with_step(step, async { tokio::spawn(async { get_step().is_some() }).await.unwrap() }).await;
        assert!(!seen);
    }

    #[tokio::test]
    async fn test_concurrent_executions_are_isolated() {
        let (a, step_a) = handle();
        let (b, step_b) = handle();
        let task_a = tokio::spawn(with_step(step_a, async {
            tokio::task::yield_now().await;
            get_step().unwrap().run_id().to_string()
        }));
        let task_b = tokio::spawn(with_step(step_b, async {
            tokio::task::yield_now().await;
            get_step().unwrap().run_id().to_string()
        }));
        assert_eq!(task_a.await.unwrap(), a.run_id());
        assert_eq!(task_b.await.unwrap(), b.run_id());
    }
}
