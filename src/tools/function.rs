//! 类型化函数工具：由参数结构体自动生成 JSON Schema（schemars），闭包作为实现

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tools::{shape_value, Tool, ToolError, ToolOutput};

type Handler<A> = Box<dyn Fn(A) -> BoxFuture<'static, Result<ToolOutput, ToolError>> + Send + Sync>;

/// 函数工具：A 为参数类型，LLM 传来的 JSON 先反序列化为 A 再交给 handler
pub struct FunctionTool<A> {
    name: String,
    description: String,
    schema: Value,
    handler: Handler<A>,
    _args: PhantomData<fn(A)>,
}

impl<A> FunctionTool<A>
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
{
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let schema = serde_json::to_value(schema_for!(A))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Box::new(move |args| handler(args).boxed()),
            _args: PhantomData,
        }
    }
}

#[async_trait]
impl<A> Tool for FunctionTool<A>
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        // Agent 运行时常把参数作为 JSON 字符串传入
        let parsed: A = serde_json::from_value(shape_value(args))
            .map_err(|e| ToolError::InvalidArgs(format!("{}: {e}", self.name)))?;
        (self.handler)(parsed).await
    }
}
