//! 费用估算
//!
//! CostEstimator 是可选的外部价格查询协作者；缺省或查不到模型时费用为 None。
//! PriceTable 是基于配置的静态实现，单价以「美元 / 百万 token」计。

use std::collections::HashMap;

use crate::config::{ModelPrice, PricingSection};

pub trait CostEstimator: Send + Sync {
    /// 估算一次运行的总费用（美元）；无法估算时返回 None
    fn estimate(&self, model: &str, input_tokens: u64, output_tokens: u64) -> Option<f64>;
}

/// 静态价格表
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, ModelPrice>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(section: &PricingSection) -> Self {
        Self {
            prices: section.models.clone(),
        }
    }

    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.prices.insert(model.into(), price);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// 先精确匹配，再去掉 `provider/` 前缀匹配（如 openai/gpt-4o → gpt-4o）
    pub fn lookup(&self, model: &str) -> Option<&ModelPrice> {
        self.prices.get(model).or_else(|| {
            model
                .rsplit_once('/')
                .and_then(|(_, bare)| self.prices.get(bare))
        })
    }
}

impl CostEstimator for PriceTable {
    fn estimate(&self, model: &str, input_tokens: u64, output_tokens: u64) -> Option<f64> {
        let price = self.lookup(model)?;
        let cost = input_tokens as f64 * price.input_per_million / 1_000_000.0
            + output_tokens as f64 * price.output_per_million / 1_000_000.0;
        cost.is_finite().then_some(cost)
    }
}
