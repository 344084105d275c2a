use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_PARALLEL_THRESHOLD, DEFAULT_WORD_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionConfig {
    pub word_count: usize,
    /// 批量计算达到该数量时切换为 rayon 并行
    pub parallel_threshold: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            word_count: DEFAULT_WORD_COUNT,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl PartitionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置, 缺失或解析失败时使用默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let word_count = lookup("FUZZY_WORD_COUNT")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_WORD_COUNT);

        let parallel_threshold = lookup("FUZZY_PARALLEL_THRESHOLD")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

        Self {
            word_count,
            parallel_threshold,
        }
    }
}
