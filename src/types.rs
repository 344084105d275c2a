use serde::{Deserialize, Serialize};

// 常量定义
/// 隶属度比较容差 (浮点累积误差)
pub const DEGREE_TOLERANCE: f64 = 1e-9;
/// 划分至少包含左肩和右肩两个语言项
pub const MIN_WORD_COUNT: usize = 2;
pub const DEFAULT_WORD_COUNT: usize = 3;
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;
/// 序列化状态版本号 (用于迁移)
pub const STATE_VERSION: &str = "1.0.0";

/// 语言项形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermShape {
    /// 左开: 中点以左隶属度恒为 1
    LeftShoulder,
    Triangle,
    /// 右开: 中点以右隶属度恒为 1
    RightShoulder,
}

impl TermShape {
    pub fn is_left_open(&self) -> bool {
        matches!(self, TermShape::LeftShoulder)
    }

    pub fn is_right_open(&self) -> bool {
        matches!(self, TermShape::RightShoulder)
    }
}
