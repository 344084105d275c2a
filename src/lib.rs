//! # danci-fuzzy - 模糊语言项划分与去模糊化
//!
//! 本 crate 将一个连续数值区间划分为相互重叠的语言项 ("word"),
//! 并提供把各项激活度合成为单一清晰值的去模糊化算子:
//!
//! - **Term** - 单个语言项的隶属函数 (左肩 / 三角 / 右肩)
//! - **Partition** - 由样本数据构建的等距 Ruspini 划分
//! - **Aggregate** - 基于质心的加权平均去模糊化
//!
//! ## 模块结构
//!
//! - [`term`] - 语言项与隶属度计算
//! - [`partition`] - 划分构建、聚合、批量计算、状态持久化
//! - [`config`] - 划分配置 (支持环境变量)
//! - [`sanitize`] - 输入数据校验
//! - [`error`] - 错误类型
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use danci_fuzzy::build_partition;
//!
//! let partition = build_partition(&[0.0, 4.0, 10.0], 3)?;
//! let weights = partition.fuzzify(6.5)?;
//! let crisp = partition.aggregate(&weights)?;
//! assert!(crisp > 0.0 && crisp < 10.0);
//! # Ok::<(), danci_fuzzy::FuzzyError>(())
//! ```

#![deny(clippy::all)]

// ============================================================================
// 模块声明
// ============================================================================

pub mod config;
pub mod error;
pub mod partition;
pub mod sanitize;
pub mod term;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

pub use config::PartitionConfig;
pub use error::{FuzzyError, FuzzyResult};
pub use partition::{build_partition, Partition, PartitionState};
pub use term::Term;
pub use types::*;
