use crate::error::{FuzzyError, FuzzyResult};

/// 检查数组是否包含无效值 (NaN 或 Inf)
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// 计算样本数据的取值范围 (low, high)
///
/// 空数据、含 NaN/Inf 的数据、零宽度范围均视为非法输入。
pub fn value_range(data: &[f64]) -> FuzzyResult<(f64, f64)> {
    if data.is_empty() {
        return Err(FuzzyError::EmptyData);
    }
    if has_invalid_values(data) {
        return Err(FuzzyError::InvalidData);
    }

    let (low, high) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });

    if low >= high {
        return Err(FuzzyError::InvalidRange { low, high });
    }

    Ok((low, high))
}

/// 校验权重向量长度与语言项数量一致
pub fn validate_weights(weights: &[f64], expected: usize) -> FuzzyResult<()> {
    if weights.len() != expected {
        return Err(FuzzyError::DimensionMismatch {
            expected,
            actual: weights.len(),
        });
    }
    Ok(())
}
