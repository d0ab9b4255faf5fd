//! # Error モジュール
//!
//! シミュレーションコアの設定エラーを表す型を提供します。
//!
//! シミュレーションは閉じた決定論的計算であり、実行途中で回復すべき一時的な
//! 失敗は存在しません。すべてのエラーは構築時または実行開始時に検出されます。

use thiserror::Error;

/// クレート共通の Result 型
pub type Result<T> = std::result::Result<T, SimError>;

/// シミュレーション設定エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// 確率パラメータが [0, 1] の範囲外（NaN を含む）
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// エージェント数が 0
    #[error("agent count must be positive, got {0}")]
    InvalidCount(usize),

    /// ステップ数が 0
    #[error("step count must be positive, got {0}")]
    InvalidSteps(usize),

    /// 自粛解除ステップが [1, steps) の範囲外
    #[error("distancing stop step {step} must be within [1, {steps})")]
    InvalidStopStep { step: usize, steps: usize },

    /// 領域境界が不正（min >= max または非有限値）
    #[error("invalid area bounds: x=[{xmin}, {xmax}], y=[{ymin}, {ymax}]")]
    InvalidBounds {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },

    /// その他の数値パラメータ（dt, 半径, 質量など）が不正
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// 確率値が [0, 1] に収まっているか検証
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability { name, value })
    }
}

/// 正の有限値であるか検証
pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bounds() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.01).is_err());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_error_display_names_parameter() {
        let err = check_probability("distancing_probability", 2.0).unwrap_err();
        assert!(err.to_string().contains("distancing_probability"));

        let err = check_positive("dt", 0.0).unwrap_err();
        assert!(err.to_string().contains("dt"));
        assert!(check_positive("dt", f64::INFINITY).is_err());
    }
}
