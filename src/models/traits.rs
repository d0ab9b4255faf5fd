use crate::models::agent::Agent;
use crate::models::common::*;

/// 移動可能なエージェントのインターフェース
pub trait IMovable {
    /// 移動処理
    fn move_agent(&mut self, dt: f64);

    /// 現在位置の取得
    fn get_position(&self) -> Position2D;

    /// 現在速度の取得
    fn get_velocity(&self) -> Velocity2D;

    /// 位置の設定
    fn set_position(&mut self, position: Position2D);

    /// 速度の設定
    fn set_velocity(&mut self, velocity: Velocity2D);
}

/// 近接検出のインターフェース
///
/// 実装は距離 `2 * radius` 未満の全ペア `(i, j)`（`i < j`）を
/// `(i, j)` の昇順で返さなければなりません。
pub trait IProximityDetector {
    /// 接触しているインデックスペアを列挙
    fn detect(&self, positions: &[Position2D], radius: f64) -> Vec<(usize, usize)>;
}

/// 衝突計算で用いる質量モデルのインターフェース
///
/// 自粛フラグと物理パラメータを切り離し、弾性衝突式を評価する瞬間にだけ
/// 質量を決定します。
pub trait IMassModel {
    /// 衝突計算に使う実効質量
    fn effective_mass(&self, agent: &Agent) -> f64;
}
