//! # episim
//!
//! 物理ベースのエージェント型 SIR 感染シミュレーター。
//!
//! 矩形領域内を等速直線運動する個体が、壁や他の個体と弾性衝突しながら
//! 接触によって感染を広げます。自粛者は「巨大質量・速度0」の物体として
//! 同じ衝突式で扱われます。
//!
//! - `models`: 個体・近接検出・衝突解決・集団・軌跡記録
//! - `simulation`: シナリオ駆動の実行エンジン
//! - `scenario`: YAML シナリオ設定
//! - `logging`: tracing によるログ設定

pub mod error;
pub mod logging;
pub mod models;
pub mod scenario;
pub mod simulation;

pub use error::{Result, SimError};
pub use models::{Population, PopulationConfig, TrajectoryRecord};
