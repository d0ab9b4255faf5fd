// 基本的なデータ型と定数
pub mod common;

// エージェント・近接検出・質量モデルのインターフェース（trait）定義
pub mod traits;

// 各モデルの実装
pub mod agent;
pub mod proximity;
pub mod collision;
pub mod trajectory;
pub mod population;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use agent::Agent;
pub use proximity::PairwiseDetector;
pub use collision::{CollisionOutcome, CollisionResolver, HeavyObstacleMass};
pub use trajectory::TrajectoryRecord;
pub use population::{Population, PopulationConfig, Snapshot, StepSummary};
