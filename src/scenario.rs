use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::SimError;
use crate::models::{
    BoundedArea, PopulationConfig, DEFAULT_CONTACT_RADIUS, DEFAULT_DT,
    DEFAULT_RECOVERY_PROBABILITY, DEFAULT_RECOVERY_THRESHOLD, DISTANCING_MASS, MOBILE_MASS,
};

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default = "default_dt")]
    pub dt: f64,
    pub steps: usize,
    pub seed: u64,
    /// 全個体の自粛を解除するステップ（省略時は解除しない）
    #[serde(default)]
    pub distancing_stop_step: Option<usize>,
}

/// 世界設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    pub region_rect: RegionRect,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionRect {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

/// 集団設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PopulationSection {
    pub count: usize,
    pub initial_infection_probability: f64,
    #[serde(default)]
    pub distancing_probability: f64,
    #[serde(default = "default_contact_radius")]
    pub contact_radius: f64,
    #[serde(default = "default_recovery_threshold")]
    pub recovery_threshold: f64,
    #[serde(default = "default_recovery_probability")]
    pub recovery_probability: f64,
}

/// 衝突計算の物理設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhysicsConfig {
    pub mobile_mass: f64,
    pub distancing_mass: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mobile_mass: MOBILE_MASS,
            distancing_mass: DISTANCING_MASS,
        }
    }
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

fn default_contact_radius() -> f64 {
    DEFAULT_CONTACT_RADIUS
}

fn default_recovery_threshold() -> f64 {
    DEFAULT_RECOVERY_THRESHOLD
}

fn default_recovery_probability() -> f64 {
    DEFAULT_RECOVERY_PROBABILITY
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub world: WorldConfig,
    pub population: PopulationSection,
    #[serde(default)]
    pub physics: PhysicsConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::ParseError(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の検証
    ///
    /// 集団パラメータの検証に加えて、ステップ数と自粛解除ステップを確認します。
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sim.steps == 0 {
            return Err(SimError::InvalidSteps(self.sim.steps).into());
        }
        if let Some(stop) = self.sim.distancing_stop_step {
            if stop < 1 || stop >= self.sim.steps {
                return Err(SimError::InvalidStopStep {
                    step: stop,
                    steps: self.sim.steps,
                }
                .into());
            }
        }

        self.to_population_config()?.validate()?;
        Ok(())
    }

    /// 集団生成パラメータへ変換
    pub fn to_population_config(&self) -> Result<PopulationConfig, ScenarioError> {
        let region = &self.world.region_rect;
        let area = BoundedArea::new(region.xmin, region.xmax, region.ymin, region.ymax)?;

        Ok(PopulationConfig {
            count: self.population.count,
            initial_infection_probability: self.population.initial_infection_probability,
            distancing_probability: self.population.distancing_probability,
            area,
            contact_radius: self.population.contact_radius,
            dt: self.sim.dt,
            recovery_threshold: self.population.recovery_threshold,
            recovery_probability: self.population.recovery_probability,
            mobile_mass: self.physics.mobile_mass,
            distancing_mass: self.physics.distancing_mass,
            seed: self.sim.seed,
        })
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}", self.sim.dt);
        println!("ステップ数: {} (時間: {:.1})", self.sim.steps, self.sim.steps as f64 * self.sim.dt);
        println!("シード値: {}", self.sim.seed);
        match self.sim.distancing_stop_step {
            Some(step) => println!("自粛解除ステップ: {}", step),
            None => println!("自粛解除ステップ: なし"),
        }
        println!();

        let region = &self.world.region_rect;
        println!("=== 領域 ===");
        println!("x: [{}, {}], y: [{}, {}]", region.xmin, region.xmax, region.ymin, region.ymax);
        println!();

        println!("=== 集団 ===");
        println!("個体数: {}", self.population.count);
        println!("初期感染確率: {:.3}", self.population.initial_infection_probability);
        println!("自粛確率: {:.3}", self.population.distancing_probability);
        println!("接触半径: {}", self.population.contact_radius);
        println!(
            "回復: 感染後 {:.1} 経過以降、毎ティック確率 {:.2}",
            self.population.recovery_threshold, self.population.recovery_probability
        );
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),

    #[error("設定検証エラー: {0}")]
    ValidationError(#[from] SimError),
}
