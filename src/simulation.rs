//! # Simulation モジュール
//!
//! シナリオ設定から個体集団を構築し、感染シミュレーションを実行するエンジンを提供します。
//!
//! 時間駆動型のメインループ自体は `Population` が持ち、このモジュールは
//! シナリオとの橋渡し、進行状況のログ出力、結果の要約表示を担当します。
//!
//! ## 各ステップの処理順序
//!
//! 1. **近接検出**: 接触距離 (2r) 未満の全ペアを列挙
//! 2. **衝突解決**: ペアの昇順に感染伝播と弾性衝突を適用
//! 3. **移動**: 全個体を `dt` だけ等速直線運動
//! 4. **壁反射**: 境界に達した軸の速度成分を反転
//! 5. **感染進行**: 感染経過時間の積算と回復判定
//!
//! ## 使用例
//!
//! ```no_run
//! use episim::scenario::ScenarioConfig;
//! use episim::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/basic.yaml")?;
//! let mut engine = SimulationEngine::new(config, 1);
//! engine.initialize()?;
//! let record = engine.run()?;
//! engine.print_report(&record, 100);
//! # Ok::<(), episim::scenario::ScenarioError>(())
//! ```

use crate::error::SimError;
use crate::models::{Population, TrajectoryRecord};
use crate::scenario::{ScenarioConfig, ScenarioError};
use tracing::{debug, info};

/// 進行状況をログ出力する間隔（ステップ）
const PROGRESS_INTERVAL: usize = 100;

pub struct SimulationEngine {
    pub scenario_config: ScenarioConfig,
    pub verbose_level: u8,
    population: Option<Population>,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Self {
        Self {
            scenario_config: scenario,
            verbose_level,
            population: None,
        }
    }

    /// シナリオから個体集団を生成
    pub fn initialize(&mut self) -> Result<(), ScenarioError> {
        if self.verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
        }

        let config = self.scenario_config.to_population_config()?;
        let population = Population::from_config(&config)?;

        if self.verbose_level > 0 {
            let distancing = population.agents().iter().filter(|a| a.is_distancing()).count();
            info!("初期化完了:");
            info!("  個体数: {}", population.agents().len());
            info!("  初期状態: {}", population.counts());
            info!("  自粛者: {}", distancing);
        }

        self.population = Some(population);
        Ok(())
    }

    /// シミュレーションを実行し、軌跡を返す
    ///
    /// 未初期化の場合は先に `initialize` を行います。
    pub fn run(&mut self) -> Result<TrajectoryRecord, ScenarioError> {
        if self.population.is_none() {
            self.initialize()?;
        }
        let population = self
            .population
            .as_mut()
            .ok_or_else(|| SimError::InvalidParameter("population is not initialized".to_string()))?;

        let steps = self.scenario_config.sim.steps;
        let stop = self.scenario_config.sim.distancing_stop_step;
        let verbose_level = self.verbose_level;

        info!("=== シミュレーション実行開始 ===");

        let record = population.run_with(steps, stop, |step, p| {
            if verbose_level > 2 {
                debug!("ステップ {}: {}", step, p.counts());
            }
            if step % PROGRESS_INTERVAL == 0 && verbose_level > 0 {
                let progress = (step as f64 / steps as f64) * 100.0;
                info!("進行状況: {:.1}% ({}/{}ステップ) {}", progress, step, steps, p.counts());
            }
        })?;

        info!("=== シミュレーション完了 ===");
        info!("シミュレーション時間: {:.1}", population.time());
        info!("総ステップ数: {}", population.step_count());
        if let Some(counts) = record.final_counts() {
            info!("最終状態: {}", counts);
        }

        Ok(record)
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// 結果の要約を表示
    ///
    /// `interval` ステップごとの S/I/R 推移と、感染者数のピークを表示します。
    pub fn print_report(&self, record: &TrajectoryRecord, interval: usize) {
        let interval = interval.max(1);
        let dt = self.scenario_config.sim.dt;

        println!("=== 感染推移 ===");
        println!("{:>8} {:>10} {:>8} {:>8} {:>8}", "step", "time", "S", "I", "R");
        for step in (0..record.len()).step_by(interval) {
            println!(
                "{:>8} {:>10.1} {:>8} {:>8} {:>8}",
                step,
                step as f64 * dt,
                record.s[step],
                record.i[step],
                record.r[step]
            );
        }
        println!();

        if let Some(final_counts) = record.final_counts() {
            println!("最終状態: {}", final_counts);
        }
        if let Some((step, peak)) = record.peak_infected() {
            println!("感染者ピーク: {}人 (ステップ {}, 時間 {:.1})", peak, step, step as f64 * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(stop: Option<usize>) -> ScenarioConfig {
        let stop_line = stop
            .map(|s| format!("  distancing_stop_step: {s}\n"))
            .unwrap_or_default();
        let yaml = format!(
            "meta:\n  version: \"1.0\"\n  name: engine\nsim:\n  steps: 30\n  seed: 11\n{stop_line}\
             world:\n  region_rect: {{ xmin: 0.0, xmax: 20.0, ymin: 0.0, ymax: 20.0 }}\n\
             population:\n  count: 25\n  initial_infection_probability: 0.2\n  distancing_probability: 0.4\n"
        );
        ScenarioConfig::from_yaml_str(&yaml).unwrap()
    }

    #[test]
    fn test_run_without_explicit_initialize() {
        let mut engine = SimulationEngine::new(scenario(None), 0);
        assert!(engine.population().is_none());
        let record = engine.run().unwrap();
        assert_eq!(record.len(), 30);
        assert_eq!(engine.population().map(|p| p.step_count()), Some(29));
    }

    #[test]
    fn test_engine_matches_direct_population_run() {
        let config = scenario(Some(10));
        let mut direct = Population::from_config(&config.to_population_config().unwrap()).unwrap();
        let expected = direct.run(30, Some(10)).unwrap();

        let mut engine = SimulationEngine::new(config, 3);
        engine.initialize().unwrap();
        let record = engine.run().unwrap();
        assert_eq!(record, expected);
        engine.print_report(&record, 10);
    }
}
