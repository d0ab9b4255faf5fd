use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info, trace};

use crate::error::{check_positive, check_probability, Result, SimError};
use crate::models::{
    agent::Agent,
    collision::{pair_mut, CollisionResolver, HeavyObstacleMass},
    common::*,
    proximity::PairwiseDetector,
    trajectory::TrajectoryRecord,
    traits::{IMovable, IProximityDetector},
};

/// 集団の生成パラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    /// 個体数
    pub count: usize,
    /// 初期感染確率
    pub initial_infection_probability: f64,
    /// 自粛確率
    pub distancing_probability: f64,
    /// シミュレーション領域
    pub area: BoundedArea,
    /// 接触半径
    pub contact_radius: f64,
    /// 時間刻み
    pub dt: f64,
    /// 回復判定を開始する感染経過時間
    pub recovery_threshold: f64,
    /// 閾値経過後の回復確率
    pub recovery_probability: f64,
    /// 非自粛者の質量
    pub mobile_mass: f64,
    /// 自粛者の質量
    pub distancing_mass: f64,
    /// 乱数シード
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: 100,
            initial_infection_probability: 0.05,
            distancing_probability: 0.0,
            area: BoundedArea::default(),
            contact_radius: DEFAULT_CONTACT_RADIUS,
            dt: DEFAULT_DT,
            recovery_threshold: DEFAULT_RECOVERY_THRESHOLD,
            recovery_probability: DEFAULT_RECOVERY_PROBABILITY,
            mobile_mass: MOBILE_MASS,
            distancing_mass: DISTANCING_MASS,
            seed: 0,
        }
    }
}

impl PopulationConfig {
    /// パラメータの検証
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(SimError::InvalidCount(self.count));
        }
        check_probability("initial_infection_probability", self.initial_infection_probability)?;
        check_probability("distancing_probability", self.distancing_probability)?;
        check_probability("recovery_probability", self.recovery_probability)?;
        check_positive("contact_radius", self.contact_radius)?;
        check_positive("dt", self.dt)?;
        check_positive("recovery_threshold", self.recovery_threshold)?;
        check_positive("mobile_mass", self.mobile_mass)?;
        check_positive("distancing_mass", self.distancing_mass)?;
        Ok(())
    }
}

/// 現在状態のスナップショット（描画用）
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<Position2D>,
    pub states: Vec<HealthState>,
    pub distancing: Vec<bool>,
}

/// 1ステップの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepSummary {
    /// 接触ペア数
    pub contacts: usize,
    /// 新規感染数
    pub transmissions: usize,
    /// 新規回復数
    pub recoveries: usize,
}

/// 個体集団（ユニバース）
///
/// 個体列・領域・乱数源を所有し、固定時間刻みで1ステップずつ進めます。
/// 個体の並び順は不変で、衝突ペアの適用順にも使われます。
pub struct Population {
    agents: Vec<Agent>,
    area: BoundedArea,
    dt: f64,
    contact_radius: f64,
    rng: Pcg64,
    detector: Box<dyn IProximityDetector>,
    resolver: CollisionResolver,
    step_count: u64,
}

impl Population {
    /// 個体数と確率を指定して集団を生成（その他はデフォルト値）
    pub fn new(
        count: usize,
        initial_infection_probability: f64,
        distancing_probability: f64,
        seed: u64,
    ) -> Result<Self> {
        Self::from_config(&PopulationConfig {
            count,
            initial_infection_probability,
            distancing_probability,
            seed,
            ..PopulationConfig::default()
        })
    }

    /// 設定から集団を生成
    ///
    /// 各個体について初期感染・自粛をベルヌーイ試行で決め、位置を一様乱数で配置します。
    pub fn from_config(config: &PopulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = Pcg64::seed_from_u64(config.seed);
        let mut agents = Vec::with_capacity(config.count);
        for id in 0..config.count {
            let initial_state = if rng.random_bool(config.initial_infection_probability) {
                HealthState::Infected
            } else {
                HealthState::Susceptible
            };
            let distancing = rng.random_bool(config.distancing_probability);

            let mut agent = Agent::new(id, Position2D::default(), Velocity2D::ZERO, initial_state)
                .with_parameters(
                    config.contact_radius,
                    config.recovery_threshold,
                    config.recovery_probability,
                );
            agent.initialize(&config.area, initial_state, distancing, &mut rng);
            agents.push(agent);
        }

        let population = Self {
            agents,
            area: config.area,
            dt: config.dt,
            contact_radius: config.contact_radius,
            rng,
            detector: Box::new(PairwiseDetector::new()),
            resolver: CollisionResolver::new(Box::new(HeavyObstacleMass::new(
                config.mobile_mass,
                config.distancing_mass,
            ))),
            step_count: 0,
        };

        debug!(
            "集団生成: {}体 ({}), 自粛者: {}体",
            population.agents.len(),
            population.counts(),
            population.agents.iter().filter(|a| a.is_distancing()).count()
        );

        Ok(population)
    }

    /// 配置済みの個体列から集団を作成
    ///
    /// 接触半径は全個体で共通でなければなりません。
    pub fn with_agents(agents: Vec<Agent>, area: BoundedArea, dt: f64, seed: u64) -> Result<Self> {
        let first = agents.first().ok_or(SimError::InvalidCount(0))?;
        let contact_radius = first.radius;
        check_positive("contact_radius", contact_radius)?;
        check_positive("dt", dt)?;
        if agents.iter().any(|a| a.radius != contact_radius) {
            return Err(SimError::InvalidParameter(
                "contact radius must be identical for all agents".to_string(),
            ));
        }

        Ok(Self {
            agents,
            area,
            dt,
            contact_radius,
            rng: Pcg64::seed_from_u64(seed),
            detector: Box::new(PairwiseDetector::new()),
            resolver: CollisionResolver::default(),
            step_count: 0,
        })
    }

    /// 近接検出器を差し替え
    pub fn with_detector(mut self, detector: Box<dyn IProximityDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// 1ステップ進める
    ///
    /// 近接検出 → 接触ペアの解決（昇順）→ 全個体の移動 → 壁での反射 → 感染の進行。
    /// 同一ステップで複数ペアに現れる個体は、先に解決されたペアの結果を引き継ぎます。
    pub fn step(&mut self) -> StepSummary {
        let mut summary = StepSummary::default();

        let positions: Vec<Position2D> = self.agents.iter().map(|a| a.get_position()).collect();
        let pairs = self.detector.detect(&positions, self.contact_radius);
        summary.contacts = pairs.len();

        for (i, j) in pairs {
            let (p1, p2) = pair_mut(&mut self.agents, i, j);
            if self.resolver.resolve(p1, p2).transmitted {
                summary.transmissions += 1;
            }
        }

        for agent in &mut self.agents {
            agent.move_agent(self.dt);
        }

        // 位置はクランプしない（1ティックだけ領域外に出ることがある）
        for agent in &mut self.agents {
            let position = agent.get_position();
            let mut velocity = agent.get_velocity();
            if position.x <= self.area.xmin() || position.x >= self.area.xmax() {
                velocity.x = -velocity.x;
            }
            if position.y <= self.area.ymin() || position.y >= self.area.ymax() {
                velocity.y = -velocity.y;
            }
            agent.set_velocity(velocity);
        }

        for agent in &mut self.agents {
            if agent.progress_infection(self.dt, &mut self.rng) {
                summary.recoveries += 1;
            }
        }

        self.step_count += 1;
        trace!(
            "ステップ {}: 接触 {}組, 新規感染 {}, 新規回復 {} ({})",
            self.step_count,
            summary.contacts,
            summary.transmissions,
            summary.recoveries,
            self.counts()
        );

        summary
    }

    /// `steps` ステップ分のシミュレーションを実行し軌跡を返す
    ///
    /// ステップ0として初期状態を記録してから、1..steps の各ステップを進めます。
    /// `distancing_stop_step` を指定すると、そのステップの直前に全個体の自粛を解除します。
    pub fn run(&mut self, steps: usize, distancing_stop_step: Option<usize>) -> Result<TrajectoryRecord> {
        self.run_with(steps, distancing_stop_step, |_, _| {})
    }

    /// `run` と同じだが、各ステップの記録後に `on_step(step, self)` を呼び出す
    pub fn run_with<F>(
        &mut self,
        steps: usize,
        distancing_stop_step: Option<usize>,
        mut on_step: F,
    ) -> Result<TrajectoryRecord>
    where
        F: FnMut(usize, &Population),
    {
        if steps == 0 {
            return Err(SimError::InvalidSteps(steps));
        }
        if let Some(stop) = distancing_stop_step {
            if stop < 1 || stop >= steps {
                return Err(SimError::InvalidStopStep { step: stop, steps });
            }
        }

        let mut record = TrajectoryRecord::with_capacity(steps);
        record.record(&self.agents);

        for step in 1..steps {
            if distancing_stop_step == Some(step) {
                self.stop_distancing();
                info!("ステップ {}: 全個体の自粛を解除", step);
            }
            self.step();
            record.record(&self.agents);
            on_step(step, self);
        }

        Ok(record)
    }

    /// 全個体の自粛を解除
    pub fn stop_distancing(&mut self) {
        for agent in &mut self.agents {
            agent.set_distancing(false, false, &mut self.rng);
        }
    }

    /// 描画用の現在状態
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            positions: self.agents.iter().map(|a| a.position).collect(),
            states: self.agents.iter().map(|a| a.health()).collect(),
            distancing: self.agents.iter().map(|a| a.is_distancing()).collect(),
        }
    }

    /// 現在の S/I/R 集計
    pub fn counts(&self) -> SirCounts {
        SirCounts::tally(self.agents.iter().map(|a| a.health()))
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn area(&self) -> &BoundedArea {
        &self.area
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn contact_radius(&self) -> f64 {
        self.contact_radius
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// 経過シミュレーション時間
    pub fn time(&self) -> f64 {
        self.step_count as f64 * self.dt
    }
}

impl std::fmt::Debug for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("agents", &self.agents.len())
            .field("area", &self.area)
            .field("dt", &self.dt)
            .field("step_count", &self.step_count)
            .finish_non_exhaustive()
    }
}
