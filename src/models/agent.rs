use rand::Rng;
use rand_distr::StandardNormal;

use crate::models::{
    common::*,
    traits::IMovable,
};

/// 個体エージェント
///
/// 領域内を等速直線運動し、壁や他の個体と弾性衝突する点エージェントです。
/// 健康状態（S/I/R）と自粛フラグを持ち、感染期間を積算します。
/// 質量は保持せず、衝突計算時に質量モデルが自粛フラグから決定します。
#[derive(Debug, Clone)]
pub struct Agent {
    /// 個体の識別子（集団内での並び順と一致）
    pub id: usize,
    /// 現在位置
    pub position: Position2D,
    /// 現在速度
    pub velocity: Velocity2D,
    /// 接触半径（全個体で共通）
    pub radius: f64,
    /// 健康状態
    health: HealthState,
    /// 感染してからの経過時間（Infected の間のみ意味を持つ）
    days_infected: f64,
    /// 自粛中かどうか
    distancing: bool,
    /// 回復判定を開始する感染経過時間
    pub recovery_threshold: f64,
    /// 閾値経過後の1ティックあたり回復確率
    pub recovery_probability: f64,
}

impl Agent {
    /// 新しいエージェントを作成
    ///
    /// 半径・回復パラメータはデフォルト値になります。集団生成時は
    /// `initialize` で位置と速度を乱数から設定します。
    pub fn new(id: usize, position: Position2D, velocity: Velocity2D, health: HealthState) -> Self {
        Self {
            id,
            position,
            velocity,
            radius: DEFAULT_CONTACT_RADIUS,
            health,
            days_infected: 0.0,
            distancing: false,
            recovery_threshold: DEFAULT_RECOVERY_THRESHOLD,
            recovery_probability: DEFAULT_RECOVERY_PROBABILITY,
        }
    }

    /// 接触半径と回復パラメータを設定
    pub fn with_parameters(
        mut self,
        radius: f64,
        recovery_threshold: f64,
        recovery_probability: f64,
    ) -> Self {
        self.radius = radius;
        self.recovery_threshold = recovery_threshold;
        self.recovery_probability = recovery_probability;
        self
    }

    /// 領域内の一様乱数位置に配置し、健康状態と自粛状態を設定
    ///
    /// 自粛状態は `force` 付きで適用するため、非自粛の個体は必ず
    /// 新しい速度を標準正規分布から受け取ります。
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        area: &BoundedArea,
        initial_state: HealthState,
        initial_distancing: bool,
        rng: &mut R,
    ) {
        let x = rng.random_range(area.xmin()..area.xmax());
        let y = rng.random_range(area.ymin()..area.ymax());
        self.position = Position2D::new(x, y);
        self.health = initial_state;
        self.days_infected = 0.0;
        self.set_distancing(initial_distancing, true, rng);
    }

    /// 自粛状態の切り替え
    ///
    /// 有効化すると速度が 0 になり、無効化すると速度を2つの独立な
    /// 標準正規乱数から再設定します。要求された状態が既に成立していて
    /// `force` が偽なら何もしません（毎回速度を振り直さないため）。
    pub fn set_distancing<R: Rng + ?Sized>(&mut self, enable: bool, force: bool, rng: &mut R) {
        if enable == self.distancing && !force {
            return;
        }

        if enable {
            self.velocity = Velocity2D::ZERO;
        } else {
            let vx: f64 = rng.sample(StandardNormal);
            let vy: f64 = rng.sample(StandardNormal);
            self.velocity = Velocity2D::new(vx, vy);
        }
        self.distancing = enable;
    }

    /// 感染の進行
    ///
    /// 感染期間が閾値に達するまでは経過時間を積算するだけです。閾値以降は
    /// 毎ティック独立に回復判定を行います。回復した場合は true を返します。
    pub fn progress_infection<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> bool {
        if self.health != HealthState::Infected {
            return false;
        }

        if self.days_infected < self.recovery_threshold {
            self.days_infected += dt;
            return false;
        }

        let trial: f64 = rng.random();
        if trial < self.recovery_probability {
            self.transition(HealthState::Recovered)
        } else {
            self.days_infected += dt;
            false
        }
    }

    /// 感染させる
    ///
    /// 感受性者のみが感染者になります。状態が変化した場合は true を返します。
    pub fn infect(&mut self) -> bool {
        self.transition(HealthState::Infected)
    }

    /// 許可された遷移のみ適用し、感染経過時間をリセット
    fn transition(&mut self, next: HealthState) -> bool {
        if !self.health.can_transition_to(next) {
            return false;
        }
        self.health = next;
        self.days_infected = 0.0;
        true
    }

    pub fn health(&self) -> HealthState {
        self.health
    }

    pub fn days_infected(&self) -> f64 {
        self.days_infected
    }

    pub fn is_distancing(&self) -> bool {
        self.distancing
    }

    pub fn is_infected(&self) -> bool {
        self.health == HealthState::Infected
    }

    pub fn is_susceptible(&self) -> bool {
        self.health == HealthState::Susceptible
    }
}

impl IMovable for Agent {
    fn move_agent(&mut self, dt: f64) {
        self.position = self.position + self.velocity * dt;
    }

    fn get_position(&self) -> Position2D {
        self.position
    }

    fn get_velocity(&self) -> Velocity2D {
        self.velocity
    }

    fn set_position(&mut self, position: Position2D) {
        self.position = position;
    }

    fn set_velocity(&mut self, velocity: Velocity2D) {
        self.velocity = velocity;
    }
}
