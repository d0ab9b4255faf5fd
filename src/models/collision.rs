use crate::models::{
    agent::Agent,
    common::*,
    traits::IMassModel,
};

/// 自粛者を「巨大質量・速度0」の物体として扱う質量モデル
///
/// 通常の二体弾性衝突式に巨大質量を代入することで、静止障害物を近似します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeavyObstacleMass {
    /// 非自粛者の質量
    pub mobile_mass: f64,
    /// 自粛者の質量
    pub distancing_mass: f64,
}

impl HeavyObstacleMass {
    pub fn new(mobile_mass: f64, distancing_mass: f64) -> Self {
        Self {
            mobile_mass,
            distancing_mass,
        }
    }
}

impl Default for HeavyObstacleMass {
    fn default() -> Self {
        Self::new(MOBILE_MASS, DISTANCING_MASS)
    }
}

impl IMassModel for HeavyObstacleMass {
    fn effective_mass(&self, agent: &Agent) -> f64 {
        if agent.is_distancing() {
            self.distancing_mass
        } else {
            self.mobile_mass
        }
    }
}

/// 1ペア分の衝突解決結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionOutcome {
    /// 感染が伝播したか
    pub transmitted: bool,
    /// 速度を更新したか（位置が一致する場合は false）
    pub velocities_updated: bool,
}

/// 衝突解決器
///
/// 接触ペアに対して、感染伝播と弾性衝突による速度更新を順に適用します。
pub struct CollisionResolver {
    mass_model: Box<dyn IMassModel>,
}

impl CollisionResolver {
    pub fn new(mass_model: Box<dyn IMassModel>) -> Self {
        Self { mass_model }
    }

    /// 接触ペアを解決
    ///
    /// 1. 片方だけが感染者でもう片方が感受性者なら、確実に感染させる
    /// 2. 解決前の質量・位置・速度で二体弾性衝突の速度を計算して適用する
    ///
    /// 位置が完全に一致する場合（距離0）は速度を変更しません。
    pub fn resolve(&self, p1: &mut Agent, p2: &mut Agent) -> CollisionOutcome {
        let transmitted = Self::transmit(p1, p2);
        let velocities_updated = self.elastic_collision(p1, p2);
        CollisionOutcome {
            transmitted,
            velocities_updated,
        }
    }

    fn transmit(p1: &mut Agent, p2: &mut Agent) -> bool {
        match (p1.health(), p2.health()) {
            (HealthState::Infected, HealthState::Susceptible) => p2.infect(),
            (HealthState::Susceptible, HealthState::Infected) => p1.infect(),
            _ => false,
        }
    }

    fn elastic_collision(&self, p1: &mut Agent, p2: &mut Agent) -> bool {
        let m1 = self.mass_model.effective_mass(p1);
        let m2 = self.mass_model.effective_mass(p2);

        let dr = p1.position - p2.position;
        let d = dr.x.powi(2) + dr.y.powi(2);
        if d == 0.0 {
            return false;
        }

        let normal = Velocity2D::new(dr.x, dr.y);
        let dv = p1.velocity - p2.velocity;
        // dot(v2 - v1, r2 - r1) は dot(v1 - v2, r1 - r2) に等しい
        let projection = dv.dot(&normal) / d;
        let total_mass = m1 + m2;

        let u1 = p1.velocity - normal * (2.0 * m2 / total_mass * projection);
        let u2 = p2.velocity + normal * (2.0 * m1 / total_mass * projection);
        p1.velocity = u1;
        p2.velocity = u2;
        true
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(Box::new(HeavyObstacleMass::default()))
    }
}

impl std::fmt::Debug for CollisionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionResolver").finish_non_exhaustive()
    }
}

/// スライス内の異なる2要素への可変参照を取得（`i < j`）
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j, "pair indices must be ascending");
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
