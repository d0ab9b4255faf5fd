use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{Result, SimError};

/// 非自粛エージェントの質量
pub const MOBILE_MASS: f64 = 1.0;
/// 自粛エージェントの質量（静止障害物の近似）
pub const DISTANCING_MASS: f64 = 1000.0;
/// 接触半径のデフォルト値
pub const DEFAULT_CONTACT_RADIUS: f64 = 1.0;
/// 回復判定を始めるまでの感染期間（時間単位）
pub const DEFAULT_RECOVERY_THRESHOLD: f64 = 14.0;
/// 閾値経過後、各ティックで回復する確率
pub const DEFAULT_RECOVERY_PROBABILITY: f64 = 0.5;
/// デフォルトの時間刻み
pub const DEFAULT_DT: f64 = 0.1;

/// 2次元位置を表す構造体
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 2点間距離の2乗
    pub fn distance_squared(&self, other: &Position2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// 2点間距離
    pub fn distance(&self, other: &Position2D) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl Sub for Position2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

// Position2D + Velocity2D*dt の演算を可能にする
impl Add<Velocity2D> for Position2D {
    type Output = Self;

    fn add(self, displacement: Velocity2D) -> Self::Output {
        Self::new(self.x + displacement.x, self.y + displacement.y)
    }
}

/// 2次元速度を表す構造体
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity2D {
    pub x: f64,
    pub y: f64,
}

impl Velocity2D {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 速度ベクトルの大きさ
    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2)).sqrt()
    }

    /// 内積
    pub fn dot(&self, other: &Velocity2D) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Velocity2D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Velocity2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Velocity2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Neg for Velocity2D {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// シミュレーション領域（矩形）
///
/// 構築後は不変です。`xmin < xmax` かつ `ymin < ymax` が常に成り立ちます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedArea {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl BoundedArea {
    /// 境界を検証して領域を作成
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let finite = [xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite());
        if !finite || xmin >= xmax || ymin >= ymax {
            return Err(SimError::InvalidBounds {
                xmin,
                xmax,
                ymin,
                ymax,
            });
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// 位置が領域の内側（境界を含む）にあるか
    pub fn contains(&self, position: &Position2D) -> bool {
        position.x >= self.xmin
            && position.x <= self.xmax
            && position.y >= self.ymin
            && position.y <= self.ymax
    }
}

impl Default for BoundedArea {
    fn default() -> Self {
        Self {
            xmin: 0.0,
            xmax: 100.0,
            ymin: 0.0,
            ymax: 100.0,
        }
    }
}

/// エージェントの健康状態
///
/// 遷移は Susceptible → Infected → Recovered の一方向のみで、
/// Recovered は終端状態です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthState {
    Susceptible, // 感受性者
    Infected,    // 感染者
    Recovered,   // 回復者
}

impl HealthState {
    /// `self` から `next` への遷移が許可されているか
    pub fn can_transition_to(self, next: HealthState) -> bool {
        match (self, next) {
            (HealthState::Susceptible, HealthState::Infected) => true,
            (HealthState::Infected, HealthState::Recovered) => true,
            (HealthState::Susceptible, _) => false,
            (HealthState::Infected, _) => false,
            (HealthState::Recovered, _) => false,
        }
    }

    /// 描画側で使う1文字ラベル
    pub fn label(self) -> &'static str {
        match self {
            HealthState::Susceptible => "S",
            HealthState::Infected => "I",
            HealthState::Recovered => "R",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthState::Susceptible => "susceptible",
            HealthState::Infected => "infected",
            HealthState::Recovered => "recovered",
        };
        f.write_str(name)
    }
}

/// S/I/R 集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SirCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

impl SirCounts {
    /// 健康状態の列から集計
    pub fn tally<I>(states: I) -> Self
    where
        I: IntoIterator<Item = HealthState>,
    {
        let mut counts = Self::default();
        for state in states {
            match state {
                HealthState::Susceptible => counts.susceptible += 1,
                HealthState::Infected => counts.infected += 1,
                HealthState::Recovered => counts.recovered += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

impl fmt::Display for SirCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={} I={} R={}",
            self.susceptible, self.infected, self.recovered
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_area_rejects_inverted_bounds() {
        assert!(BoundedArea::new(0.0, 10.0, 0.0, 10.0).is_ok());
        assert!(BoundedArea::new(10.0, 0.0, 0.0, 10.0).is_err());
        assert!(BoundedArea::new(0.0, 10.0, 5.0, 5.0).is_err());
        assert!(BoundedArea::new(0.0, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_health_transitions_are_monotonic() {
        use HealthState::*;
        assert!(Susceptible.can_transition_to(Infected));
        assert!(Infected.can_transition_to(Recovered));
        assert!(!Susceptible.can_transition_to(Recovered));
        assert!(!Infected.can_transition_to(Susceptible));
        assert!(!Recovered.can_transition_to(Susceptible));
        assert!(!Recovered.can_transition_to(Infected));
        assert!(!Infected.can_transition_to(Infected));
    }

    #[test]
    fn test_sir_tally() {
        use HealthState::*;
        let counts = SirCounts::tally([Susceptible, Infected, Infected, Recovered]);
        assert_eq!(counts.susceptible, 1);
        assert_eq!(counts.infected, 2);
        assert_eq!(counts.recovered, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.to_string(), "S=1 I=2 R=1");
    }

    #[test]
    fn test_position_plus_displacement() {
        let p = Position2D::new(1.0, 2.0) + Velocity2D::new(3.0, -4.0) * 0.5;
        assert_eq!(p, Position2D::new(2.5, 0.0));
        assert!((Position2D::new(0.0, 0.0).distance(&Position2D::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}
