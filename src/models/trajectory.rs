use crate::models::{
    agent::Agent,
    common::*,
};

/// 1回の `run` で記録される軌跡
///
/// ステップごとに全個体の位置・健康状態・自粛フラグと S/I/R 集計値を保持します。
/// `x[step][agent]` の形でアクセスできます。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryRecord {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub state: Vec<Vec<HealthState>>,
    pub distancing: Vec<Vec<bool>>,
    pub s: Vec<usize>,
    pub i: Vec<usize>,
    pub r: Vec<usize>,
}

impl TrajectoryRecord {
    /// `steps` ステップ分の領域を確保した空の記録を作成
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            x: Vec::with_capacity(steps),
            y: Vec::with_capacity(steps),
            state: Vec::with_capacity(steps),
            distancing: Vec::with_capacity(steps),
            s: Vec::with_capacity(steps),
            i: Vec::with_capacity(steps),
            r: Vec::with_capacity(steps),
        }
    }

    /// 現在の全個体の状態を1ステップ分として追記
    pub fn record(&mut self, agents: &[Agent]) {
        self.x.push(agents.iter().map(|a| a.position.x).collect());
        self.y.push(agents.iter().map(|a| a.position.y).collect());
        self.state.push(agents.iter().map(|a| a.health()).collect());
        self.distancing.push(agents.iter().map(|a| a.is_distancing()).collect());

        let counts = SirCounts::tally(agents.iter().map(|a| a.health()));
        self.s.push(counts.susceptible);
        self.i.push(counts.infected);
        self.r.push(counts.recovered);
    }

    /// 記録済みステップ数
    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// 指定ステップの集計値
    pub fn counts(&self, step: usize) -> Option<SirCounts> {
        Some(SirCounts {
            susceptible: *self.s.get(step)?,
            infected: *self.i.get(step)?,
            recovered: *self.r.get(step)?,
        })
    }

    /// 最終ステップの集計値
    pub fn final_counts(&self) -> Option<SirCounts> {
        self.counts(self.len().checked_sub(1)?)
    }

    /// 感染者数が最大となった最初のステップとその人数
    pub fn peak_infected(&self) -> Option<(usize, usize)> {
        self.i
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (step, count)| match best {
                Some((_, peak)) if peak >= count => best,
                _ => Some((step, count)),
            })
    }

    /// 指定ステップの全個体位置
    pub fn positions(&self, step: usize) -> Option<Vec<Position2D>> {
        let xs = self.x.get(step)?;
        let ys = self.y.get(step)?;
        Some(
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| Position2D::new(x, y))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(states: &[HealthState]) -> Vec<Agent> {
        states
            .iter()
            .enumerate()
            .map(|(id, &h)| Agent::new(id, Position2D::new(id as f64, -(id as f64)), Velocity2D::ZERO, h))
            .collect()
    }

    #[test]
    fn test_record_appends_snapshot() {
        use HealthState::*;
        let mut record = TrajectoryRecord::with_capacity(2);
        assert!(record.is_empty());
        record.record(&agents(&[Susceptible, Infected, Recovered]));
        record.record(&agents(&[Infected, Infected, Recovered]));

        assert_eq!(record.len(), 2);
        assert_eq!(record.x[1], vec![0.0, 1.0, 2.0]);
        assert_eq!(record.y[0], vec![0.0, -1.0, -2.0]);
        assert_eq!(record.state[1], vec![Infected, Infected, Recovered]);
        assert_eq!(record.distancing[0], vec![false; 3]);
        assert_eq!(record.counts(0), Some(SirCounts { susceptible: 1, infected: 1, recovered: 1 }));
        assert_eq!(record.final_counts().map(|c| c.infected), Some(2));
        assert_eq!(record.counts(2), None);
        assert_eq!(record.positions(1).map(|p| p[2]), Some(Position2D::new(2.0, -2.0)));
    }

    #[test]
    fn test_peak_infected_returns_first_maximum() {
        let record = TrajectoryRecord {
            i: vec![1, 3, 2, 3, 0],
            s: vec![0; 5],
            r: vec![0; 5],
            ..Default::default()
        };
        assert_eq!(record.peak_infected(), Some((1, 3)));
        assert_eq!(TrajectoryRecord::default().peak_infected(), None);
        assert_eq!(TrajectoryRecord::default().final_counts(), None);
    }
}
