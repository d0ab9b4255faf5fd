use crate::models::{
    common::Position2D,
    traits::IProximityDetector,
};

/// 総当たり近接検出器
///
/// 全ペアの距離を O(N²) で調べます。千体程度までの集団を想定しています。
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseDetector;

impl PairwiseDetector {
    pub fn new() -> Self {
        Self
    }
}

impl IProximityDetector for PairwiseDetector {
    fn detect(&self, positions: &[Position2D], radius: f64) -> Vec<(usize, usize)> {
        let contact_sq = (2.0 * radius).powi(2);
        let mut pairs = Vec::new();

        for (i, a) in positions.iter().enumerate() {
            for (offset, b) in positions[i + 1..].iter().enumerate() {
                if a.distance_squared(b) < contact_sq {
                    pairs.push((i, i + 1 + offset));
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_pairs_in_ascending_order() {
        let positions = vec![
            Position2D::new(0.0, 0.0),
            Position2D::new(10.0, 0.0),
            Position2D::new(1.0, 0.0),
            Position2D::new(10.5, 0.0),
            Position2D::new(0.5, 0.5),
        ];
        let pairs = PairwiseDetector.detect(&positions, 1.0);
        assert_eq!(pairs, vec![(0, 2), (0, 4), (1, 3), (2, 4)]);
    }

    #[test]
    fn test_contact_distance_is_strict() {
        // 距離ちょうど 2r は接触しない
        let positions = vec![Position2D::new(0.0, 0.0), Position2D::new(2.0, 0.0)];
        assert!(PairwiseDetector.detect(&positions, 1.0).is_empty());

        let positions = vec![Position2D::new(0.0, 0.0), Position2D::new(1.999, 0.0)];
        assert_eq!(PairwiseDetector.detect(&positions, 1.0), vec![(0, 1)]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(PairwiseDetector.detect(&[], 1.0).is_empty());
        assert!(PairwiseDetector.detect(&[Position2D::new(0.0, 0.0)], 1.0).is_empty());
    }

    #[test]
    fn test_coincident_positions_are_reported() {
        let positions = vec![Position2D::new(3.0, 3.0); 3];
        assert_eq!(
            PairwiseDetector.detect(&positions, 0.5),
            vec![(0, 1), (0, 2), (1, 2)]
        );
    }
}
