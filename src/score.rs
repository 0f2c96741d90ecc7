//! Scoring and the level speed curve

use std::time::Duration;

/// Points needed per level
pub const POINTS_PER_LEVEL: u64 = 1000;

/// Drop interval for levels missing from the speed table
pub const DEFAULT_DROP_INTERVAL: Duration = Duration::from_millis(300);

/// (level, rows per second). Levels not listed use `DEFAULT_DROP_INTERVAL`.
const SPEED_TABLE: [(u32, f64); 15] = [
    (1, 1.5),
    (2, 1.7),
    (3, 1.9),
    (4, 2.1),
    (5, 2.3),
    (6, 2.5),
    (7, 2.7),
    (8, 2.9),
    (9, 3.1),
    (10, 3.3),
    (11, 3.5),
    (12, 3.7),
    (15, 4.0),
    (16, 4.5),
    (17, 5.0),
];

/// Points for clearing `rows` lines with one piece
pub fn points_for(rows: usize) -> u64 {
    match rows {
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => 0,
    }
}

/// Level reached at a given score, starting from 1
pub fn level_for(points: u64) -> u32 {
    1 + (points / POINTS_PER_LEVEL) as u32
}

/// Gravity interval for a level
pub fn drop_interval(level: u32) -> Duration {
    SPEED_TABLE
        .iter()
        .find(|&&(tabulated, _)| tabulated == level)
        .map_or(DEFAULT_DROP_INTERVAL, |&(_, rate)| {
            Duration::from_secs_f64(1.0 / rate)
        })
}

/// Score tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, always `level_for(points)`
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Add the award for one lock's worth of cleared rows.
    /// Returns the points added.
    pub fn add_clear(&mut self, rows: usize) -> u64 {
        let awarded = points_for(rows);
        self.points += awarded;
        self.lines += rows as u32;
        self.level = level_for(self.points);
        awarded
    }

    /// Gravity interval for the current level
    pub fn drop_interval(&self) -> Duration {
        drop_interval(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_table() {
        let expected = [(0, 0), (1, 100), (2, 300), (3, 500), (4, 800), (5, 0)];
        for (rows, points) in expected {
            let mut score = Score::new();
            assert_eq!(score.add_clear(rows), points);
            assert_eq!(score.points, points);
        }
    }

    #[test]
    fn test_zero_rows_keeps_level() {
        let mut score = Score::new();
        score.add_clear(0);
        assert_eq!(score.level, 1);
        assert_eq!(score.lines, 0);
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::new();
        // 800 + 100 + 100
        score.add_clear(4);
        score.add_clear(1);
        assert_eq!(score.level, 1);
        score.add_clear(1);
        assert_eq!(score.points, 1000);
        assert_eq!(score.level, 2);
        assert_eq!(score.lines, 6);
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(999), 1);
        assert_eq!(level_for(1000), 2);
        assert_eq!(level_for(12_345), 13);
    }

    #[test]
    fn test_tabulated_speeds_get_faster() {
        for pair in SPEED_TABLE.windows(2) {
            let (slow, fast) = (drop_interval(pair[0].0), drop_interval(pair[1].0));
            assert!(fast < slow, "level {} should beat level {}", pair[1].0, pair[0].0);
        }
    }

    #[test]
    fn test_untabulated_levels_use_default() {
        assert_eq!(drop_interval(13), DEFAULT_DROP_INTERVAL);
        assert_eq!(drop_interval(14), DEFAULT_DROP_INTERVAL);
        assert_eq!(drop_interval(40), DEFAULT_DROP_INTERVAL);
        assert_eq!(drop_interval(0), DEFAULT_DROP_INTERVAL);
    }

    #[test]
    fn test_level_one_interval() {
        let millis = drop_interval(1).as_secs_f64() * 1000.0;
        assert!((millis - 666.666).abs() < 0.01);
    }
}
