//! Skill levels.
//!
//! The UI exposes a 1..=20 slider; each level maps to a fixed search
//! budget through the closed table below. The mapping is monotonic:
//! a higher level never gets less depth or less time than a lower one.
//! Quiescence joins at level 4, and the root randomization window (which
//! makes low levels less deterministic without searching worse) tapers
//! to zero at level 15.

use std::time::Duration;

use crate::error::ChessError;

/// (max depth, time budget in ms, quiescence, randomization window in cp)
const SKILL_TABLE: [(u8, u64, bool, i32); 20] = [
    (1, 250, false, 150),
    (1, 250, false, 100),
    (2, 500, false, 80),
    (2, 500, true, 60),
    (3, 1000, true, 50),
    (3, 1000, true, 40),
    (4, 1500, true, 30),
    (4, 1500, true, 25),
    (4, 2000, true, 20),
    (5, 2000, true, 15),
    (5, 2500, true, 10),
    (5, 3000, true, 10),
    (6, 3000, true, 5),
    (6, 4000, true, 5),
    (6, 5000, true, 0),
    (7, 5000, true, 0),
    (7, 6000, true, 0),
    (7, 8000, true, 0),
    (8, 8000, true, 0),
    (8, 10000, true, 0),
];

/// Search budget for one request. Immutable once constructed; the only
/// public constructor is the level table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillConfig {
    level: u8,
    pub(crate) max_depth: u8,
    pub(crate) max_time: Option<Duration>,
    pub(crate) quiescence: bool,
    pub(crate) randomization: i32,
}

impl SkillConfig {
    /// Look up the configuration for a 1..=20 skill level.
    pub fn from_level(level: u8) -> Result<Self, ChessError> {
        if !(1..=20).contains(&level) {
            return Err(ChessError::InvalidSkillLevel(level));
        }
        let (max_depth, time_ms, quiescence, randomization) = SKILL_TABLE[level as usize - 1];
        Ok(SkillConfig {
            level,
            max_depth,
            max_time: Some(Duration::from_millis(time_ms)),
            quiescence,
            randomization,
        })
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    pub fn quiescence(&self) -> bool {
        self.quiescence
    }

    pub fn randomization(&self) -> i32 {
        self.randomization
    }

    #[cfg(test)]
    pub(crate) fn fixed(max_depth: u8, max_time: Option<Duration>, randomization: i32) -> Self {
        SkillConfig {
            level: 20,
            max_depth,
            max_time,
            quiescence: true,
            randomization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert_eq!(
            SkillConfig::from_level(0),
            Err(ChessError::InvalidSkillLevel(0))
        );
        assert_eq!(
            SkillConfig::from_level(21),
            Err(ChessError::InvalidSkillLevel(21))
        );
    }

    #[test]
    fn table_is_monotonic() {
        let mut previous = SkillConfig::from_level(1).unwrap();
        for level in 2..=20 {
            let config = SkillConfig::from_level(level).unwrap();
            assert!(config.max_depth >= previous.max_depth, "depth at {}", level);
            assert!(config.max_time >= previous.max_time, "time at {}", level);
            assert!(
                config.randomization <= previous.randomization,
                "randomization at {}",
                level
            );
            previous = config;
        }
    }

    #[test]
    fn top_level_is_deterministic() {
        let config = SkillConfig::from_level(20).unwrap();
        assert_eq!(config.randomization(), 0);
        assert_eq!(config.max_depth(), 8);
        assert!(config.quiescence());
    }
}
