use crate::{LotteryError, Result};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    pub set_count: usize,
    pub numbers_per_set: usize,
    pub max_number: u8,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            set_count: 5,
            numbers_per_set: 6,
            max_number: 49,
        }
    }
}

impl DrawConfig {
    pub fn validate(&self) -> Result<()> {
        if self.set_count == 0 {
            return Err(LotteryError::InvalidConfig(
                "Set count must be greater than 0".to_string(),
            ));
        }

        if self.numbers_per_set == 0 {
            return Err(LotteryError::InvalidConfig(
                "Numbers per set must be greater than 0".to_string(),
            ));
        }

        if self.numbers_per_set > self.max_number as usize {
            return Err(LotteryError::RangeTooSmall {
                requested: self.numbers_per_set,
                max: self.max_number,
            });
        }

        Ok(())
    }
}

/// Unique numbers, ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberSet(Vec<u8>);

impl NumberSet {
    pub fn numbers(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone)]
pub struct NumberSetGenerator {
    config: DrawConfig,
}

impl NumberSetGenerator {
    pub fn new(config: DrawConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// One set of distinct numbers in `1..=max_number`
    pub fn generate_set<R: Rng + ?Sized>(&self, rng: &mut R) -> NumberSet {
        let mut numbers: Vec<u8> = index::sample(
            rng,
            self.config.max_number as usize,
            self.config.numbers_per_set,
        )
        .into_iter()
        .map(|i| (i + 1) as u8)
        .collect();
        numbers.sort_unstable();
        NumberSet(numbers)
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<NumberSet>> {
        let sets: Vec<NumberSet> = (0..self.config.set_count)
            .map(|_| self.generate_set(rng))
            .collect();

        tracing::debug!("Generated {} number sets", sets.len());
        Ok(sets)
    }

    /// `Set N: a, b, c` lines, numbered from 1
    pub fn render(sets: &[NumberSet]) -> Vec<String> {
        sets.iter()
            .enumerate()
            .map(|(i, set)| format!("Set {}: {}", i + 1, set))
            .collect()
    }
}
