//! Simulator settings, read from environment variables.

use railink_core::{BotStrategy, TURNS};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for one simulated game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed for both the dice and the bot
    pub seed: u64,
    /// Turns to play
    pub turns: u8,
    pub strategy: BotStrategy,
    /// Search states the enumerator may expand per call
    pub search_budget: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            turns: TURNS,
            strategy: BotStrategy::Greedy,
            search_budget: 200_000,
        }
    }
}

impl SimConfig {
    /// Read `RAILINK_SEED`, `RAILINK_TURNS`, `RAILINK_STRATEGY` and
    /// `RAILINK_SEARCH_BUDGET`, falling back to defaults for unset variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let turns: u8 = parse_var(&lookup, "RAILINK_TURNS", defaults.turns, "a number of turns")?;
        if turns == 0 || turns > TURNS {
            return Err(ConfigError::Invalid {
                name: "RAILINK_TURNS",
                value: turns.to_string(),
                expected: "between 1 and 7",
            });
        }

        let strategy = match lookup("RAILINK_STRATEGY") {
            None => defaults.strategy,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "greedy" => BotStrategy::Greedy,
                "random" => BotStrategy::Random,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "RAILINK_STRATEGY",
                        value,
                        expected: "\"greedy\" or \"random\"",
                    })
                }
            },
        };

        Ok(Self {
            seed: parse_var(&lookup, "RAILINK_SEED", defaults.seed, "an unsigned integer")?,
            turns,
            strategy,
            search_budget: parse_var(
                &lookup,
                "RAILINK_SEARCH_BUDGET",
                defaults.search_budget,
                "a positive number of states",
            )?,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<SimConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SimConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]).unwrap(), SimConfig::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let config = config_from(&[
            ("RAILINK_SEED", "7"),
            ("RAILINK_TURNS", "3"),
            ("RAILINK_STRATEGY", "Random"),
            ("RAILINK_SEARCH_BUDGET", "1000"),
        ])
        .unwrap();
        assert_eq!(
            config,
            SimConfig {
                seed: 7,
                turns: 3,
                strategy: BotStrategy::Random,
                search_budget: 1000,
            }
        );
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(matches!(
            config_from(&[("RAILINK_SEED", "forty-two")]),
            Err(ConfigError::Invalid {
                name: "RAILINK_SEED",
                ..
            })
        ));
        assert!(config_from(&[("RAILINK_TURNS", "0")]).is_err());
        assert!(config_from(&[("RAILINK_TURNS", "8")]).is_err());
        assert!(config_from(&[("RAILINK_STRATEGY", "clever")]).is_err());
    }
}
