// src/io/demand.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Steady, then a single shock, then a wider volatile band.
/// This is the pattern that makes the bullwhip visible within ten cycles.
///
/// Missing fields in a config file take the classroom values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockSchedule {
    pub steady_min: u32,
    pub steady_max: u32,
    /// Cycles `1..=steady_cycles` draw from the steady band.
    pub steady_cycles: u32,
    pub shock_cycle: u32,
    pub shock_demand: u32,
    pub volatile_min: u32,
    pub volatile_max: u32,
}

impl Default for ShockSchedule {
    fn default() -> Self {
        Self {
            steady_min: 10,
            steady_max: 11,
            steady_cycles: 3,
            shock_cycle: 4,
            shock_demand: 30,
            volatile_min: 12,
            volatile_max: 19,
        }
    }
}

/// End User demand patterns.
///
/// Every draw is a pure function of `(seed, cycle)`, so a game replays
/// identically from its seed no matter how it is stepped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandScenario {
    ShockThenVolatile(ShockSchedule),
    /// The same demand every cycle. Useful for stability checks.
    Constant { value: u32 },
    /// Normally distributed demand, rounded and clamped at zero.
    Normal { mean: f64, std_dev: f64 },
}

impl Default for DemandScenario {
    fn default() -> Self {
        DemandScenario::ShockThenVolatile(ShockSchedule::default())
    }
}

impl DemandScenario {
    /// Checks the scenario parameters, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            DemandScenario::ShockThenVolatile(ShockSchedule {
                steady_min,
                steady_max,
                volatile_min,
                volatile_max,
                ..
            }) => {
                if steady_min > steady_max {
                    return Err(format!(
                        "steady demand band is inverted ({steady_min} > {steady_max})"
                    ));
                }
                if volatile_min > volatile_max {
                    return Err(format!(
                        "volatile demand band is inverted ({volatile_min} > {volatile_max})"
                    ));
                }
                Ok(())
            }
            DemandScenario::Constant { .. } => Ok(()),
            DemandScenario::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(format!(
                        "normal demand needs a finite mean and a non-negative std_dev (got {mean}, {std_dev})"
                    ));
                }
                Ok(())
            }
        }
    }

    /// End User demand for `cycle` under `seed`.
    pub fn demand_for_cycle(&self, seed: u64, cycle: u32) -> u32 {
        let mut rng = cycle_rng(seed, cycle);
        match *self {
            DemandScenario::ShockThenVolatile(shock) => {
                if cycle == shock.shock_cycle {
                    shock.shock_demand
                } else if cycle <= shock.steady_cycles {
                    draw(&mut rng, shock.steady_min, shock.steady_max)
                } else {
                    draw(&mut rng, shock.volatile_min, shock.volatile_max)
                }
            }
            DemandScenario::Constant { value } => value,
            DemandScenario::Normal { mean, std_dev } => match Normal::new(mean, std_dev) {
                Ok(normal) => {
                    let val: f64 = normal.sample(&mut rng);
                    // Demand cannot be negative
                    val.round().max(0.0) as u32
                }
                // Validation rejects these parameters; fall back to the mean.
                Err(_) => mean.round().max(0.0) as u32,
            },
        }
    }

    /// The demand for cycles `1..=cycles`, as the engine will draw it.
    pub fn schedule(&self, seed: u64, cycles: u32) -> Vec<u32> {
        (1..=cycles)
            .map(|cycle| self.demand_for_cycle(seed, cycle))
            .collect()
    }
}

/// Uniform draw from an inclusive band, tolerating the bounds either way round.
fn draw(rng: &mut StdRng, a: u32, b: u32) -> u32 {
    rng.gen_range(a.min(b)..=a.max(b))
}

/// An independent stream per cycle.
fn cycle_rng(seed: u64, cycle: u32) -> StdRng {
    let mixed = seed ^ (cycle as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}
