//! Parameter grid builder — enumeration with a combination budget.
//!
//! Declared parameter ranges are resolved against caller overrides, each
//! dimension is enumerated into a sorted value list, and the raw Cartesian
//! count is checked against the budget. Over budget, either the caller gets
//! an error or every step is uniformly coarsened until the grid fits.

use std::collections::BTreeMap;

use backlab_core::ParamSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid construction failure.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("parameter '{name}': resolved step must be positive, got {step}")]
    NonPositiveStep { name: String, step: f64 },
    #[error(
        "grid has {raw_count} raw combinations, over the budget of {budget} \
         with auto-scaling disabled"
    )]
    BudgetExceeded { raw_count: u128, budget: u64 },
}

/// Caller-supplied narrowing of one declared range. Every field is
/// independently optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RangeOverride {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// One declared parameter after override resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub is_integer: bool,
}

impl ParamDefinition {
    fn resolve(
        name: &str,
        spec: &ParamSpec,
        overrides: &BTreeMap<String, RangeOverride>,
        step_scale: f64,
    ) -> Result<Self, GridError> {
        let ov = overrides.get(name).copied().unwrap_or_default();
        let min = ov.min.unwrap_or(spec.min);
        let max = ov.max.unwrap_or(spec.max);
        let step = ov.step.unwrap_or(spec.step) * step_scale;
        if step <= 0.0 || !step.is_finite() {
            return Err(GridError::NonPositiveStep {
                name: name.to_string(),
                step,
            });
        }
        let is_integer = [spec.default, min, max, step]
            .iter()
            .all(|v| v.fract() == 0.0);
        Ok(Self {
            name: name.to_string(),
            min,
            max,
            step,
            is_integer,
        })
    }

    /// Enumerate this dimension with the step coarsened by `multiplier`.
    /// `max` is always force-included; the list is deduplicated ascending.
    fn enumerate(&self, multiplier: u32) -> Vec<f64> {
        let step = self.step * multiplier as f64;
        let eps = step * 1e-9;
        let mut values = Vec::new();
        let mut i = 0u64;
        loop {
            let v = self.min + i as f64 * step;
            if v > self.max + eps {
                break;
            }
            values.push(v);
            i += 1;
        }
        values.push(self.max);

        let precision = if self.is_integer {
            0
        } else {
            self.decimal_precision()
        };
        let scale = 10f64.powi(precision as i32);
        for v in values.iter_mut() {
            *v = (*v * scale).round() / scale;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values.dedup();
        values
    }

    /// Arithmetic length of `enumerate(multiplier)` without building the
    /// list. Mirrors the walk: `floor((max - min + eps) / step) + 1` points,
    /// plus one more when the last aligned point falls short of the
    /// force-included `max`.
    fn walk_len(&self, multiplier: u32) -> u128 {
        let step = self.step * multiplier as f64;
        let eps = step * 1e-9;
        if self.min > self.max + eps {
            // The walk yields nothing; only the forced max survives.
            return 1;
        }
        let steps = ((self.max - self.min + eps) / step).floor();
        let steps = if steps.is_finite() && steps >= 0.0 {
            steps.min(u64::MAX as f64) as u128
        } else {
            0
        };
        let last = self.min + steps as f64 * step;
        let extra = if last < self.max - eps { 1 } else { 0 };
        steps + 1 + extra
    }

    /// Minimal decimal precision implied by min/max/step, capped at 8.
    fn decimal_precision(&self) -> u32 {
        [self.min, self.max, self.step]
            .iter()
            .map(|&v| decimals_of(v))
            .max()
            .unwrap_or(0)
    }
}

fn decimals_of(value: f64) -> u32 {
    for d in 0..=8u32 {
        let scale = 10f64.powi(d as i32);
        if ((value * scale).round() / scale - value).abs() < 1e-9 {
            return d;
        }
    }
    8
}

/// One enumerated dimension of a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParam {
    pub name: String,
    pub values: Vec<f64>,
}

/// The enumerated parameter space for one strategy, with the declared
/// defaults for the parameters the grid does not vary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub params: Vec<GridParam>,
    pub default_params: BTreeMap<String, f64>,
    pub estimated_combinations: u64,
    pub step_multiplier: u32,
}

impl Grid {
    /// Lazy, restartable walk over the Cartesian product. A grid with no
    /// parameters yields exactly one empty combination.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations {
            grid: self,
            indices: vec![0; self.params.len()],
            exhausted: self.params.iter().any(|p| p.values.is_empty()),
        }
    }
}

/// Odometer iterator over a grid's value lists. The last parameter varies
/// fastest; enumeration order is the deterministic order ranking ties fall
/// back to.
pub struct Combinations<'a> {
    grid: &'a Grid,
    indices: Vec<usize>,
    exhausted: bool,
}

impl Iterator for Combinations<'_> {
    type Item = BTreeMap<String, f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let combo: BTreeMap<String, f64> = self
            .grid
            .params
            .iter()
            .zip(self.indices.iter())
            .map(|(p, &i)| (p.name.clone(), p.values[i]))
            .collect();

        // Advance the odometer, rightmost digit first.
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.exhausted = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.grid.params[pos].values.len() {
                break;
            }
            self.indices[pos] = 0;
        }
        Some(combo)
    }
}

/// Build the grid for one strategy's declared parameter space.
///
/// Steps are scaled by `step_scale` before enumeration. Combination counts
/// are computed arithmetically per dimension, so the budget check and the
/// multiplier search never materialize an over-budget grid; only the final
/// accepted grid is enumerated. If the raw count exceeds `max_combinations`,
/// auto-scaling coarsens every step by a uniform multiplier
/// `m = ceil((raw/budget)^(1/n))`, incrementing `m` until the grid fits;
/// with auto-scaling off the caller gets the raw count back in the error.
pub fn build_grid(
    specs: &BTreeMap<String, ParamSpec>,
    overrides: &BTreeMap<String, RangeOverride>,
    step_scale: f64,
    max_combinations: u64,
    auto_scale: bool,
) -> Result<Grid, GridError> {
    let definitions: Vec<ParamDefinition> = specs
        .iter()
        .map(|(name, spec)| ParamDefinition::resolve(name, spec, overrides, step_scale))
        .collect::<Result<_, _>>()?;
    let default_params: BTreeMap<String, f64> = specs
        .iter()
        .map(|(name, spec)| (name.clone(), spec.default))
        .collect();

    if definitions.is_empty() {
        return Ok(Grid {
            params: Vec::new(),
            default_params,
            estimated_combinations: 1,
            step_multiplier: 1,
        });
    }

    let count_all = |multiplier: u32| -> u128 {
        definitions
            .iter()
            .map(|d| d.walk_len(multiplier))
            .fold(1u128, |acc, len| acc.saturating_mul(len))
    };
    let materialize = |multiplier: u32| -> Grid {
        let params: Vec<GridParam> = definitions
            .iter()
            .map(|d| GridParam {
                name: d.name.clone(),
                values: d.enumerate(multiplier),
            })
            .collect();
        // Rounding dedup can only shrink a list, so the product of the
        // actual lengths never exceeds the arithmetic count checked above.
        let count = params
            .iter()
            .map(|p| p.values.len() as u64)
            .fold(1u64, |acc, len| acc.saturating_mul(len));
        Grid {
            params,
            default_params: default_params.clone(),
            estimated_combinations: count,
            step_multiplier: multiplier,
        }
    };

    let raw_count = count_all(1);
    if raw_count <= max_combinations as u128 {
        return Ok(materialize(1));
    }

    if !auto_scale {
        return Err(GridError::BudgetExceeded {
            raw_count,
            budget: max_combinations,
        });
    }

    let n = definitions.len() as f64;
    let ratio = raw_count as f64 / max_combinations as f64;
    let mut multiplier = ratio.powf(1.0 / n).ceil() as u32;
    if multiplier < 2 {
        multiplier = 2;
    }

    // Rounding can keep the count just over budget; keep coarsening. Each
    // dimension bottoms out at {min, max}, so once every list is that short
    // no multiplier can shrink the grid further.
    loop {
        let count = count_all(multiplier);
        let irreducible = definitions.iter().all(|d| d.walk_len(multiplier) <= 2);
        if count <= max_combinations as u128 || irreducible {
            return Ok(materialize(multiplier));
        }
        multiplier += 1;
    }
}
