//! Greedy action maps over the first two state dimensions

use ndarray::Array2;
use tdlab_agent::ControlAlgorithm;
use tdlab_core::{BoxSpace, RLError, Result};

/// Samples per tile side used by [`default_resolution`]
const SAMPLES_PER_TILE: usize = 3;
/// Tiles per granularity unit used by [`default_resolution`]
const TILES_PER_BIN: usize = 4;

/// Grid resolution that samples every tile of a `granularity` tiling three times
/// per side
///
/// Returns `(columns, rows)` for dimensions 0 and 1.
pub fn default_resolution(granularity: &[usize]) -> Result<(usize, usize)> {
    match granularity {
        [g0, g1, ..] => Ok((
            g0 * TILES_PER_BIN * SAMPLES_PER_TILE,
            g1 * TILES_PER_BIN * SAMPLES_PER_TILE,
        )),
        _ => Err(RLError::DimensionMismatch {
            expected: 2,
            actual: granularity.len(),
        }),
    }
}

/// Greedy action at the midpoint of every cell of a `columns × rows` grid
///
/// Dimension 0 runs along the columns and dimension 1 along the rows; any
/// further dimensions are held at the centre of their range. The agent's
/// episode state is not touched.
pub fn greedy_action_map(
    agent: &mut dyn ControlAlgorithm,
    space: &BoxSpace,
    resolution: (usize, usize),
) -> Result<Array2<usize>> {
    if space.dim() < 2 {
        return Err(RLError::InvalidSpace(format!(
            "an action map needs at least 2 state dimensions, got {}",
            space.dim()
        )));
    }
    let (columns, rows) = resolution;
    if columns == 0 || rows == 0 {
        return Err(RLError::config("action map resolution must be positive"));
    }

    let mut state: Vec<f64> = space
        .low
        .iter()
        .zip(&space.high)
        .map(|(l, h)| (l + h) / 2.0)
        .collect();

    let mut map = Array2::zeros((rows, columns));
    for ((row, column), cell) in map.indexed_iter_mut() {
        state[0] = midpoint(space.low[0], space.high[0], column, columns);
        state[1] = midpoint(space.low[1], space.high[1], row, rows);
        *cell = agent.greedy_action(&state)?;
    }
    Ok(map)
}

#[allow(clippy::cast_precision_loss)]
fn midpoint(low: f64, high: f64, index: usize, cells: usize) -> f64 {
    low + (index as f64 + 0.5) * (high - low) / cells as f64
}
