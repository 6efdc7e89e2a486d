//! # Correction Grid
//!
//! A [`Grid`] is a piecewise constant lookup table over the horizontal position of an object
//! (the steering axis, from -1 to +1) and its vertical position in the frame (the distance axis,
//! from 0 at the top to 1 at the bottom).
//!
//! The default steering correction grid is:
//!
//! ```text
//!         -1   -0.66 -0.33   0    0.33  0.66   1
//!     0%  |-----|-----|-----|-----|-----|-----|
//!         |  0  |  0  |  0  |  0  |  0  |  0  |
//!     20% |-----|-----|-----|-----|-----|-----|
//!         |  0  |  0  |  0  |  0  |  0  |  0  |
//!     40% |-----|-----|-----|-----|-----|-----|
//!         |  0  |  0  | 0.25|-0.25|  0  |  0  |
//!     60% |-----|-----|-----|-----|-----|-----|
//!         |  0  | 0.25| 0.5 |-0.5 |-0.25|  0  |
//!     80% |-----|-----|-----|-----|-----|-----|
//!         | 0.25| 0.5 |  1  |  -1 |-0.5 |-0.25|
//!     100%|-----|-----|-----|-----|-----|-----|
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{ConfigLoadError, CorrError, GridAxis};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const DEFAULT_DISTANCE_STEPS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

const DEFAULT_STEERING_STEPS: [f64; 7] = [-1.0, -0.66, -0.33, 0.0, 0.33, 0.66, 1.0];

const DEFAULT_STEERING_DATA: [[f64; 6]; 5] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.25, -0.25, 0.0, 0.0],
    [0.0, 0.25, 0.5, -0.5, -0.25, 0.0],
    [0.25, 0.5, 1.0, -1.0, -0.5, -0.25],
];

const DEFAULT_OBJ_MOVE_FACTORS_DATA: [[f64; 6]; 5] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 0.25, 0.0, 0.0, -0.25, 0.0],
    [0.5, 0.25, 0.0, 0.0, -0.5, -0.25],
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An immutable step function lookup table.
///
/// Rows of `data` are indexed by distance bucket, columns by steering bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    distance_steps: Vec<f64>,
    steering_steps: Vec<f64>,
    data: Vec<Vec<f64>>,
}

/// On disk representation of a [`Grid`], validated by [`Grid::new`].
#[derive(Deserialize)]
struct GridFile {
    distance_steps: Vec<f64>,
    steering_steps: Vec<f64>,
    data: Vec<Vec<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Grid {
    /// Build a new grid, checking that both step sequences are strictly increasing and that the
    /// data has one row per distance bucket and one column per steering bucket.
    pub fn new(
        distance_steps: Vec<f64>,
        steering_steps: Vec<f64>,
        data: Vec<Vec<f64>>,
    ) -> Result<Self, ConfigLoadError> {
        check_steps(GridAxis::Distance, &distance_steps)?;
        check_steps(GridAxis::Steering, &steering_steps)?;

        if data.len() != distance_steps.len() - 1 {
            return Err(ConfigLoadError::InvalidShape(format!(
                "expected {} rows of data, found {}",
                distance_steps.len() - 1,
                data.len()
            )));
        }

        for (i, row) in data.iter().enumerate() {
            if row.len() != steering_steps.len() - 1 {
                return Err(ConfigLoadError::InvalidShape(format!(
                    "expected {} columns in row {}, found {}",
                    steering_steps.len() - 1,
                    i,
                    row.len()
                )));
            }
        }

        Ok(Self {
            distance_steps,
            steering_steps,
            data,
        })
    }

    /// Load a grid from a JSON file with `distance_steps`, `steering_steps` and `data` fields.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        let s = fs::read_to_string(path)
            .map_err(|e| ConfigLoadError::FileLoadError(path.to_path_buf(), e))?;

        let file: GridFile = serde_json::from_str(&s)
            .map_err(|e| ConfigLoadError::DeserialiseError(path.to_path_buf(), e))?;

        Self::new(file.distance_steps, file.steering_steps, file.data)
    }

    /// The built-in steering correction grid.
    pub fn default_steering() -> Self {
        Self::from_default_data(&DEFAULT_STEERING_DATA)
    }

    /// The built-in object move factors grid.
    pub fn default_obj_move_factors() -> Self {
        Self::from_default_data(&DEFAULT_OBJ_MOVE_FACTORS_DATA)
    }

    fn from_default_data(data: &[[f64; 6]; 5]) -> Self {
        Self {
            distance_steps: DEFAULT_DISTANCE_STEPS.to_vec(),
            steering_steps: DEFAULT_STEERING_STEPS.to_vec(),
            data: data.iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Get the value of the bucket containing the given position.
    ///
    /// Values outside of the steps bounds are rejected, no clamping is performed. A value equal
    /// to the last boundary of an axis is not matched by any bucket and so falls into bucket `0`
    /// of that axis.
    pub fn value_of(&self, steering: f64, distance: f64) -> Result<f64, CorrError> {
        check_in_range(GridAxis::Steering, &self.steering_steps, steering)?;
        check_in_range(GridAxis::Distance, &self.distance_steps, distance)?;

        let col = bucket_index(&self.steering_steps, steering);
        let row = bucket_index(&self.distance_steps, distance);

        Ok(self.data[row][col])
    }

    pub fn distance_steps(&self) -> &[f64] {
        &self.distance_steps
    }

    pub fn steering_steps(&self) -> &[f64] {
        &self.steering_steps
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_steps(axis: GridAxis, steps: &[f64]) -> Result<(), ConfigLoadError> {
    if steps.len() < 2 {
        return Err(ConfigLoadError::InvalidShape(format!(
            "{} steps must contain at least 2 boundaries, found {}",
            axis,
            steps.len()
        )));
    }

    if !steps.windows(2).all(|w| w[0] < w[1]) {
        return Err(ConfigLoadError::InvalidShape(format!(
            "{} steps must be strictly increasing, found {:?}",
            axis, steps
        )));
    }

    Ok(())
}

fn check_in_range(axis: GridAxis, steps: &[f64], value: f64) -> Result<(), CorrError> {
    let min = steps[0];
    let max = steps[steps.len() - 1];

    // Written so that NaN is rejected too
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(CorrError::OutOfRange {
            axis,
            value,
            min,
            max,
        })
    }
}

/// Index of the first bucket whose upper boundary is strictly greater than `value`, or `0` if no
/// such bucket exists.
fn bucket_index(steps: &[f64], value: f64) -> usize {
    steps[1..].iter().position(|&b| value < b).unwrap_or(0)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_value_of() -> Result<(), CorrError> {
        let grid = Grid::default_steering();

        assert_eq!(grid.value_of(0.0, 0.0)?, 0.0);

        // Distance bucket limits
        assert_eq!(grid.value_of(0.0, 0.39999)?, 0.0);
        assert_eq!(grid.value_of(0.0, 0.400001)?, -0.25);

        // Steering bucket limits
        assert_eq!(grid.value_of(-0.660001, 0.85)?, 0.25);
        assert_eq!(grid.value_of(-0.66, 0.85)?, 0.5);
        assert_eq!(grid.value_of(0.0, 0.9)?, -1.0);
        assert_eq!(grid.value_of(-0.2, 0.9)?, 1.0);

        Ok(())
    }

    #[test]
    fn test_last_boundary_falls_into_first_bucket() -> Result<(), CorrError> {
        let grid = Grid::default_steering();

        // Steering at the maximum selects column 0 rather than column 5
        assert_eq!(grid.value_of(1.0, 0.85)?, grid.data()[4][0]);
        assert_eq!(grid.value_of(1.0, 0.85)?, 0.25);

        // Distance at the maximum selects row 0 rather than row 4
        assert_eq!(grid.value_of(0.0, 1.0)?, grid.data()[0][3]);
        assert_eq!(grid.value_of(0.0, 1.0)?, 0.0);

        let factors = Grid::default_obj_move_factors();
        assert_eq!(factors.value_of(1.0, 0.9)?, 0.5);
        assert_eq!(factors.value_of(0.99, 0.9)?, -0.25);

        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let grid = Grid::default_steering();
        let eps = 1e-6;

        for (s, d, axis) in &[
            (-1.0 - eps, 0.85, GridAxis::Steering),
            (1.0 + eps, 0.85, GridAxis::Steering),
            (-0.65, -eps, GridAxis::Distance),
            (-0.65, 1.0 + eps, GridAxis::Distance),
            (std::f64::NAN, 0.85, GridAxis::Steering),
        ] {
            match grid.value_of(*s, *d) {
                Err(CorrError::OutOfRange { axis: a, .. }) => assert_eq!(a, *axis),
                r => panic!("Expected out of range error for ({}, {}), got {:?}", s, d, r),
            }
        }
    }

    #[test]
    fn test_new_rejects_invalid_grids() {
        let steps = || vec![0.0, 0.5, 1.0];

        assert!(Grid::new(steps(), steps(), vec![vec![0.0; 2]; 2]).is_ok());

        // Too few boundaries
        assert!(matches!(
            Grid::new(vec![0.0], steps(), vec![]),
            Err(ConfigLoadError::InvalidShape(_))
        ));

        // Not strictly increasing
        assert!(matches!(
            Grid::new(vec![0.0, 0.5, 0.5], steps(), vec![vec![0.0; 2]; 2]),
            Err(ConfigLoadError::InvalidShape(_))
        ));

        // Wrong number of rows
        assert!(matches!(
            Grid::new(steps(), steps(), vec![vec![0.0; 2]; 3]),
            Err(ConfigLoadError::InvalidShape(_))
        ));

        // Wrong number of columns
        assert!(matches!(
            Grid::new(steps(), steps(), vec![vec![0.0; 2], vec![0.0; 1]]),
            Err(ConfigLoadError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_load() -> Result<(), ConfigLoadError> {
        let params_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../params");

        assert_eq!(
            Grid::load(params_dir.join("steering_grid.json"))?,
            Grid::default_steering()
        );
        assert_eq!(
            Grid::load(params_dir.join("obj_move_factors.json"))?,
            Grid::default_obj_move_factors()
        );

        assert!(matches!(
            Grid::load(params_dir.join("missing_grid.json")),
            Err(ConfigLoadError::FileLoadError(..))
        ));
        assert!(matches!(
            Grid::load(params_dir.join("steer_exec.toml")),
            Err(ConfigLoadError::DeserialiseError(..))
        ));

        Ok(())
    }
}
