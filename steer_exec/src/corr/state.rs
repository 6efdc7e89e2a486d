//! Implementations for the grid corrector

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};

// Internal
use comms_if::eqpt::per::Object;
use util::maths::{clamp, lin_map};

use super::{
    filter_big_objects, filter_distant_objects, group_objects, nearest_object, ConfigLoadError,
    CorrError, CorrParams, Corrector, Grid,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering corrector based on two lookup grids.
///
/// 1. When driving straight (steering near 0) the nearest object is looked up in the steering
///    grid:
///    - if the object is entirely on the right of the left edge (`left > 0` and `right > 0`)
///      its left edge is used,
///    - otherwise its horizontal centre is used.
///
/// 2. When turning, the nearest object is first shifted horizontally by
///    `current_steering * factor`, where `factor` comes from the object move factors grid, to
///    approximate where it will be if the turn continues. Step 1 is then applied to the shifted
///    object and the result saturated to `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct GridCorrector {
    steering_grid: Grid,
    obj_move_factors: Grid,
    delta_middle: f64,
    size_threshold: f64,
    img_width: u32,
    img_height: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridCorrector {
    /// Create a new corrector, loading the grids given in the parameters.
    pub fn new(params: &CorrParams) -> Result<Self, CorrError> {
        let steering_grid = load_grid(
            "steering grid",
            &params.steering_grid_path,
            Grid::default_steering,
        )?;
        let obj_move_factors = load_grid(
            "object move factors",
            &params.obj_move_factors_path,
            Grid::default_obj_move_factors,
        )?;

        Ok(Self::with_grids(steering_grid, obj_move_factors, params))
    }

    /// Create a new corrector from already built grids. The grid paths of `params` are ignored.
    pub fn with_grids(steering_grid: Grid, obj_move_factors: Grid, params: &CorrParams) -> Self {
        Self {
            steering_grid,
            obj_move_factors,
            delta_middle: params.delta_middle,
            size_threshold: params.size_threshold,
            img_width: params.img_width,
            img_height: params.img_height,
        }
    }

    /// Objects remaining once the detections have been filtered and grouped.
    pub fn objects_to_avoid(&self, objects: &[Object]) -> Vec<Object> {
        let objects = filter_big_objects(objects, self.img_width, self.img_height, self.size_threshold);
        let objects = filter_distant_objects(&objects);

        debug!("{} objects to avoid", objects.len());

        group_objects(&objects, self.img_width, self.img_height)
    }

    /// Steering deviation needed to avoid the given object.
    ///
    /// If the object is outside the steering grid no deviation is applied.
    pub fn compute_deviation(&self, nearest: &Object) -> f64 {
        trace!("Search delta value for bottom limit: {}", nearest.bottom);

        let left = nearest.left as f64;
        let right = nearest.right as f64;

        let x = if nearest.left > 0.0 && nearest.right > 0.0 {
            left
        } else {
            left + (right - left) / 2.0
        };

        let delta = match self
            .steering_grid
            .value_of(lin_map((0.0, 1.0), (-1.0, 1.0), x), nearest.bottom as f64)
        {
            Ok(d) => d,
            Err(e) => {
                warn!("Unable to compute delta to apply to steering, skip correction: {}", e);
                0.0
            }
        };

        debug!("New deviation computed: {}", delta);
        delta
    }

    fn is_straight(&self, steering: f64) -> bool {
        steering > -self.delta_middle && steering < self.delta_middle
    }
}

impl Corrector for GridCorrector {
    fn adjust(&self, current_steering: f64, objects: &[Object]) -> f64 {
        let objects = self.objects_to_avoid(objects);

        if objects.is_empty() {
            return current_steering;
        }

        let nearest = match nearest_object(&objects) {
            Ok(o) => o,
            Err(e) => {
                warn!("Unexpected error on nearest object search, ignore objects: {}", e);
                return current_steering;
            }
        };

        // Straight, the deviation is added as is
        if self.is_straight(current_steering) {
            return current_steering + self.compute_deviation(&nearest);
        }

        // Turning, move the object according to the current turn before looking it up
        let factor = match self
            .obj_move_factors
            .value_of(nearest.right as f64, nearest.bottom as f64)
        {
            Ok(f) => f,
            Err(e) => {
                warn!("Unable to compute factor to apply to object: {}", e);
                return current_steering;
            }
        };

        let shift = (current_steering * factor) as f32;
        let moved = Object {
            left: nearest.left + shift,
            right: nearest.right + shift,
            ..nearest
        };

        let result = current_steering + self.compute_deviation(&moved);

        clamp(&result, &-1.0, &1.0)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn load_grid<F>(
    name: &str,
    path: &Option<std::path::PathBuf>,
    default: F,
) -> Result<Grid, ConfigLoadError>
where
    F: FnOnce() -> Grid,
{
    match path {
        Some(p) => {
            let grid = Grid::load(p)?;
            debug!("Loaded {} from {:?}", name, p);
            Ok(grid)
        }
        None => {
            warn!("No configuration defined for the {}, use default", name);
            Ok(default())
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    /// Near field objects, passing both detection filters
    const MIDDLE_NEAR: Object = obj(0.4, 0.92, 0.6, 0.98);
    const LEFT_NEAR: Object = obj(0.1, 0.92, 0.3, 0.98);
    const RIGHT_NEAR: Object = obj(0.7, 0.92, 0.9, 0.98);

    const MIDDLE_DISTANT: Object = obj(0.4, 0.1, 0.6, 0.2);

    const fn obj(left: f32, top: f32, right: f32, bottom: f32) -> Object {
        Object {
            obj_type: comms_if::eqpt::per::ObjectType::Any,
            left,
            top,
            right,
            bottom,
            confidence: 0.9,
        }
    }

    fn corrector() -> GridCorrector {
        GridCorrector::new(&CorrParams::default()).unwrap()
    }

    fn assert_close(got: f64, want: f64) {
        assert!(
            (got - want).abs() < 1e-6,
            "adjust() = {}, want {}",
            got,
            want
        );
    }

    #[test]
    fn test_adjust_without_objects() {
        let c = corrector();

        for &s in &[-1.0, -0.9, -0.05, 0.0, 0.05, 0.3, 0.9, 1.0] {
            assert_eq!(c.adjust(s, &[]), s);
        }
    }

    #[test]
    fn test_adjust_ignores_filtered_objects() {
        let c = corrector();

        for &s in &[0.0, -0.9, 0.9] {
            assert_eq!(c.adjust(s, &[MIDDLE_DISTANT]), s);
        }

        // Whole frame false detection
        assert_eq!(c.adjust(0.0, &[obj(0.0, 0.0, 1.0, 1.0)]), 0.0);

        // Large but starting in the middle of the frame
        assert_eq!(c.adjust(0.0, &[obj(0.4, 0.5, 0.6, 0.98)]), 0.0);
    }

    #[test]
    fn test_adjust_straight() {
        let c = corrector();

        // Left edge at x = -0.2, last row -> +1
        assert_close(c.adjust(0.0, &[MIDDLE_NEAR]), 1.0);
        assert_close(c.adjust(0.05, &[MIDDLE_NEAR]), 1.05);

        // Left edge at x = 0.4, column 4 -> -0.5
        assert_close(c.adjust(0.0, &[RIGHT_NEAR]), -0.5);

        // Left edge at x = -0.8, column 0 -> +0.25
        assert_close(c.adjust(0.0, &[LEFT_NEAR]), 0.25);

        // Straight results are not saturated
        assert_close(c.adjust(0.09, &[MIDDLE_NEAR]), 1.09);
    }

    #[test]
    fn test_adjust_turning() {
        let c = corrector();

        // Factor -0.25, object moved to [0.575, 0.775] -> x = 0.15 -> -1
        assert_close(c.adjust(0.5, &[RIGHT_NEAR]), -0.5);

        // Factor 0, object not moved, x = -0.8 -> +0.25
        assert_close(c.adjust(-0.9, &[LEFT_NEAR]), -0.65);
    }

    #[test]
    fn test_adjust_turning_saturates() {
        let c = corrector();

        // Factor -0.5, object moved to [-0.05, 0.15], centre at x = -0.9 -> 0.25
        assert_eq!(c.adjust(0.9, &[MIDDLE_NEAR]), 1.0);

        // Factor -0.5, object moved to [0.85, 1.05], x = 0.7 -> -0.25
        assert_eq!(c.adjust(-0.9, &[MIDDLE_NEAR]), -1.0);
    }

    #[test]
    fn test_adjust_out_of_grid() {
        let c = corrector();

        // Bottom outside of the grids: no deviation when straight, no factor when turning
        let below = obj(0.4, 0.95, 0.6, 1.05);
        assert_eq!(c.adjust(0.0, &[below]), 0.0);
        assert_eq!(c.adjust(0.5, &[below]), 0.5);
        assert_eq!(c.adjust(-0.5, &[below]), -0.5);
    }

    #[test]
    fn test_adjust_uses_nearest_group() {
        let c = corrector();

        // Two detections of the same obstacle, plus a lone detection which is dropped by the
        // grouping
        let objects = [MIDDLE_NEAR, obj(0.41, 0.92, 0.61, 0.98), LEFT_NEAR];
        assert_close(c.adjust(0.0, &objects), 1.0);

        // Two unrelated obstacles: nothing survives the grouping
        assert_eq!(c.adjust(0.0, &[LEFT_NEAR, RIGHT_NEAR]), 0.0);
    }

    #[test]
    fn test_compute_deviation() {
        let c = corrector();

        // Right of the left edge, looked up at its left edge (x = -0.2)
        assert_eq!(c.compute_deviation(&obj(0.4, 0.8, 0.6, 0.9)), 1.0);
        assert_eq!(c.compute_deviation(&obj(0.4, 0.3, 0.6, 0.5)), 0.25);

        // Starting on the left edge, looked up at its centre (x = 0)
        assert_eq!(c.compute_deviation(&obj(0.0, 0.8, 1.0, 0.9)), -1.0);

        // Straddling the left edge, centre at 0 so x = -1
        assert_eq!(c.compute_deviation(&obj(-0.1, 0.8, 0.1, 0.9)), 0.25);

        // Centre outside of the frame
        assert_eq!(c.compute_deviation(&obj(-0.4, 0.8, -0.2, 0.9)), 0.0);
        assert_eq!(c.compute_deviation(&obj(0.4, 0.8, 0.6, 1.2)), 0.0);
    }

    #[test]
    fn test_new_from_files() -> Result<(), CorrError> {
        let params_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../params");

        let params = CorrParams {
            steering_grid_path: Some(params_dir.join("steering_grid.json")),
            obj_move_factors_path: Some(params_dir.join("obj_move_factors.json")),
            ..Default::default()
        };
        let c = GridCorrector::new(&params)?;
        assert_close(c.adjust(0.5, &[RIGHT_NEAR]), -0.5);

        let params = CorrParams {
            steering_grid_path: Some(params_dir.join("not_a_grid.json")),
            ..Default::default()
        };
        assert!(matches!(
            GridCorrector::new(&params),
            Err(CorrError::ConfigLoad(ConfigLoadError::FileLoadError(..)))
        ));

        Ok(())
    }
}
