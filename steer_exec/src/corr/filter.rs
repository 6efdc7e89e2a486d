//! # Detection filters
//!
//! Reduce the raw detections of a frame to those which matter for avoidance.

use comms_if::eqpt::per::Object;

use super::bbox::object_to_rect;

/// Objects must start below this fraction of the image height to be avoided.
pub const NEAR_FIELD_MIN_TOP: f32 = 0.90;

/// Remove objects whose area is at least `size_threshold` times the area of the image.
///
/// Such boxes usually cover the whole frame and are false detections rather than obstacles.
pub fn filter_big_objects(
    objects: &[Object],
    img_width: u32,
    img_height: u32,
    size_threshold: f64,
) -> Vec<Object> {
    let size_limit = (img_width as f64 * img_height as f64) * size_threshold;

    objects
        .iter()
        .filter(|o| (object_to_rect(o, img_width, img_height).area() as f64) < size_limit)
        .copied()
        .collect()
}

/// Keep only the objects in the bottom of the image, i.e. close to the vehicle.
pub fn filter_distant_objects(objects: &[Object]) -> Vec<Object> {
    objects
        .iter()
        .filter(|o| o.top > NEAR_FIELD_MIN_TOP)
        .copied()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_filter_big_objects() {
        let small = Object::new(0.4, 0.92, 0.6, 0.98, 0.9);
        // Covers 80% of the frame
        let big = Object::new(0.0, 0.0, 1.0, 0.8, 0.9);
        // Covers exactly 75% of the frame
        let limit = Object::new(0.0, 0.0, 0.75, 1.0, 0.9);

        assert_eq!(
            filter_big_objects(&[small, big, limit], 160, 120, 0.75),
            vec![small]
        );
        assert_eq!(
            filter_big_objects(&[small, big, limit], 160, 120, 1.0),
            vec![small, big, limit]
        );
    }

    #[test]
    fn test_filter_distant_objects() {
        let near = Object::new(0.4, 0.92, 0.6, 0.98, 0.9);
        let middle = Object::new(0.4, 0.5, 0.6, 0.99, 0.9);
        let on_limit = Object::new(0.4, 0.9, 0.6, 0.99, 0.9);
        let far = Object::new(0.4, 0.1, 0.6, 0.2, 0.9);

        assert_eq!(
            filter_distant_objects(&[near, middle, on_limit, far]),
            vec![near]
        );
        assert!(filter_distant_objects(&[]).is_empty());
    }
}
