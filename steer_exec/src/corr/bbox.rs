//! # Bounding Box Grouping
//!
//! Detectors tend to report the same obstacle several times with slightly different boxes. The
//! boxes are converted to pixel rectangles and merged with the usual detector rectangle grouping:
//!
//! 1. Rectangles are partitioned into classes of similar rectangles. Two rectangles are similar
//!    when all four of their edges are within `eps * (min width + min height) / 2` of each other,
//!    and similarity is made transitive.
//! 2. Each class is replaced by its average rectangle.
//! 3. Classes with `group_threshold` members or fewer are dropped, as are classes lying inside
//!    another, more populated, class.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::per::{Object, ObjectType, SYNTHETIC_CONFIDENCE};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum number of neighbours, classes must have strictly more members than this to be kept.
pub const GROUP_THRESHOLD: usize = 1;

/// Relative difference between the edges of two rectangles for them to be grouped.
pub const GROUP_EPS: f64 = 0.2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rect {
    /// Create a rectangle from two corners, which may be given in any order.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Area of the rectangle in square pixels.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Check if two rectangles are near duplicates of each other.
    pub fn is_similar(&self, other: &Rect, eps: f64) -> bool {
        let delta = eps
            * (self.width.min(other.width) + self.height.min(other.height)) as f64
            * 0.5;

        (self.x - other.x).abs() as f64 <= delta
            && (self.y - other.y).abs() as f64 <= delta
            && (self.right() - other.right()).abs() as f64 <= delta
            && (self.bottom() - other.bottom()).abs() as f64 <= delta
    }

    /// Check if this rectangle is inside `other`, allowing `other` to be enlarged by `eps` times
    /// its own size on each side.
    fn is_inside(&self, other: &Rect, eps: f64) -> bool {
        let dx = round_to_i32(other.width as f64 * eps);
        let dy = round_to_i32(other.height as f64 * eps);

        self.x >= other.x - dx
            && self.y >= other.y - dy
            && self.right() <= other.right() + dx
            && self.bottom() <= other.bottom() + dy
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Group the given objects so that each physical obstacle is represented by a single object.
///
/// Zero or one objects are returned unchanged. Otherwise the objects are grouped in pixel space
/// (assuming an image of `img_width` by `img_height` pixels) and the resulting objects have type
/// `ANY` and [`SYNTHETIC_CONFIDENCE`]. Objects with no near duplicate are dropped by the grouping.
pub fn group_objects(objects: &[Object], img_width: u32, img_height: u32) -> Vec<Object> {
    if objects.len() <= 1 {
        return objects.to_vec();
    }

    let rects: Vec<Rect> = objects
        .iter()
        .map(|o| object_to_rect(o, img_width, img_height))
        .collect();

    group_rects(&rects, GROUP_THRESHOLD, GROUP_EPS)
        .iter()
        .map(|r| rect_to_object(r, img_width, img_height))
        .collect()
}

/// Group similar rectangles, see the module documentation.
pub fn group_rects(rects: &[Rect], group_threshold: usize, eps: f64) -> Vec<Rect> {
    if group_threshold == 0 || rects.is_empty() {
        return rects.to_vec();
    }

    let (labels, num_classes) = partition(rects, |a, b| a.is_similar(b, eps));

    // Sum up every class
    let mut sums = vec![Rect::default(); num_classes];
    let mut weights = vec![0usize; num_classes];

    for (r, &cls) in rects.iter().zip(labels.iter()) {
        sums[cls].x += r.x;
        sums[cls].y += r.y;
        sums[cls].width += r.width;
        sums[cls].height += r.height;
        weights[cls] += 1;
    }

    // Average them, in single precision like the detector grouping does
    let averages: Vec<Rect> = sums
        .iter()
        .zip(weights.iter())
        .map(|(r, &n)| {
            let s = 1.0f32 / n as f32;
            Rect {
                x: round_to_i32((r.x as f32 * s) as f64),
                y: round_to_i32((r.y as f32 * s) as f64),
                width: round_to_i32((r.width as f32 * s) as f64),
                height: round_to_i32((r.height as f32 * s) as f64),
            }
        })
        .collect();

    let mut grouped = Vec::with_capacity(num_classes);

    for (i, (r1, &n1)) in averages.iter().zip(weights.iter()).enumerate() {
        // Not enough neighbours
        if n1 <= group_threshold {
            continue;
        }

        // Small groups inside larger ones
        let swallowed = averages
            .iter()
            .zip(weights.iter())
            .enumerate()
            .any(|(j, (r2, &n2))| {
                j != i
                    && n2 > group_threshold
                    && r1.is_inside(r2, eps)
                    && (n2 > n1.max(3) || n1 < 3)
            });

        if !swallowed {
            grouped.push(*r1);
        }
    }

    grouped
}

/// Convert an object into a rectangle in pixel space, truncating towards zero.
pub fn object_to_rect(object: &Object, img_width: u32, img_height: u32) -> Rect {
    let w = img_width as f32;
    let h = img_height as f32;

    Rect::from_corners(
        (object.left * w) as i32,
        (object.top * h) as i32,
        (object.right * w) as i32,
        (object.bottom * h) as i32,
    )
}

/// Convert a pixel space rectangle into a synthetic object.
pub fn rect_to_object(rect: &Rect, img_width: u32, img_height: u32) -> Object {
    let w = img_width as f32;
    let h = img_height as f32;

    Object {
        obj_type: ObjectType::Any,
        left: rect.x as f32 / w,
        top: rect.y as f32 / h,
        right: rect.right() as f32 / w,
        bottom: rect.bottom() as f32 / h,
        confidence: SYNTHETIC_CONFIDENCE,
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Round half to even and saturate into an `i32`.
fn round_to_i32(value: f64) -> i32 {
    value.round_ties_even() as i32
}

/// Split the items into equivalence classes of the given predicate.
///
/// Returns the class of each item and the number of classes. Classes are numbered in order of
/// their first member.
fn partition<T, F>(items: &[T], is_equivalent: F) -> (Vec<usize>, usize)
where
    F: Fn(&T, &T) -> bool,
{
    let mut parents: Vec<usize> = (0..items.len()).collect();

    fn find(parents: &mut [usize], mut i: usize) -> usize {
        while parents[i] != i {
            parents[i] = parents[parents[i]];
            i = parents[i];
        }
        i
    }

    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if is_equivalent(&items[i], &items[j]) {
                let root_i = find(&mut parents, i);
                let root_j = find(&mut parents, j);
                if root_i != root_j {
                    parents[root_j] = root_i;
                }
            }
        }
    }

    let mut root_labels: Vec<Option<usize>> = vec![None; items.len()];
    let mut labels = Vec::with_capacity(items.len());
    let mut num_classes = 0;

    for i in 0..items.len() {
        let root = find(&mut parents, i);
        let label = *root_labels[root].get_or_insert_with(|| {
            num_classes += 1;
            num_classes - 1
        });
        labels.push(label);
    }

    (labels, num_classes)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const W: u32 = 160;
    const H: u32 = 120;

    #[test]
    fn test_group_objects_passthrough() {
        assert!(group_objects(&[], W, H).is_empty());

        let obj = Object::new(0.4, 0.92, 0.6, 0.98, 0.9);
        assert_eq!(group_objects(&[obj], W, H), vec![obj]);
    }

    #[test]
    fn test_group_near_duplicates() {
        let objects = [
            Object::new(0.40, 0.92, 0.60, 0.98, 0.9),
            Object::new(0.41, 0.92, 0.61, 0.98, 0.8),
        ];

        let grouped = group_objects(&objects, W, H);

        // (64 + 65) / 2 = 64.5, rounded half to even
        assert_eq!(grouped.len(), 1);
        assert_eq!(
            object_to_rect(&grouped[0], W, H),
            Rect { x: 64, y: 110, width: 32, height: 7 }
        );
        assert_eq!(grouped[0].confidence, SYNTHETIC_CONFIDENCE);
        assert_eq!(grouped[0].obj_type, ObjectType::Any);
        assert_eq!(grouped[0].left, 0.4);
        assert_eq!(grouped[0].bottom, 117.0 / 120.0);
    }

    #[test]
    fn test_isolated_objects_dropped() {
        let objects = [
            Object::new(0.05, 0.92, 0.25, 0.98, 0.9),
            Object::new(0.70, 0.92, 0.90, 0.98, 0.9),
        ];

        assert!(group_objects(&objects, W, H).is_empty());
    }

    #[test]
    fn test_group_rects() {
        let rects = [
            // Cluster A, 3 members
            Rect { x: 10, y: 10, width: 40, height: 40 },
            Rect { x: 12, y: 11, width: 40, height: 40 },
            Rect { x: 11, y: 12, width: 40, height: 40 },
            // Lone rectangle
            Rect { x: 100, y: 10, width: 20, height: 20 },
            // Cluster B, 2 members
            Rect { x: 100, y: 80, width: 30, height: 30 },
            Rect { x: 101, y: 80, width: 30, height: 30 },
        ];

        let grouped = group_rects(&rects, GROUP_THRESHOLD, GROUP_EPS);

        assert_eq!(
            grouped,
            vec![
                Rect { x: 11, y: 11, width: 40, height: 40 },
                // 100.5 rounds to 100
                Rect { x: 100, y: 80, width: 30, height: 30 },
            ]
        );

        // A zero threshold disables grouping
        assert_eq!(group_rects(&rects, 0, GROUP_EPS), rects.to_vec());
    }

    #[test]
    fn test_small_group_inside_large_group_dropped() {
        let rects = [
            // Large box, 4 members
            Rect { x: 0, y: 0, width: 100, height: 100 },
            Rect { x: 1, y: 0, width: 100, height: 100 },
            Rect { x: 0, y: 1, width: 100, height: 100 },
            Rect { x: 1, y: 1, width: 100, height: 100 },
            // Small box inside it, 2 members
            Rect { x: 40, y: 40, width: 20, height: 20 },
            Rect { x: 41, y: 40, width: 20, height: 20 },
        ];

        let grouped = group_rects(&rects, GROUP_THRESHOLD, GROUP_EPS);

        assert_eq!(grouped, vec![Rect { x: 0, y: 0, width: 100, height: 100 }]);
    }

    #[test]
    fn test_object_to_rect() {
        let obj = Object::new(0.4, 0.92, 0.6, 0.98, 0.9);
        assert_eq!(
            object_to_rect(&obj, W, H),
            Rect { x: 64, y: 110, width: 32, height: 7 }
        );

        // Inverted corners are reordered
        let obj = Object::new(0.6, 0.98, 0.4, 0.92, 0.9);
        assert_eq!(
            object_to_rect(&obj, W, H),
            Rect { x: 64, y: 110, width: 32, height: 7 }
        );
    }
}
