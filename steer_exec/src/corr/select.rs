//! # Nearest object selection

use comms_if::eqpt::per::Object;

use super::CorrError;

/// Find the object nearest to the vehicle, i.e. the one reaching lowest in the image.
///
/// On ties the first object wins.
pub fn nearest_object(objects: &[Object]) -> Result<Object, CorrError> {
    let mut iter = objects.iter();
    let mut nearest = iter.next().ok_or(CorrError::EmptyInput)?;

    for obj in iter {
        if obj.bottom > nearest.bottom {
            nearest = obj;
        }
    }

    Ok(*nearest)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_nearest_object() -> Result<(), CorrError> {
        let middle_distant = Object::new(0.4, 0.1, 0.6, 0.2, 0.9);
        let left_distant = Object::new(0.1, 0.09, 0.3, 0.19, 0.9);
        let right_distant = Object::new(0.7, 0.21, 0.9, 0.11, 0.9);
        let middle_near = Object::new(0.4, 0.8, 0.6, 0.9, 0.9);

        assert!(matches!(nearest_object(&[]), Err(CorrError::EmptyInput)));

        assert_eq!(nearest_object(&[middle_near])?, middle_near);

        assert_eq!(
            nearest_object(&[left_distant, middle_near, right_distant, middle_distant])?,
            middle_near
        );

        // First one wins on ties
        let mut twin = middle_near;
        twin.confidence = 0.1;
        assert_eq!(nearest_object(&[middle_near, twin])?.confidence, 0.9);

        Ok(())
    }
}
