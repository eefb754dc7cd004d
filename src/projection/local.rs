//! Local project frame <-> projected offsets
//!
//! The local frame is the projected frame translated to the origin and
//! rotated counter-clockwise by the origin's rotation. At 0° local +Y points
//! to grid north; at 90° local +X points to grid north.

/// Rotates (x, y) counter-clockwise by `degrees`
pub fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Local (x, y) to an (east, north) offset from the origin
pub fn local_to_offset(x: f64, y: f64, rotation_degrees: f64) -> (f64, f64) {
    rotate(x, y, rotation_degrees)
}

/// (east, north) offset from the origin back to local (x, y)
pub fn offset_to_local(delta_easting: f64, delta_northing: f64, rotation_degrees: f64) -> (f64, f64) {
    rotate(delta_easting, delta_northing, -rotation_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_rotation_is_identity() {
        assert_eq!(rotate(100.0, 200.0, 0.0), (100.0, 200.0));
    }

    #[test]
    fn test_quarter_turn() {
        let (e, n) = local_to_offset(10.0, 0.0, 90.0);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_rotation() {
        for &rotation in &[0.0, 90.0, -45.0, 17.3, 270.0] {
            let (e, n) = local_to_offset(100.0, 200.0, rotation);
            let (x, y) = offset_to_local(e, n, rotation);
            assert_abs_diff_eq!(x, 100.0, epsilon = 1e-9);
            assert_abs_diff_eq!(y, 200.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rotation_preserves_length() {
        let (e, n) = local_to_offset(3.0, 4.0, -45.0);
        assert_abs_diff_eq!((e * e + n * n).sqrt(), 5.0, epsilon = 1e-12);
    }
}
