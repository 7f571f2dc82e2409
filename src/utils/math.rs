//! Small math helpers shared by the spatial queries.

use glam::{Quat, Vec3};

/// Rotate vector `v` by the conjugate of quaternion `q`:
/// `r = (q⁻¹ ⊗ v) ⊗ q`, written out component-wise so no intermediate
/// quaternion products are built. Maps a world-frame vector into the frame
/// described by `q`.
pub fn rotate_by_inverse(v: Vec3, q: Quat) -> Vec3 {
    let (x, y, z) = (v.x, v.y, v.z);
    let (qx, qy, qz, qw) = (q.x, q.y, q.z, q.w);

    // i = q' * v
    let ix = qw * x - qy * z + qz * y;
    let iy = qw * y - qz * x + qx * z;
    let iz = qw * z - qx * y + qy * x;
    let iw = qx * x + qy * y + qz * z;

    // r = i * q
    Vec3::new(
        ix * qw + iw * qx + iy * qz - iz * qy,
        iy * qw + iw * qy + iz * qx - ix * qz,
        iz * qw + iw * qz + ix * qy - iy * qx,
    )
}

/// Cartesian `(x, y)` to polar `(magnitude, angle)`, `atan2` convention.
pub fn cartesian_to_polar(x: f32, y: f32) -> (f32, f32) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_quaternion_inverse_rotation() {
        let q = Quat::from_euler(glam::EulerRot::YXZ, 0.7, -0.3, 0.1);
        let v = Vec3::new(1.5, -2.0, 0.25);
        let expected = q.inverse() * v;
        assert!(rotate_by_inverse(v, q).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn identity_rotation_is_a_no_op() {
        let v = Vec3::new(3.0, 4.0, 5.0);
        assert!(rotate_by_inverse(v, Quat::IDENTITY).abs_diff_eq(v, 1e-6));
    }

    #[test]
    fn polar_conversion() {
        let (magnitude, angle) = cartesian_to_polar(1.0, 1.0);
        assert!((magnitude - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!((angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);

        let (magnitude, angle) = cartesian_to_polar(0.0, 0.0);
        assert_eq!(magnitude, 0.0);
        assert_eq!(angle, 0.0);
    }
}
