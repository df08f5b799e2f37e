//! 2D/3D vector math and the ground-plane mapping convention.
//!
//! World 2D coordinates: `x` runs goal to goal, `y` touchline to touchline,
//! origin at the center spot. The ball lives in 3D as `(x, height, y)` —
//! the vertical axis is the middle component, and dropping it recovers the
//! ground-plane position.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Length below which a vector is treated as zero when normalizing.
pub const NORMALIZE_EPS: f32 = 1e-6;

/// 2D vector / point on the pitch plane (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at the given angle (radians, counter-clockwise from +x).
    #[inline]
    pub fn from_angle(theta: f32) -> Self {
        Self { x: theta.cos(), y: theta.sin() }
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_squared_to(self, other: Vec2) -> f32 {
        (other - self).length_squared()
    }

    /// Unit-length copy; zero vector for near-zero inputs.
    #[inline]
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len < NORMALIZE_EPS {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross).
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Angle of this vector (radians, `atan2` convention).
    #[inline]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Copy rotated counter-clockwise by `theta` radians.
    #[inline]
    pub fn rotated(self, theta: f32) -> Vec2 {
        let (s, c) = theta.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Smallest signed angle that rotates `self` onto `other`, in
    /// `[-PI, PI]`. Both inputs are treated as directions; magnitude is
    /// irrelevant. Zero for degenerate inputs.
    pub fn signed_angle_to(self, other: Vec2) -> f32 {
        let a = self.normalized();
        let b = other.normalized();
        if a == Vec2::ZERO || b == Vec2::ZERO {
            return 0.0;
        }
        a.cross(b).atan2(a.dot(b))
    }

    #[inline]
    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        Vec2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    /// Copy with length capped at `max`.
    pub fn clamped_length(self, max: f32) -> Vec2 {
        let len_sq = self.length_squared();
        if len_sq > max * max && len_sq > 0.0 {
            let len = len_sq.sqrt();
            Vec2::new(self.x / len * max, self.y / len * max)
        } else {
            self
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// 3D vector for ball motion: `(x, height, y)` — `y` is vertical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Lift a ground-plane point to 3D at the given height.
    #[inline]
    pub fn from_ground(ground: Vec2, height: f32) -> Self {
        Self { x: ground.x, y: height, z: ground.y }
    }

    /// Project onto the pitch plane: `(x, z)` becomes world `(x, y)`.
    #[inline]
    pub fn ground(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    /// Horizontal (ground-plane) component.
    #[inline]
    pub fn horizontal(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned rectangle on the pitch plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: Vec2::new(min.x.min(max.x), min.y.min(max.y)),
            max: Vec2::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    pub fn from_center_size(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width.abs() * 0.5, height.abs() * 0.5);
        Self { min: center - half, max: center + half }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Nearest point inside the rectangle.
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }
}

/// Scalar linear interpolation.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Wrap an angle into `[-PI, PI]`.
pub fn wrap_angle(theta: f32) -> f32 {
    let two_pi = std::f32::consts::TAU;
    let mut a = theta % two_pi;
    if a > std::f32::consts::PI {
        a -= two_pi;
    } else if a < -std::f32::consts::PI {
        a += two_pi;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalized_zero_safe() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let v = Vec2::new(3.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_signed_angle_quadrants() {
        let right = Vec2::new(1.0, 0.0);
        let up = Vec2::new(0.0, 1.0);
        assert!((right.signed_angle_to(up) - FRAC_PI_2).abs() < 1e-6);
        assert!((up.signed_angle_to(right) + FRAC_PI_2).abs() < 1e-6);
        // Opposite directions come out at +/- PI
        let back = Vec2::new(-1.0, 0.0);
        assert!((right.signed_angle_to(back).abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_matches_from_angle() {
        let v = Vec2::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert!((v.x - 0.0).abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ground_plane_mapping() {
        let p = Vec3::new(10.0, 2.5, -20.0);
        let g = p.ground();
        assert_eq!(g, Vec2::new(10.0, -20.0));
        let back = Vec3::from_ground(g, 2.5);
        assert_eq!(back, p);
    }

    #[test]
    fn test_rect_contains_and_clamp() {
        let r = Rect::from_center_size(Vec2::ZERO, 10.0, 4.0);
        assert!(r.contains(Vec2::new(4.9, 1.9)));
        assert!(!r.contains(Vec2::new(5.1, 0.0)));
        let clamped = r.clamp_point(Vec2::new(100.0, -100.0));
        assert_eq!(clamped, Vec2::new(5.0, -2.0));
        // Clamping is idempotent
        assert_eq!(r.clamp_point(clamped), clamped);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI) + PI).abs() < 1e-5);
        assert_eq!(wrap_angle(0.5), 0.5);
    }

    #[test]
    fn test_clamped_length() {
        let v = Vec2::new(6.0, 8.0).clamped_length(5.0);
        assert!((v.length() - 5.0).abs() < 1e-5);
        let short = Vec2::new(1.0, 0.0).clamped_length(5.0);
        assert_eq!(short, Vec2::new(1.0, 0.0));
    }
}
