//! Small vector and matrix helpers for projecting the blossom volume.
//!
//! Matrices are column-major, matching what WebGL expects for
//! `uniformMatrix4fv(.., false, ..)`.

use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Unit-length copy. Near-zero vectors come back unchanged.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len_sq = self.dot(self);
        if len_sq > 1e-5 {
            self * (1.0 / len_sq.sqrt())
        } else {
            self
        }
    }

    pub fn get(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn set(&mut self, axis: usize, value: f64) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            _ => self.z = value,
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [f64; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    #[must_use]
    pub fn identity() -> Self {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        Self(m)
    }

    /// Right-handed perspective projection with a vertical field of view in degrees.
    #[must_use]
    pub fn perspective(aspect: f64, fov_deg: f64, near: f64, far: f64) -> Self {
        let h = near * (fov_deg.to_radians() * 0.5).tan() * 2.0;
        let w = h * aspect;
        let mut m = [0.0; 16];
        m[0] = 2.0 * near / w;
        m[5] = 2.0 * near / h;
        m[10] = -(far + near) / (far - near);
        m[11] = -1.0;
        m[14] = -2.0 * far * near / (far - near);
        Self(m)
    }

    /// View matrix for a camera at `eye` looking at `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let front = (eye - target).normalized();
        let side = up.cross(front).normalized();
        let top = front.cross(side).normalized();

        let mut m = [0.0; 16];
        m[0] = side.x;
        m[1] = top.x;
        m[2] = front.x;
        m[4] = side.y;
        m[5] = top.y;
        m[6] = front.y;
        m[8] = side.z;
        m[9] = top.z;
        m[10] = front.z;
        m[12] = -eye.dot(Vec3::new(m[0], m[4], m[8]));
        m[13] = -eye.dot(Vec3::new(m[1], m[5], m[9]));
        m[14] = -eye.dot(Vec3::new(m[2], m[6], m[10]));
        m[15] = 1.0;
        Self(m)
    }

    /// `self * rhs`
    #[must_use]
    pub fn multiply(&self, rhs: &Self) -> Self {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Self(out)
    }

    /// Homogeneous transform of a point (w = 1); returns `[x, y, z, w]`.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> [f64; 4] {
        let m = &self.0;
        let mut out = [0.0; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = m[row] * p.x + m[4 + row] * p.y + m[8 + row] * p.z + m[12 + row];
        }
        out
    }
}
