// =============================================================================
// MATRIX.RS — 2x3 affine transform
//
// Layout follows the usual canvas convention:
//
//   | a  c  e |
//   | b  d  f |
//   | 0  0  1 |
//
// `translate`, `scale` and `rotate` right-multiply, so a chain of calls
// composes in call order onto whatever transform is already loaded.
// =============================================================================

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Translation / scale / rotation pulled back out of a matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Decomposed {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
}

/// 2D affine transform stored as six floats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformMatrix {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn load_identity(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    pub fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> &mut Self {
        *self = Self { a, b, c, d, e, f };
        self
    }

    pub fn copy_from(&mut self, src: &TransformMatrix) -> &mut Self {
        *self = *src;
        self
    }

    pub fn translate(&mut self, x: f32, y: f32) -> &mut Self {
        self.e += self.a * x + self.c * y;
        self.f += self.b * x + self.d * y;
        self
    }

    pub fn scale(&mut self, x: f32, y: f32) -> &mut Self {
        self.a *= x;
        self.b *= x;
        self.c *= y;
        self.d *= y;
        self
    }

    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        let (sin, cos) = radians.sin_cos();
        let Self { a, b, c, d, .. } = *self;
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
        self
    }

    /// `self = self * rhs`.
    pub fn multiply(&mut self, rhs: &TransformMatrix) -> &mut Self {
        let product = self.product(rhs);
        *self = product;
        self
    }

    /// Write `self * rhs` into `out`, leaving `self` untouched.
    pub fn multiply_into(&self, rhs: &TransformMatrix, out: &mut TransformMatrix) {
        *out = self.product(rhs);
    }

    /// `self * rhs` as a new matrix.
    pub fn product(&self, rhs: &TransformMatrix) -> TransformMatrix {
        let l = self;
        TransformMatrix {
            a: rhs.a * l.a + rhs.b * l.c,
            b: rhs.a * l.b + rhs.b * l.d,
            c: rhs.c * l.a + rhs.d * l.c,
            d: rhs.c * l.b + rhs.d * l.d,
            e: rhs.e * l.a + rhs.f * l.c + l.e,
            f: rhs.e * l.b + rhs.f * l.d + l.f,
        }
    }

    /// Multiply by `src`, first shifting the translation of `self` by the
    /// offset expressed in `self`'s local space.
    ///
    /// Used for parent containers: the offset is the scroll-factor adjusted
    /// camera scroll.
    pub fn multiply_with_offset(&mut self, src: &TransformMatrix, offset_x: f32, offset_y: f32) -> &mut Self {
        let pse = offset_x * self.a + offset_y * self.c + self.e;
        let psf = offset_x * self.b + offset_y * self.d + self.f;
        let Self { a, b, c, d, .. } = *self;

        self.a = src.a * a + src.b * c;
        self.b = src.a * b + src.b * d;
        self.c = src.c * a + src.d * c;
        self.d = src.c * b + src.d * d;
        self.e = src.e * a + src.f * c + pse;
        self.f = src.e * b + src.f * d + psf;
        self
    }

    /// Right-multiply by the raw components of another matrix.
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> &mut Self {
        self.multiply(&TransformMatrix { a, b, c, d, e, f })
    }

    /// Load a translate-rotate-scale transform in one step, discarding
    /// the current contents.
    pub fn apply_itrs(&mut self, x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) -> &mut Self {
        let (sin, cos) = rotation.sin_cos();
        self.a = cos * scale_x;
        self.b = sin * scale_x;
        self.c = -sin * scale_y;
        self.d = cos * scale_y;
        self.e = x;
        self.f = y;
        self
    }

    #[inline]
    pub fn get_x(&self, x: f32, y: f32) -> f32 {
        x * self.a + y * self.c + self.e
    }

    #[inline]
    pub fn get_y(&self, x: f32, y: f32) -> f32 {
        x * self.b + y * self.d + self.f
    }

    pub fn transform_point(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(self.get_x(x, y), self.get_y(x, y))
    }

    /// Determinant of the linear 2x2 part.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn try_inverse(&self) -> Option<TransformMatrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let n = 1.0 / det;
        Some(TransformMatrix {
            a: self.d * n,
            b: -self.b * n,
            c: -self.c * n,
            d: self.a * n,
            e: (self.c * self.f - self.d * self.e) * n,
            f: (self.b * self.e - self.a * self.f) * n,
        })
    }

    /// Invert in place. A singular matrix is left unchanged and `false`
    /// is returned.
    pub fn invert(&mut self) -> bool {
        match self.try_inverse() {
            Some(inverse) => {
                *self = inverse;
                true
            }
            None => false,
        }
    }

    /// Map a point through the inverse transform. Singular matrices return
    /// the input point unchanged.
    pub fn apply_inverse(&self, x: f32, y: f32) -> Vec2 {
        match self.try_inverse() {
            Some(inverse) => inverse.transform_point(x, y),
            None => Vec2::new(x, y),
        }
    }

    pub fn scale_x(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    pub fn scale_y(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }

    pub fn decompose(&self) -> Decomposed {
        let scale_x = self.scale_x();
        let scale_y = self.scale_y();
        let sign = if (-self.c / self.a).atan() < 0.0 { -1.0 } else { 1.0 };
        let rotation = if scale_x == 0.0 {
            0.0
        } else {
            (self.a / scale_x).clamp(-1.0, 1.0).acos() * sign
        };
        Decomposed {
            translate_x: self.e,
            translate_y: self.f,
            scale_x,
            scale_y,
            rotation,
        }
    }

    /// Column-major 3x3 suitable for a `mat3` uniform.
    pub fn to_uniform(&self) -> [f32; 9] {
        [self.a, self.b, 0.0, self.c, self.d, 0.0, self.e, self.f, 1.0]
    }

    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}
