// ── Easing curves ─────────────────────────────────────────────────────────────
//
// Maps linear progress `t` in 0..=1 onto an eased value.  Used by the camera
// pan and zoom effects.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
            Ease::QuadInOut => {
                let t2 = t * 2.0;
                if t2 < 1.0 {
                    0.5 * t2 * t2
                } else {
                    let u = t2 - 1.0;
                    -0.5 * (u * (u - 2.0) - 1.0)
                }
            }
            Ease::CubicIn => t * t * t,
            Ease::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Ease::CubicInOut => {
                let t2 = t * 2.0;
                if t2 < 1.0 {
                    0.5 * t2 * t2 * t2
                } else {
                    let u = t2 - 2.0;
                    0.5 * (u * u * u + 2.0)
                }
            }
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => 0.5 * (1.0 - (PI * t).cos()),
        }
    }
}
