use crate::foundation::core::Vec3;
use crate::foundation::math::Fnv1a64;
use crate::model::binding::BindingType;

/// Main point light that shades the book surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyLight {
    pub position: Vec3,
    pub intensity: f64,
}

/// Area-like light used only for the accumulated ground shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowLight {
    pub position: Vec3,
    /// Jitter radius around `position`; larger values give softer penumbrae.
    pub radius: f64,
    pub samples: u32,
    /// Darkness of a fully covered ground texel.
    pub opacity: f64,
}

impl ShadowLight {
    pub(crate) fn fingerprint(&self, h: &mut Fnv1a64) {
        h.write_f64(self.position.x);
        h.write_f64(self.position.y);
        h.write_f64(self.position.z);
        h.write_f64(self.radius);
        h.write_u32(self.samples);
    }
}

/// Screen-space ambient occlusion settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AoSettings {
    /// Sampling radius in world units.
    pub radius: f64,
    pub intensity: f64,
    /// Depth difference (world units) ignored as self-occlusion.
    pub bias: f64,
    /// Occluders further than this in depth do not count.
    pub range: f64,
    pub samples: u32,
}

/// Fixed lighting and post-processing recipe for one binding type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingRecipe {
    pub key: KeyLight,
    pub ambient: f64,
    pub shadow: ShadowLight,
    pub ao: AoSettings,
    /// Contrast boost around mid-gray; 0 leaves colors untouched.
    pub contrast: f64,
    /// Luma difference above which the anti-alias pass smooths a pixel.
    pub aa_threshold: f64,
    /// Strength of the brightening overlay on surfaces lit above 1.
    pub highlight: f64,
}

impl LightingRecipe {
    pub const SHADOW_LIGHT_POSITION: Vec3 = Vec3::new(5.0, 20.0, 5.0);

    pub fn for_binding(binding: BindingType) -> Self {
        let base = Self {
            key: KeyLight {
                position: Vec3::new(-2.0, 3.0, 8.0),
                intensity: 0.55,
            },
            ambient: 0.55,
            shadow: ShadowLight {
                position: Self::SHADOW_LIGHT_POSITION,
                radius: 2.0,
                samples: 32,
                opacity: 0.55,
            },
            ao: AoSettings {
                radius: 0.05,
                intensity: 0.6,
                bias: 0.002,
                range: 0.2,
                samples: 8,
            },
            contrast: 0.08,
            aa_threshold: 0.1,
            highlight: 0.35,
        };
        match binding {
            BindingType::PerfectBound | BindingType::SpiralBound => base,
            BindingType::Hardcover => Self {
                key: KeyLight {
                    intensity: 0.6,
                    ..base.key
                },
                ambient: 0.5,
                contrast: 0.12,
                ..base
            },
            // Thin booklet: tighter, lighter shadow.
            BindingType::Saddlestitch => Self {
                shadow: ShadowLight {
                    radius: 1.2,
                    opacity: 0.45,
                    ..base.shadow
                },
                ..base
            },
        }
    }

    pub fn with_shadow_samples(mut self, samples: u32) -> Self {
        self.shadow.samples = samples.max(1);
        self
    }

    /// Lambert shade for a surface with unit normal `n` at `p`: 1.0 is the unlit texture.
    pub fn shade(&self, p: Vec3, n: Vec3) -> f64 {
        let l = (self.key.position - p).normalize();
        self.ambient + self.key.intensity * n.dot(l).max(0.0)
    }
}
