//! Facial feature distributions and heritability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FacialFeature, Sex};

/// Population distribution of one facial feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistribution {
    /// Value weights for men.
    pub male: BTreeMap<String, f64>,
    /// Value weights for women.
    pub female: BTreeMap<String, f64>,
    /// Chance the value is inherited from a relative.
    pub heritability: f64,
}

impl FeatureDistribution {
    pub fn weights(&self, sex: Sex) -> &BTreeMap<String, f64> {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }
}

/// Relative weights of the relatives a child may take a feature after.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakesAfter {
    pub same_sex_parent: f64,
    pub other_sex_parent: f64,
    pub grandparent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub features: BTreeMap<FacialFeature, FeatureDistribution>,
    pub takes_after: TakesAfter,
    pub chance_inherits_exact_variant: f64,
    pub variants_per_value: u32,
    /// Skin colors from darkest to lightest. A child's color is the midpoint
    /// of its parents' positions in this list.
    pub skin_colors: Vec<String>,
}

impl FaceConfig {
    pub fn distribution(&self, feature: FacialFeature) -> Option<&FeatureDistribution> {
        self.features.get(&feature)
    }

    /// Skin color of a child of two parents with the given colors.
    pub fn blend_skin_colors(&self, a: &str, b: &str) -> Option<String> {
        let i = self.skin_colors.iter().position(|c| c == a)?;
        let j = self.skin_colors.iter().position(|c| c == b)?;
        Some(self.skin_colors[(i + j) / 2].clone())
    }
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(v, w)| (v.to_string(), *w)).collect()
}

fn same(pairs: &[(&str, f64)], heritability: f64) -> FeatureDistribution {
    FeatureDistribution {
        male: weights(pairs),
        female: weights(pairs),
        heritability,
    }
}

fn split(male: &[(&str, f64)], female: &[(&str, f64)], heritability: f64) -> FeatureDistribution {
    FeatureDistribution {
        male: weights(male),
        female: weights(female),
        heritability,
    }
}

const SIZES: &[(&str, f64)] = &[("small", 0.3), ("medium", 0.4), ("large", 0.3)];

fn default_features() -> BTreeMap<FacialFeature, FeatureDistribution> {
    use FacialFeature as F;
    BTreeMap::from([
        (
            F::SkinColor,
            same(
                &[("black", 0.15), ("brown", 0.15), ("beige", 0.2), ("pink", 0.25), ("white", 0.25)],
                1.0,
            ),
        ),
        (F::HeadSize, same(SIZES, 0.75)),
        (
            F::HeadShape,
            same(&[("circle", 0.3), ("oval", 0.3), ("square", 0.2), ("heart", 0.2)], 0.75),
        ),
        (
            F::HairLength,
            split(
                &[("bald", 0.1), ("short", 0.7), ("medium", 0.15), ("long", 0.05)],
                &[("bald", 0.01), ("short", 0.2), ("medium", 0.35), ("long", 0.44)],
                0.05,
            ),
        ),
        (
            F::HairColor,
            same(
                &[("black", 0.2), ("brown", 0.4), ("blonde", 0.2), ("red", 0.1), ("gray", 0.1)],
                0.75,
            ),
        ),
        (F::EyebrowSize, same(SIZES, 0.6)),
        (
            F::EyebrowColor,
            same(&[("black", 0.25), ("brown", 0.45), ("blonde", 0.2), ("red", 0.1)], 0.75),
        ),
        (F::MouthSize, same(SIZES, 0.6)),
        (F::EarSize, same(SIZES, 0.6)),
        (F::EarAngle, same(&[("flat", 0.8), ("protruding", 0.2)], 0.6)),
        (F::NoseSize, same(SIZES, 0.6)),
        (
            F::NoseShape,
            same(&[("long", 0.25), ("broad", 0.25), ("upturned", 0.25), ("pointy", 0.25)], 0.6),
        ),
        (F::EyeSize, same(SIZES, 0.6)),
        (
            F::EyeShape,
            same(&[("round", 0.3), ("almond", 0.4), ("thin", 0.3)], 0.6),
        ),
        (
            F::EyeColor,
            same(
                &[("brown", 0.55), ("blue", 0.25), ("green", 0.1), ("gray", 0.05), ("black", 0.05)],
                0.75,
            ),
        ),
        (
            F::EyeHorizontalSettedness,
            same(&[("narrow", 0.3), ("middle", 0.4), ("wide", 0.3)], 0.6),
        ),
        (
            F::EyeVerticalSettedness,
            same(&[("high", 0.3), ("middle", 0.4), ("low", 0.3)], 0.6),
        ),
        (
            F::FacialHairStyle,
            split(
                &[("none", 0.5), ("mustache", 0.15), ("goatee", 0.1), ("beard", 0.15), ("sideburns", 0.1)],
                &[("none", 1.0)],
                0.05,
            ),
        ),
        (F::Freckles, same(&[("yes", 0.15), ("no", 0.85)], 0.6)),
        (F::Birthmark, same(&[("yes", 0.1), ("no", 0.9)], 0.0)),
        (F::Scar, same(&[("yes", 0.1), ("no", 0.9)], 0.0)),
        (F::Tattoo, same(&[("yes", 0.1), ("no", 0.9)], 0.0)),
        (F::Glasses, same(&[("yes", 0.2), ("no", 0.8)], 0.2)),
        (F::Sunglasses, same(&[("yes", 0.05), ("no", 0.95)], 0.0)),
    ])
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            features: default_features(),
            takes_after: TakesAfter {
                same_sex_parent: 0.5,
                other_sex_parent: 0.35,
                grandparent: 0.15,
            },
            chance_inherits_exact_variant: 0.5,
            variants_per_value: 5,
            skin_colors: ["black", "brown", "beige", "pink", "white"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_feature_has_a_distribution() {
        let face = FaceConfig::default();
        for f in FacialFeature::ALL {
            let d = face.distribution(*f).expect("distribution");
            assert!(!d.male.is_empty() && !d.female.is_empty(), "{f}");
        }
    }

    #[test]
    fn skin_color_blend_is_symmetric() {
        let face = FaceConfig::default();
        assert_eq!(face.blend_skin_colors("black", "white").as_deref(), Some("beige"));
        assert_eq!(
            face.blend_skin_colors("brown", "pink"),
            face.blend_skin_colors("pink", "brown")
        );
        assert_eq!(face.blend_skin_colors("pink", "pink").as_deref(), Some("pink"));
        assert_eq!(face.blend_skin_colors("pink", "green"), None);
    }
}
