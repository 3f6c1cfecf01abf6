use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::PersonId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FacialFeature {
    SkinColor,
    HeadSize,
    HeadShape,
    HairLength,
    HairColor,
    EyebrowSize,
    EyebrowColor,
    MouthSize,
    EarSize,
    EarAngle,
    NoseSize,
    NoseShape,
    EyeSize,
    EyeShape,
    EyeColor,
    EyeHorizontalSettedness,
    EyeVerticalSettedness,
    FacialHairStyle,
    Freckles,
    Birthmark,
    Scar,
    Tattoo,
    Glasses,
    Sunglasses,
}

string_enum!(FacialFeature {
    SkinColor => "skin color",
    HeadSize => "head size",
    HeadShape => "head shape",
    HairLength => "hair length",
    HairColor => "hair color",
    EyebrowSize => "eyebrow size",
    EyebrowColor => "eyebrow color",
    MouthSize => "mouth size",
    EarSize => "ear size",
    EarAngle => "ear angle",
    NoseSize => "nose size",
    NoseShape => "nose shape",
    EyeSize => "eye size",
    EyeShape => "eye shape",
    EyeColor => "eye color",
    EyeHorizontalSettedness => "eye horizontal settedness",
    EyeVerticalSettedness => "eye vertical settedness",
    FacialHairStyle => "facial hair style",
    Freckles => "freckles",
    Birthmark => "birthmark",
    Scar => "scar",
    Tattoo => "tattoo",
    Glasses => "glasses",
    Sunglasses => "sunglasses",
});

impl FacialFeature {
    /// Features whose population distributions differ so much by sex that
    /// they are only inherited from same-sex relatives.
    pub fn is_sex_specific(self) -> bool {
        matches!(self, FacialFeature::HairLength | FacialFeature::FacialHairStyle)
    }
}

/// A concrete feature value. `variant_id` seeds the sprite variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub value: String,
    pub variant_id: u32,
    pub inherited_from: Option<PersonId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub features: BTreeMap<FacialFeature, FeatureValue>,
}

impl Face {
    pub fn get(&self, feature: FacialFeature) -> &str {
        self.features
            .get(&feature)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn feature(&self, feature: FacialFeature) -> Option<&FeatureValue> {
        self.features.get(&feature)
    }
}
