//! Evidence strengths, perception, and memory deterioration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{EvidenceType, FacialFeature, FeatureType};

/// Relative weights of the three ways a belief can deteriorate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeteriorationWeights {
    pub forgetting: f64,
    pub mutation: f64,
    pub transference: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefsConfig {
    pub base_strength_of_evidence_types: BTreeMap<EvidenceType, f64>,
    /// How much a feature stands out; scales both perception and evidence.
    pub salience_of_features: BTreeMap<FeatureType, f64>,
    pub chance_of_memory_deterioration_on_timestep: BTreeMap<FeatureType, f64>,
    /// Per feature, per believed value, the values it may mutate into.
    pub memory_mutations: BTreeMap<FeatureType, BTreeMap<String, BTreeMap<String, f64>>>,
    pub deterioration_weights: DeteriorationWeights,
    pub chance_of_confabulation_on_timestep: f64,

    pub perception_salience_multiplier: f64,
    pub perception_chance_floor: f64,
    pub perception_chance_cap: f64,
    pub chance_someone_observes_nearby_entity: f64,
    pub chance_someone_observes_building_they_are_in: f64,

    pub teller_strength_scale: f64,
    pub teller_strength_boost_floor: f64,
    pub teller_strength_boost_cap: f64,
    pub lie_teller_strength_max: u32,
    pub trust_someone_has_for_random_person_they_eavesdrop: f64,
    pub chance_someone_eavesdrops_statement: f64,
    pub facet_strength_cap: f64,

    // Implants
    pub implant_salience_threshold: f64,
    pub implant_interactions_weight: f64,
    pub implant_salience_weight: f64,
}

impl BeliefsConfig {
    pub fn base_strength(&self, evidence: EvidenceType) -> f64 {
        self.base_strength_of_evidence_types
            .get(&evidence)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn salience(&self, feature: FeatureType) -> f64 {
        self.salience_of_features
            .get(&feature)
            .copied()
            .unwrap_or(0.5)
    }

    pub fn deterioration_chance(&self, feature: FeatureType) -> f64 {
        self.chance_of_memory_deterioration_on_timestep
            .get(&feature)
            .copied()
            .unwrap_or(0.01)
    }

    /// Chance an observer perceives a feature correctly.
    pub fn perception_chance(&self, feature: FeatureType, memory: f64) -> f64 {
        (self.salience(feature) * memory * self.perception_salience_multiplier)
            .clamp(self.perception_chance_floor, self.perception_chance_cap)
    }

    /// Multiplier applied to a propagated belief's strength given how
    /// strongly the teller holds it.
    pub fn teller_strength_boost(&self, teller_belief_strength: f64) -> f64 {
        (teller_belief_strength / self.teller_strength_scale)
            .clamp(self.teller_strength_boost_floor, self.teller_strength_boost_cap)
    }

    /// Strength multiplier of an implant before per-feature salience.
    pub fn implant_component(&self, total_interactions: u32, salience: f64) -> f64 {
        f64::from(total_interactions) * self.implant_interactions_weight
            + salience * self.implant_salience_weight
    }

    pub fn mutation_targets(&self, feature: FeatureType, value: &str) -> Option<&BTreeMap<String, f64>> {
        self.memory_mutations.get(&feature)?.get(value)
    }
}

fn default_base_strengths() -> BTreeMap<EvidenceType, f64> {
    use EvidenceType as E;
    BTreeMap::from([
        (E::Reflection, 100.0),
        (E::Observation, 20.0),
        (E::Statement, 5.0),
        (E::Lie, 5.0),
        (E::Eavesdropping, 3.0),
        (E::Declaration, 2.0),
        (E::Confabulation, 1.0),
        (E::Mutation, 1.0),
        (E::Transference, 1.0),
        (E::Forgetting, 0.001),
        (E::Implant, 10.0),
    ])
}

fn face_salience(f: FacialFeature) -> f64 {
    use FacialFeature as F;
    match f {
        F::SkinColor | F::HairColor => 0.8,
        F::HairLength | F::FacialHairStyle | F::Glasses | F::Tattoo => 0.7,
        F::Scar | F::Sunglasses | F::Birthmark => 0.6,
        F::HeadSize | F::EyeColor | F::Freckles => 0.5,
        F::HeadShape | F::NoseSize | F::MouthSize | F::EyebrowColor => 0.3,
        F::NoseShape | F::EyeSize | F::EyeShape | F::EyebrowSize | F::EarSize => 0.2,
        F::EarAngle | F::EyeHorizontalSettedness | F::EyeVerticalSettedness => 0.1,
    }
}

fn default_salience() -> BTreeMap<FeatureType, f64> {
    let mut table: BTreeMap<FeatureType, f64> = FacialFeature::ALL
        .iter()
        .map(|f| (FeatureType::Face(*f), face_salience(*f)))
        .collect();
    table.extend([
        (FeatureType::FirstName, 0.9),
        (FeatureType::MiddleName, 0.3),
        (FeatureType::LastName, 0.7),
        (FeatureType::Workplace, 0.6),
        (FeatureType::JobTitle, 0.6),
        (FeatureType::JobShift, 0.4),
        (FeatureType::HomeAddress, 0.5),
        (FeatureType::Whereabouts, 0.3),
        (FeatureType::BuildingName, 0.8),
        (FeatureType::BuildingKind, 0.9),
        (FeatureType::Address, 0.5),
        (FeatureType::BlockName, 0.6),
    ]);
    table
}

/// Less salient features deteriorate faster.
fn default_deterioration() -> BTreeMap<FeatureType, f64> {
    FeatureType::all()
        .into_iter()
        .map(|f| {
            let chance = match f {
                FeatureType::FirstName | FeatureType::LastName => 0.005,
                FeatureType::BuildingKind | FeatureType::BuildingName => 0.005,
                FeatureType::Whereabouts => 0.05,
                FeatureType::Face(face) => 0.06 * (1.0 - face_salience(face)),
                _ => 0.02,
            };
            (f, chance)
        })
        .collect()
}

fn transitions(rows: &[(&str, &[(&str, f64)])]) -> BTreeMap<String, BTreeMap<String, f64>> {
    rows.iter()
        .map(|(from, to)| {
            (
                from.to_string(),
                to.iter().map(|(v, w)| (v.to_string(), *w)).collect(),
            )
        })
        .collect()
}

fn default_mutations() -> BTreeMap<FeatureType, BTreeMap<String, BTreeMap<String, f64>>> {
    use FacialFeature as F;
    let sizes = transitions(&[
        ("small", &[("medium", 1.0)]),
        ("medium", &[("small", 0.5), ("large", 0.5)]),
        ("large", &[("medium", 1.0)]),
    ]);
    let hair = transitions(&[
        ("black", &[("brown", 0.9), ("gray", 0.1)]),
        ("brown", &[("black", 0.4), ("blonde", 0.3), ("red", 0.3)]),
        ("blonde", &[("brown", 0.7), ("red", 0.3)]),
        ("red", &[("brown", 0.6), ("blonde", 0.4)]),
        ("gray", &[("black", 0.3), ("blonde", 0.7)]),
    ]);
    let eyes = transitions(&[
        ("brown", &[("black", 0.6), ("green", 0.4)]),
        ("blue", &[("gray", 0.6), ("green", 0.4)]),
        ("green", &[("blue", 0.5), ("brown", 0.5)]),
        ("gray", &[("blue", 1.0)]),
        ("black", &[("brown", 1.0)]),
    ]);
    let yes_no = transitions(&[("yes", &[("no", 1.0)]), ("no", &[("yes", 1.0)])]);
    let mut table = BTreeMap::new();
    for f in [F::HeadSize, F::EyebrowSize, F::MouthSize, F::EarSize, F::NoseSize, F::EyeSize] {
        table.insert(FeatureType::Face(f), sizes.clone());
    }
    table.insert(FeatureType::Face(F::HairColor), hair.clone());
    table.insert(FeatureType::Face(F::EyebrowColor), hair);
    table.insert(FeatureType::Face(F::EyeColor), eyes);
    for f in [F::Freckles, F::Birthmark, F::Scar, F::Tattoo, F::Glasses, F::Sunglasses] {
        table.insert(FeatureType::Face(f), yes_no.clone());
    }
    table.insert(
        FeatureType::JobShift,
        transitions(&[("day", &[("night", 1.0)]), ("night", &[("day", 1.0)])]),
    );
    table
}

impl Default for BeliefsConfig {
    fn default() -> Self {
        Self {
            base_strength_of_evidence_types: default_base_strengths(),
            salience_of_features: default_salience(),
            chance_of_memory_deterioration_on_timestep: default_deterioration(),
            memory_mutations: default_mutations(),
            deterioration_weights: DeteriorationWeights {
                forgetting: 0.6,
                mutation: 0.25,
                transference: 0.15,
            },
            chance_of_confabulation_on_timestep: 0.01,
            perception_salience_multiplier: 1.5,
            perception_chance_floor: 0.1,
            perception_chance_cap: 0.95,
            chance_someone_observes_nearby_entity: 0.5,
            chance_someone_observes_building_they_are_in: 0.3,
            teller_strength_scale: 10.0,
            teller_strength_boost_floor: 0.1,
            teller_strength_boost_cap: 5.0,
            lie_teller_strength_max: 300,
            trust_someone_has_for_random_person_they_eavesdrop: 0.05,
            chance_someone_eavesdrops_statement: 0.05,
            facet_strength_cap: 1000.0,
            implant_salience_threshold: 2.0,
            implant_interactions_weight: 0.1,
            implant_salience_weight: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perception_chance_is_clamped() {
        let beliefs = BeliefsConfig::default();
        let ear = FeatureType::Face(FacialFeature::EarAngle);
        assert_eq!(beliefs.perception_chance(ear, 0.1), 0.1);
        assert_eq!(beliefs.perception_chance(FeatureType::FirstName, 0.9), 0.95);
    }

    #[test]
    fn teller_boost_saturates() {
        let beliefs = BeliefsConfig::default();
        assert_eq!(beliefs.teller_strength_boost(0.0), 0.1);
        assert_eq!(beliefs.teller_strength_boost(20.0), 2.0);
        assert_eq!(beliefs.teller_strength_boost(10_000.0), 5.0);
    }

    #[test]
    fn salient_features_deteriorate_slower() {
        let beliefs = BeliefsConfig::default();
        let hair = FeatureType::Face(FacialFeature::HairColor);
        let ear = FeatureType::Face(FacialFeature::EarAngle);
        assert!(beliefs.deterioration_chance(hair) < beliefs.deterioration_chance(ear));
    }
}
