//! Mental models and their belief facets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{EvidenceId, FacetId, PersonId};
use crate::model::entity::Entity;
use crate::model::face::FacialFeature;
use crate::model::timestamp::SimTimestamp;

/// Every kind of thing a person can believe about a person or a place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FeatureType {
    FirstName,
    MiddleName,
    LastName,
    Workplace,
    JobTitle,
    JobShift,
    HomeAddress,
    Face(FacialFeature),
    Whereabouts,
    BuildingName,
    BuildingKind,
    Address,
    BlockName,
}

const NON_FACE_FEATURES: &[(FeatureType, &str)] = &[
    (FeatureType::FirstName, "first name"),
    (FeatureType::MiddleName, "middle name"),
    (FeatureType::LastName, "last name"),
    (FeatureType::Workplace, "workplace"),
    (FeatureType::JobTitle, "job title"),
    (FeatureType::JobShift, "job shift"),
    (FeatureType::HomeAddress, "home address"),
    (FeatureType::Whereabouts, "whereabouts"),
    (FeatureType::BuildingName, "name"),
    (FeatureType::BuildingKind, "building type"),
    (FeatureType::Address, "address"),
    (FeatureType::BlockName, "block"),
];

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Face(f) => f.as_str(),
            other => NON_FACE_FEATURES
                .iter()
                .find(|(f, _)| f == other)
                .map(|(_, s)| *s)
                .unwrap_or("unknown"),
        }
    }

    /// Features held in a person mental model, whereabouts excluded.
    pub fn person_features() -> Vec<FeatureType> {
        let mut features = vec![
            FeatureType::FirstName,
            FeatureType::MiddleName,
            FeatureType::LastName,
            FeatureType::Workplace,
            FeatureType::JobTitle,
            FeatureType::JobShift,
            FeatureType::HomeAddress,
        ];
        features.extend(FacialFeature::ALL.iter().map(|f| FeatureType::Face(*f)));
        features
    }

    pub fn place_features(is_business: bool) -> Vec<FeatureType> {
        let mut features = vec![
            FeatureType::BuildingKind,
            FeatureType::Address,
            FeatureType::BlockName,
        ];
        if is_business {
            features.insert(0, FeatureType::BuildingName);
        }
        features
    }

    pub fn all() -> Vec<FeatureType> {
        let mut features = Self::person_features();
        features.extend([
            FeatureType::Whereabouts,
            FeatureType::BuildingName,
            FeatureType::BuildingKind,
            FeatureType::Address,
            FeatureType::BlockName,
        ]);
        features
    }

    pub fn is_name(self) -> bool {
        matches!(
            self,
            FeatureType::FirstName | FeatureType::MiddleName | FeatureType::LastName
        )
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FeatureType> for String {
    fn from(f: FeatureType) -> Self {
        f.as_str().to_string()
    }
}

impl TryFrom<String> for FeatureType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if let Some((f, _)) = NON_FACE_FEATURES.iter().find(|(_, name)| *name == s) {
            return Ok(*f);
        }
        s.parse::<FacialFeature>()
            .map(FeatureType::Face)
            .map_err(|_| format!("unknown FeatureType: {s}"))
    }
}

/// One typed belief component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facet {
    pub id: FacetId,
    pub owner: PersonId,
    pub subject: Entity,
    pub feature: FeatureType,
    /// Empty when the owner has forgotten.
    pub value: String,
    /// The world entity the value resolves to, when it names one.
    pub object_itself: Option<Entity>,
    /// Oldest first.
    pub evidence: Vec<EvidenceId>,
    /// The facet this one replaced.
    pub predecessor: Option<FacetId>,
    /// The facet this one was derived from, possibly in another mind.
    pub parent: Option<FacetId>,
    pub strength: f64,
    /// For whereabouts facets, the half-day the belief is about.
    pub when: Option<SimTimestamp>,
    pub created: SimTimestamp,
}

impl Facet {
    pub fn is_forgotten(&self) -> bool {
        self.value.is_empty()
    }

    pub fn latest_evidence(&self) -> Option<EvidenceId> {
        self.evidence.last().copied()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameBelief {
    pub first: Option<FacetId>,
    pub middle: Option<FacetId>,
    pub last: Option<FacetId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkBelief {
    pub workplace: Option<FacetId>,
    pub job_title: Option<FacetId>,
    pub job_shift: Option<FacetId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceBelief {
    pub features: BTreeMap<FacialFeature, FacetId>,
}

/// Where the subject was on each remembered half-day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhereaboutsBelief {
    pub entries: BTreeMap<SimTimestamp, FacetId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonMentalModel {
    pub name: NameBelief,
    pub work: WorkBelief,
    pub face: FaceBelief,
    pub home: Option<FacetId>,
    pub whereabouts: WhereaboutsBelief,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DwellingPlaceModel {
    pub kind: Option<FacetId>,
    pub address: Option<FacetId>,
    pub block: Option<FacetId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessMentalModel {
    pub name: Option<FacetId>,
    pub kind: Option<FacetId>,
    pub address: Option<FacetId>,
    pub block: Option<FacetId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MentalModel {
    Person(PersonMentalModel),
    Dwelling(DwellingPlaceModel),
    Business(BusinessMentalModel),
}

impl MentalModel {
    /// An empty model of the right shape for `subject`.
    pub fn for_subject(subject: Entity) -> Self {
        match subject {
            Entity::Person(_) => MentalModel::Person(PersonMentalModel::default()),
            Entity::Dwelling(_) => MentalModel::Dwelling(DwellingPlaceModel::default()),
            Entity::Business(_) => MentalModel::Business(BusinessMentalModel::default()),
        }
    }

    fn slot_mut(&mut self, feature: FeatureType) -> Option<&mut Option<FacetId>> {
        match self {
            MentalModel::Person(m) => match feature {
                FeatureType::FirstName => Some(&mut m.name.first),
                FeatureType::MiddleName => Some(&mut m.name.middle),
                FeatureType::LastName => Some(&mut m.name.last),
                FeatureType::Workplace => Some(&mut m.work.workplace),
                FeatureType::JobTitle => Some(&mut m.work.job_title),
                FeatureType::JobShift => Some(&mut m.work.job_shift),
                FeatureType::HomeAddress => Some(&mut m.home),
                FeatureType::Face(_)
                | FeatureType::Whereabouts
                | FeatureType::BuildingName
                | FeatureType::BuildingKind
                | FeatureType::Address
                | FeatureType::BlockName => None,
            },
            MentalModel::Dwelling(m) => match feature {
                FeatureType::BuildingKind => Some(&mut m.kind),
                FeatureType::Address => Some(&mut m.address),
                FeatureType::BlockName => Some(&mut m.block),
                _ => None,
            },
            MentalModel::Business(m) => match feature {
                FeatureType::BuildingName => Some(&mut m.name),
                FeatureType::BuildingKind => Some(&mut m.kind),
                FeatureType::Address => Some(&mut m.address),
                FeatureType::BlockName => Some(&mut m.block),
                _ => None,
            },
        }
    }

    /// The current facet for a feature. Whereabouts are keyed by time and
    /// go through [`MentalModel::whereabouts_at`] instead.
    pub fn get_facet(&self, feature: FeatureType) -> Option<FacetId> {
        match self {
            MentalModel::Person(m) => match feature {
                FeatureType::FirstName => m.name.first,
                FeatureType::MiddleName => m.name.middle,
                FeatureType::LastName => m.name.last,
                FeatureType::Workplace => m.work.workplace,
                FeatureType::JobTitle => m.work.job_title,
                FeatureType::JobShift => m.work.job_shift,
                FeatureType::HomeAddress => m.home,
                FeatureType::Face(f) => m.face.features.get(&f).copied(),
                FeatureType::Whereabouts
                | FeatureType::BuildingName
                | FeatureType::BuildingKind
                | FeatureType::Address
                | FeatureType::BlockName => None,
            },
            MentalModel::Dwelling(m) => match feature {
                FeatureType::BuildingKind => m.kind,
                FeatureType::Address => m.address,
                FeatureType::BlockName => m.block,
                _ => None,
            },
            MentalModel::Business(m) => match feature {
                FeatureType::BuildingName => m.name,
                FeatureType::BuildingKind => m.kind,
                FeatureType::Address => m.address,
                FeatureType::BlockName => m.block,
                _ => None,
            },
        }
    }

    /// Install `facet` as the current belief for `feature`. Returns the
    /// facet it replaced. Panics if the feature does not apply to the model.
    pub fn set_facet(&mut self, feature: FeatureType, facet: FacetId) -> Option<FacetId> {
        if let (MentalModel::Person(m), FeatureType::Face(f)) = (&mut *self, feature) {
            return m.face.features.insert(f, facet);
        }
        match self.slot_mut(feature) {
            Some(slot) => slot.replace(facet),
            None => panic!("set_facet: {feature} does not apply to this mental model"),
        }
    }

    pub fn whereabouts_at(&self, when: SimTimestamp) -> Option<FacetId> {
        match self {
            MentalModel::Person(m) => m.whereabouts.entries.get(&when).copied(),
            MentalModel::Dwelling(_) | MentalModel::Business(_) => None,
        }
    }

    pub fn set_whereabouts(&mut self, when: SimTimestamp, facet: FacetId) -> Option<FacetId> {
        match self {
            MentalModel::Person(m) => m.whereabouts.entries.insert(when, facet),
            MentalModel::Dwelling(_) | MentalModel::Business(_) => {
                panic!("set_whereabouts: places have no whereabouts")
            }
        }
    }

    /// Current facets, whereabouts excluded, in feature order.
    pub fn facets(&self) -> Vec<(FeatureType, FacetId)> {
        let features = match self {
            MentalModel::Person(_) => FeatureType::person_features(),
            MentalModel::Dwelling(_) => FeatureType::place_features(false),
            MentalModel::Business(_) => FeatureType::place_features(true),
        };
        features
            .into_iter()
            .filter_map(|f| self.get_facet(f).map(|id| (f, id)))
            .collect()
    }

    /// Every current facet including whereabouts.
    pub fn all_facet_ids(&self) -> Vec<FacetId> {
        let mut ids: Vec<FacetId> = self.facets().into_iter().map(|(_, id)| id).collect();
        if let MentalModel::Person(m) = self {
            ids.extend(m.whereabouts.entries.values().copied());
        }
        ids
    }

    /// Swap a whereabouts facet in place wherever it is referenced.
    pub fn replace_whereabouts(&mut self, old: FacetId, new: FacetId) -> bool {
        if let MentalModel::Person(m) = self {
            for id in m.whereabouts.entries.values_mut() {
                if *id == old {
                    *id = new;
                    return true;
                }
            }
        }
        false
    }
}

/// A person's memory capacity and everything they believe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mind {
    pub memory: f64,
    #[serde(skip)]
    pub models: BTreeMap<Entity, MentalModel>,
}

impl Mind {
    /// The subject whose current facets match every `(feature, value)` pair.
    /// Among several matches the most salient person wins; places rank
    /// below people and ties fall to the lowest entity.
    pub fn closest_match(
        &self,
        facets: &BTreeMap<FacetId, Facet>,
        salience: &BTreeMap<PersonId, f64>,
        description: &[(FeatureType, String)],
    ) -> Option<Entity> {
        let mut best: Option<(Entity, f64)> = None;
        for (subject, model) in &self.models {
            let matches = description.iter().all(|(feature, value)| {
                model
                    .get_facet(*feature)
                    .and_then(|id| facets.get(&id))
                    .is_some_and(|f| !f.is_forgotten() && f.value == *value)
            });
            if !matches {
                continue;
            }
            let score = match subject {
                Entity::Person(p) => salience.get(p).copied().unwrap_or(0.0),
                _ => -1.0,
            };
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((*subject, score));
            }
        }
        best.map(|(subject, _)| subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_type_strings_round_trip() {
        for f in FeatureType::all() {
            let s: String = f.into();
            assert_eq!(FeatureType::try_from(s.clone()), Ok(f), "round trip of {s}");
        }
    }

    #[test]
    fn get_and_set_by_feature() {
        let mut model = MentalModel::for_subject(Entity::Person(PersonId(1)));
        assert_eq!(model.get_facet(FeatureType::FirstName), None);
        assert_eq!(model.set_facet(FeatureType::FirstName, FacetId(5)), None);
        assert_eq!(model.set_facet(FeatureType::FirstName, FacetId(6)), Some(FacetId(5)));
        model.set_facet(FeatureType::Face(FacialFeature::HairColor), FacetId(7));
        assert_eq!(model.get_facet(FeatureType::FirstName), Some(FacetId(6)));
        assert_eq!(
            model.get_facet(FeatureType::Face(FacialFeature::HairColor)),
            Some(FacetId(7))
        );
        assert_eq!(model.facets().len(), 2);
    }

    #[test]
    fn place_models_reject_person_features() {
        let model = MentalModel::for_subject(Entity::Business(crate::id::BuildingId(2)));
        assert_eq!(model.get_facet(FeatureType::FirstName), None);
    }

    #[test]
    #[should_panic(expected = "does not apply")]
    fn set_facet_panics_on_mismatch() {
        let mut model = MentalModel::for_subject(Entity::Dwelling(crate::id::BuildingId(2)));
        model.set_facet(FeatureType::JobTitle, FacetId(1));
    }

    #[test]
    fn whereabouts_keyed_by_half_day() {
        let mut model = MentalModel::for_subject(Entity::Person(PersonId(1)));
        let when = SimTimestamp::from_year(1950);
        model.set_whereabouts(when, FacetId(9));
        assert_eq!(model.whereabouts_at(when), Some(FacetId(9)));
        assert_eq!(model.all_facet_ids(), vec![FacetId(9)]);
        assert!(model.replace_whereabouts(FacetId(9), FacetId(10)));
        assert_eq!(model.whereabouts_at(when), Some(FacetId(10)));
    }
}
