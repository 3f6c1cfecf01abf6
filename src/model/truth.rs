//! Ground truth for belief features; facets are accurate iff they match it.

use super::belief::FeatureType;
use super::business::DwellingKind;
use super::entity::Entity;
use super::timestamp::SimTimestamp;
use super::world::World;
use crate::id::BuildingId;

/// The true value of a feature, and the entity it names if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Truth {
    pub value: String,
    pub object: Option<Entity>,
}

impl Truth {
    fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            object: None,
        }
    }
}

impl World {
    /// How a place is referred to: business name or street address.
    pub fn place_label(&self, place: Entity) -> String {
        match place {
            Entity::Business(id) => self.business(id).name.clone(),
            Entity::Dwelling(id) => self.dwelling(id).address.clone(),
            Entity::Person(id) => self.person(id).name(),
        }
    }

    fn building_block_name(&self, id: BuildingId) -> String {
        let lot = self.building_lot(id);
        self.town.block_name(self.town.lot(lot).street_address().block)
    }

    /// Ground truth for `feature` of `subject`; `None` when the feature does
    /// not currently apply (an unemployed person has no workplace).
    /// Whereabouts need the half-day in `when`.
    pub fn true_value(
        &self,
        subject: Entity,
        feature: FeatureType,
        when: Option<SimTimestamp>,
    ) -> Option<Truth> {
        match subject {
            Entity::Person(id) => {
                let person = self.people.get(&id)?;
                match feature {
                    FeatureType::FirstName => Some(Truth::plain(&person.first_name)),
                    FeatureType::MiddleName => Some(Truth::plain(&person.middle_name)),
                    FeatureType::LastName => Some(Truth::plain(&person.last_name)),
                    FeatureType::Workplace => person.occupation.map(|o| {
                        let company = self.occupation(o).company;
                        Truth {
                            value: self.business(company).name.clone(),
                            object: Some(Entity::Business(company)),
                        }
                    }),
                    FeatureType::JobTitle => person
                        .occupation
                        .map(|o| Truth::plain(self.occupation(o).kind.title())),
                    FeatureType::JobShift => person
                        .occupation
                        .map(|o| Truth::plain(self.occupation(o).shift.as_str())),
                    FeatureType::HomeAddress => person.home.map(|h| Truth {
                        value: self.dwelling(h).address.clone(),
                        object: Some(Entity::Dwelling(h)),
                    }),
                    FeatureType::Face(f) => person.face.feature(f).map(|v| Truth::plain(&v.value)),
                    FeatureType::Whereabouts => {
                        let place = *person.whereabouts.get(&when?)?;
                        Some(Truth {
                            value: self.place_label(place),
                            object: Some(place),
                        })
                    }
                    FeatureType::BuildingName
                    | FeatureType::BuildingKind
                    | FeatureType::Address
                    | FeatureType::BlockName => None,
                }
            }
            Entity::Dwelling(id) => {
                let dwelling = self.dwellings.get(&id)?;
                match feature {
                    FeatureType::BuildingKind => Some(Truth::plain(match dwelling.kind {
                        DwellingKind::House => "house",
                        DwellingKind::Apartment { .. } => "apartment",
                    })),
                    FeatureType::Address => Some(Truth::plain(&dwelling.address)),
                    FeatureType::BlockName => Some(Truth::plain(self.building_block_name(id))),
                    _ => None,
                }
            }
            Entity::Business(id) => {
                let business = self.businesses.get(&id)?;
                match feature {
                    FeatureType::BuildingName => Some(Truth::plain(&business.name)),
                    FeatureType::BuildingKind => Some(Truth::plain(business.kind.display_name())),
                    FeatureType::Address => Some(Truth::plain(&business.address)),
                    FeatureType::BlockName => Some(Truth::plain(self.building_block_name(id))),
                    _ => None,
                }
            }
        }
    }

    /// Whether a facet's value matches its subject's current ground truth.
    pub fn facet_is_accurate(&self, facet: crate::id::FacetId) -> bool {
        let facet = self.facet(facet);
        match self.true_value(facet.subject, facet.feature, facet.when) {
            Some(truth) => truth.value == facet.value,
            None => false,
        }
    }
}
