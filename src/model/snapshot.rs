//! Read-only structural dump of a world, consumed by exports and UIs.

use serde::{Deserialize, Serialize};

use super::belief::FeatureType;
use super::business::{BusinessKind, DwellingKind};
use super::entity::Entity;
use super::event::Event;
use super::occupation::{OccupationKind, Shift};
use super::person::Sex;
use super::space::{Direction, LotKind};
use super::timestamp::SimTimestamp;
use super::world::World;
use crate::id::{BlockId, BuildingId, LotId, OccupationId, PersonId, StreetId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRecord {
    pub id: StreetId,
    pub name: String,
    pub number: u32,
    pub direction: Direction,
    pub blocks: Vec<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub street: StreetId,
    pub number: u32,
    pub coords: (u32, u32),
    pub lots: Vec<LotId>,
    pub neighbors: Vec<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotRecord {
    pub id: LotId,
    pub kind: LotKind,
    pub address: String,
    pub building: Option<BuildingId>,
    /// "house", "apartment_complex", "vacant", ...
    pub building_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellingRecord {
    pub id: BuildingId,
    pub address: String,
    pub apartment: bool,
    pub occupants: Vec<PersonId>,
    pub owners: Vec<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub person: PersonId,
    pub occupation: OccupationKind,
    pub shift: Shift,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: BuildingId,
    pub name: String,
    pub kind: BusinessKind,
    pub address: String,
    pub founded: SimTimestamp,
    pub employees: Vec<EmployeeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentRecord {
    pub id: PersonId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub sex: Sex,
    pub age: u32,
    pub mother: Option<PersonId>,
    pub father: Option<PersonId>,
    pub spouse: Option<PersonId>,
    pub kids: Vec<PersonId>,
    pub siblings: Vec<PersonId>,
    pub home: Option<BuildingId>,
    pub occupation: Option<OccupationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRecord {
    pub owner: PersonId,
    pub subject: Entity,
    pub feature: FeatureType,
    pub value: String,
    pub strength: f64,
    pub accurate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub town: String,
    pub date: SimTimestamp,
    pub streets: Vec<StreetRecord>,
    pub blocks: Vec<BlockRecord>,
    pub lots: Vec<LotRecord>,
    pub dwellings: Vec<DwellingRecord>,
    pub businesses: Vec<BusinessRecord>,
    pub residents: Vec<ResidentRecord>,
    pub events: Vec<Event>,
    /// Current non-whereabouts facets of every resident's mental models.
    pub beliefs: Vec<BeliefRecord>,
}

impl World {
    pub fn snapshot(&self) -> Snapshot {
        let streets = self
            .town
            .streets
            .iter()
            .map(|s| StreetRecord {
                id: s.id,
                name: s.name.clone(),
                number: s.number,
                direction: s.direction,
                blocks: s.blocks.clone(),
            })
            .collect();

        let blocks = self
            .town
            .blocks
            .iter()
            .map(|b| BlockRecord {
                id: b.id,
                street: b.street,
                number: b.number,
                coords: b.coords,
                lots: b.lots.clone(),
                neighbors: b.neighbors.clone(),
            })
            .collect();

        let lots = self
            .town
            .lots
            .iter()
            .map(|l| LotRecord {
                id: l.id,
                kind: l.kind,
                address: self.town.address_of(l.id),
                building: l.building,
                building_type: match l.building {
                    None => "vacant".to_string(),
                    Some(b) => match self.businesses.get(&b) {
                        Some(business) => business.kind.as_str().to_string(),
                        None => "house".to_string(),
                    },
                },
            })
            .collect();

        let dwellings = self
            .dwellings
            .values()
            .map(|d| DwellingRecord {
                id: d.id,
                address: d.address.clone(),
                apartment: matches!(d.kind, DwellingKind::Apartment { .. }),
                occupants: d.residents.iter().copied().collect(),
                owners: d.owners.iter().copied().collect(),
            })
            .collect();

        let businesses = self
            .businesses
            .values()
            .filter(|b| b.is_open())
            .map(|b| BusinessRecord {
                id: b.id,
                name: b.name.clone(),
                kind: b.kind,
                address: b.address.clone(),
                founded: b.founded,
                employees: b
                    .employees
                    .iter()
                    .map(|o| {
                        let occupation = self.occupation(*o);
                        EmployeeRecord {
                            person: occupation.person,
                            occupation: occupation.kind,
                            shift: occupation.shift,
                        }
                    })
                    .collect(),
            })
            .collect();

        let now = self.current_time;
        let residents = self
            .residents
            .iter()
            .map(|id| {
                let p = self.person(*id);
                ResidentRecord {
                    id: p.id,
                    first_name: p.first_name.clone(),
                    middle_name: p.middle_name.clone(),
                    last_name: p.last_name.clone(),
                    suffix: p.suffix.clone(),
                    sex: p.sex,
                    age: p.age(now),
                    mother: p.mother,
                    father: p.father,
                    spouse: p.spouse,
                    kids: p.legal.kids.iter().copied().collect(),
                    siblings: p.legal.siblings.iter().copied().collect(),
                    home: p.home,
                    occupation: p.occupation,
                }
            })
            .collect();

        let mut beliefs = Vec::new();
        for id in &self.residents {
            for (subject, model) in &self.person(*id).mind.models {
                for (feature, facet) in model.facets() {
                    let f = self.facet(facet);
                    beliefs.push(BeliefRecord {
                        owner: *id,
                        subject: *subject,
                        feature,
                        value: f.value.clone(),
                        strength: f.strength,
                        accurate: self.facet_is_accurate(facet),
                    });
                }
            }
        }

        Snapshot {
            town: self.town.name.clone(),
            date: now,
            streets,
            blocks,
            lots,
            dwellings,
            businesses,
            residents,
            events: self.events.values().cloned().collect(),
            beliefs,
        }
    }
}
