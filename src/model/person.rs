use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{BuildingId, EventId, OccupationId, PersonId};
use crate::model::belief::Mind;
use crate::model::entity::Entity;
use crate::model::face::Face;
use crate::model::occupation::OccupationKind;
use crate::model::personality::Personality;
use crate::model::relationship::Relationship;
use crate::model::timestamp::SimTimestamp;

/// Age at which people count as adults for romance and next-of-kin duties.
pub const AGE_OF_ADULTHOOD: u32 = 18;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

string_enum!(Sex {
    Male => "male",
    Female => "female",
});

impl Sex {
    pub fn opposite(self) -> Sex {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sexuality {
    pub attracted_to_men: bool,
    pub attracted_to_women: bool,
}

impl Sexuality {
    pub fn attracted_to(&self, sex: Sex) -> bool {
        match sex {
            Sex::Male => self.attracted_to_men,
            Sex::Female => self.attracted_to_women,
        }
    }
}

/// Every kinship relation derivable from parent pointers. Each set has an
/// inverse (parents/kids, grandparents/grandchildren, ...) or is symmetric
/// (siblings, cousins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyTies {
    pub parents: BTreeSet<PersonId>,
    pub kids: BTreeSet<PersonId>,
    pub siblings: BTreeSet<PersonId>,
    pub grandparents: BTreeSet<PersonId>,
    pub grandchildren: BTreeSet<PersonId>,
    pub greatgrandparents: BTreeSet<PersonId>,
    pub greatgrandchildren: BTreeSet<PersonId>,
    pub aunts_and_uncles: BTreeSet<PersonId>,
    pub nieces_and_nephews: BTreeSet<PersonId>,
    pub cousins: BTreeSet<PersonId>,
}

impl FamilyTies {
    pub fn immediate(&self) -> BTreeSet<PersonId> {
        let mut set = BTreeSet::new();
        set.extend(&self.grandparents);
        set.extend(&self.parents);
        set.extend(&self.siblings);
        set.extend(&self.kids);
        set.extend(&self.grandchildren);
        set
    }

    pub fn extended(&self) -> BTreeSet<PersonId> {
        let mut set = self.immediate();
        set.extend(&self.greatgrandparents);
        set.extend(&self.greatgrandchildren);
        set.extend(&self.aunts_and_uncles);
        set.extend(&self.nieces_and_nephews);
        set.extend(&self.cousins);
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pregnancy {
    pub father: PersonId,
    pub conceived: SimTimestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub sex: Sex,
    pub sexuality: Sexuality,
    pub infertile: bool,
    pub birth: SimTimestamp,
    pub death: Option<SimTimestamp>,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub maiden_name: Option<String>,
    pub named_for: (Option<PersonId>, Option<PersonId>),
    /// Legal parents.
    pub mother: Option<PersonId>,
    pub father: Option<PersonId>,
    pub biological_mother: Option<PersonId>,
    pub biological_father: Option<PersonId>,
    pub legal: FamilyTies,
    pub biological: FamilyTies,
    pub home: Option<BuildingId>,
    pub occupation: Option<OccupationId>,
    pub occupations: Vec<OccupationId>,
    pub in_college: bool,
    pub college_graduate: bool,
    pub retired: bool,
    pub in_town: bool,
    pub ex_nihilo: bool,
    pub spouse: Option<PersonId>,
    pub widowed: bool,
    pub grieving: bool,
    pub love_interest: Option<PersonId>,
    pub sexual_partners: BTreeSet<PersonId>,
    pub pregnancy: Option<Pregnancy>,
    /// Decided at marriage; applies to children born while it holds.
    pub kids_get_hyphenated_surname: bool,
    pub marriage: Option<EventId>,
    #[serde(skip)]
    pub relationships: BTreeMap<PersonId, Relationship>,
    pub friends: BTreeSet<PersonId>,
    pub enemies: BTreeSet<PersonId>,
    pub acquaintances: BTreeSet<PersonId>,
    pub best_friend: Option<PersonId>,
    pub worst_enemy: Option<PersonId>,
    #[serde(skip)]
    pub salience: BTreeMap<PersonId, f64>,
    /// People contracted for services, by their occupation.
    #[serde(skip)]
    pub former_contractors: BTreeMap<OccupationKind, BTreeSet<PersonId>>,
    pub money: i64,
    pub life_events: Vec<EventId>,
    pub personality: Personality,
    pub face: Face,
    pub mind: Mind,
    /// Ground-truth location per half-day, recorded at high fidelity.
    #[serde(skip)]
    pub whereabouts: BTreeMap<SimTimestamp, Entity>,
    pub location: Option<Entity>,
}

impl Person {
    pub fn name(&self) -> String {
        let mut name = format!("{} {}", self.first_name, self.last_name);
        if !self.suffix.is_empty() {
            name.push(' ');
            name.push_str(&self.suffix);
        }
        name
    }

    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.as_str()];
        if !self.middle_name.is_empty() {
            parts.push(&self.middle_name);
        }
        parts.push(&self.last_name);
        if !self.suffix.is_empty() {
            parts.push(&self.suffix);
        }
        parts.join(" ")
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// Alive and living in town.
    pub fn is_present(&self) -> bool {
        self.is_alive() && self.in_town
    }

    pub fn age(&self, now: SimTimestamp) -> u32 {
        self.death.unwrap_or(now).years_since(self.birth)
    }

    pub fn is_adult(&self, now: SimTimestamp) -> bool {
        self.age(now) >= AGE_OF_ADULTHOOD
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }

    /// Legal immediate family plus a living spouse.
    pub fn immediate_family(&self) -> BTreeSet<PersonId> {
        let mut set = self.legal.immediate();
        set.extend(self.spouse);
        set
    }

    pub fn extended_family(&self) -> BTreeSet<PersonId> {
        let mut set = self.legal.extended();
        set.extend(self.biological.extended());
        set.extend(self.spouse);
        set
    }

    pub fn is_extended_family(&self, other: PersonId) -> bool {
        self.legal.extended().contains(&other) || self.biological.extended().contains(&other)
    }

    pub fn attracted_to(&self, other: &Person) -> bool {
        self.sexuality.attracted_to(other.sex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_is_subset_of_extended() {
        let mut ties = FamilyTies::default();
        ties.parents.insert(PersonId(1));
        ties.cousins.insert(PersonId(2));
        ties.grandchildren.insert(PersonId(3));
        let immediate = ties.immediate();
        let extended = ties.extended();
        assert!(immediate.contains(&PersonId(1)));
        assert!(immediate.contains(&PersonId(3)));
        assert!(!immediate.contains(&PersonId(2)));
        assert!(immediate.is_subset(&extended));
    }

    #[test]
    fn sexuality_attraction() {
        let s = Sexuality {
            attracted_to_men: true,
            attracted_to_women: false,
        };
        assert!(s.attracted_to(Sex::Male));
        assert!(!s.attracted_to(Sex::Female));
        assert_eq!(Sex::Male.opposite(), Sex::Female);
    }
}
