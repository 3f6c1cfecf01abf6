use serde::{Deserialize, Serialize};

use crate::id::{BuildingId, EventId, LotId, OccupationId, PersonId};
use crate::model::business::BusinessKind;
use crate::model::entity::Entity;
use crate::model::occupation::OccupationKind;
use crate::model::timestamp::SimTimestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Birth {
        child: PersonId,
        mother: PersonId,
        father: Option<PersonId>,
        biological_father: PersonId,
        doctor: Option<PersonId>,
        nurses: Vec<PersonId>,
        hospital: Option<BuildingId>,
    },
    Adoption {
        child: PersonId,
        adoptive_parents: Vec<PersonId>,
    },
    Death {
        subject: PersonId,
        mortician: Option<PersonId>,
        cemetery: Option<BuildingId>,
        plot: Option<u32>,
        widow: Option<PersonId>,
    },
    Marriage {
        spouses: [PersonId; 2],
        /// Name changes made because of this marriage; divorce may revert them.
        name_changes: Vec<EventId>,
    },
    Divorce {
        spouses: [PersonId; 2],
        lawyer: Option<PersonId>,
        marriage: Option<EventId>,
    },
    Move {
        movers: Vec<PersonId>,
        from: Option<BuildingId>,
        to: BuildingId,
    },
    NameChange {
        subject: PersonId,
        old_last_name: String,
        new_last_name: String,
        lawyer: Option<PersonId>,
    },
    Departure {
        subjects: Vec<PersonId>,
    },
    Hiring {
        subject: PersonId,
        company: BuildingId,
        occupation: OccupationId,
        position: OccupationKind,
        promotion: bool,
    },
    Termination {
        subject: PersonId,
        occupation: OccupationId,
    },
    Retirement {
        subject: PersonId,
        occupation: OccupationId,
    },
    HouseConstruction {
        clients: Vec<PersonId>,
        architect: Option<PersonId>,
        builders: Vec<PersonId>,
        lot: LotId,
        house: BuildingId,
    },
    BuildingConstruction {
        client: Option<PersonId>,
        architect: Option<PersonId>,
        builders: Vec<PersonId>,
        lot: LotId,
        building: BuildingId,
        business_kind: BusinessKind,
    },
    HomePurchase {
        buyers: Vec<PersonId>,
        home: BuildingId,
        realtor: Option<PersonId>,
    },
}

impl EventKind {
    /// Short tag used in logs and exports.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Birth { .. } => "birth",
            EventKind::Adoption { .. } => "adoption",
            EventKind::Death { .. } => "death",
            EventKind::Marriage { .. } => "marriage",
            EventKind::Divorce { .. } => "divorce",
            EventKind::Move { .. } => "move",
            EventKind::NameChange { .. } => "name_change",
            EventKind::Departure { .. } => "departure",
            EventKind::Hiring { .. } => "hiring",
            EventKind::Termination { .. } => "termination",
            EventKind::Retirement { .. } => "retirement",
            EventKind::HouseConstruction { .. } => "house_construction",
            EventKind::BuildingConstruction { .. } => "building_construction",
            EventKind::HomePurchase { .. } => "home_purchase",
        }
    }

    /// Everyone whose life story includes this event.
    pub fn participants(&self) -> Vec<PersonId> {
        let mut people = Vec::new();
        match self {
            EventKind::Birth {
                child,
                mother,
                father,
                biological_father,
                doctor,
                nurses,
                ..
            } => {
                people.extend([*child, *mother, *biological_father]);
                people.extend(*father);
                people.extend(*doctor);
                people.extend(nurses);
            }
            EventKind::Adoption {
                child,
                adoptive_parents,
            } => {
                people.push(*child);
                people.extend(adoptive_parents);
            }
            EventKind::Death {
                subject, mortician, ..
            } => {
                people.push(*subject);
                people.extend(*mortician);
            }
            EventKind::Marriage { spouses, .. } => people.extend(spouses),
            EventKind::Divorce {
                spouses, lawyer, ..
            } => {
                people.extend(spouses);
                people.extend(*lawyer);
            }
            EventKind::Move { movers, .. } => people.extend(movers),
            EventKind::NameChange {
                subject, lawyer, ..
            } => {
                people.push(*subject);
                people.extend(*lawyer);
            }
            EventKind::Departure { subjects } => people.extend(subjects),
            EventKind::Hiring { subject, .. }
            | EventKind::Termination { subject, .. }
            | EventKind::Retirement { subject, .. } => people.push(*subject),
            EventKind::HouseConstruction {
                clients,
                architect,
                builders,
                ..
            } => {
                people.extend(clients);
                people.extend(*architect);
                people.extend(builders);
            }
            EventKind::BuildingConstruction {
                client,
                architect,
                builders,
                ..
            } => {
                people.extend(*client);
                people.extend(*architect);
                people.extend(builders);
            }
            EventKind::HomePurchase {
                buyers, realtor, ..
            } => {
                people.extend(buyers);
                people.extend(*realtor);
            }
        }
        people.sort();
        people.dedup();
        people
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Monotone across events and evidence; orders same-timestamp happenings.
    pub number: u64,
    pub kind: EventKind,
    pub timestamp: SimTimestamp,
    pub location: Option<Entity>,
    pub description: String,
    pub caused_by: Option<EventId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_are_deduplicated() {
        let kind = EventKind::Birth {
            child: PersonId(3),
            mother: PersonId(1),
            father: Some(PersonId(2)),
            biological_father: PersonId(2),
            doctor: None,
            nurses: vec![],
            hospital: None,
        };
        assert_eq!(kind.participants(), vec![PersonId(1), PersonId(2), PersonId(3)]);
        assert_eq!(kind.name(), "birth");
    }

    #[test]
    fn serde_shape() {
        let kind = EventKind::Departure {
            subjects: vec![PersonId(4)],
        };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["type"], "departure");
        assert_eq!(value["subjects"][0], 4);
    }
}
