use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::business::{Business, BusinessKind, DwellingPlace};
use super::belief::Facet;
use super::entity::Entity;
use super::event::{Event, EventKind};
use super::evidence::{Evidence, EvidenceKind};
use super::occupation::Occupation;
use super::person::Person;
use super::space::Town;
use super::timestamp::SimTimestamp;
use crate::config::Config;
use crate::corpora::Corpora;
use crate::id::{BuildingId, EventId, EvidenceId, FacetId, IdGenerator, LotId, OccupationId, PersonId};

/// The whole simulated town: layout, people, places, events and beliefs.
/// Every cross-reference is an id into one of these arenas.
#[derive(Debug)]
pub struct World {
    pub config: Arc<Config>,
    pub corpora: Arc<Corpora>,
    pub town: Town,
    pub people: BTreeMap<PersonId, Person>,
    /// Alive and living in town.
    pub residents: BTreeSet<PersonId>,
    pub departed: BTreeSet<PersonId>,
    pub deceased: BTreeSet<PersonId>,
    pub dwellings: BTreeMap<BuildingId, DwellingPlace>,
    pub businesses: BTreeMap<BuildingId, Business>,
    pub occupations: BTreeMap<OccupationId, Occupation>,
    pub facets: BTreeMap<FacetId, Facet>,
    pub evidence: BTreeMap<EvidenceId, Evidence>,
    pub events: BTreeMap<EventId, Event>,
    pub id_gen: IdGenerator,
    event_numbers: IdGenerator,
    pub current_time: SimTimestamp,
    /// Set while replaying an immigrant family's past; events use this date.
    pub retcon_time: Option<SimTimestamp>,
    /// Facets that received supporting evidence during the current step.
    pub reinforced: BTreeSet<FacetId>,
    pub founder: Option<PersonId>,
    pub high_fidelity: bool,
}

impl World {
    pub fn new(config: Arc<Config>, corpora: Arc<Corpora>) -> Self {
        let start = SimTimestamp::from_year(config.time.year_city_gets_founded);
        Self {
            config,
            corpora,
            town: Town::default(),
            people: BTreeMap::new(),
            residents: BTreeSet::new(),
            departed: BTreeSet::new(),
            deceased: BTreeSet::new(),
            dwellings: BTreeMap::new(),
            businesses: BTreeMap::new(),
            occupations: BTreeMap::new(),
            facets: BTreeMap::new(),
            evidence: BTreeMap::new(),
            events: BTreeMap::new(),
            id_gen: IdGenerator::new(),
            event_numbers: IdGenerator::new(),
            current_time: start,
            retcon_time: None,
            reinforced: BTreeSet::new(),
            founder: None,
            high_fidelity: false,
        }
    }

    /// The date events are stamped with: the retcon date while replaying
    /// an immigrant's past, otherwise the simulation clock.
    pub fn now(&self) -> SimTimestamp {
        self.retcon_time.unwrap_or(self.current_time)
    }

    pub fn next_event_number(&mut self) -> u64 {
        self.event_numbers.next_id()
    }

    /// Highest event number handed out so far.
    pub fn last_event_number(&self) -> u64 {
        self.event_numbers.peek() - 1
    }

    // -----------------------------------------------------------------------
    // Arena accessors
    // -----------------------------------------------------------------------

    pub fn person(&self, id: PersonId) -> &Person {
        self.people
            .get(&id)
            .unwrap_or_else(|| panic!("person {id} not found"))
    }

    pub fn person_mut(&mut self, id: PersonId) -> &mut Person {
        self.people
            .get_mut(&id)
            .unwrap_or_else(|| panic!("person {id} not found"))
    }

    pub fn dwelling(&self, id: BuildingId) -> &DwellingPlace {
        self.dwellings
            .get(&id)
            .unwrap_or_else(|| panic!("dwelling {id} not found"))
    }

    pub fn dwelling_mut(&mut self, id: BuildingId) -> &mut DwellingPlace {
        self.dwellings
            .get_mut(&id)
            .unwrap_or_else(|| panic!("dwelling {id} not found"))
    }

    pub fn business(&self, id: BuildingId) -> &Business {
        self.businesses
            .get(&id)
            .unwrap_or_else(|| panic!("business {id} not found"))
    }

    pub fn business_mut(&mut self, id: BuildingId) -> &mut Business {
        self.businesses
            .get_mut(&id)
            .unwrap_or_else(|| panic!("business {id} not found"))
    }

    pub fn occupation(&self, id: OccupationId) -> &Occupation {
        self.occupations
            .get(&id)
            .unwrap_or_else(|| panic!("occupation {id} not found"))
    }

    pub fn occupation_mut(&mut self, id: OccupationId) -> &mut Occupation {
        self.occupations
            .get_mut(&id)
            .unwrap_or_else(|| panic!("occupation {id} not found"))
    }

    pub fn facet(&self, id: FacetId) -> &Facet {
        self.facets
            .get(&id)
            .unwrap_or_else(|| panic!("facet {id} not found"))
    }

    pub fn facet_mut(&mut self, id: FacetId) -> &mut Facet {
        self.facets
            .get_mut(&id)
            .unwrap_or_else(|| panic!("facet {id} not found"))
    }

    pub fn evidence_item(&self, id: EvidenceId) -> &Evidence {
        self.evidence
            .get(&id)
            .unwrap_or_else(|| panic!("evidence {id} not found"))
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Append an event stamped with [`World::now`] and attach it to the life
    /// story of every participant.
    pub fn add_event(
        &mut self,
        kind: EventKind,
        location: Option<Entity>,
        description: String,
        caused_by: Option<EventId>,
    ) -> EventId {
        if let Some(cause) = caused_by {
            assert!(
                self.events.contains_key(&cause),
                "add_event: cause event {cause} not found"
            );
        }
        let id = EventId(self.id_gen.next_id());
        let number = self.next_event_number();
        for person in kind.participants() {
            if let Some(p) = self.people.get_mut(&person) {
                p.life_events.push(id);
            }
        }
        let event = Event {
            id,
            number,
            kind,
            timestamp: self.now(),
            location,
            description,
            caused_by,
        };
        self.events.insert(id, event);
        id
    }

    /// Log a new evidence item. Facets register themselves with it later.
    pub fn add_evidence(
        &mut self,
        kind: EvidenceKind,
        subject: Entity,
        source: PersonId,
        location: Option<Entity>,
    ) -> EvidenceId {
        let id = EvidenceId(self.id_gen.next_id());
        let number = self.next_event_number();
        let evidence = Evidence {
            id,
            number,
            kind,
            subject,
            source,
            location,
            timestamp: self.now(),
            beliefs_evidenced: BTreeSet::new(),
        };
        self.evidence.insert(id, evidence);
        id
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The entity for a building id, whichever arena it lives in.
    pub fn building_entity(&self, id: BuildingId) -> Entity {
        if self.businesses.contains_key(&id) {
            Entity::Business(id)
        } else {
            Entity::Dwelling(id)
        }
    }

    pub fn building_lot(&self, id: BuildingId) -> LotId {
        match self.businesses.get(&id) {
            Some(b) => b.lot,
            None => self.dwelling(id).lot,
        }
    }

    /// Open businesses of a kind, in id order.
    pub fn businesses_of_kind(&self, kind: BusinessKind) -> impl Iterator<Item = &Business> + '_ {
        self.businesses
            .values()
            .filter(move |b| b.kind == kind && b.is_open())
    }

    /// Dwellings nobody lives in.
    pub fn vacant_homes(&self) -> Vec<BuildingId> {
        self.dwellings
            .values()
            .filter(|d| d.is_vacant())
            .map(|d| d.id)
            .collect()
    }

    /// Number of people living or working on a lot.
    pub fn lot_population(&self, lot: LotId) -> usize {
        let Some(building) = self.town.lot(lot).building else {
            return 0;
        };
        if let Some(d) = self.dwellings.get(&building) {
            return d.residents.len();
        }
        let business = self.business(building);
        let tenants: usize = business
            .units
            .iter()
            .map(|u| self.dwelling(*u).residents.len())
            .sum();
        business.employees.len() + tenants
    }

    /// Workplace of a person's current occupation.
    pub fn workplace_of(&self, person: PersonId) -> Option<BuildingId> {
        self.person(person)
            .occupation
            .map(|o| self.occupation(o).company)
    }

    /// Present members of the current household, `person` excluded.
    pub fn household_of(&self, person: PersonId) -> BTreeSet<PersonId> {
        let Some(home) = self.person(person).home else {
            return BTreeSet::new();
        };
        self.dwelling(home)
            .residents
            .iter()
            .copied()
            .filter(|p| *p != person)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_world() -> World {
        World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()))
    }

    #[test]
    fn event_numbers_are_shared_with_evidence() {
        let mut world = empty_world();
        let e1 = world.add_event(
            EventKind::Departure { subjects: vec![] },
            None,
            "nobody left".to_string(),
            None,
        );
        let ev = world.add_evidence(
            EvidenceKind::Reflection,
            Entity::Person(PersonId(99)),
            PersonId(99),
            None,
        );
        let e2 = world.add_event(
            EventKind::Departure { subjects: vec![] },
            None,
            "nobody left again".to_string(),
            Some(e1),
        );
        assert_eq!(world.events[&e1].number, 1);
        assert_eq!(world.evidence[&ev].number, 2);
        assert_eq!(world.events[&e2].number, 3);
        assert_eq!(world.last_event_number(), 3);
        assert_eq!(world.events[&e2].caused_by, Some(e1));
    }

    #[test]
    fn retcon_time_stamps_events() {
        let mut world = empty_world();
        world.retcon_time = Some(SimTimestamp::from_year(1890));
        let e = world.add_event(
            EventKind::Departure { subjects: vec![] },
            None,
            String::new(),
            None,
        );
        assert_eq!(world.events[&e].timestamp.year(), 1890);
        world.retcon_time = None;
        assert_eq!(world.now().year(), world.config.time.year_city_gets_founded);
    }

    #[test]
    #[should_panic(expected = "cause event")]
    fn add_event_panics_on_missing_cause() {
        let mut world = empty_world();
        world.add_event(
            EventKind::Departure { subjects: vec![] },
            None,
            String::new(),
            Some(EventId(404)),
        );
    }

    #[test]
    #[should_panic(expected = "person 5 not found")]
    fn missing_person_panics() {
        let world = empty_world();
        world.person(PersonId(5));
    }
}
