pub mod belief;
pub mod business;
pub mod entity;
pub mod event;
pub mod evidence;
pub mod face;
pub mod occupation;
pub mod person;
pub mod personality;
pub mod relationship;
pub mod snapshot;
pub mod space;
pub mod timestamp;
pub mod truth;
pub mod world;

pub use belief::{
    BusinessMentalModel, DwellingPlaceModel, Facet, FeatureType, MentalModel, Mind,
    PersonMentalModel,
};
pub use business::{Business, BusinessKind, DwellingKind, DwellingPlace};
pub use entity::Entity;
pub use event::{Event, EventKind};
pub use evidence::{Evidence, EvidenceKind, EvidenceType};
pub use face::{Face, FacialFeature, FeatureValue};
pub use occupation::{Industry, Occupation, OccupationKind, Prerequisite, Shift};
pub use person::{FamilyTies, Person, Pregnancy, Sex, Sexuality};
pub use personality::{Personality, Trait};
pub use relationship::{Relationship, RelationshipKind};
pub use snapshot::Snapshot;
pub use space::{Block, Direction, DistanceTable, Frontage, Lot, LotKind, Orientation, Side, Street, Town};
pub use timestamp::{Phase, SimTimestamp};
pub use truth::Truth;
pub use world::World;
