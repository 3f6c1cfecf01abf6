use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{BuildingId, EventId, LotId, OccupationId, PersonId};
use crate::model::occupation::{Industry, OccupationKind, Shift, title_case};
use crate::model::timestamp::SimTimestamp;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BusinessKind {
    ApartmentComplex,
    Bank,
    Bar,
    Barbershop,
    BusDepot,
    Cemetery,
    CityHall,
    ConstructionFirm,
    FireStation,
    Hospital,
    Hotel,
    LawFirm,
    OptometryClinic,
    Park,
    PlasticSurgeryClinic,
    PoliceStation,
    RealtyFirm,
    Restaurant,
    Supermarket,
    TattooParlor,
    TaxiDepot,
    University,
}

string_enum!(BusinessKind {
    ApartmentComplex => "apartment_complex",
    Bank => "bank",
    Bar => "bar",
    Barbershop => "barbershop",
    BusDepot => "bus_depot",
    Cemetery => "cemetery",
    CityHall => "city_hall",
    ConstructionFirm => "construction_firm",
    FireStation => "fire_station",
    Hospital => "hospital",
    Hotel => "hotel",
    LawFirm => "law_firm",
    OptometryClinic => "optometry_clinic",
    Park => "park",
    PlasticSurgeryClinic => "plastic_surgery_clinic",
    PoliceStation => "police_station",
    RealtyFirm => "realty_firm",
    Restaurant => "restaurant",
    Supermarket => "supermarket",
    TattooParlor => "tattoo_parlor",
    TaxiDepot => "taxi_depot",
    University => "university",
});

impl BusinessKind {
    /// Institutions run by the town rather than an owner.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            BusinessKind::CityHall
                | BusinessKind::FireStation
                | BusinessKind::PoliceStation
                | BusinessKind::University
                | BusinessKind::Park
                | BusinessKind::Cemetery
        )
    }

    /// Parks and cemeteries occupy tracts when one is free.
    pub fn prefers_tract(self) -> bool {
        matches!(self, BusinessKind::Park | BusinessKind::Cemetery)
    }

    pub fn industry(self) -> Industry {
        match self {
            BusinessKind::ApartmentComplex
            | BusinessKind::Supermarket
            | BusinessKind::Restaurant => Industry::General,
            BusinessKind::Bar | BusinessKind::Hotel => Industry::Hospitality,
            BusinessKind::Bank => Industry::Finance,
            BusinessKind::Barbershop | BusinessKind::TattooParlor => Industry::Cosmetic,
            BusinessKind::BusDepot | BusinessKind::TaxiDepot => Industry::Transportation,
            BusinessKind::Cemetery | BusinessKind::Park => Industry::Parks,
            BusinessKind::CityHall => Industry::Politics,
            BusinessKind::ConstructionFirm => Industry::Construction,
            BusinessKind::FireStation => Industry::Fire,
            BusinessKind::Hospital
            | BusinessKind::OptometryClinic
            | BusinessKind::PlasticSurgeryClinic => Industry::Medical,
            BusinessKind::LawFirm => Industry::Law,
            BusinessKind::PoliceStation => Industry::Police,
            BusinessKind::RealtyFirm => Industry::Realty,
            BusinessKind::University => Industry::Education,
        }
    }

    /// Display name, e.g. "Plastic Surgery Clinic".
    pub fn display_name(self) -> String {
        title_case(self.as_str())
    }
}

/// A company occupying a business building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BuildingId,
    pub kind: BusinessKind,
    pub name: String,
    pub lot: LotId,
    pub address: String,
    pub founded: SimTimestamp,
    pub closed: Option<SimTimestamp>,
    pub founder: Option<PersonId>,
    pub owner: Option<OccupationId>,
    pub employees: BTreeSet<OccupationId>,
    pub former_employees: BTreeSet<OccupationId>,
    /// Positions the company could not fill; retried every year.
    pub open_positions: Vec<(OccupationKind, Shift)>,
    /// Apartment units, for apartment complexes.
    pub units: Vec<BuildingId>,
    /// Burial plots, for cemeteries.
    pub plots: BTreeMap<u32, PersonId>,
    pub construction: Option<EventId>,
}

impl Business {
    pub fn is_open(&self) -> bool {
        self.closed.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DwellingKind {
    House,
    Apartment { complex: BuildingId, unit: u32 },
}

/// A house or apartment unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DwellingPlace {
    pub id: BuildingId,
    pub kind: DwellingKind,
    pub lot: LotId,
    pub address: String,
    pub owners: BTreeSet<PersonId>,
    pub former_owners: BTreeSet<PersonId>,
    pub residents: BTreeSet<PersonId>,
    pub former_residents: BTreeSet<PersonId>,
    pub construction: Option<EventId>,
    pub transactions: Vec<EventId>,
}

impl DwellingPlace {
    pub fn is_vacant(&self) -> bool {
        self.residents.is_empty()
    }

    pub fn is_apartment(&self) -> bool {
        matches!(self.kind, DwellingKind::Apartment { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(BusinessKind::PlasticSurgeryClinic.display_name(), "Plastic Surgery Clinic");
        assert_eq!(BusinessKind::Bar.display_name(), "Bar");
    }

    #[test]
    fn public_institutions() {
        assert!(BusinessKind::CityHall.is_public());
        assert!(BusinessKind::Cemetery.is_public());
        assert!(!BusinessKind::Hospital.is_public());
        assert!(BusinessKind::Park.prefers_tract());
    }
}
