//! Jobs, companies and money.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{BusinessKind, Industry, OccupationKind, Prerequisite, Shift};

/// Services whose providers get paid, keyed in the compensation table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Service {
    Birth,
    BuildingConstruction,
    Death,
    Divorce,
    HouseConstruction,
    HomePurchase,
    NameChange,
}

string_enum!(Service {
    Birth => "birth",
    BuildingConstruction => "building_construction",
    Death => "death",
    Divorce => "divorce",
    HouseConstruction => "house_construction",
    HomePurchase => "home_purchase",
    NameChange => "name_change",
});

/// One position a company opens with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    pub occupation: OccupationKind,
    #[serde(default = "day_shift")]
    pub shift: Shift,
}

fn day_shift() -> Shift {
    Shift::Day
}

/// When the town wants another business of a kind.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessDemand {
    pub min_population: usize,
    pub residents_per_business: usize,
    pub chance_per_year: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub age_people_start_working: u32,
    pub amount_of_money_generated_people_from_outside_city_start_with: i64,
    pub business_startup_cost: i64,
    pub age_people_retire: u32,
    pub chance_someone_retires: f64,

    // Hiring
    pub preference_to_hire_immediate_family: f64,
    pub preference_to_hire_from_within_company: f64,
    pub preference_to_hire_friend: f64,
    pub preference_to_hire_extended_family: f64,
    pub preference_to_hire_known_person: f64,
    pub dispreference_to_hire_enemy: f64,
    /// Stand-in job level for unemployed candidates when scoring.
    pub unemployment_occupation_level: f64,

    // Contracting
    pub preference_to_contract_immediate_family: f64,
    pub preference_to_contract_friend: f64,
    pub preference_to_contract_former_contract: f64,
    pub preference_to_contract_extended_family: f64,
    pub preference_to_contract_known_person: f64,
    pub experience_bonus_exponent: f64,

    pub initial_job_vacancies: BTreeMap<BusinessKind, Vec<Vacancy>>,
    pub industries: BTreeMap<OccupationKind, Industry>,
    pub prerequisites: BTreeMap<OccupationKind, Prerequisite>,
    pub job_levels: BTreeMap<OccupationKind, u8>,
    pub compensations: BTreeMap<Service, BTreeMap<OccupationKind, i64>>,
    pub business_demand: BTreeMap<BusinessKind, BusinessDemand>,

    // Business siting
    pub secondary_population_weight: f64,
    pub tertiary_population_weight: f64,
    pub same_kind_proximity_penalty: f64,
    pub distance_from_downtown_penalty: f64,
}

impl EconomyConfig {
    pub fn job_level(&self, occupation: OccupationKind) -> u8 {
        self.job_levels.get(&occupation).copied().unwrap_or(1)
    }

    pub fn industry(&self, occupation: OccupationKind) -> Industry {
        self.industries
            .get(&occupation)
            .copied()
            .unwrap_or(Industry::General)
    }

    pub fn prerequisite(&self, occupation: OccupationKind) -> Option<Prerequisite> {
        self.prerequisites.get(&occupation).copied()
    }

    pub fn vacancies(&self, kind: BusinessKind) -> &[Vacancy] {
        self.initial_job_vacancies
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn compensation(&self, service: Service, occupation: OccupationKind) -> i64 {
        self.compensations
            .get(&service)
            .and_then(|table| table.get(&occupation))
            .copied()
            .unwrap_or(0)
    }

    /// Contracting score multiplier for a practitioner's experience.
    pub fn experience_bonus(&self, years_experience: u32) -> f64 {
        f64::from(years_experience).powf(self.experience_bonus_exponent)
    }
}

fn vacancies(list: &[(OccupationKind, Shift)]) -> Vec<Vacancy> {
    list.iter()
        .map(|(occupation, shift)| Vacancy {
            occupation: *occupation,
            shift: *shift,
        })
        .collect()
}

fn default_vacancies() -> BTreeMap<BusinessKind, Vec<Vacancy>> {
    use BusinessKind as B;
    use OccupationKind::*;
    use Shift::{Day, Night};
    BTreeMap::from([
        (B::ApartmentComplex, vacancies(&[(Janitor, Day), (Janitor, Night), (Manager, Day)])),
        (
            B::Bank,
            vacancies(&[(Janitor, Night), (BankTeller, Day), (BankTeller, Day), (Manager, Day)]),
        ),
        (
            B::Bar,
            vacancies(&[(Bartender, Night), (Bartender, Night), (Manager, Night)]),
        ),
        (
            B::Barbershop,
            vacancies(&[(Cashier, Day), (HairStylist, Day), (HairStylist, Day), (Manager, Day)]),
        ),
        (B::BusDepot, vacancies(&[(BusDriver, Day), (BusDriver, Night), (Manager, Day)])),
        (
            B::Cemetery,
            vacancies(&[(Groundskeeper, Day), (Groundskeeper, Day), (Mortician, Day)]),
        ),
        (B::CityHall, vacancies(&[(Secretary, Day), (Secretary, Day)])),
        (
            B::ConstructionFirm,
            vacancies(&[
                (Secretary, Day),
                (ConstructionWorker, Day),
                (ConstructionWorker, Day),
                (ConstructionWorker, Day),
                (ConstructionWorker, Day),
                (Architect, Day),
            ]),
        ),
        (
            B::FireStation,
            vacancies(&[(Secretary, Day), (Firefighter, Day), (Firefighter, Night), (FireChief, Day)]),
        ),
        (
            B::Hospital,
            vacancies(&[
                (Secretary, Day),
                (Nurse, Day),
                (Nurse, Night),
                (Manager, Day),
                (Doctor, Day),
            ]),
        ),
        (
            B::Hotel,
            vacancies(&[(HotelMaid, Day), (HotelMaid, Day), (Concierge, Night), (Manager, Day)]),
        ),
        (B::LawFirm, vacancies(&[(Secretary, Day), (Lawyer, Day), (Lawyer, Day)])),
        (
            B::OptometryClinic,
            vacancies(&[
                (Secretary, Day),
                (Nurse, Day),
                (Nurse, Day),
                (Manager, Day),
                (Optometrist, Day),
            ]),
        ),
        (B::Park, vacancies(&[(Groundskeeper, Day), (Groundskeeper, Day), (Manager, Day)])),
        (
            B::PlasticSurgeryClinic,
            vacancies(&[
                (Secretary, Day),
                (Nurse, Day),
                (Nurse, Day),
                (Manager, Day),
                (PlasticSurgeon, Day),
            ]),
        ),
        (
            B::PoliceStation,
            vacancies(&[
                (Secretary, Day),
                (PoliceOfficer, Day),
                (PoliceOfficer, Night),
                (PoliceChief, Day),
            ]),
        ),
        (B::RealtyFirm, vacancies(&[(Secretary, Day), (Realtor, Day), (Realtor, Day)])),
        (
            B::Restaurant,
            vacancies(&[
                (Cashier, Day),
                (Cashier, Night),
                (Waiter, Day),
                (Waiter, Night),
                (Waiter, Night),
                (Manager, Day),
            ]),
        ),
        (
            B::Supermarket,
            vacancies(&[
                (Cashier, Day),
                (Cashier, Night),
                (Janitor, Night),
                (Manager, Day),
            ]),
        ),
        (
            B::TattooParlor,
            vacancies(&[(Cashier, Day), (TattooArtist, Day), (TattooArtist, Night), (Manager, Day)]),
        ),
        (B::TaxiDepot, vacancies(&[(TaxiDriver, Day), (TaxiDriver, Night), (Manager, Day)])),
        (B::University, vacancies(&[(Professor, Day), (Professor, Day)])),
    ])
}

fn default_industries() -> BTreeMap<OccupationKind, Industry> {
    use Industry as I;
    use OccupationKind::*;
    BTreeMap::from([
        (Cashier, I::General),
        (Janitor, I::General),
        (HotelMaid, I::Hospitality),
        (Waiter, I::Hospitality),
        (Secretary, I::General),
        (Groundskeeper, I::Parks),
        (Bartender, I::Hospitality),
        (BankTeller, I::Finance),
        (Concierge, I::Hospitality),
        (HairStylist, I::Cosmetic),
        (ConstructionWorker, I::Construction),
        (Firefighter, I::Fire),
        (PoliceOfficer, I::Police),
        (TaxiDriver, I::Transportation),
        (BusDriver, I::Transportation),
        (Nurse, I::Medical),
        (TattooArtist, I::Cosmetic),
        (Manager, I::General),
        (FireChief, I::Fire),
        (PoliceChief, I::Police),
        (Realtor, I::Realty),
        (Mortician, I::Medical),
        (Doctor, I::Medical),
        (Architect, I::Construction),
        (Optometrist, I::Medical),
        (PlasticSurgeon, I::Medical),
        (Lawyer, I::Law),
        (Professor, I::Education),
        (Owner, I::General),
        (Mayor, I::Politics),
    ])
}

fn default_prerequisites() -> BTreeMap<OccupationKind, Prerequisite> {
    use OccupationKind::*;
    BTreeMap::from([
        (Manager, Prerequisite::SameIndustry),
        (FireChief, Prerequisite::Industry(Industry::Fire)),
        (PoliceChief, Prerequisite::Industry(Industry::Police)),
        (Doctor, Prerequisite::CollegeGraduate),
        (Architect, Prerequisite::CollegeGraduate),
        (Optometrist, Prerequisite::CollegeGraduate),
        (PlasticSurgeon, Prerequisite::CollegeGraduate),
        (Lawyer, Prerequisite::CollegeGraduate),
        (Professor, Prerequisite::CollegeGraduate),
    ])
}

fn default_job_levels() -> BTreeMap<OccupationKind, u8> {
    use OccupationKind::*;
    BTreeMap::from([
        (Cashier, 1),
        (Janitor, 1),
        (HotelMaid, 1),
        (Waiter, 1),
        (Secretary, 1),
        (Groundskeeper, 1),
        (Bartender, 1),
        (BankTeller, 2),
        (Concierge, 2),
        (HairStylist, 2),
        (ConstructionWorker, 2),
        (Firefighter, 2),
        (PoliceOfficer, 2),
        (TaxiDriver, 2),
        (BusDriver, 2),
        (Nurse, 2),
        (TattooArtist, 2),
        (Manager, 3),
        (FireChief, 3),
        (PoliceChief, 3),
        (Realtor, 3),
        (Mortician, 3),
        (Doctor, 4),
        (Architect, 4),
        (Optometrist, 4),
        (PlasticSurgeon, 4),
        (Lawyer, 4),
        (Professor, 4),
        (Owner, 5),
        (Mayor, 5),
    ])
}

fn default_compensations() -> BTreeMap<Service, BTreeMap<OccupationKind, i64>> {
    use OccupationKind::*;
    BTreeMap::from([
        (Service::Birth, BTreeMap::from([(Owner, 500), (Doctor, 750), (Nurse, 300)])),
        (
            Service::BuildingConstruction,
            BTreeMap::from([(Owner, 5000), (Architect, 2000), (ConstructionWorker, 400)]),
        ),
        (Service::Death, BTreeMap::from([(Mortician, 1000)])),
        (Service::Divorce, BTreeMap::from([(Lawyer, 1000), (Owner, 500)])),
        (
            Service::HouseConstruction,
            BTreeMap::from([(Owner, 2500), (Architect, 1000), (ConstructionWorker, 200)]),
        ),
        (Service::HomePurchase, BTreeMap::from([(Owner, 2000), (Realtor, 600)])),
        (Service::NameChange, BTreeMap::from([(Owner, 200), (Lawyer, 200)])),
    ])
}

fn demand(min_population: usize, residents_per_business: usize, chance_per_year: f64) -> BusinessDemand {
    BusinessDemand {
        min_population,
        residents_per_business,
        chance_per_year,
    }
}

fn default_business_demand() -> BTreeMap<BusinessKind, BusinessDemand> {
    use BusinessKind as B;
    BTreeMap::from([
        (B::ApartmentComplex, demand(50, 60, 0.3)),
        (B::Bank, demand(30, 80, 0.3)),
        (B::Bar, demand(25, 50, 0.4)),
        (B::Barbershop, demand(20, 60, 0.3)),
        (B::BusDepot, demand(120, 300, 0.2)),
        (B::ConstructionFirm, demand(60, 150, 0.2)),
        (B::FireStation, demand(80, 400, 0.3)),
        (B::Hotel, demand(60, 200, 0.2)),
        (B::LawFirm, demand(40, 150, 0.3)),
        (B::OptometryClinic, demand(70, 250, 0.2)),
        (B::Park, demand(100, 300, 0.2)),
        (B::PlasticSurgeryClinic, demand(150, 500, 0.1)),
        (B::PoliceStation, demand(60, 400, 0.3)),
        (B::RealtyFirm, demand(15, 150, 0.4)),
        (B::Restaurant, demand(15, 40, 0.4)),
        (B::Supermarket, demand(10, 60, 0.5)),
        (B::TattooParlor, demand(100, 300, 0.1)),
        (B::TaxiDepot, demand(90, 300, 0.2)),
        (B::University, demand(200, 1000, 0.1)),
    ])
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            age_people_start_working: 16,
            amount_of_money_generated_people_from_outside_city_start_with: 5000,
            business_startup_cost: 8000,
            age_people_retire: 68,
            chance_someone_retires: 0.2,
            preference_to_hire_immediate_family: 3.0,
            preference_to_hire_from_within_company: 2.0,
            preference_to_hire_friend: 1.0,
            preference_to_hire_extended_family: 1.0,
            preference_to_hire_known_person: 0.5,
            dispreference_to_hire_enemy: 2.0,
            unemployment_occupation_level: 0.5,
            preference_to_contract_immediate_family: 3.0,
            preference_to_contract_friend: 2.0,
            preference_to_contract_former_contract: 2.0,
            preference_to_contract_extended_family: 1.0,
            preference_to_contract_known_person: 0.5,
            experience_bonus_exponent: 0.2,
            initial_job_vacancies: default_vacancies(),
            industries: default_industries(),
            prerequisites: default_prerequisites(),
            job_levels: default_job_levels(),
            compensations: default_compensations(),
            business_demand: default_business_demand(),
            secondary_population_weight: 1.0,
            tertiary_population_weight: 0.5,
            same_kind_proximity_penalty: 10.0,
            distance_from_downtown_penalty: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vacancy_has_a_level_and_industry() {
        let economy = EconomyConfig::default();
        for list in economy.initial_job_vacancies.values() {
            for vacancy in list {
                assert!(economy.job_levels.contains_key(&vacancy.occupation));
                assert!(economy.industries.contains_key(&vacancy.occupation));
            }
        }
    }

    #[test]
    fn experience_bonus_grows_slowly() {
        let economy = EconomyConfig::default();
        assert_eq!(economy.experience_bonus(0), 0.0);
        assert_eq!(economy.experience_bonus(1), 1.0);
        assert!(economy.experience_bonus(32) < 2.01);
    }

    #[test]
    fn compensation_defaults_to_zero() {
        let economy = EconomyConfig::default();
        assert_eq!(economy.compensation(Service::Death, OccupationKind::Mortician), 1000);
        assert_eq!(economy.compensation(Service::Death, OccupationKind::Owner), 0);
    }
}
