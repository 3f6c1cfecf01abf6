use serde::{Deserialize, Serialize};

use crate::id::{CompanyId, EventId, OccupationId, PersonId};
use crate::model::timestamp::SimTimestamp;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OccupationKind {
    Cashier,
    Janitor,
    HotelMaid,
    Waiter,
    Secretary,
    Groundskeeper,
    Bartender,
    BankTeller,
    Concierge,
    HairStylist,
    ConstructionWorker,
    Firefighter,
    PoliceOfficer,
    TaxiDriver,
    BusDriver,
    Nurse,
    TattooArtist,
    Manager,
    FireChief,
    PoliceChief,
    Realtor,
    Mortician,
    Doctor,
    Architect,
    Optometrist,
    PlasticSurgeon,
    Lawyer,
    Professor,
    Owner,
    Mayor,
}

string_enum!(OccupationKind {
    Cashier => "cashier",
    Janitor => "janitor",
    HotelMaid => "hotel_maid",
    Waiter => "waiter",
    Secretary => "secretary",
    Groundskeeper => "groundskeeper",
    Bartender => "bartender",
    BankTeller => "bank_teller",
    Concierge => "concierge",
    HairStylist => "hair_stylist",
    ConstructionWorker => "construction_worker",
    Firefighter => "firefighter",
    PoliceOfficer => "police_officer",
    TaxiDriver => "taxi_driver",
    BusDriver => "bus_driver",
    Nurse => "nurse",
    TattooArtist => "tattoo_artist",
    Manager => "manager",
    FireChief => "fire_chief",
    PoliceChief => "police_chief",
    Realtor => "realtor",
    Mortician => "mortician",
    Doctor => "doctor",
    Architect => "architect",
    Optometrist => "optometrist",
    PlasticSurgeon => "plastic_surgeon",
    Lawyer => "lawyer",
    Professor => "professor",
    Owner => "owner",
    Mayor => "mayor",
});

impl OccupationKind {
    /// Human-readable job title.
    pub fn title(self) -> String {
        title_case(self.as_str())
    }
}

/// "plastic_surgeon" -> "Plastic Surgeon".
pub(crate) fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Industry {
    General,
    Hospitality,
    Parks,
    Finance,
    Cosmetic,
    Construction,
    Fire,
    Police,
    Transportation,
    Medical,
    Realty,
    Law,
    Politics,
    Education,
}

string_enum!(Industry {
    General => "general",
    Hospitality => "hospitality",
    Parks => "parks",
    Finance => "finance",
    Cosmetic => "cosmetic",
    Construction => "construction",
    Fire => "fire",
    Police => "police",
    Transportation => "transportation",
    Medical => "medical",
    Realty => "realty",
    Law => "law",
    Politics => "politics",
    Education => "education",
});

/// What a candidate must bring to qualify for an occupation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Prerequisite {
    /// A college degree.
    CollegeGraduate,
    /// Prior experience in the hiring company's own industry.
    SameIndustry,
    /// Prior experience in a specific industry.
    Industry(Industry),
}

impl From<Prerequisite> for String {
    fn from(p: Prerequisite) -> Self {
        match p {
            Prerequisite::CollegeGraduate => "college_graduate".to_string(),
            Prerequisite::SameIndustry => "same_industry".to_string(),
            Prerequisite::Industry(i) => i.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for Prerequisite {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "college_graduate" => Ok(Prerequisite::CollegeGraduate),
            "same_industry" => Ok(Prerequisite::SameIndustry),
            other => other
                .parse::<Industry>()
                .map(Prerequisite::Industry)
                .map_err(|_| format!("unknown Prerequisite: {other}")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Shift {
    Day,
    Night,
}

string_enum!(Shift {
    Day => "day",
    Night => "night",
});

/// A position held by a person at a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupation {
    pub id: OccupationId,
    pub kind: OccupationKind,
    pub person: PersonId,
    pub company: CompanyId,
    pub shift: Shift,
    pub level: u8,
    pub industry: Industry,
    pub start: SimTimestamp,
    pub end: Option<SimTimestamp>,
    pub hiring: Option<EventId>,
    pub terminus: Option<EventId>,
}

impl Occupation {
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    pub fn years_experience(&self, now: SimTimestamp) -> u32 {
        self.end.unwrap_or(now).years_since(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        assert_eq!(OccupationKind::PlasticSurgeon.title(), "Plastic Surgeon");
        assert_eq!(OccupationKind::Mayor.title(), "Mayor");
    }

    #[test]
    fn prerequisite_strings() {
        assert_eq!(
            Prerequisite::try_from("fire".to_string()),
            Ok(Prerequisite::Industry(Industry::Fire))
        );
        assert_eq!(String::from(Prerequisite::SameIndustry), "same_industry");
        assert!(Prerequisite::try_from("juggling".to_string()).is_err());
    }
}
