//! Simulation tunables.
//!
//! Every section is defaulted, so a TOML file only needs to name the values
//! it overrides. Validation runs on load and again before generation.

mod beliefs;
mod economy;
mod face;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use beliefs::{BeliefsConfig, DeteriorationWeights};
pub use economy::{BusinessDemand, EconomyConfig, Service, Vacancy};
pub use face::{FaceConfig, FeatureDistribution, TakesAfter};

use crate::error::ConfigError;
use crate::model::{BusinessKind, OccupationKind, Phase, Trait};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world_gen: WorldGenConfig,
    pub time: TimeConfig,
    pub founding: FoundingConfig,
    pub demographics: DemographicsConfig,
    pub personality: PersonalityConfig,
    pub memory: MemoryConfig,
    pub face: FaceConfig,
    pub names: NamesConfig,
    pub economy: EconomyConfig,
    pub housing: HousingConfig,
    pub relationships: RelationshipsConfig,
    pub beliefs: BeliefsConfig,
    pub routine: RoutineConfig,
    pub corpora: CorporaConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Reject combinations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let economy = &self.economy;
        for occupation in OccupationKind::ALL {
            if !economy.job_levels.contains_key(occupation) {
                return Err(ConfigError::MissingJobLevel(*occupation));
            }
            if !economy.industries.contains_key(occupation) {
                return Err(ConfigError::MissingIndustry(*occupation));
            }
        }
        for kind in BusinessKind::ALL {
            let Some(vacancies) = economy.initial_job_vacancies.get(kind) else {
                return Err(ConfigError::BusinessWithoutVacancies(*kind));
            };
            for vacancy in vacancies {
                if !economy.job_levels.contains_key(&vacancy.occupation) {
                    return Err(ConfigError::VacancyWithoutJobLevel {
                        business: *kind,
                        occupation: vacancy.occupation,
                    });
                }
            }
        }
        for (kind, demand) in &economy.business_demand {
            if demand.residents_per_business == 0 {
                return Err(ConfigError::invalid(
                    format!("economy.business_demand.{kind}.residents_per_business"),
                    "must be positive",
                ));
            }
            probability(
                &format!("economy.business_demand.{kind}.chance_per_year"),
                demand.chance_per_year,
            )?;
        }

        let size = self.world_gen.size;
        if size < 4 || !size.is_power_of_two() {
            return Err(ConfigError::invalid(
                "world_gen.size",
                format!("must be a power of two no smaller than 4, got {size}"),
            ));
        }
        if self.world_gen.loci == 0 || self.world_gen.samples == 0 {
            return Err(ConfigError::invalid(
                "world_gen",
                "loci and samples must be positive",
            ));
        }
        let per_block = self.world_gen.n_buildings_per_block;
        if !(2..=24).contains(&per_block) {
            return Err(ConfigError::invalid(
                "world_gen.n_buildings_per_block",
                format!("must lie in 2..=24, got {per_block}"),
            ));
        }
        let (lo, hi) = (
            self.world_gen.smallest_possible_house_number,
            self.world_gen.largest_possible_house_number,
        );
        if lo == 0 || hi >= 100 || hi < lo + 2 * per_block {
            return Err(ConfigError::invalid(
                "world_gen.largest_possible_house_number",
                format!("house numbers {lo}..={hi} cannot fit {per_block} lots per side"),
            ));
        }
        if self.time.year_worldgen_ends < self.time.year_city_gets_founded {
            return Err(ConfigError::invalid(
                "time.year_worldgen_ends",
                "precedes the founding year",
            ));
        }
        if self.memory.floor > self.memory.cap || self.personality.floor > self.personality.cap {
            return Err(ConfigError::invalid("memory/personality", "floor exceeds cap"));
        }
        if self.relationships.charge_threshold_enmity >= self.relationships.charge_threshold_friendship {
            return Err(ConfigError::invalid(
                "relationships.charge_threshold_enmity",
                "must be below the friendship threshold",
            ));
        }
        if self.beliefs.teller_strength_scale <= 0.0 {
            return Err(ConfigError::invalid(
                "beliefs.teller_strength_scale",
                "must be positive",
            ));
        }

        let probabilities = [
            ("demographics.male_infertility_rate", self.demographics.male_infertility_rate),
            ("demographics.female_infertility_rate", self.demographics.female_infertility_rate),
            ("demographics.chance_protection_does_not_work", self.demographics.chance_protection_does_not_work),
            ("demographics.chance_person_falls_in_love_after_sex", self.demographics.chance_person_falls_in_love_after_sex),
            ("demographics.chance_love_interests_marry", self.demographics.chance_love_interests_marry),
            ("demographics.chance_unhappy_spouse_divorces", self.demographics.chance_unhappy_spouse_divorces),
            ("demographics.chance_a_male_divorcee_is_one_who_moves_out", self.demographics.chance_a_male_divorcee_is_one_who_moves_out),
            ("demographics.chance_adult_moves_out_per_year", self.demographics.chance_adult_moves_out_per_year),
            ("memory.heritability", self.memory.heritability),
            ("names.chance_son_inherits_fathers_exact_name", self.names.chance_son_inherits_fathers_exact_name),
            ("names.chance_child_inherits_first_name", self.names.chance_child_inherits_first_name),
            ("names.chance_child_inherits_middle_name", self.names.chance_child_inherits_middle_name),
            ("names.chance_one_newlywed_takes_others_name", self.names.chance_one_newlywed_takes_others_name),
            ("economy.chance_someone_retires", economy.chance_someone_retires),
            ("beliefs.chance_someone_observes_nearby_entity", self.beliefs.chance_someone_observes_nearby_entity),
            ("beliefs.chance_someone_eavesdrops_statement", self.beliefs.chance_someone_eavesdrops_statement),
            ("beliefs.chance_of_confabulation_on_timestep", self.beliefs.chance_of_confabulation_on_timestep),
            ("face.chance_inherits_exact_variant", self.face.chance_inherits_exact_variant),
            ("routine.chance_someone_calls_in_sick", self.routine.chance_someone_calls_in_sick),
            ("routine.chance_someone_takes_day_off", self.routine.chance_someone_takes_day_off),
            ("relationships.chance_someone_socializes", self.relationships.chance_someone_socializes),
        ];
        for (field, value) in probabilities {
            probability(field, value)?;
        }
        let incidence = self.demographics.homosexuality_incidence
            + self.demographics.bisexuality_incidence
            + self.demographics.asexuality_incidence;
        probability("demographics sexuality incidences (sum)", incidence)?;
        for (feature, distribution) in &self.face.features {
            probability(&format!("face.features.{feature}.heritability"), distribution.heritability)?;
        }
        Ok(())
    }
}

fn probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAProbability {
            field: field.to_string(),
            value,
        })
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Layout parameters for platting the town.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Side of the square map in grid units. A power of two.
    pub size: u32,
    pub loci: u32,
    pub samples: u32,
    /// Standard deviation of loci and samples, as a fraction of `size`.
    pub spread: f64,
    /// A quadtree cell splits once it holds more points than this.
    pub max_points_per_cell: usize,
    pub n_buildings_per_block: u32,
    pub smallest_possible_house_number: u32,
    pub largest_possible_house_number: u32,
    /// Chance a street is named after a person rather than its number.
    pub chance_street_gets_surname: f64,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            size: 16,
            loci: 3,
            samples: 32,
            spread: 1.0 / 6.0,
            max_points_per_cell: 10,
            n_buildings_per_block: 4,
            smallest_possible_house_number: 1,
            largest_possible_house_number: 99,
            chance_street_gets_surname: 0.13,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub year_city_gets_founded: u32,
    /// Low-fidelity simulation runs until the start of this year.
    pub year_worldgen_ends: u32,
    /// Days of high-fidelity simulation run before gameplay.
    pub high_fidelity_days: u32,
    /// Sampled social occasions per low-fidelity year.
    pub social_occasions_per_year: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            year_city_gets_founded: 1909,
            year_worldgen_ends: 1979,
            high_fidelity_days: 3,
            social_occasions_per_year: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundingConfig {
    pub founder_age: u32,
    pub founder_spouse_age: u32,
    pub founder_money: i64,
    /// Public institutions the city establishes at founding.
    pub public_institutions: Vec<BusinessKind>,
    /// Businesses immigrants found alongside the town.
    pub immigrant_businesses: Vec<BusinessKind>,
}

impl Default for FoundingConfig {
    fn default() -> Self {
        Self {
            founder_age: 30,
            founder_spouse_age: 30,
            founder_money: 100_000,
            public_institutions: vec![
                BusinessKind::CityHall,
                BusinessKind::Cemetery,
                BusinessKind::Park,
            ],
            immigrant_businesses: vec![BusinessKind::Hospital],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicsConfig {
    pub male_infertility_rate: f64,
    pub female_infertility_rate: f64,
    pub homosexuality_incidence: f64,
    pub bisexuality_incidence: f64,
    pub asexuality_incidence: f64,

    // Sex and pregnancy
    pub chance_person_falls_in_love_after_sex: f64,
    pub chance_protection_does_not_work: f64,
    pub trying_to_conceive_base: f64,

    // Marriage and divorce
    pub spark_threshold_for_marriage: f64,
    pub chance_love_interests_marry: f64,
    pub chance_a_newlywed_keeps_former_love_interest: f64,
    /// Divorce is considered once a spouse's love interest outsparks the
    /// spouse by this factor.
    pub divorce_spark_ratio: f64,
    pub chance_unhappy_spouse_divorces: f64,
    pub chance_a_divorcee_falls_out_of_love: f64,
    pub chance_a_male_divorcee_is_one_who_moves_out: f64,

    // Death
    pub death_base_chance: f64,
    pub death_age_scale: f64,
    pub death_age_exponent: f64,
    pub death_chance_cap: f64,

    // Life course
    pub age_people_go_to_college: u32,
    pub age_people_graduate: u32,
    pub college_base_chance: f64,
    pub college_conscientiousness_bonus: f64,
    pub chance_adult_moves_out_per_year: f64,

    // People ex nihilo
    pub ex_nihilo_age_base: u32,
    pub ex_nihilo_years_per_level_min: u32,
    pub ex_nihilo_years_per_level_max: u32,
    pub ex_nihilo_family_chance_multiplier: f64,
    pub ex_nihilo_age_at_marriage_mean: f64,
    pub ex_nihilo_age_at_marriage_sd: f64,
    pub ex_nihilo_age_at_marriage_floor: f64,
}

impl DemographicsConfig {
    /// Yearly chance a married couple tries for a child.
    pub fn chance_trying_to_conceive(&self, n_kids: usize) -> f64 {
        self.trying_to_conceive_base / (n_kids as f64 + 1.0)
    }

    /// Decreases with age; near zero past the mid fifties.
    pub fn chance_of_conception(&self, female_age: u32) -> f64 {
        let age = f64::from(female_age);
        ((100.0 - age.powf(1.98) / 20.0) / 100.0).clamp(0.0, 1.0)
    }

    pub fn chance_spouse_changes_name_back(&self, years_married: u32) -> f64 {
        (0.9 / ((f64::from(years_married) + 0.1) / 4.0)).min(0.9)
    }

    pub fn chance_of_death(&self, age: u32) -> f64 {
        (self.death_base_chance + (f64::from(age) / self.death_age_scale).powf(self.death_age_exponent))
            .min(self.death_chance_cap)
    }

    pub fn chance_ex_nihilo_starts_with_family(&self, age: u32) -> f64 {
        (f64::from(age) / 100.0 * self.ex_nihilo_family_chance_multiplier).min(1.0)
    }

    pub fn chance_goes_to_college(&self, conscientiousness: f64) -> f64 {
        (self.college_base_chance + conscientiousness * self.college_conscientiousness_bonus)
            .clamp(0.0, 1.0)
    }
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            male_infertility_rate: 0.07,
            female_infertility_rate: 0.11,
            homosexuality_incidence: 0.045,
            bisexuality_incidence: 0.01,
            asexuality_incidence: 0.002,
            chance_person_falls_in_love_after_sex: 0.8,
            chance_protection_does_not_work: 0.01,
            trying_to_conceive_base: 0.4,
            spark_threshold_for_marriage: 2.0,
            chance_love_interests_marry: 0.5,
            chance_a_newlywed_keeps_former_love_interest: 0.01,
            divorce_spark_ratio: 2.0,
            chance_unhappy_spouse_divorces: 0.1,
            chance_a_divorcee_falls_out_of_love: 0.9,
            chance_a_male_divorcee_is_one_who_moves_out: 0.7,
            death_base_chance: 0.0005,
            death_age_scale: 95.0,
            death_age_exponent: 8.0,
            death_chance_cap: 0.9,
            age_people_go_to_college: 18,
            age_people_graduate: 22,
            college_base_chance: 0.3,
            college_conscientiousness_bonus: 0.4,
            chance_adult_moves_out_per_year: 0.15,
            ex_nihilo_age_base: 18,
            ex_nihilo_years_per_level_min: 2,
            ex_nihilo_years_per_level_max: 5,
            ex_nihilo_family_chance_multiplier: 1.4,
            ex_nihilo_age_at_marriage_mean: 23.0,
            ex_nihilo_age_at_marriage_sd: 2.7,
            ex_nihilo_age_at_marriage_floor: 17.0,
        }
    }
}

/// Mean, spread and heritability of one trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitDistribution {
    pub mean: f64,
    pub sd: f64,
    pub heritability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub floor: f64,
    pub cap: f64,
    pub inheritance_sd: f64,
    pub traits: BTreeMap<Trait, TraitDistribution>,
}

impl PersonalityConfig {
    pub fn distribution(&self, t: Trait) -> TraitDistribution {
        self.traits.get(&t).copied().unwrap_or(TraitDistribution {
            mean: 0.0,
            sd: 0.35,
            heritability: 0.5,
        })
    }
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        let t = |mean, heritability| TraitDistribution {
            mean,
            sd: 0.35,
            heritability,
        };
        Self {
            floor: -1.0,
            cap: 1.0,
            inheritance_sd: 0.05,
            traits: BTreeMap::from([
                (Trait::Openness, t(0.375, 0.57)),
                (Trait::Conscientiousness, t(0.25, 0.54)),
                (Trait::Extroversion, t(0.15, 0.49)),
                (Trait::Agreeableness, t(0.35, 0.48)),
                (Trait::Neuroticism, t(0.0, 0.42)),
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub mean: f64,
    pub sd: f64,
    pub cap: f64,
    pub floor: f64,
    /// Worst possible memory of a newborn.
    pub floor_at_birth: f64,
    /// Subtracted for men.
    pub sex_diff: f64,
    pub heritability: f64,
    pub heritability_sd: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            mean: 0.7,
            sd: 0.1,
            cap: 0.9,
            floor: 0.1,
            floor_at_birth: 0.55,
            sex_diff: 0.03,
            heritability: 0.6,
            heritability_sd: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub chance_son_inherits_fathers_exact_name: f64,
    pub chance_child_inherits_first_name: f64,
    pub chance_child_inherits_middle_name: f64,
    pub frequency_of_naming_after_father: u32,
    pub frequency_of_naming_after_grandfather: u32,
    pub frequency_of_naming_after_greatgrandfather: u32,
    pub frequency_of_naming_after_mother: u32,
    pub frequency_of_naming_after_grandmother: u32,
    pub frequency_of_naming_after_greatgrandmother: u32,
    pub frequency_of_naming_after_uncle_or_aunt: u32,
    pub chance_one_newlywed_takes_others_name: f64,
    /// Chance the one taking the other's name is the woman, in a
    /// mixed-sex marriage.
    pub chance_woman_takes_mans_name: f64,
    pub chance_newlyweds_decide_children_get_hyphenated_surname: f64,
    pub chance_stepchildren_take_stepparent_name: f64,
    pub age_after_which_stepchildren_will_not_take_stepparent_name: u32,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            chance_son_inherits_fathers_exact_name: 0.03,
            chance_child_inherits_first_name: 0.1,
            chance_child_inherits_middle_name: 0.25,
            frequency_of_naming_after_father: 12,
            frequency_of_naming_after_grandfather: 5,
            frequency_of_naming_after_greatgrandfather: 2,
            frequency_of_naming_after_mother: 0,
            frequency_of_naming_after_grandmother: 5,
            frequency_of_naming_after_greatgrandmother: 2,
            frequency_of_naming_after_uncle_or_aunt: 1,
            chance_one_newlywed_takes_others_name: 0.9,
            chance_woman_takes_mans_name: 0.95,
            chance_newlyweds_decide_children_get_hyphenated_surname: 0.02,
            chance_stepchildren_take_stepparent_name: 0.3,
            age_after_which_stepchildren_will_not_take_stepparent_name: 6,
        }
    }
}

/// Relatives by how strongly people want to live near them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Kin {
    Child,
    Parent,
    Grandchild,
    Sibling,
    Grandparent,
    Greatgrandparent,
    NieceOrNephew,
    AuntOrUncle,
    Cousin,
}

string_enum!(Kin {
    Child => "child",
    Parent => "parent",
    Grandchild => "grandchild",
    Sibling => "sibling",
    Grandparent => "grandparent",
    Greatgrandparent => "greatgrandparent",
    NieceOrNephew => "niece_or_nephew",
    AuntOrUncle => "aunt_or_uncle",
    Cousin => "cousin",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingConfig {
    /// Relative desire to build rather than buy.
    pub penalty_for_having_to_build_a_home_vs_buying_one: f64,
    pub desire_to_live_near_family_base: f64,
    pub desire_to_live_near_family_floor: f64,
    pub desire_to_live_near_family_cap: f64,
    pub pull_to_live_near_a_friend: f64,
    pub pull_to_live_near_family: BTreeMap<Kin, f64>,
    pub pull_to_live_near_workplace: f64,
    pub units_per_apartment_complex: u32,
}

impl HousingConfig {
    /// Personality-dependent desire to live near relatives.
    pub fn desire_to_live_near_family(&self, conscientiousness: f64, openness: f64) -> f64 {
        (self.desire_to_live_near_family_base + conscientiousness - openness)
            .clamp(self.desire_to_live_near_family_floor, self.desire_to_live_near_family_cap)
    }

    pub fn pull(&self, kin: Kin) -> f64 {
        self.pull_to_live_near_family.get(&kin).copied().unwrap_or(0.0)
    }
}

impl Default for HousingConfig {
    fn default() -> Self {
        Self {
            penalty_for_having_to_build_a_home_vs_buying_one: 0.5,
            desire_to_live_near_family_base: 0.3,
            desire_to_live_near_family_floor: -2.0,
            desire_to_live_near_family_cap: 2.0,
            pull_to_live_near_a_friend: 1.5,
            pull_to_live_near_family: BTreeMap::from([
                (Kin::Child, 7.0),
                (Kin::Parent, 5.0),
                (Kin::Grandchild, 3.0),
                (Kin::Sibling, 2.0),
                (Kin::Grandparent, 2.0),
                (Kin::Greatgrandparent, 2.0),
                (Kin::NieceOrNephew, 1.0),
                (Kin::AuntOrUncle, 1.0),
                (Kin::Cousin, 1.0),
            ]),
            pull_to_live_near_workplace: 5.0,
            units_per_apartment_complex: 6,
        }
    }
}

/// Per-sex weights of the five traits in romantic attraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparkMultipliers {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extroversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
}

impl SparkMultipliers {
    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Openness => self.openness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Extroversion => self.extroversion,
            Trait::Agreeableness => self.agreeableness,
            Trait::Neuroticism => self.neuroticism,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipsConfig {
    pub owner_extroversion_boost_to_charge_multiplier: f64,
    pub subject_agreeableness_boost_to_charge_multiplier: f64,
    pub charge_intensity_reduction_due_to_sex_difference: f64,
    pub spark_multipliers_male: SparkMultipliers,
    pub spark_multipliers_female: SparkMultipliers,
    pub charge_threshold_friendship: f64,
    pub charge_threshold_enmity: f64,
    pub spark_decay_rate: f64,
    /// Charge at which trust reaches about 88%.
    pub trust_charge_scale: f64,
    pub age_gap_floor: f64,
    pub age_gap_scale: f64,
    pub job_level_gap_floor: f64,
    pub job_level_gap_scale: f64,
    /// Whether friendships and enmities fall back to acquaintance when
    /// charge recrosses their threshold.
    pub allow_reversion: bool,
    /// High-fidelity chance co-located people interact on a half-day.
    pub chance_someone_socializes: f64,
    pub salience: SalienceWeights,
}

/// How salient another person is, by their relation to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalienceWeights {
    pub spouse: f64,
    pub immediate_family: f64,
    pub extended_family: f64,
    pub best_friend: f64,
    pub worst_enemy: f64,
    pub love_interest: f64,
    pub friend: f64,
    pub enemy: f64,
    pub coworker: f64,
    pub acquaintance: f64,
}

impl RelationshipsConfig {
    pub fn spark_multipliers(&self, sex: crate::model::Sex) -> &SparkMultipliers {
        match sex {
            crate::model::Sex::Male => &self.spark_multipliers_male,
            crate::model::Sex::Female => &self.spark_multipliers_female,
        }
    }

    pub fn trust(&self, charge: f64) -> f64 {
        0.5 * (1.0 + (charge / self.trust_charge_scale).tanh())
    }

    pub fn age_gap_modifier(&self, age1: u32, age2: u32) -> f64 {
        let gap = (f64::from(age1).sqrt() - f64::from(age2).sqrt()).abs();
        (1.0 - gap / self.age_gap_scale).max(self.age_gap_floor)
    }

    pub fn job_level_gap_modifier(&self, level1: u8, level2: u8) -> f64 {
        let gap = f64::from(level1.abs_diff(level2));
        (1.0 - gap / self.job_level_gap_scale).max(self.job_level_gap_floor)
    }
}

impl Default for RelationshipsConfig {
    fn default() -> Self {
        Self {
            owner_extroversion_boost_to_charge_multiplier: 0.25,
            subject_agreeableness_boost_to_charge_multiplier: 0.25,
            charge_intensity_reduction_due_to_sex_difference: 0.5,
            spark_multipliers_male: SparkMultipliers {
                openness: 0.5,
                conscientiousness: 0.25,
                extroversion: 0.5,
                agreeableness: 0.5,
                neuroticism: -0.25,
            },
            spark_multipliers_female: SparkMultipliers {
                openness: 0.5,
                conscientiousness: 0.5,
                extroversion: 0.25,
                agreeableness: 0.5,
                neuroticism: -0.25,
            },
            charge_threshold_friendship: 15.0,
            charge_threshold_enmity: -15.0,
            spark_decay_rate: 0.8,
            trust_charge_scale: 20.0,
            age_gap_floor: 0.05,
            age_gap_scale: 1.5,
            job_level_gap_floor: 0.05,
            job_level_gap_scale: 4.0,
            allow_reversion: false,
            chance_someone_socializes: 0.3,
            salience: SalienceWeights {
                spouse: 5.0,
                immediate_family: 3.0,
                extended_family: 1.0,
                best_friend: 4.0,
                worst_enemy: 3.0,
                love_interest: 4.0,
                friend: 2.0,
                enemy: 1.5,
                coworker: 1.0,
                acquaintance: 0.5,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineConfig {
    pub chance_someone_calls_in_sick: f64,
    pub chance_someone_takes_day_off: f64,
    /// Chance someone not working leaves home, by phase.
    pub chance_someone_leaves_home_day: f64,
    pub chance_someone_leaves_home_night: f64,
    pub chance_child_accompanies_adult: f64,
    /// Relative weights of the reasons to leave home.
    pub errand_weight: f64,
    pub visit_weight: f64,
    pub errand_business_types_day: BTreeMap<BusinessKind, f64>,
    pub errand_business_types_night: BTreeMap<BusinessKind, f64>,
    pub visit_neighbor_weight: f64,
    pub visit_relative_weight: f64,
    pub visit_friend_weight: f64,
}

impl RoutineConfig {
    /// Kinds of business people patronize regularly.
    pub const PATRONIZED: [BusinessKind; 10] = [
        BusinessKind::Bank,
        BusinessKind::Barbershop,
        BusinessKind::BusDepot,
        BusinessKind::Hotel,
        BusinessKind::OptometryClinic,
        BusinessKind::Park,
        BusinessKind::Restaurant,
        BusinessKind::Supermarket,
        BusinessKind::TaxiDepot,
        BusinessKind::Bar,
    ];

    pub fn chance_leaves_home(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Day => self.chance_someone_leaves_home_day,
            Phase::Night => self.chance_someone_leaves_home_night,
        }
    }

    pub fn errand_types(&self, phase: Phase) -> &BTreeMap<BusinessKind, f64> {
        match phase {
            Phase::Day => &self.errand_business_types_day,
            Phase::Night => &self.errand_business_types_night,
        }
    }
}

impl Default for RoutineConfig {
    fn default() -> Self {
        use BusinessKind as B;
        Self {
            chance_someone_calls_in_sick: 0.03,
            chance_someone_takes_day_off: 0.05,
            chance_someone_leaves_home_day: 0.5,
            chance_someone_leaves_home_night: 0.3,
            chance_child_accompanies_adult: 0.5,
            errand_weight: 0.6,
            visit_weight: 0.4,
            errand_business_types_day: BTreeMap::from([
                (B::Bank, 0.15),
                (B::Barbershop, 0.1),
                (B::BusDepot, 0.05),
                (B::OptometryClinic, 0.05),
                (B::Park, 0.2),
                (B::Restaurant, 0.15),
                (B::Supermarket, 0.25),
                (B::TaxiDepot, 0.05),
            ]),
            errand_business_types_night: BTreeMap::from([
                (B::Bar, 0.4),
                (B::Hotel, 0.1),
                (B::Restaurant, 0.35),
                (B::Supermarket, 0.1),
                (B::TaxiDepot, 0.05),
            ]),
            visit_neighbor_weight: 1.0,
            visit_relative_weight: 3.0,
            visit_friend_weight: 2.0,
        }
    }
}

/// Optional corpus files; any left unset uses the built-in list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorporaConfig {
    pub masculine_names: Option<PathBuf>,
    pub feminine_names: Option<PathBuf>,
    /// One file per surname origin.
    pub surnames: Vec<PathBuf>,
    pub restaurant_names: Option<PathBuf>,
    pub bar_names: Option<PathBuf>,
    pub place_names: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().expect("default config is valid");
    }

    #[test]
    fn partial_toml_overrides_only_named_values() {
        let config = Config::from_toml(
            r#"
            [world_gen]
            size = 32

            [relationships]
            allow_reversion = true
            "#,
        )
        .expect("valid config");
        assert_eq!(config.world_gen.size, 32);
        assert_eq!(config.world_gen.loci, 3);
        assert!(config.relationships.allow_reversion);
        assert_eq!(config.relationships.charge_threshold_friendship, 15.0);
    }

    #[test]
    fn rejects_non_power_of_two_size() {
        let err = Config::from_toml("[world_gen]\nsize = 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err}");
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let err = Config::from_toml("[demographics]\nmale_infertility_rate = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::NotAProbability { .. }), "{err}");
    }

    #[test]
    fn rejects_vacancy_without_job_level() {
        let mut config = Config::default();
        config.economy.job_levels.remove(&OccupationKind::Janitor);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingJobLevel(OccupationKind::Janitor))
        ));
    }

    #[test]
    fn rejects_business_without_vacancies() {
        let mut config = Config::default();
        config.economy.initial_job_vacancies.remove(&BusinessKind::Bank);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BusinessWithoutVacancies(BusinessKind::Bank))
        ));
    }

    #[test]
    fn rejects_unknown_occupation_in_toml() {
        let err = Config::from_toml(
            "[economy.job_levels]\nastronaut = 3\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn formulas() {
        let config = Config::default();
        let d = &config.demographics;
        assert!(d.chance_of_conception(25) > d.chance_of_conception(45));
        assert_eq!(d.chance_of_conception(60), 0.0);
        assert!(d.chance_of_death(90) > d.chance_of_death(30));
        assert!(d.chance_trying_to_conceive(0) > d.chance_trying_to_conceive(3));
        let r = &config.relationships;
        assert_eq!(r.trust(0.0), 0.5);
        assert!(r.trust(100.0) > 0.99);
        assert_eq!(r.age_gap_modifier(30, 30), 1.0);
        assert_eq!(r.job_level_gap_modifier(1, 5), 0.05);
    }
}
