//! Name pools: first names, surnames, and names for places and venues.
//!
//! Built-in lists ship with the crate; any pool can be replaced by a plain
//! text file with one name per line.

use std::path::Path;

use rand::Rng;
use rand::RngCore;

use crate::config::CorporaConfig;
use crate::error::ConfigError;
use crate::model::Sex;

const MASCULINE_NAMES: &[&str] = &[
    "Albert", "Arthur", "Benjamin", "Carl", "Charles", "Clarence", "Daniel", "David", "Donald",
    "Edward", "Ernest", "Frank", "Fred", "George", "Harold", "Harry", "Henry", "Herbert", "Howard",
    "Jack", "James", "John", "Joseph", "Kenneth", "Lawrence", "Leonard", "Louis", "Paul", "Ralph",
    "Raymond", "Richard", "Robert", "Roy", "Samuel", "Thomas", "Walter", "William",
];

const FEMININE_NAMES: &[&str] = &[
    "Alice", "Anna", "Bertha", "Betty", "Clara", "Doris", "Dorothy", "Edith", "Edna", "Elizabeth",
    "Ella", "Emma", "Esther", "Ethel", "Evelyn", "Florence", "Frances", "Gladys", "Grace", "Hazel",
    "Helen", "Irene", "Josephine", "Lillian", "Louise", "Margaret", "Marie", "Martha", "Mary",
    "Mildred", "Minnie", "Pearl", "Rose", "Ruby", "Ruth", "Thelma", "Virginia",
];

const ENGLISH_SURNAMES: &[&str] = &[
    "Baker", "Bennett", "Carter", "Clark", "Cooper", "Fisher", "Hall", "Harris", "Hughes", "Lewis",
    "Marshall", "Parker", "Shaw", "Turner", "Walker", "Ward", "Wright", "Young",
];

const FRENCH_SURNAMES: &[&str] = &[
    "Bernard", "Blanc", "Dubois", "Durand", "Fontaine", "Girard", "Lambert", "Laurent", "Leroy",
    "Martin", "Mercier", "Moreau", "Petit", "Renard", "Roux", "Simon",
];

const GERMAN_SURNAMES: &[&str] = &[
    "Bauer", "Becker", "Fischer", "Hoffmann", "Keller", "Koch", "Krause", "Meyer", "Neumann",
    "Richter", "Schmidt", "Schneider", "Schulz", "Wagner", "Weber", "Zimmermann",
];

const IRISH_SURNAMES: &[&str] = &[
    "Brennan", "Byrne", "Connolly", "Doyle", "Fitzgerald", "Gallagher", "Kelly", "Kennedy",
    "McCarthy", "Murphy", "Nolan", "O'Brien", "O'Connor", "Quinn", "Ryan", "Walsh",
];

const SCANDINAVIAN_SURNAMES: &[&str] = &[
    "Andersen", "Berg", "Dahl", "Eriksson", "Hansen", "Holm", "Johansson", "Larsen", "Lindqvist",
    "Lund", "Nielsen", "Nilsson", "Olsen", "Strand", "Svensson", "Vik",
];

const RESTAURANT_NAMES: &[&str] = &[
    "The Blue Plate", "Corner Kitchen", "The Copper Pot", "Golden Spoon", "Harvest Table",
    "Lantern Grill", "Main Street Diner", "The Red Hen", "Silver Fork", "Sunrise Cafe",
];

const BAR_NAMES: &[&str] = &[
    "The Anchor", "Barrel House", "The Crooked Mile", "The Drowsy Owl", "The Iron Horse",
    "Last Call", "The Lucky Penny", "Night Heron", "The Rusty Nail", "The Thirsty Fox",
];

const PLACE_NAMES: &[&str] = &[
    "Ashbury", "Bellmont", "Cedar Falls", "Clearwater", "Dunmore", "Fairview", "Glenrock",
    "Harmony", "Lakewood", "Millbrook", "Oakdale", "Pine Bluff", "Riverton", "Stillwater",
    "Willow Creek",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn pick<'a>(pool: &'a [String], rng: &mut dyn RngCore) -> &'a str {
    &pool[rng.random_range(0..pool.len())]
}

#[derive(Debug, Clone)]
pub struct Corpora {
    pub masculine_names: Vec<String>,
    pub feminine_names: Vec<String>,
    /// Surname pools, one per origin.
    pub surnames: Vec<Vec<String>>,
    pub restaurant_names: Vec<String>,
    pub bar_names: Vec<String>,
    pub place_names: Vec<String>,
}

impl Corpora {
    pub fn builtin() -> Self {
        Self {
            masculine_names: owned(MASCULINE_NAMES),
            feminine_names: owned(FEMININE_NAMES),
            surnames: vec![
                owned(ENGLISH_SURNAMES),
                owned(FRENCH_SURNAMES),
                owned(GERMAN_SURNAMES),
                owned(IRISH_SURNAMES),
                owned(SCANDINAVIAN_SURNAMES),
            ],
            restaurant_names: owned(RESTAURANT_NAMES),
            bar_names: owned(BAR_NAMES),
            place_names: owned(PLACE_NAMES),
        }
    }

    /// Built-in pools with any configured files swapped in.
    pub fn load(config: &CorporaConfig) -> Result<Self, ConfigError> {
        let mut corpora = Self::builtin();
        if let Some(path) = &config.masculine_names {
            corpora.masculine_names = read_corpus(path)?;
        }
        if let Some(path) = &config.feminine_names {
            corpora.feminine_names = read_corpus(path)?;
        }
        if !config.surnames.is_empty() {
            corpora.surnames = config
                .surnames
                .iter()
                .map(|p| read_corpus(p))
                .collect::<Result<_, _>>()?;
        }
        if let Some(path) = &config.restaurant_names {
            corpora.restaurant_names = read_corpus(path)?;
        }
        if let Some(path) = &config.bar_names {
            corpora.bar_names = read_corpus(path)?;
        }
        if let Some(path) = &config.place_names {
            corpora.place_names = read_corpus(path)?;
        }
        Ok(corpora)
    }

    pub fn first_name(&self, sex: Sex, rng: &mut dyn RngCore) -> String {
        match sex {
            Sex::Male => pick(&self.masculine_names, rng).to_string(),
            Sex::Female => pick(&self.feminine_names, rng).to_string(),
        }
    }

    /// A surname of a random origin.
    pub fn surname(&self, rng: &mut dyn RngCore) -> String {
        let origin = &self.surnames[rng.random_range(0..self.surnames.len())];
        pick(origin, rng).to_string()
    }

    pub fn restaurant_name(&self, rng: &mut dyn RngCore) -> String {
        pick(&self.restaurant_names, rng).to_string()
    }

    pub fn bar_name(&self, rng: &mut dyn RngCore) -> String {
        pick(&self.bar_names, rng).to_string()
    }

    pub fn place_name(&self, rng: &mut dyn RngCore) -> String {
        pick(&self.place_names, rng).to_string()
    }
}

/// One name per line; blank lines are skipped.
fn read_corpus(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let names: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(ConfigError::EmptyCorpus(path.display().to_string()));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::io::Write;

    #[test]
    fn builtin_pools_are_nonempty() {
        let corpora = Corpora::builtin();
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(!corpora.first_name(Sex::Female, &mut rng).is_empty());
        assert!(!corpora.surname(&mut rng).is_empty());
        assert_eq!(corpora.surnames.len(), 5);
    }

    #[test]
    fn loads_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "The Only Bar\n\n").unwrap();
        let config = CorporaConfig {
            bar_names: Some(path),
            ..CorporaConfig::default()
        };
        let corpora = Corpora::load(&config).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(corpora.bar_name(&mut rng), "The Only Bar");
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "\n").unwrap();
        let config = CorporaConfig {
            place_names: Some(path),
            ..CorporaConfig::default()
        };
        assert!(matches!(Corpora::load(&config), Err(ConfigError::EmptyCorpus(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let config = CorporaConfig {
            place_names: Some("/nonexistent/places.txt".into()),
            ..CorporaConfig::default()
        };
        assert!(matches!(Corpora::load(&config), Err(ConfigError::Io { .. })));
    }
}
