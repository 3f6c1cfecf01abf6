use serde::{Deserialize, Serialize};

/// One of the five-factor personality traits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extroversion,
    Agreeableness,
    Neuroticism,
}

string_enum!(Trait {
    Openness => "openness",
    Conscientiousness => "conscientiousness",
    Extroversion => "extroversion",
    Agreeableness => "agreeableness",
    Neuroticism => "neuroticism",
});

/// Five-factor personality; every trait lies in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extroversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
}

impl Personality {
    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Openness => self.openness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Extroversion => self.extroversion,
            Trait::Agreeableness => self.agreeableness,
            Trait::Neuroticism => self.neuroticism,
        }
    }

    pub fn set(&mut self, t: Trait, value: f64) {
        let slot = match t {
            Trait::Openness => &mut self.openness,
            Trait::Conscientiousness => &mut self.conscientiousness,
            Trait::Extroversion => &mut self.extroversion,
            Trait::Agreeableness => &mut self.agreeableness,
            Trait::Neuroticism => &mut self.neuroticism,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_by_trait() {
        let mut p = Personality::default();
        for (i, t) in Trait::ALL.iter().enumerate() {
            p.set(*t, i as f64 / 10.0);
        }
        assert_eq!(p.openness, 0.0);
        assert_eq!(p.neuroticism, 0.4);
        assert_eq!(p.get(Trait::Agreeableness), 0.3);
    }
}
