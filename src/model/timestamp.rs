use std::fmt;

use serde::{Deserialize, Serialize};

const PHASE_BITS: u32 = 1;
const DAY_BITS: u32 = 9;
const DAY_SHIFT: u32 = PHASE_BITS;
const YEAR_SHIFT: u32 = PHASE_BITS + DAY_BITS;

const PHASE_MASK: u32 = (1 << PHASE_BITS) - 1;
const DAY_MASK: u32 = (1 << DAY_BITS) - 1;

pub const DAYS_PER_YEAR: u32 = 360;

/// Half of a simulated day.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Phase {
    Day,
    Night,
}

string_enum!(Phase {
    Day => "day",
    Night => "night",
});

/// Compact timestamp encoding year, day of year and day/night phase in a `u32`.
///
/// Bit layout: `[year:22][day_of_year:9][phase:1]`. Natural `u32` ordering
/// equals chronological ordering, and the half-day step is the finest grain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "TimestampRepr", from = "TimestampRepr")]
pub struct SimTimestamp(u32);

#[derive(Serialize, Deserialize)]
struct TimestampRepr {
    year: u32,
    day: u32,
    phase: Phase,
}

impl From<SimTimestamp> for TimestampRepr {
    fn from(ts: SimTimestamp) -> Self {
        TimestampRepr {
            year: ts.year(),
            day: ts.day(),
            phase: ts.phase(),
        }
    }
}

impl From<TimestampRepr> for SimTimestamp {
    fn from(repr: TimestampRepr) -> Self {
        SimTimestamp::new(repr.year, repr.day, repr.phase)
    }
}

impl SimTimestamp {
    /// Create a timestamp from year, day-of-year (1–360) and phase.
    pub fn new(year: u32, day: u32, phase: Phase) -> Self {
        assert!(
            (1..=DAYS_PER_YEAR).contains(&day),
            "day out of range: {day}"
        );
        let phase_bit = match phase {
            Phase::Day => 0,
            Phase::Night => 1,
        };
        Self((year << YEAR_SHIFT) | (day << DAY_SHIFT) | phase_bit)
    }

    /// Daytime on the first day of a year.
    pub fn from_year(year: u32) -> Self {
        Self::new(year, 1, Phase::Day)
    }

    /// Rebuild a timestamp from an ordinal date (`year * 360 + day - 1`).
    pub fn from_ordinal(ordinal: u32, phase: Phase) -> Self {
        Self::new(ordinal / DAYS_PER_YEAR, ordinal % DAYS_PER_YEAR + 1, phase)
    }

    pub fn year(self) -> u32 {
        self.0 >> YEAR_SHIFT
    }

    pub fn day(self) -> u32 {
        (self.0 >> DAY_SHIFT) & DAY_MASK
    }

    pub fn phase(self) -> Phase {
        if self.0 & PHASE_MASK == 0 {
            Phase::Day
        } else {
            Phase::Night
        }
    }

    /// Days elapsed since day 1 of year 0.
    pub fn ordinal_date(self) -> u32 {
        self.year() * DAYS_PER_YEAR + self.day() - 1
    }

    /// The following half-day.
    pub fn next_phase(self) -> Self {
        match self.phase() {
            Phase::Day => Self::new(self.year(), self.day(), Phase::Night),
            Phase::Night => Self::from_ordinal(self.ordinal_date() + 1, Phase::Day),
        }
    }

    /// Same day and phase in another year.
    pub fn with_year(self, year: u32) -> Self {
        Self::new(year, self.day(), self.phase())
    }

    pub fn days_since(self, earlier: SimTimestamp) -> u32 {
        self.ordinal_date().saturating_sub(earlier.ordinal_date())
    }

    /// Whole years elapsed since `earlier`; this is how ages are computed.
    pub fn years_since(self, earlier: SimTimestamp) -> u32 {
        self.days_since(earlier) / DAYS_PER_YEAR
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for SimTimestamp {
    fn default() -> Self {
        Self::from_year(0)
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Y{}.D{}.{}", self.year(), self.day(), self.phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trip() {
        let ts = SimTimestamp::new(1909, 180, Phase::Night);
        assert_eq!(ts.year(), 1909);
        assert_eq!(ts.day(), 180);
        assert_eq!(ts.phase(), Phase::Night);
    }

    #[test]
    fn chronological_ordering() {
        let a = SimTimestamp::new(1909, 1, Phase::Day);
        let b = SimTimestamp::new(1909, 1, Phase::Night);
        let c = SimTimestamp::new(1909, 2, Phase::Day);
        let d = SimTimestamp::new(1910, 1, Phase::Day);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn next_phase_rolls_over_years() {
        let last = SimTimestamp::new(1909, DAYS_PER_YEAR, Phase::Night);
        assert_eq!(last.next_phase(), SimTimestamp::from_year(1910));
        let morning = SimTimestamp::new(1909, 12, Phase::Day);
        assert_eq!(morning.next_phase(), SimTimestamp::new(1909, 12, Phase::Night));
    }

    #[test]
    fn ages_are_whole_years() {
        let birth = SimTimestamp::new(1900, 200, Phase::Day);
        assert_eq!(SimTimestamp::new(1930, 199, Phase::Day).years_since(birth), 29);
        assert_eq!(SimTimestamp::new(1930, 200, Phase::Day).years_since(birth), 30);
        assert_eq!(birth.years_since(SimTimestamp::new(1950, 1, Phase::Day)), 0);
    }

    #[test]
    fn ordinal_round_trip() {
        let ts = SimTimestamp::new(1920, 77, Phase::Night);
        assert_eq!(SimTimestamp::from_ordinal(ts.ordinal_date(), Phase::Night), ts);
    }

    #[test]
    fn serde_shape() {
        let ts = SimTimestamp::new(1925, 45, Phase::Night);
        let value = serde_json::to_value(ts).unwrap();
        assert_eq!(value["year"], 1925);
        assert_eq!(value["day"], 45);
        assert_eq!(value["phase"], "night");
    }

    #[test]
    fn display_format() {
        let ts = SimTimestamp::new(1925, 1, Phase::Day);
        assert_eq!(ts.to_string(), "Y1925.D1.day");
    }
}
