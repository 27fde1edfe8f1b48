//! Dice Notation
//!
//! Content tables express quantities as `NdM` or `NdM*K` ("3d6*10"). The
//! grammar is exactly `\d+ d \d+ (\* \d+)?`; anything else is a content
//! table error at bootstrap.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;
use crate::rng::SimRng;

/// A parsed dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    pub multiplier: u32,
}

impl DiceNotation {
    pub fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            multiplier: 1,
        }
    }

    pub fn times(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Rolls the dice. Consumes exactly `count` draws from the stream.
    pub fn roll(&self, rng: &mut SimRng) -> u64 {
        let mut total: u64 = 0;
        for _ in 0..self.count {
            total += rng.die(u64::from(self.sides));
        }
        total * u64::from(self.multiplier)
    }

    /// Largest possible result.
    pub fn max(&self) -> u64 {
        u64::from(self.count) * u64::from(self.sides) * u64::from(self.multiplier)
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier == 1 {
            write!(f, "{}d{}", self.count, self.sides)
        } else {
            write!(f, "{}d{}*{}", self.count, self.sides, self.multiplier)
        }
    }
}

impl FromStr for DiceNotation {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SimError::ContentTable(format!("invalid dice notation '{}'", s));

        let (dice_part, multiplier) = match s.split_once('*') {
            Some((dice, mult)) => {
                let multiplier: u32 = mult.parse().map_err(|_| bad())?;
                (dice, multiplier)
            }
            None => (s, 1),
        };

        let (count_str, sides_str) = dice_part.split_once('d').ok_or_else(bad)?;
        let count: u32 = count_str.parse().map_err(|_| bad())?;
        let sides: u32 = sides_str.parse().map_err(|_| bad())?;
        if count == 0 || sides == 0 || multiplier == 0 {
            return Err(bad());
        }
        Ok(Self {
            count,
            sides,
            multiplier,
        })
    }
}

// Serialized as the notation string so tables stay readable.
impl Serialize for DiceNotation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DiceNotation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let d: DiceNotation = "3d6".parse().unwrap();
        assert_eq!(d, DiceNotation::new(3, 6));
    }

    #[test]
    fn test_parse_with_multiplier() {
        let d: DiceNotation = "2d10*100".parse().unwrap();
        assert_eq!(d, DiceNotation::new(2, 10).times(100));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "d6", "3d", "3x6", "3d6*", "0d6", "3d0", "3d6*0", "-1d6", "3 d 6"] {
            assert!(bad.parse::<DiceNotation>().is_err(), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["1d4", "3d6", "2d10*100"] {
            let d: DiceNotation = s.parse().unwrap();
            assert_eq!(d.to_string(), s);
        }
    }

    #[test]
    fn test_roll_in_bounds() {
        let mut rng = SimRng::from_seed("dice");
        let d: DiceNotation = "3d6*10".parse().unwrap();
        for _ in 0..200 {
            let v = d.roll(&mut rng);
            assert!((30..=180).contains(&v));
            assert_eq!(v % 10, 0);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let d: DiceNotation = "2d8".parse().unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), r#""2d8""#);
        let back: DiceNotation = serde_json::from_str(r#""2d8""#).unwrap();
        assert_eq!(back, d);
    }
}
