//! Bit-packed weekly schedule.
//!
//! A week is 7 days of 96 quarter-hour slots (UTC). On the wire each day
//! is four 24-bit words, bit 0 being the earliest slot, and the 28 words
//! of the week are written as colon-separated hex:
//!
//! ```text
//! <wlan-schedule value="0x0:0xffffff:0xffffff:0x0:..."/>
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::FormatError;

pub const DAYS: usize = 7;
pub const SLOTS_PER_DAY: usize = 96;

const BITS_PER_WORD: usize = 24;
const WORDS_PER_DAY: usize = SLOTS_PER_DAY / BITS_PER_WORD;
const WORDS: usize = DAYS * WORDS_PER_DAY;
const WORD_MASK: u64 = (1 << BITS_PER_WORD) - 1;

/// When a WLAN is switched on, in quarter-hour slots over a week.
///
/// Day 0 is Sunday; slot 0 is 00:00-00:15 UTC.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WeeklySchedule([[bool; SLOTS_PER_DAY]; DAYS]);

impl WeeklySchedule {
    /// A schedule with every slot off.
    pub fn new() -> Self {
        Self([[false; SLOTS_PER_DAY]; DAYS])
    }

    /// A schedule with every slot on.
    pub fn always_on() -> Self {
        Self([[true; SLOTS_PER_DAY]; DAYS])
    }

    /// # Panics
    /// Panics if `day >= 7` or `slot >= 96`.
    pub fn get(&self, day: usize, slot: usize) -> bool {
        self.0[day][slot]
    }

    /// # Panics
    /// Panics if `day >= 7` or `slot >= 96`.
    pub fn set(&mut self, day: usize, slot: usize, on: bool) {
        self.0[day][slot] = on;
    }

    pub fn days(&self) -> &[[bool; SLOTS_PER_DAY]; DAYS] {
        &self.0
    }

    fn word(&self, index: usize) -> u64 {
        let day = &self.0[index / WORDS_PER_DAY];
        let first = (index % WORDS_PER_DAY) * BITS_PER_WORD;
        day[first..first + BITS_PER_WORD]
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0, |word, (bit, _)| word | (1 << bit))
    }

    fn set_word(&mut self, index: usize, word: u64) {
        let day = &mut self.0[index / WORDS_PER_DAY];
        let first = (index % WORDS_PER_DAY) * BITS_PER_WORD;
        for bit in 0..BITS_PER_WORD {
            day[first + bit] = (word >> bit) & 1 == 1;
        }
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WeeklySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeeklySchedule").field(&self.to_string()).finish()
    }
}

impl fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..WORDS {
            if index > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:#x}", self.word(index))?;
        }
        Ok(())
    }
}

impl FromStr for WeeklySchedule {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        // A 29th word stays attached to the 28th and fails as a bad word.
        let words: Vec<&str> = text.splitn(WORDS, ':').collect();
        if words.len() < WORDS {
            return Err(FormatError::Schedule("not enough words"));
        }

        let mut schedule = Self::new();
        for (index, raw) in words.into_iter().enumerate() {
            let digits = raw
                .strip_prefix("0x")
                .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_hexdigit()))
                .ok_or(FormatError::Schedule("invalid word"))?;
            let word = u64::from_str_radix(digits, 16)
                .map_err(|_| FormatError::Schedule("invalid word"))?;
            if word & !WORD_MASK != 0 {
                return Err(FormatError::Schedule("word has too many bits"));
            }
            schedule.set_word(index, word);
        }
        Ok(schedule)
    }
}

/// The element form: the packed text rides in a `value` attribute.
#[derive(Serialize, Deserialize)]
struct ScheduleElement {
    #[serde(rename = "@value")]
    value: String,
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ScheduleElement { value: self.to_string() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let element = ScheduleElement::deserialize(deserializer)?;
        element.value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_text() -> String {
        vec!["0x0"; WORDS].join(":")
    }

    #[test]
    fn test_display_blank_schedule() {
        assert_eq!(WeeklySchedule::new().to_string(), blank_text());
    }

    #[test]
    fn test_display_always_on_schedule() {
        assert_eq!(
            WeeklySchedule::always_on().to_string(),
            vec!["0xffffff"; WORDS].join(":")
        );
    }

    #[test]
    fn test_parse_blank_schedule() {
        let schedule: WeeklySchedule = blank_text().parse().unwrap();
        assert_eq!(schedule, WeeklySchedule::new());
    }

    #[test]
    fn test_set_bits_map_to_words() {
        let mut schedule = WeeklySchedule::new();
        schedule.set(0, 0, true); // Sunday 00:00, word 0 bit 0
        schedule.set(0, 25, true); // Sunday 06:15, word 1 bit 1
        schedule.set(6, 95, true); // Saturday 23:45, word 27 bit 23

        let text = schedule.to_string();
        let words: Vec<&str> = text.split(':').collect();

        assert_eq!(words[0], "0x1");
        assert_eq!(words[1], "0x2");
        assert_eq!(words[27], "0x800000");
        assert_eq!(text.parse::<WeeklySchedule>(), Ok(schedule));
    }

    #[test]
    fn test_parse_sparse_grid_preserves_every_slot() {
        let mut schedule = WeeklySchedule::new();
        for day in 0..DAYS {
            for slot in (day..SLOTS_PER_DAY).step_by(7) {
                schedule.set(day, slot, true);
            }
        }
        let parsed: WeeklySchedule = schedule.to_string().parse().unwrap();
        assert_eq!(parsed, schedule);
        assert!(parsed.get(3, 3));
        assert!(!parsed.get(3, 4));
    }

    #[test]
    fn test_parse_too_few_words_returns_error() {
        let text = vec!["0x0"; WORDS - 1].join(":");
        assert_eq!(
            text.parse::<WeeklySchedule>(),
            Err(FormatError::Schedule("not enough words"))
        );
    }

    #[test]
    fn test_parse_extra_word_returns_error() {
        let text = vec!["0x0"; WORDS + 1].join(":");
        assert_eq!(
            text.parse::<WeeklySchedule>(),
            Err(FormatError::Schedule("invalid word"))
        );
    }

    #[test]
    fn test_parse_missing_prefix_returns_error() {
        let mut words = vec!["0x0"; WORDS];
        words[5] = "ff";
        assert!(words.join(":").parse::<WeeklySchedule>().is_err());

        words[5] = "0x";
        assert!(words.join(":").parse::<WeeklySchedule>().is_err());
    }

    #[test]
    fn test_parse_bit_above_23_returns_error() {
        let mut words = vec!["0x0"; WORDS];
        words[12] = "0x1000000";
        assert_eq!(
            words.join(":").parse::<WeeklySchedule>(),
            Err(FormatError::Schedule("word has too many bits"))
        );
    }

    #[test]
    fn test_serde_uses_value_attribute() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        #[serde(rename = "wlansvc")]
        struct Holder {
            #[serde(rename = "wlan-schedule")]
            schedule: WeeklySchedule,
        }

        let holder = Holder { schedule: WeeklySchedule::new() };
        let xml = quick_xml::se::to_string(&holder).unwrap();
        assert_eq!(
            xml,
            format!(r#"<wlansvc><wlan-schedule value="{}"/></wlansvc>"#, blank_text())
        );

        let back: Holder = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(back, holder);
    }
}
