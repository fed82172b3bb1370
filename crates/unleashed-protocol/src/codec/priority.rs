//! WLAN queue priority.
//!
//! The controller stores the priority class as four per-access-category
//! queue numbers on one element. Only two combinations are legal, so the
//! element decodes into a two-variant enum by table lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FormatError;

/// The raw attribute tuple on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTuple {
    #[serde(rename = "@voice")]
    pub voice: i32,
    #[serde(rename = "@video")]
    pub video: i32,
    #[serde(rename = "@data")]
    pub data: i32,
    #[serde(rename = "@background")]
    pub background: i32,
}

/// Priority class of a WLAN's traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PriorityTuple", into = "PriorityTuple")]
pub enum QueuePriority {
    #[default]
    High,
    Low,
}

/// Legal tuples, consulted in both directions.
const PRIORITY_TABLE: [(QueuePriority, PriorityTuple); 2] = [
    (
        QueuePriority::High,
        PriorityTuple { voice: 0, video: 2, data: 4, background: 6 },
    ),
    (
        QueuePriority::Low,
        PriorityTuple { voice: 1, video: 3, data: 5, background: 7 },
    ),
];

impl QueuePriority {
    pub fn tuple(self) -> PriorityTuple {
        let row = match self {
            Self::High => 0,
            Self::Low => 1,
        };
        PRIORITY_TABLE[row].1
    }
}

impl TryFrom<PriorityTuple> for QueuePriority {
    type Error = FormatError;

    fn try_from(tuple: PriorityTuple) -> Result<Self, Self::Error> {
        PRIORITY_TABLE
            .iter()
            .find(|(_, legal)| *legal == tuple)
            .map(|(priority, _)| *priority)
            .ok_or(FormatError::UnknownPriority {
                voice: tuple.voice,
                video: tuple.video,
                data: tuple.data,
                background: tuple.background,
            })
    }
}

impl From<QueuePriority> for PriorityTuple {
    fn from(priority: QueuePriority) -> Self {
        priority.tuple()
    }
}

impl fmt::Display for QueuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Low => f.write_str("low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(voice: i32, video: i32, data: i32, background: i32) -> PriorityTuple {
        PriorityTuple { voice, video, data, background }
    }

    #[test]
    fn test_try_from_high_tuple() {
        assert_eq!(QueuePriority::try_from(tuple(0, 2, 4, 6)), Ok(QueuePriority::High));
    }

    #[test]
    fn test_try_from_low_tuple() {
        assert_eq!(QueuePriority::try_from(tuple(1, 3, 5, 7)), Ok(QueuePriority::Low));
    }

    #[test]
    fn test_try_from_other_tuples_return_error() {
        for bad in [tuple(0, 0, 0, 0), tuple(0, 2, 4, 7), tuple(6, 4, 2, 0)] {
            let result = QueuePriority::try_from(bad);
            assert!(
                matches!(result, Err(FormatError::UnknownPriority { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_tuple_matches_table_for_each_variant() {
        for priority in [QueuePriority::High, QueuePriority::Low] {
            assert_eq!(QueuePriority::try_from(priority.tuple()), Ok(priority));
        }
    }

    #[test]
    fn test_serialize_as_element_attributes() {
        #[derive(Serialize)]
        #[serde(rename = "wlansvc")]
        struct Holder {
            #[serde(rename = "queue-priority")]
            priority: QueuePriority,
        }

        let xml = quick_xml::se::to_string(&Holder { priority: QueuePriority::Low })
            .unwrap();

        assert_eq!(
            xml,
            r#"<wlansvc><queue-priority voice="1" video="3" data="5" background="7"/></wlansvc>"#
        );
    }

    #[test]
    fn test_deserialize_from_element_attributes() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(rename = "queue-priority")]
            priority: QueuePriority,
        }

        let high: Holder = quick_xml::de::from_str(
            r#"<wlansvc><queue-priority voice="0" video="2" data="4" background="6"/></wlansvc>"#,
        )
        .unwrap();
        assert_eq!(high.priority, QueuePriority::High);

        let bad = quick_xml::de::from_str::<Holder>(
            r#"<wlansvc><queue-priority voice="0" video="0" data="0" background="0"/></wlansvc>"#,
        );
        assert!(bad.is_err());
    }
}
