use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "`")]
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self::new).map_err(|_| ParseIdError {
                    kind: stringify!($name).to_string(),
                })
            }
        }
    };
}

numeric_id!(
    /// Identifier of a test definition (the content being taken).
    TestId
);
numeric_id!(
    /// Identifier of one attempt at a test. Resuming reuses the original one.
    TestResultId
);
numeric_id!(
    /// Identifier of a question entry within a part (single or grouped).
    TestQuestionId
);
numeric_id!(
    /// Numeric part id; doubles as the part ordering key and section lookup key.
    PartId
);

// ─── FromStr Error ─────────────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_id_display() {
        let id = TestResultId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "TestResultId(42)");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: TestQuestionId = " 123 ".parse().unwrap();
        assert_eq!(id, TestQuestionId::new(123));
    }

    #[test]
    fn test_id_from_str_invalid() {
        let err = "not-a-number".parse::<TestId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse TestId from string");
    }

    #[test]
    fn part_ids_order_numerically() {
        assert!(PartId::new(2) < PartId::new(10));
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&TestQuestionId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
