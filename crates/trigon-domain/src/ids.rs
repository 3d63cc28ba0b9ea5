//! Numeric identifiers for questions, answers and theorems
//!
//! The knowledge base keys everything by small integers. Wrapping them in
//! distinct newtypes keeps a question id from being passed where a theorem
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Get the raw numeric value
            pub fn value(&self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a diagnostic question
    QuestionId
);

numeric_id!(
    /// Identifier of an answer option (e.g. 0 = no, 1 = yes)
    AnswerId
);

numeric_id!(
    /// Identifier of a geometry theorem
    TheoremId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_value() {
        assert!(QuestionId(3) < QuestionId(7));
        assert_eq!(TheoremId::from(12).value(), 12);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&AnswerId(2)).unwrap();
        assert_eq!(json, "2");

        let parsed: QuestionId = serde_json::from_str("41").unwrap();
        assert_eq!(parsed, QuestionId(41));
    }
}
