// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer};

/// Accepts the corpus' mixed `estimatedTime` shapes (number or unit
/// string) and yields whole minutes.
pub mod estimated_minutes {
    use super::*;
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(crate::estimated_time::parse_estimated_minutes(&raw))
    }
}

/// Accepts a missing field, a single string, or a list of strings.
pub mod string_list {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<OneOrMany>::deserialize(deserializer)?;
        Ok(match raw {
            None => Vec::new(),
            Some(OneOrMany::One(value)) => vec![value],
            Some(OneOrMany::Many(values)) => values,
        })
    }
}
