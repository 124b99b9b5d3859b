// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

macro_rules! content_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        #[serde(transparent)]
        #[non_exhaustive]
        pub struct $name(String);

        impl $name {
            pub fn parse(input: &str) -> Result<Self, ParseError> {
                if input.is_empty() {
                    return Err(ParseError::Empty($label));
                }
                if input.trim() != input {
                    return Err(ParseError::Trimmed($label));
                }
                if input.len() > ID_MAX_LEN {
                    return Err(ParseError::TooLong($label, ID_MAX_LEN));
                }
                Ok(Self(input.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

content_id!(ModuleId, "module_id");
content_id!(QuizId, "quiz_id");
content_id!(QuestionId, "question_id");
content_id!(LearningPathId, "learning_path_id");
