use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a stored string does not name a known enum variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value for {field}: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MedicationType {
    Pill => "pill",
    Liquid => "liquid",
    Topical => "topical",
});

str_enum!(TimeOfDay {
    Morning => "morning",
    Evening => "evening",
    Unspecified => "unspecified",
});

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::Unspecified
    }
}
