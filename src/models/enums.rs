use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SeverityLabel {
    NoSymptoms => "None",
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

str_enum!(PredictionLabel {
    Asthma => "Asthma",
    NoAsthma => "No Asthma",
});

str_enum!(RecipientRole {
    Doctor => "doctor",
    Caretaker => "caretaker",
    EmergencyContact => "emergency_contact",
});

impl SeverityLabel {
    /// Severity from the number of positive indicators on a record (0..=6).
    pub fn from_positive_count(count: usize) -> Self {
        match count {
            0 => Self::NoSymptoms,
            1 | 2 => Self::Mild,
            3 | 4 => Self::Moderate,
            _ => Self::Severe,
        }
    }
}

impl PredictionLabel {
    /// Whether this label is a positive finding (triggers notifications).
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Asthma)
    }
}

/// Patient gender as stored on the profile.
///
/// Stored as free text by the front end, so parsing never fails: anything
/// that is not a recognised value lands in `Other`, blank lands in `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Unspecified,
            Some(s) if s.eq_ignore_ascii_case("male") => Self::Male,
            Some(s) if s.eq_ignore_ascii_case("female") => Self::Female,
            Some(_) => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
            Self::Unspecified => "",
        }
    }

    /// Numeric encoding expected by the predictor: Male is 1, everything else 0.
    pub fn encode(&self) -> u8 {
        match self {
            Self::Male => 1,
            Self::Female | Self::Other | Self::Unspecified => 0,
        }
    }
}
