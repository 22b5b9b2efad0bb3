use serde::{Deserialize, Serialize};

/// Recurrence frequency supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "YEARLY",
            Self::Monthly => "MONTHLY",
            Self::Weekly => "WEEKLY",
            Self::Daily => "DAILY",
        }
    }

    /// Parses a frequency token (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YEARLY" => Some(Self::Yearly),
            "MONTHLY" => Some(Self::Monthly),
            "WEEKLY" => Some(Self::Weekly),
            "DAILY" => Some(Self::Daily),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-letter weekday token used by `by_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayToken {
    MO,
    TU,
    WE,
    TH,
    FR,
    SA,
    SU,
}

impl DayToken {
    pub const ALL: [Self; 7] = [
        Self::MO,
        Self::TU,
        Self::WE,
        Self::TH,
        Self::FR,
        Self::SA,
        Self::SU,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MO => "MO",
            Self::TU => "TU",
            Self::WE => "WE",
            Self::TH => "TH",
            Self::FR => "FR",
            Self::SA => "SA",
            Self::SU => "SU",
        }
    }

    /// Parses a weekday token (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MO" => Some(Self::MO),
            "TU" => Some(Self::TU),
            "WE" => Some(Self::WE),
            "TH" => Some(Self::TH),
            "FR" => Some(Self::FR),
            "SA" => Some(Self::SA),
            "SU" => Some(Self::SU),
            _ => None,
        }
    }

    #[must_use]
    pub const fn weekday(self) -> chrono::Weekday {
        match self {
            Self::MO => chrono::Weekday::Mon,
            Self::TU => chrono::Weekday::Tue,
            Self::WE => chrono::Weekday::Wed,
            Self::TH => chrono::Weekday::Thu,
            Self::FR => chrono::Weekday::Fri,
            Self::SA => chrono::Weekday::Sat,
            Self::SU => chrono::Weekday::Sun,
        }
    }
}

impl From<chrono::Weekday> for DayToken {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::MO,
            chrono::Weekday::Tue => Self::TU,
            chrono::Weekday::Wed => Self::WE,
            chrono::Weekday::Thu => Self::TH,
            chrono::Weekday::Fri => Self::FR,
            chrono::Weekday::Sat => Self::SA,
            chrono::Weekday::Sun => Self::SU,
        }
    }
}

impl std::fmt::Display for DayToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
