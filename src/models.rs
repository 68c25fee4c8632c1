use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// What happened: a product code was redeemed, or a user account was created.
///
/// The source file labels these with quoted Russian literals; they are decoded
/// into this enum once at load time so nothing downstream compares strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum)]
pub enum EventKind {
    Activation,
    Registration,
}

impl EventKind {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().trim_matches('"') {
            "Активация кода" | "Activation" => Some(Self::Activation),
            "Регистрация пользователя" | "Registration" => Some(Self::Registration),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activation => write!(f, "code activations"),
            Self::Registration => write!(f, "user registrations"),
        }
    }
}

/// Federal district of the Russian Federation, the geographic dimension of
/// the event log. `Undefined` marks rows with no resolvable district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum District {
    Central,
    #[serde(rename = "Far Eastern")]
    FarEastern,
    #[serde(rename = "North Caucasian")]
    NorthCaucasian,
    Northwestern,
    Siberian,
    Southern,
    Ural,
    Volga,
    Undefined,
}

impl District {
    pub const ALL: [District; 9] = [
        District::Central,
        District::FarEastern,
        District::NorthCaucasian,
        District::Northwestern,
        District::Siberian,
        District::Southern,
        District::Ural,
        District::Volga,
        District::Undefined,
    ];

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Central" => Some(Self::Central),
            "Far Eastern" => Some(Self::FarEastern),
            "North Caucasian" => Some(Self::NorthCaucasian),
            "Northwestern" => Some(Self::Northwestern),
            "Siberian" => Some(Self::Siberian),
            "Southern" => Some(Self::Southern),
            "Ural" => Some(Self::Ural),
            "Volga" => Some(Self::Volga),
            "Undefined" => Some(Self::Undefined),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Central => "Central",
            Self::FarEastern => "Far Eastern",
            Self::NorthCaucasian => "North Caucasian",
            Self::Northwestern => "Northwestern",
            Self::Siberian => "Siberian",
            Self::Southern => "Southern",
            Self::Ural => "Ural",
            Self::Volga => "Volga",
            Self::Undefined => "Undefined",
        }
    }

    /// District seat coordinates (lat, lon) used for map rendering.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Self::Central => Some((55.75222, 37.61556)),
            Self::FarEastern => Some((43.1332, 131.9113)),
            Self::NorthCaucasian => Some((44.0499, 43.0396)),
            Self::Northwestern => Some((59.9311, 30.3609)),
            Self::Siberian => Some((54.9833, 82.8964)),
            Self::Southern => Some((47.2357, 39.7015)),
            Self::Ural => Some((56.8431, 60.6454)),
            Self::Volga => Some((56.3269, 44.0059)),
            Self::Undefined => None,
        }
    }

    /// Census population of the district, for per-capita rates.
    pub fn population(&self) -> Option<u64> {
        match self {
            Self::Central => Some(39_250_960),
            Self::FarEastern => Some(8_124_053),
            Self::NorthCaucasian => Some(9_967_301),
            Self::Northwestern => Some(13_941_959),
            Self::Siberian => Some(17_003_927),
            Self::Southern => Some(16_482_488),
            Self::Ural => Some(12_329_500),
            Self::Volga => Some(29_070_827),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded row of the event log.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub occurred_at: NaiveDateTime,
    pub kind: EventKind,
    pub district: District,
    pub count: u64,
}

/// One point of a daily series for a single event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDateTime,
    pub count: u64,
}

/// Mean and population standard deviation of the gaps between peaks,
/// in fractional days.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GapStats {
    pub mean_days: f64,
    pub stddev_days: f64,
}

/// Output of the peak-interval analyzer. `gap_stats` is `None` when fewer
/// than two peaks were found; no statistic is defined in that case.
#[derive(Debug, Clone, Serialize)]
pub struct PeakIntervals {
    pub peak_dates: Vec<NaiveDateTime>,
    pub gap_days: Vec<f64>,
    pub gap_stats: Option<GapStats>,
}
