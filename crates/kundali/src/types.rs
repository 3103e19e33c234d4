//! Birth data and chart records shared by every pipeline stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Houses in every chart, listed from the ascendant.
pub const HOUSE_COUNT: usize = 12;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(alias = "others")]
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Token the engine expects for this gender.
    pub fn engine_token(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "others",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "others" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{other}' (expected male, female or other)")),
        }
    }
}

/// The divisional charts the selector offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    #[serde(rename = "D1")]
    Lagna,
    #[serde(rename = "D9")]
    Navamsa,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Lagna, ChartKind::Navamsa];

    /// Dataset key for this chart.
    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::Lagna => "D1",
            ChartKind::Navamsa => "D9",
        }
    }

    /// Selector label, e.g. `D9 (Navamsa)`.
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Lagna => "D1 (Lagna)",
            ChartKind::Navamsa => "D9 (Navamsa)",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ChartKind::ALL
            .into_iter()
            .find(|kind| {
                wanted.eq_ignore_ascii_case(kind.id()) || wanted.eq_ignore_ascii_case(kind.label())
            })
            .ok_or_else(|| format!("unknown chart '{wanted}' (expected D1 (Lagna) or D9 (Navamsa))"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// A coerced, range-checked birth record ready for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthDataInput {
    pub name: String,
    pub gender: Gender,
    pub date: CalendarDate,
    pub time: ClockTime,
    pub place: String,
    /// Degrees, east positive.
    pub longitude: f64,
    /// Degrees, north positive.
    pub latitude: f64,
    /// Hours from GMT.
    pub timezone: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPlacement {
    pub sign: String,
    pub house: u32,
    pub nakshatra: String,
    pub nakshatra_lord: String,
    /// Engine fields this pipeline does not interpret (degrees, pada, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseData {
    pub sign: String,
    pub lord: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One chart as returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub name: String,
    pub symbol: String,
    pub ascendant: String,
    pub planets: BTreeMap<String, PlanetPlacement>,
    /// Houses 1..12 in order.
    pub houses: Vec<HouseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<BTreeMap<String, Vec<String>>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Everything the engine computed for one birth record, keyed by chart id.
///
/// Entries stay untyped until a chart is extracted; the engine also stores
/// non-chart entries here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AstrologicalDataset(BTreeMap<String, Value>);

impl AstrologicalDataset {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: Value) {
        self.0.insert(id.into(), entry);
    }
}

impl From<BTreeMap<String, Value>> for AstrologicalDataset {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self(entries)
    }
}
