use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
        }
    }
}

/// Medal type. Ordering is Gold < Silver < Bronze so pivots list Gold first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub const ALL: [Medal; 3] = [Medal::Gold, Medal::Silver, Medal::Bronze];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Gold" => Some(Medal::Gold),
            "Silver" => Some(Medal::Silver),
            "Bronze" => Some(Medal::Bronze),
            _ => None,
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medal::Gold => write!(f, "Gold"),
            Medal::Silver => write!(f, "Silver"),
            Medal::Bronze => write!(f, "Bronze"),
        }
    }
}

// ---------------------------------------------------------------------------
// Missing-value handling
// ---------------------------------------------------------------------------

/// A raw cell that may arrive as a number (JSON) or as text (CSV, where the
/// source file spells missing values as `NA`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
}

fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == "NA" || s.eq_ignore_ascii_case("nan")
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCell>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCell::Number(v)) if v.is_finite() => Ok(Some(v)),
        Some(RawCell::Number(_)) => Ok(None),
        Some(RawCell::Text(s)) if is_missing(&s) => Ok(None),
        Some(RawCell::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a number"))),
    }
}

fn optional_sex<'de, D>(deserializer: D) -> Result<Option<Sex>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Text(s)) => Sex::parse(&s),
        _ => None,
    })
}

fn optional_medal<'de, D>(deserializer: D) -> Result<Option<Medal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Text(s)) if is_missing(&s) => Ok(None),
        Some(RawCell::Text(s)) => Medal::parse(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown medal '{s}'"))),
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// AthleteRecord – one (athlete, event, games) participation
// ---------------------------------------------------------------------------

/// Column names as they appear after load (`NOC` → `Country`, `Team` → `Team Name`).
pub const COLUMNS: [&str; 16] = [
    "ID", "Name", "Sex", "Age", "Height", "Weight", "Team Name", "Country", "Games", "Year",
    "Season", "City", "Sport", "Event", "Medal", "BMI",
];

/// One row of the source table.
///
/// Deserializes from the raw schema (`Team`, `NOC`) as well as the normalized
/// one, and always serializes with the normalized names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sex", default, deserialize_with = "optional_sex")]
    pub sex: Option<Sex>,
    #[serde(rename = "Age", default, deserialize_with = "optional_number")]
    pub age: Option<f64>,
    /// Centimetres.
    #[serde(rename = "Height", default, deserialize_with = "optional_number")]
    pub height: Option<f64>,
    /// Kilograms.
    #[serde(rename = "Weight", default, deserialize_with = "optional_number")]
    pub weight: Option<f64>,
    #[serde(rename(serialize = "Team Name", deserialize = "Team"), alias = "Team Name")]
    pub team_name: String,
    /// National Olympic Committee code.
    #[serde(rename(serialize = "Country", deserialize = "NOC"), alias = "Country")]
    pub country: String,
    #[serde(rename = "Games")]
    pub games: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Sport")]
    pub sport: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Medal", default, deserialize_with = "optional_medal")]
    pub medal: Option<Medal>,
    /// Derived at load time by [`Dataset::from_records`].
    #[serde(rename = "BMI", skip_deserializing)]
    pub bmi: Option<f64>,
}

/// Body mass index from height (cm) and weight (kg).
/// `None` when either input is missing or the height is zero.
pub fn compute_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    let (h, w) = (height_cm?, weight_kg?);
    if h == 0.0 {
        return None;
    }
    let metres = h / 100.0;
    Some(w / (metres * metres))
}

impl AthleteRecord {
    /// Value of a normalized column rendered as text, for tables.
    pub fn cell(&self, column: &str) -> String {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }
        match column {
            "ID" => self.id.to_string(),
            "Name" => self.name.clone(),
            "Sex" => opt(&self.sex),
            "Age" => opt(&self.age),
            "Height" => opt(&self.height),
            "Weight" => opt(&self.weight),
            "Team Name" => self.team_name.clone(),
            "Country" => self.country.clone(),
            "Games" => self.games.clone(),
            "Year" => self.year.to_string(),
            "Season" => self.season.clone(),
            "City" => self.city.clone(),
            "Sport" => self.sport.clone(),
            "Event" => self.event.clone(),
            "Medal" => opt(&self.medal),
            "BMI" => self.bmi.map(|b| format!("{b:.2}")).unwrap_or_default(),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full, immutable dataset with its selection domain pre-computed.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<AthleteRecord>,
    /// Sorted distinct years.
    pub years: Vec<i32>,
    /// Sorted distinct sports.
    pub sports: Vec<String>,
    /// Sorted distinct country codes.
    pub countries: Vec<String>,
}

impl Dataset {
    /// Derive BMI for every row and build the domain indices.
    pub fn from_records(mut records: Vec<AthleteRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut sports = BTreeSet::new();
        let mut countries = BTreeSet::new();

        for rec in &mut records {
            rec.bmi = compute_bmi(rec.height, rec.weight);
            years.insert(rec.year);
            if !rec.sport.is_empty() {
                sports.insert(rec.sport.clone());
            }
            if !rec.country.is_empty() {
                countries.insert(rec.country.clone());
            }
        }

        Dataset {
            records,
            years: years.into_iter().collect(),
            sports: sports.into_iter().collect(),
            countries: countries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest year, if any rows exist.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builder for test rows; unspecified fields get plausible defaults.
    pub(crate) fn record(
        id: u64,
        name: &str,
        year: i32,
        sport: &str,
        country: &str,
    ) -> AthleteRecord {
        AthleteRecord {
            id,
            name: name.to_string(),
            sex: Some(Sex::Male),
            age: None,
            height: None,
            weight: None,
            team_name: country.to_string(),
            country: country.to_string(),
            games: format!("{year} Summer"),
            year,
            season: "Summer".to_string(),
            city: "Somewhere".to_string(),
            sport: sport.to_string(),
            event: format!("{sport} Event"),
            medal: None,
            bmi: None,
        }
    }

    #[test]
    fn test_bmi_from_height_and_weight() {
        let bmi = compute_bmi(Some(180.0), Some(80.0)).unwrap();
        assert!((bmi - 24.69).abs() < 0.01);
    }

    #[test]
    fn test_bmi_missing_or_zero_height() {
        assert_eq!(compute_bmi(None, Some(80.0)), None);
        assert_eq!(compute_bmi(Some(180.0), None), None);
        assert_eq!(compute_bmi(Some(0.0), Some(80.0)), None);
    }

    #[test]
    fn test_from_records_builds_domain() {
        let mut a = record(1, "A", 2004, "Judo", "JPN");
        a.height = Some(170.0);
        a.weight = Some(70.0);
        let b = record(2, "B", 2000, "Swimming", "USA");
        let c = record(3, "C", 2000, "Judo", "FRA");

        let ds = Dataset::from_records(vec![a, b, c]);
        assert_eq!(ds.years, vec![2000, 2004]);
        assert_eq!(ds.sports, vec!["Judo", "Swimming"]);
        assert_eq!(ds.countries, vec!["FRA", "JPN", "USA"]);
        assert_eq!(ds.year_bounds(), Some((2000, 2004)));
        assert!(ds.records[0].bmi.is_some());
        assert!(ds.records[1].bmi.is_none());
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_bounds(), None);
    }

    #[test]
    fn test_cell_formats_optional_values() {
        let mut rec = record(7, "X", 2000, "Judo", "JPN");
        rec.medal = Some(Medal::Gold);
        rec.bmi = Some(24.6913);
        assert_eq!(rec.cell("Medal"), "Gold");
        assert_eq!(rec.cell("Age"), "");
        assert_eq!(rec.cell("BMI"), "24.69");
        assert_eq!(rec.cell("Country"), "JPN");
    }
}
