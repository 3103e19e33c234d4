//! Text and JSON renderings of a chart.

use crate::types::{ChartData, PlanetPlacement};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Traditional listing order; anything else follows by name.
const PLANET_ORDER: &[&str] = &[
    "ascendant", "sun", "moon", "mars", "mercury", "jupiter", "venus", "saturn", "rahu", "ketu",
];

pub const CLASSIFICATION_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn wants_text(&self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn wants_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// Both renderings of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub text: String,
    pub json: String,
}

/// Render `chart` both ways. An absent chart renders to nothing.
pub fn present(chart: Option<&ChartData>, pretty_json: bool) -> serde_json::Result<Option<Presentation>> {
    let Some(chart) = chart else {
        return Ok(None);
    };
    Ok(Some(Presentation {
        text: render_text(chart),
        json: to_json(chart, pretty_json)?,
    }))
}

/// Text rendering of a chart, usable with `{}`.
pub struct ChartText<'a>(pub &'a ChartData);

impl fmt::Display for ChartText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_text(f, Some(self.0))
    }
}

pub fn render_text(chart: &ChartData) -> String {
    ChartText(chart).to_string()
}

/// Write the text rendering of `chart` into `out`; writes nothing for `None`.
pub fn write_text<W: Write>(out: &mut W, chart: Option<&ChartData>) -> fmt::Result {
    let Some(chart) = chart else {
        return Ok(());
    };

    writeln!(out, "{} Chart ({})", chart.name, chart.symbol)?;
    writeln!(out, "Ascendant: {}", chart.ascendant)?;

    writeln!(out, "Planets:")?;
    for (planet, details) in ordered_planets(chart) {
        write_planet(out, planet, details)?;
    }

    writeln!(out, "Houses:")?;
    for (idx, house) in chart.houses.iter().enumerate() {
        writeln!(out, "  - House {}:", idx + 1)?;
        writeln!(out, "    - Sign: {}", house.sign)?;
        writeln!(out, "    - Lord: {}", house.lord)?;
    }

    if let Some(classifications) = &chart.classifications {
        writeln!(out, "Classifications:")?;
        for (category, planets) in classifications {
            writeln!(out, "  - {}: {}", category, planets.join(CLASSIFICATION_SEPARATOR))?;
        }
    }
    Ok(())
}

fn write_planet<W: Write>(out: &mut W, planet: &str, details: &PlanetPlacement) -> fmt::Result {
    writeln!(out, "  - {planet}:")?;
    writeln!(out, "    - Sign: {}", details.sign)?;
    writeln!(out, "    - House: {}", details.house)?;
    writeln!(out, "    - Nakshatra: {}", details.nakshatra)?;
    writeln!(out, "    - Nakshatra Lord: {}", details.nakshatra_lord)
}

fn ordered_planets(chart: &ChartData) -> Vec<(&str, &PlanetPlacement)> {
    let mut planets: Vec<_> = chart
        .planets
        .iter()
        .map(|(name, details)| (name.as_str(), details))
        .collect();
    planets.sort_by_key(|(name, _)| (planet_rank(name), *name));
    planets
}

fn planet_rank(name: &str) -> usize {
    PLANET_ORDER
        .iter()
        .position(|known| known.eq_ignore_ascii_case(name))
        .unwrap_or(PLANET_ORDER.len())
}

/// Lossless JSON form of `chart`.
pub fn to_json(chart: &ChartData, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(chart)
    } else {
        serde_json::to_string(chart)
    }
}

pub fn from_json(json: &str) -> serde_json::Result<ChartData> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HouseData;
    use std::collections::BTreeMap;

    fn placement(sign: &str, house: u32, nakshatra: &str, lord: &str) -> PlanetPlacement {
        PlanetPlacement {
            sign: sign.to_string(),
            house,
            nakshatra: nakshatra.to_string(),
            nakshatra_lord: lord.to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn small_chart() -> ChartData {
        let mut planets = BTreeMap::new();
        planets.insert("Venus".to_string(), placement("Leo", 10, "Magha", "Ketu"));
        planets.insert("Sun".to_string(), placement("Cancer", 9, "Pushya", "Saturn"));
        planets.insert("Uranus".to_string(), placement("Sagittarius", 2, "Mula", "Ketu"));
        planets.insert("Ascendant".to_string(), placement("Scorpio", 1, "Jyeshtha", "Mercury"));
        ChartData {
            name: "Lagna".to_string(),
            symbol: "D1".to_string(),
            ascendant: "Scorpio".to_string(),
            planets,
            houses: vec![
                HouseData {
                    sign: "Scorpio".to_string(),
                    lord: "Mars".to_string(),
                    extra: BTreeMap::new(),
                },
                HouseData {
                    sign: "Sagittarius".to_string(),
                    lord: "Jupiter".to_string(),
                    extra: BTreeMap::new(),
                },
            ],
            classifications: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_absent_chart_writes_nothing() {
        let mut out = String::new();
        write_text(&mut out, None).unwrap();
        assert!(out.is_empty());
        assert_eq!(present(None, true).unwrap(), None);
    }

    #[test]
    fn test_planets_follow_traditional_order() {
        let text = render_text(&small_chart());
        let asc = text.find("  - Ascendant:").unwrap();
        let sun = text.find("  - Sun:").unwrap();
        let venus = text.find("  - Venus:").unwrap();
        let uranus = text.find("  - Uranus:").unwrap();
        assert!(asc < sun && sun < venus && venus < uranus);
    }

    #[test]
    fn test_text_layout() {
        let text = render_text(&small_chart());
        assert!(text.starts_with("Lagna Chart (D1)\nAscendant: Scorpio\nPlanets:\n"));
        assert!(text.contains(
            "  - Sun:\n    - Sign: Cancer\n    - House: 9\n    - Nakshatra: Pushya\n    - Nakshatra Lord: Saturn\n"
        ));
        assert!(text.ends_with(
            "Houses:\n  - House 1:\n    - Sign: Scorpio\n    - Lord: Mars\n  - House 2:\n    - Sign: Sagittarius\n    - Lord: Jupiter\n"
        ));
        assert!(!text.contains("Classifications:"));
    }

    #[test]
    fn test_chart_text_formats_like_render_text() {
        let chart = small_chart();
        let shown = format!("{}", ChartText(&chart));
        assert_eq!(shown, render_text(&chart));
        assert!(shown.starts_with("Lagna Chart (D1)\n"));
    }

    #[test]
    fn test_classifications_are_joined() {
        let mut chart = small_chart();
        let mut classes = BTreeMap::new();
        classes.insert(
            "benefics".to_string(),
            vec!["Jupiter".to_string(), "Venus".to_string()],
        );
        classes.insert("malefics".to_string(), vec![]);
        chart.classifications = Some(classes);
        let text = render_text(&chart);
        assert!(text.contains("Classifications:\n  - benefics: Jupiter, Venus\n  - malefics: \n"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut chart = small_chart();
        chart
            .extra
            .insert("divisional_factor".to_string(), serde_json::json!(1));
        for pretty in [true, false] {
            let json = to_json(&chart, pretty).unwrap();
            assert_eq!(from_json(&json).unwrap(), chart);
        }
    }
}
