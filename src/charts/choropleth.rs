//! Choropleth Data Module
//! Joins the latest snapshot to country shapes and maps total cases onto a
//! continuous red color scale.

use crate::charts::geo::{CountryShape, WorldGeometry};
use crate::data::{DataProcessor, ProcessorError, ISO_CODE, LOCATION, TOTAL_CASES};
use polars::prelude::*;

pub const MAP_TITLE: &str = "Total COVID-19 Cases by Country";

/// ColorBrewer "Reds", light to dark.
const REDS: [(u8, u8, u8); 9] = [
    (255, 245, 240),
    (254, 224, 210),
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

/// Linear color scale over a value range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `value` in the range, clamped to 0..=1.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> (u8, u8, u8) {
        Self::color_at(self.normalize(value))
    }

    /// Interpolated ramp color for `t` in 0..=1.
    pub fn color_at(t: f64) -> (u8, u8, u8) {
        let scaled = t.clamp(0.0, 1.0) * (REDS.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(REDS.len() - 1);
        let frac = scaled - lower as f64;

        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (r0, g0, b0) = REDS[lower];
        let (r1, g1, b1) = REDS[upper];
        (mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

/// A shaded country.
#[derive(Debug, Clone)]
pub struct ChoroplethRegion {
    pub iso_code: String,
    pub location: String,
    pub total_cases: f64,
    pub shape: CountryShape,
}

/// Everything needed to draw and hit-test the world map.
#[derive(Debug, Clone)]
pub struct ChoroplethMap {
    pub title: String,
    /// Every country of the boundary file, drawn unshaded underneath.
    pub land: Vec<CountryShape>,
    /// Countries with data, largest first.
    pub regions: Vec<ChoroplethRegion>,
    pub scale: ColorScale,
}

impl ChoroplethMap {
    /// Join snapshot rows to shapes by ISO code. Rows without a matching
    /// shape, code or case count are left off the map.
    pub fn build(snapshot: &DataFrame, world: &WorldGeometry) -> Result<Self, ProcessorError> {
        DataProcessor::require_columns(snapshot, &[LOCATION, ISO_CODE, TOTAL_CASES])?;

        let locations = snapshot.column(LOCATION)?.cast(&DataType::String)?;
        let iso_codes = snapshot.column(ISO_CODE)?.cast(&DataType::String)?;
        let cases = snapshot.column(TOTAL_CASES)?.cast(&DataType::Float64)?;

        let mut regions = Vec::new();
        let mut omitted = 0usize;
        for ((location, iso_code), total_cases) in locations
            .str()?
            .iter()
            .zip(iso_codes.str()?.iter())
            .zip(cases.f64()?.iter())
        {
            let region = iso_code.zip(total_cases.filter(|v| v.is_finite())).and_then(
                |(iso_code, total_cases)| {
                    let shape = world.find(iso_code)?;
                    Some(ChoroplethRegion {
                        iso_code: iso_code.to_string(),
                        location: location.unwrap_or(iso_code).to_string(),
                        total_cases,
                        shape: shape.clone(),
                    })
                },
            );
            match region {
                Some(region) => regions.push(region),
                None => omitted += 1,
            }
        }

        regions.sort_by(|a, b| b.shape.bounds_area().total_cmp(&a.shape.bounds_area()));

        let scale = regions
            .iter()
            .map(|r| r.total_cases)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .map(|(lo, hi)| ColorScale::new(lo, hi))
            .unwrap_or(ColorScale::new(0.0, 1.0));

        tracing::debug!(shaded = regions.len(), omitted, "Built choropleth regions");

        Ok(Self {
            title: MAP_TITLE.to_string(),
            land: world.countries.clone(),
            regions,
            scale,
        })
    }

    /// The shaded country under a map position. Enclaves win over the
    /// country around them.
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<&ChoroplethRegion> {
        self.regions
            .iter()
            .filter(|r| r.shape.contains(lon, lat))
            .min_by(|a, b| a.shape.bounds_area().total_cmp(&b.shape.bounds_area()))
    }

    pub fn region_color(&self, region: &ChoroplethRegion) -> (u8, u8, u8) {
        self.scale.color(region.total_cases)
    }
}
