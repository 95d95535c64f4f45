//! World Geometry Module
//! Loads country boundaries from a GeoJSON FeatureCollection and answers
//! point-in-country queries.

use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use geojson::feature::Id;
use geojson::{Feature, GeoJson};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Natural Earth marks codes it could not assign with this value.
const UNASSIGNED_ISO: &str = "-99";

const ISO_KEYS: [&str; 4] = ["ISO_A3", "ADM0_A3", "iso_a3", "adm0_a3"];
const NAME_KEYS: [&str; 4] = ["NAME", "ADMIN", "name", "admin"];

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Cannot read geometry {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid GeoJSON: {0}")]
    Format(#[from] geojson::Error),
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// A country as drawn on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub iso_code: Option<String>,
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl CountryShape {
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    pub fn bounds_area(&self) -> f64 {
        self.bounds()
            .map(|rect| rect.width() * rect.height())
            .unwrap_or(0.0)
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.geometry.contains(&Point::new(lon, lat))
    }
}

/// All country shapes of a boundary file.
#[derive(Debug, Clone, Default)]
pub struct WorldGeometry {
    pub countries: Vec<CountryShape>,
}

impl WorldGeometry {
    pub fn load(path: &Path) -> Result<Self, GeometryError> {
        let text = fs::read_to_string(path).map_err(|source| GeometryError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let world = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            countries = world.countries.len(),
            "Loaded world geometry"
        );
        Ok(world)
    }

    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
            return Err(GeometryError::NotFeatureCollection);
        };

        let mut countries = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(geometry) = feature.geometry.clone() else {
                continue;
            };
            let geometry = match geo::Geometry::<f64>::try_from(geometry)? {
                geo::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                geo::Geometry::MultiPolygon(multi) => multi,
                _ => {
                    tracing::debug!("Skipping non-polygon feature");
                    continue;
                }
            };

            countries.push(CountryShape {
                iso_code: iso_code(&feature),
                name: first_string(&feature, &NAME_KEYS),
                geometry,
            });
        }
        Ok(Self { countries })
    }

    pub fn find(&self, iso_code: &str) -> Option<&CountryShape> {
        self.countries
            .iter()
            .find(|c| c.iso_code.as_deref() == Some(iso_code))
    }
}

fn first_string(feature: &Feature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| feature.property(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty() && *value != UNASSIGNED_ISO)
        .map(str::to_string)
}

fn iso_code(feature: &Feature) -> Option<String> {
    first_string(feature, &ISO_KEYS).or_else(|| match &feature.id {
        Some(Id::String(id)) if !id.is_empty() && id != UNASSIGNED_ISO => Some(id.clone()),
        _ => None,
    })
}
