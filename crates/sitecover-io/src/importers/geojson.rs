//! GeoJSON point layers.
//!
//! Reads FeatureCollections of `Point` features. The layer CRS comes from the
//! legacy `crs` member written by most GIS tools
//! (`{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::27700"}}`);
//! without one the RFC 7946 default (CRS84) applies, which is rejected as
//! geographic unless a CRS is supplied.

use super::{LayerOptions, DEFAULT_DEMAND_ID_FIELD, DEFAULT_WEIGHT_FIELD};
use crate::error::ImportError;
use serde::Deserialize;
use serde_json::{Map, Value};
use sitecover_core::{
    CandidateSet, Crs, DemandSet, DemandUnit, Point, SiteCoverError, SiteCoverResult, SupplySet,
};

const RFC7946_CRS: &str = "OGC:CRS84";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<NamedCrs>,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct NamedCrs {
    properties: NamedCrsProperties,
}

#[derive(Debug, Deserialize)]
struct NamedCrsProperties {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

struct Layer {
    crs: Crs,
    features: Vec<Feature>,
}

fn parse(text: &str, options: &LayerOptions) -> SiteCoverResult<Layer> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    if collection.kind != "FeatureCollection" {
        return Err(SiteCoverError::Parse(format!(
            "expected a FeatureCollection, found {}",
            collection.kind
        )));
    }
    let recorded = collection
        .crs
        .map(|c| Crs::parse(&c.properties.name))
        .transpose()?;
    let crs = options.resolve_crs(recorded, Crs::parse(RFC7946_CRS)?)?;
    Ok(Layer {
        crs,
        features: collection.features,
    })
}

impl Feature {
    fn point(&self, feature: usize) -> SiteCoverResult<Point> {
        let geometry = self.geometry.as_ref().ok_or(ImportError::BadFeature {
            feature,
            message: "missing geometry".into(),
        })?;
        if geometry.kind != "Point" {
            return Err(ImportError::NonPointGeometry {
                feature,
                kind: geometry.kind.clone(),
            }
            .into());
        }
        match geometry.coordinates.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Ok(Point::new(x, y)),
                _ => Err(bad(feature, "coordinates are not numbers")),
            },
            _ => Err(bad(feature, "Point needs two coordinates")),
        }
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(name))
            .filter(|v| !v.is_null())
    }
}

fn bad(feature: usize, message: &str) -> SiteCoverError {
    ImportError::BadFeature {
        feature,
        message: message.to_string(),
    }
    .into()
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn read_demand(text: &str, options: &LayerOptions) -> SiteCoverResult<DemandSet> {
    let layer = parse(text, options)?;
    let id_field = options.id_field.as_deref().unwrap_or(DEFAULT_DEMAND_ID_FIELD);
    let weight_field = options.weight_field.as_deref().unwrap_or(DEFAULT_WEIGHT_FIELD);

    let units = layer
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| {
            let id = feature
                .property(id_field)
                .or_else(|| feature.property("id"))
                .or(feature.id.as_ref())
                .and_then(as_text)
                .ok_or_else(|| bad(idx, &format!("no '{id_field}' or 'id' identifier")))?;
            let mut unit = DemandUnit::new(id, feature.point(idx)?);
            if let Some(value) = feature.property(weight_field) {
                let weight = as_number(value).ok_or_else(|| {
                    bad(idx, &format!("'{weight_field}' is not a number"))
                })?;
                unit = unit.with_weight(weight);
            }
            Ok(unit)
        })
        .collect::<SiteCoverResult<Vec<_>>>()?;

    Ok(DemandSet::new(layer.crs, units))
}

pub fn read_candidates(text: &str, options: &LayerOptions) -> SiteCoverResult<CandidateSet> {
    let layer = parse(text, options)?;
    let entries = layer
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| {
            let label = options
                .id_field
                .as_deref()
                .and_then(|name| feature.property(name))
                .and_then(as_text);
            Ok((feature.point(idx)?, label))
        })
        .collect::<SiteCoverResult<Vec<_>>>()?;
    Ok(CandidateSet::from_labelled(layer.crs, entries))
}

pub fn read_supply(text: &str, options: &LayerOptions) -> SiteCoverResult<SupplySet> {
    let layer = parse(text, options)?;
    let points = layer
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| feature.point(idx))
        .collect::<SiteCoverResult<Vec<_>>>()?;
    Ok(SupplySet::new(layer.crs, points))
}

/// Legacy GeoJSON `crs` member for a CRS.
pub fn crs_member(crs: &Crs) -> Value {
    let name = match crs.as_str().split_once(':') {
        Some(("EPSG", code)) => format!("urn:ogc:def:crs:EPSG::{code}"),
        Some(("OGC", "CRS84")) => "urn:ogc:def:crs:OGC:1.3:CRS84".to_string(),
        _ => crs.as_str().to_string(),
    };
    serde_json::json!({ "type": "name", "properties": { "name": name } })
}
