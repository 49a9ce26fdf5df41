//! New-site GeoJSON export.

use super::ensure_parent;
use crate::importers::geojson::crs_member;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use sitecover_core::{CandidateId, CandidateSet};
use std::path::Path;

/// FeatureCollection of the chosen sites with a `site_id` property.
pub fn new_sites_geojson(candidates: &CandidateSet, chosen: &[CandidateId]) -> Result<Value> {
    let sites = candidates.select(chosen)?;
    let features: Vec<Value> = sites
        .iter()
        .map(|site| {
            let mut properties = json!({ "site_id": site.id.value() });
            if let Some(label) = &site.label {
                properties["label"] = json!(label);
            }
            json!({
                "type": "Feature",
                "properties": properties,
                "geometry": {
                    "type": "Point",
                    "coordinates": [site.location.x, site.location.y],
                },
            })
        })
        .collect();
    Ok(json!({
        "type": "FeatureCollection",
        "crs": crs_member(&candidates.crs),
        "features": features,
    }))
}

pub fn write_new_sites(path: &Path, candidates: &CandidateSet, chosen: &[CandidateId]) -> Result<()> {
    let collection = new_sites_geojson(candidates, chosen)?;
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(&collection)?;
    std::fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::{geojson, LayerOptions};
    use sitecover_core::{Crs, Point};

    fn candidates() -> CandidateSet {
        CandidateSet::from_labelled(
            Crs::default_planar(),
            [
                (Point::new(318000.0, 176000.0), Some("way/1".to_string())),
                (Point::new(319000.0, 177000.0), None),
                (Point::new(320000.0, 178000.0), None),
            ],
        )
    }

    #[test]
    fn test_site_ids_and_coordinates() {
        let chosen = [CandidateId::new(2), CandidateId::new(0)];
        let value = new_sites_geojson(&candidates(), &chosen).unwrap();
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["site_id"], 2);
        assert_eq!(features[1]["properties"]["label"], "way/1");
        assert_eq!(features[0]["geometry"]["coordinates"][0], 320000.0);

        // readable as a candidate layer in the same CRS
        let text = value.to_string();
        let back = geojson::read_candidates(&text, &LayerOptions::default()).unwrap();
        assert_eq!(back.crs, Crs::default_planar());
        assert_eq!(back.sites[0].location, Point::new(320000.0, 178000.0));
    }

    #[test]
    fn test_unknown_id_rejected() {
        assert!(new_sites_geojson(&candidates(), &[CandidateId::new(9)]).is_err());
    }
}
