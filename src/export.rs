// ===========================================================================
// GeoJSON Export
// ===========================================================================
//
// Merged lines as a FeatureCollection, for inspection in any GeoJSON viewer.
// Debug mode numbers every line and adds its start and end points as
// separate point features.

use crate::output::MergedLine;
use geo_types::Point;
use geojson::{Feature, FeatureCollection, JsonValue};
use serde_json::json;

fn line_properties(line: &MergedLine) -> serde_json::Map<String, JsonValue> {
    serde_json::Map::from_iter(vec![
        ("group".to_string(), json!(line.group)),
        ("weight".to_string(), json!(line.weight)),
        ("min_zoom".to_string(), json!(line.min_zoom)),
        ("active".to_string(), json!(line.active)),
        ("source_ids".to_string(), json!(line.source_ids)),
    ])
}

fn point_feature(point: Point, debug_id: usize, kind: &str) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&point))),
        id: None,
        properties: Some(serde_json::Map::from_iter(vec![
            ("debug_id".to_string(), json!(debug_id)),
            ("kind".to_string(), json!(kind)),
        ])),
        foreign_members: None,
    }
}

pub fn to_feature_collection(lines: &[MergedLine], debug: bool) -> FeatureCollection {
    let mut features: Vec<Feature> = Vec::with_capacity(lines.len());

    for (debug_id, line) in lines.iter().enumerate() {
        let mut properties = line_properties(line);
        if debug {
            properties.insert("debug_id".to_string(), json!(debug_id));
            properties.insert("length".to_string(), json!(line.length));
        }
        features.push(Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::from(&line.line)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });

        if debug {
            if let (Some(first), Some(last)) = (line.line.0.first(), line.line.0.last()) {
                features.push(point_feature(Point::from(*first), debug_id, "start"));
                features.push(point_feature(Point::from(*last), debug_id, "end"));
            }
        }
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString};
    use geojson::GeoJson;

    fn sample() -> Vec<MergedLine> {
        vec![MergedLine {
            line: LineString::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 }]),
            group: 2,
            weight: 1.5,
            min_zoom: 6,
            active: false,
            length: 5.0,
            source_ids: vec![11, 12],
        }]
    }

    #[test]
    fn test_plain_export() {
        let collection = to_feature_collection(&sample(), false);
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.property("group"), Some(&json!(2)));
        assert_eq!(feature.property("source_ids"), Some(&json!([11, 12])));
        assert!(feature.property("debug_id").is_none());

        let text = GeoJson::from(collection).to_string();
        assert!(text.contains("LineString"));
    }

    #[test]
    fn test_debug_export_adds_endpoints() {
        let collection = to_feature_collection(&sample(), true);
        assert_eq!(collection.features.len(), 3);
        assert_eq!(collection.features[0].property("length"), Some(&json!(5.0)));
        let kinds: Vec<_> = collection.features[1..]
            .iter()
            .filter_map(|f| f.property("kind"))
            .collect();
        assert_eq!(kinds, vec![&json!("start"), &json!("end")]);
    }
}
