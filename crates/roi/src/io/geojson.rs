use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::{
    error::Result,
    types::{LinesResult, Region},
};

fn mbr_polygon(region: &Region) -> Geometry {
    let mut ring: Vec<Vec<f64>> = region
        .geometry
        .mbr
        .iter()
        .map(|&[x, y]| vec![x, y])
        .collect();
    // GeoJSON rings are closed
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    Geometry::new(Value::Polygon(vec![ring]))
}

fn region_properties(line: usize, index: usize, region: &Region) -> JsonObject {
    let geometry = &region.geometry;
    let mut properties = JsonObject::new();
    properties.insert("line".to_string(), JsonValue::from(line));
    properties.insert("index".to_string(), JsonValue::from(index));
    properties.insert("x".to_string(), JsonValue::from(region.position()[0]));
    properties.insert("y".to_string(), JsonValue::from(region.position()[1]));
    properties.insert("width".to_string(), JsonValue::from(region.width()));
    properties.insert("height".to_string(), JsonValue::from(region.height()));
    properties.insert("surface".to_string(), JsonValue::from(region.surface()));
    properties.insert("mbr_width".to_string(), JsonValue::from(geometry.mbr_width));
    properties.insert("mbr_height".to_string(), JsonValue::from(geometry.mbr_height));
    properties.insert("mbr_surface".to_string(), JsonValue::from(geometry.mbr_surface));
    properties.insert("filling_factor".to_string(), JsonValue::from(geometry.filling_factor));
    properties.insert("degenerate".to_string(), JsonValue::from(geometry.degenerate));
    properties
}

impl LinesResult {
    /// Export region rectangles as a GeoJSON feature collection in pixel coordinates
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.region_count());

        for (line_index, line) in self.lines.iter().enumerate() {
            for (index, region) in line.regions.iter().enumerate() {
                features.push(Feature {
                    bbox: None,
                    geometry: Some(mbr_polygon(region)),
                    id: None,
                    properties: Some(region_properties(line_index, index, region)),
                    foreign_members: None,
                });
            }
        }

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("image_width".to_string(), JsonValue::from(self.image_width));
        foreign_members.insert("image_height".to_string(), JsonValue::from(self.image_height));
        foreign_members.insert("average_surface".to_string(), JsonValue::from(self.average_surface));
        foreign_members.insert("median_surface".to_string(), JsonValue::from(self.median_surface));
        foreign_members.insert("line_count".to_string(), JsonValue::from(self.lines.len()));
        foreign_members.insert("region_count".to_string(), JsonValue::from(self.region_count()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Save region rectangles to a GeoJSON file
    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let geojson = self.to_geojson()?;
        let json = serde_json::to_string_pretty(&geojson)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use crate::types::{Geometry, Line, LinesResult, Region, Roi};

    fn result_with_two_lines() -> LinesResult {
        let region = |x: u32, y: u32| {
            let roi = Roi {
                position: [x, y],
                width: 3,
                height: 4,
                surface: 12,
                mask: GrayImage::from_pixel(3, 4, Luma([255])),
            };
            Region { geometry: Geometry::from_roi(&roi), roi, data: vec![1; 4] }
        };
        LinesResult {
            lines: vec![
                Line { regions: vec![region(0, 0), region(5, 0)] },
                Line { regions: vec![region(2, 10)] },
            ],
            painted: None,
            mask: GrayImage::new(10, 20),
            average_surface: 12.0,
            median_surface: 12.0,
            image_width: 10,
            image_height: 20,
        }
    }

    #[test]
    fn one_feature_per_region() {
        let collection = result_with_two_lines().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 3);

        let last = &collection.features[2];
        let properties = last.properties.as_ref().unwrap();
        assert_eq!(properties["line"], 1);
        assert_eq!(properties["index"], 0);
        assert_eq!(properties["filling_factor"], 1.0);

        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members["region_count"], 3);
        assert_eq!(members["line_count"], 2);
    }

    #[test]
    fn rings_are_closed() {
        let collection = result_with_two_lines().to_geojson().unwrap();
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0].first(), rings[0].last());
                assert_eq!(rings[0][0], vec![0.0, 0.0]);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }
}
