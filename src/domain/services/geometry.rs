use geojson::{Feature, Geometry, Value};

/// 任意數量幾何的經緯度外框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn of_features<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Option<Self> {
        Self::of_geometries(features.into_iter().filter_map(|f| f.geometry.as_ref()))
    }

    pub fn of_geometries<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for geometry in geometries {
            visit_positions(&geometry.value, &mut |position| {
                // 座標至少要有經緯度
                if position.len() < 2 {
                    return;
                }
                let (lon, lat) = (position[0], position[1]);
                bounds = Some(match bounds {
                    None => Bounds {
                        min_lon: lon,
                        min_lat: lat,
                        max_lon: lon,
                        max_lat: lat,
                    },
                    Some(b) => Bounds {
                        min_lon: b.min_lon.min(lon),
                        min_lat: b.min_lat.min(lat),
                        max_lon: b.max_lon.max(lon),
                        max_lat: b.max_lat.max(lat),
                    },
                });
            });
        }
        bounds
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// `[lat, lon]`，Leaflet 使用的順序
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        ]
    }

    /// `[[南, 西], [北, 東]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }
}

fn visit_positions(value: &Value, visit: &mut impl FnMut(&[f64])) {
    match value {
        Value::Point(position) => visit(position.as_slice()),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().for_each(|p| visit(p.as_slice()))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines
            .iter()
            .flat_map(|line| line.iter())
            .for_each(|p| visit(p.as_slice())),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|polygon| polygon.iter())
            .flat_map(|ring| ring.iter())
            .for_each(|p| visit(p.as_slice())),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .for_each(|g| visit_positions(&g.value, visit)),
    }
}
