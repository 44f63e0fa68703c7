use foundation::ids::FeatureId;
use foundation::math::{Crs, Vec2, transform};
use scene::{CIRCLE_SEGMENTS, Feature, FeatureDraft, Geometry};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoJsonError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

/// Which coordinate systems sit on either side of the codec.
///
/// `data` is what the document holds, `features` is what the store holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Projections {
    pub data: Crs,
    pub features: Crs,
}

impl Default for Projections {
    /// Geographic documents, Web Mercator features.
    fn default() -> Self {
        Self {
            data: Crs::Geographic,
            features: Crs::WebMercator,
        }
    }
}

/// Parses a FeatureCollection into store drafts.
///
/// All-or-nothing: any malformed feature fails the whole document.
pub fn read_features(
    payload: &str,
    proj: Projections,
) -> Result<Vec<FeatureDraft>, GeoJsonError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| GeoJsonError::Json(e.to_string()))?;
    read_features_value(&value, proj)
}

pub fn read_features_value(
    value: &Value,
    proj: Projections,
) -> Result<Vec<FeatureDraft>, GeoJsonError> {
    let obj = value.as_object().ok_or(GeoJsonError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(GeoJsonError::NotAFeatureCollection)?;
    if ty != "FeatureCollection" {
        return Err(GeoJsonError::NotAFeatureCollection);
    }

    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(GeoJsonError::NotAFeatureCollection)?;

    let mut out = Vec::with_capacity(features_val.len());
    for (index, feat_val) in features_val.iter().enumerate() {
        let draft = read_feature(feat_val, proj)
            .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
        out.push(draft);
    }
    Ok(out)
}

fn read_feature(value: &Value, proj: Projections) -> Result<FeatureDraft, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type")?;
    if ty != "Feature" {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(FeatureId::new(s.clone())),
        Some(Value::Number(n)) => Some(FeatureId::new(n.to_string())),
        None | Some(Value::Null) => None,
        Some(_) => return Err("feature id must be a string or number".to_string()),
    };

    let properties = match obj.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        None | Some(Value::Null) => Map::new(),
        Some(_) => return Err("feature properties must be an object or null".to_string()),
    };

    let geometry = match obj.get("geometry") {
        None => return Err("feature missing geometry".to_string()),
        Some(Value::Null) => None,
        Some(g) => {
            let parsed = parse_geometry(g)?;
            Some(parsed.map_coords(&mut |p| transform(p, proj.data, proj.features)))
        }
    };

    Ok(FeatureDraft {
        id,
        geometry,
        properties,
    })
}

/// Serializes features as a FeatureCollection value.
///
/// Circles have no GeoJSON representation and are written as polygons.
pub fn write_features_value(features: &[Feature], proj: Projections) -> Value {
    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );

    let mut out: Vec<Value> = Vec::with_capacity(features.len());
    for feat in features {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        fobj.insert("id".to_string(), Value::String(feat.id.to_string()));
        let geometry = match &feat.geometry {
            Some(g) => {
                let g = g
                    .circle_to_polygon(CIRCLE_SEGMENTS)
                    .map_coords(&mut |p| transform(p, proj.features, proj.data));
                geometry_to_value(&g)
            }
            None => Value::Null,
        };
        fobj.insert("geometry".to_string(), geometry);
        fobj.insert(
            "properties".to_string(),
            Value::Object(feat.properties.clone()),
        );
        out.push(Value::Object(fobj));
    }

    root.insert("features".to_string(), Value::Array(out));
    Value::Object(root)
}

/// Pretty-printed (2-space indented) FeatureCollection text.
pub fn write_features_pretty(
    features: &[Feature],
    proj: Projections,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&write_features_value(features, proj))
}

fn geometry_to_value(geom: &Geometry) -> Value {
    fn path(p: &[Vec2]) -> Value {
        Value::Array(p.iter().map(|v| position(*v)).collect())
    }
    fn paths(ps: &[Vec<Vec2>]) -> Value {
        Value::Array(ps.iter().map(|p| path(p)).collect())
    }

    let coordinates = match geom {
        Geometry::Point(p) => position(*p),
        Geometry::MultiPoint(ps) | Geometry::LineString(ps) => path(ps),
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => paths(lines),
        Geometry::MultiPolygon(polys) => Value::Array(polys.iter().map(|p| paths(p)).collect()),
        Geometry::Circle { .. } => {
            return geometry_to_value(&geom.circle_to_polygon(CIRCLE_SEGMENTS));
        }
    };

    let mut obj = Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(geom.geometry_type().as_str().to_string()),
    );
    obj.insert("coordinates".to_string(), coordinates);
    Value::Object(obj)
}

fn position(p: Vec2) -> Value {
    Value::Array(vec![Value::from(p.x), Value::from(p.y)])
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type")?;

    let coords = obj
        .get("coordinates")
        .ok_or_else(|| format!("{ty} geometry missing coordinates"))?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_nested(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_nested(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons")?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_nested(poly)?);
            }
            Ok(Geometry::MultiPolygon(out))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

/// `[x, y]` or `[x, y, z]`; elevation is dropped.
fn parse_position(coords: &Value) -> Result<Vec2, String> {
    let arr = coords.as_array().ok_or("position must be an array")?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("longitude must be a number")?;
    let lat = arr[1].as_f64().ok_or("latitude must be a number")?;
    Ok(Vec2::new(lon, lat))
}

fn parse_positions(coords: &Value) -> Result<Vec<Vec2>, String> {
    let arr = coords.as_array().ok_or("coordinates must be an array")?;
    arr.iter().map(parse_position).collect()
}

fn parse_nested(coords: &Value) -> Result<Vec<Vec<Vec2>>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of position arrays")?;
    arr.iter().map(parse_positions).collect()
}
