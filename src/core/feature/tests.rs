use super::*;
use serde_json::json;

fn line(id: &str) -> Feature {
    Feature::new(
        id,
        Geometry::LineString(vec![vec![0.0, 0.0], vec![1.5, 1.0]]),
        Properties::new(),
    )
}

#[test]
fn test_to_geojson_shape() {
    let mut feature = line("a");
    feature.properties.insert("name".into(), json!("Weg"));

    assert_eq!(
        feature.to_geojson(),
        json!({
            "id": "a",
            "type": "Feature",
            "properties": { "name": "Weg" },
            "geometry": { "type": "LineString", "coordinates": [[0, 0], [1.5, 1]] }
        })
    );
}

#[test]
fn test_set_coordinates_reports_change_only_when_different() {
    let mut feature = line("a");
    let same = feature.coordinates();
    assert!(!feature.set_coordinates(&same).expect("gleiche Form"));
    assert!(feature
        .set_coordinates(&json!([[0, 0], [2, 2]]))
        .expect("gleiche Form"));
    assert_eq!(feature.coordinates(), json!([[0, 0], [2, 2]]));
}

#[test]
fn test_set_coordinates_rejects_other_dimensionality() {
    let mut feature = line("a");
    assert!(feature.set_coordinates(&json!([0, 0])).is_err());
    assert_eq!(feature.coordinates(), json!([[0, 0], [1.5, 1]]));
}

#[test]
fn test_replace_geometry_keeps_declared_type() {
    let mut feature = line("a");
    assert!(!feature.replace_geometry(Geometry::Point(vec![0.0, 0.0])));
    assert_eq!(feature.geometry_type(), GeometryType::LineString);
}

#[test]
fn test_number_value_keeps_fractions() {
    assert_eq!(number_value(2.0), json!(2));
    assert_eq!(number_value(-0.25), json!(-0.25));
    assert_eq!(number_value(f64::NAN), Value::Null);
}

#[test]
fn test_integral_floats_come_back_as_integers() {
    let input = json!([[1.0, 2.0], [0.5, 3]]);
    let feature = Feature::new(
        "l",
        Geometry::decode(GeometryType::LineString, &input).expect("gültige Linie"),
        Properties::new(),
    );

    let coordinates = &feature.to_geojson()["geometry"]["coordinates"];

    // Zahlform der Eingabe geht verloren, der Zahlenwert nicht
    assert_eq!(coordinates, &json!([[1, 2], [0.5, 3]]));
    assert_ne!(coordinates, &input);
    assert_eq!(coordinates[0][0].as_f64(), input[0][0].as_f64());
}
