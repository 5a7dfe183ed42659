//! Vertex-Zugriff über Koordinatenpfade (`"0.3"` = Ring 0, Vertex 3).
//!
//! Pfadtiefe je Typ:
//! - Point: `""`
//! - LineString / MultiPoint: `"i"`
//! - Polygon: `"ring.i"`, MultiLineString: `"line.i"`
//! - MultiPolygon: `"polygon.ring.i"`
//!
//! Ring-Indizes beziehen sich auf den offenen Ring (ohne Schluss-Vertex);
//! der Schluss-Vertex wird nach jeder Mutation neu gesetzt.

use super::geometry::{open_ring_len, Geometry, Position};
use crate::shared::{DrawError, Result};

/// Zerlegt einen Pfad in Indizes. Leerer Pfad → keine Indizes.
pub fn parse_path(path: &str) -> Result<Vec<usize>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('.')
        .map(|part| part.parse::<usize>().map_err(|_| invalid(path)))
        .collect()
}

fn invalid(path: &str) -> DrawError {
    DrawError::InvalidCoordinatePath {
        path: path.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
enum VertexOp {
    Update(f64, f64),
    Insert(f64, f64),
    Remove,
}

fn set_xy(pos: &mut Position, x: f64, y: f64) {
    if pos.len() < 2 {
        pos.resize(2, 0.0);
    }
    pos[0] = x;
    pos[1] = y;
}

fn apply_seq(seq: &mut Vec<Position>, i: usize, op: VertexOp) -> bool {
    match op {
        VertexOp::Update(x, y) => match seq.get_mut(i) {
            Some(pos) => {
                set_xy(pos, x, y);
                true
            }
            None => false,
        },
        VertexOp::Insert(x, y) => {
            if i > seq.len() {
                return false;
            }
            seq.insert(i, vec![x, y]);
            true
        }
        VertexOp::Remove => {
            if i >= seq.len() {
                return false;
            }
            seq.remove(i);
            true
        }
    }
}

fn apply_ring(ring: &mut Vec<Position>, i: usize, op: VertexOp) -> bool {
    let closed = ring.len() > 1 && ring.first() == ring.last();
    if closed {
        ring.pop();
    }
    let applied = apply_seq(ring, i, op);
    if closed && !ring.is_empty() {
        let first = ring[0].clone();
        ring.push(first);
    }
    applied
}

/// Ohne gültigen Außenring entfällt das ganze Polygon, Löcher unter
/// 3 Vertices entfallen einzeln.
fn prune_polygon(rings: &mut Vec<Vec<Position>>) {
    if rings.first().is_some_and(|outer| open_ring_len(outer) < 3) {
        rings.clear();
        return;
    }
    rings.retain(|ring| open_ring_len(ring) >= 3);
}

impl Geometry {
    /// Liest den Vertex am Pfad.
    pub fn get_coordinate(&self, path: &str) -> Result<Position> {
        let ids = parse_path(path)?;
        let found = match (self, ids.as_slice()) {
            (Geometry::Point(p), []) => Some(p),
            (Geometry::LineString(seq), [i]) | (Geometry::MultiPoint(seq), [i]) => seq.get(*i),
            (Geometry::Polygon(rings), [r, i]) => rings
                .get(*r)
                .filter(|ring| *i < open_ring_len(ring))
                .and_then(|ring| ring.get(*i)),
            (Geometry::MultiLineString(lines), [l, i]) => {
                lines.get(*l).and_then(|line| line.get(*i))
            }
            (Geometry::MultiPolygon(polygons), [p, r, i]) => polygons
                .get(*p)
                .and_then(|rings| rings.get(*r))
                .filter(|ring| *i < open_ring_len(ring))
                .and_then(|ring| ring.get(*i)),
            _ => None,
        };
        found.cloned().ok_or_else(|| invalid(path))
    }

    /// Setzt x/y des Vertex am Pfad (weitere Dimensionen bleiben erhalten).
    pub fn update_coordinate(&mut self, path: &str, x: f64, y: f64) -> Result<()> {
        if let (Geometry::Point(p), true) = (&mut *self, path.is_empty()) {
            set_xy(p, x, y);
            return Ok(());
        }
        self.apply(path, VertexOp::Update(x, y))
    }

    /// Fügt einen Vertex vor dem Pfad-Index ein (Index == Länge hängt an).
    pub fn add_coordinate(&mut self, path: &str, x: f64, y: f64) -> Result<()> {
        self.apply(path, VertexOp::Insert(x, y))
    }

    /// Entfernt den Vertex am Pfad.
    pub fn remove_coordinate(&mut self, path: &str) -> Result<()> {
        self.remove_coordinates(&[path])
    }

    /// Entfernt mehrere Vertices in einem Schritt.
    ///
    /// Alle Pfade beziehen sich auf die Geometrie vor dem Aufruf. Degenerierte
    /// Ringe und Polygone werden erst nach dem letzten Entfernen bereinigt,
    /// damit sich keine Indizes verschieben. Ein ungültiger Pfad bricht ohne
    /// Änderung ab.
    pub fn remove_coordinates<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<()> {
        let mut parsed = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            if matches!(self, Geometry::Point(_)) {
                return Err(invalid(path));
            }
            self.get_coordinate(path)?;
            parsed.push((parse_path(path)?, path));
        }
        // Absteigend: niedrigere Indizes im selben Ring bleiben stabil
        parsed.sort_by(|a, b| b.0.cmp(&a.0));
        parsed.dedup_by(|a, b| a.0 == b.0);

        for (_, path) in &parsed {
            self.apply(path, VertexOp::Remove)?;
        }
        self.prune_degenerate_rings();
        Ok(())
    }

    fn prune_degenerate_rings(&mut self) {
        match self {
            Geometry::Polygon(rings) => prune_polygon(rings),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter_mut().for_each(prune_polygon);
                polygons.retain(|rings| !rings.is_empty());
            }
            _ => {}
        }
    }

    fn apply(&mut self, path: &str, op: VertexOp) -> Result<()> {
        let ids = parse_path(path)?;
        let applied = match (self, ids.as_slice()) {
            (Geometry::LineString(seq), [i]) | (Geometry::MultiPoint(seq), [i]) => {
                apply_seq(seq, *i, op)
            }
            (Geometry::Polygon(rings), [r, i]) => rings
                .get_mut(*r)
                .is_some_and(|ring| apply_ring(ring, *i, op)),
            (Geometry::MultiLineString(lines), [l, i]) => lines
                .get_mut(*l)
                .is_some_and(|line| apply_seq(line, *i, op)),
            (Geometry::MultiPolygon(polygons), [p, r, i]) => polygons
                .get_mut(*p)
                .and_then(|rings| rings.get_mut(*r))
                .is_some_and(|ring| apply_ring(ring, *i, op)),
            _ => false,
        };
        if applied {
            Ok(())
        } else {
            Err(invalid(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Geometry {
        Geometry::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![4.0, 0.0],
            vec![4.0, 4.0],
            vec![0.0, 4.0],
            vec![0.0, 0.0],
        ]])
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(parse_path("").expect("leer ok"), Vec::<usize>::new());
        assert_eq!(parse_path("0.12").expect("gültig"), vec![0, 12]);
        assert!(parse_path("0.x").is_err());
        assert!(parse_path("-1").is_err());
    }

    #[test]
    fn test_update_first_ring_vertex_keeps_ring_closed() {
        let mut polygon = square();
        polygon
            .update_coordinate("0.0", -1.0, -1.0)
            .expect("Vertex existiert");
        let Geometry::Polygon(rings) = &polygon else {
            panic!("Polygon erwartet");
        };
        assert_eq!(rings[0].first(), Some(&vec![-1.0, -1.0]));
        assert_eq!(rings[0].last(), Some(&vec![-1.0, -1.0]));
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn test_closing_vertex_is_not_addressable() {
        let polygon = square();
        assert!(polygon.get_coordinate("0.3").is_ok());
        assert!(polygon.get_coordinate("0.4").is_err());
    }

    #[test]
    fn test_remove_ring_vertex_drops_degenerate_ring() {
        let mut polygon = square();
        polygon.remove_coordinate("0.1").expect("Vertex existiert");
        assert!(polygon.is_valid());
        polygon.remove_coordinate("0.1").expect("Vertex existiert");
        let Geometry::Polygon(rings) = &polygon else {
            panic!("Polygon erwartet");
        };
        assert!(rings.is_empty(), "Ring mit 2 Vertices muss entfallen");
    }

    #[test]
    fn test_add_coordinate_on_line() {
        let mut line = Geometry::LineString(vec![vec![0.0, 0.0], vec![2.0, 2.0]]);
        line.add_coordinate("1", 1.0, 1.5).expect("Index gültig");
        assert_eq!(line.get_coordinate("1").expect("Vertex"), vec![1.0, 1.5]);
        assert!(line.add_coordinate("9", 0.0, 0.0).is_err());
    }

    #[test]
    fn test_point_path_rules() {
        let mut point = Geometry::Point(vec![1.0, 2.0, 30.0]);
        point.update_coordinate("", 5.0, 6.0).expect("Point-Pfad leer");
        assert_eq!(point.get_coordinate("").expect("Vertex"), vec![5.0, 6.0, 30.0]);
        assert!(point.remove_coordinate("").is_err());
        assert!(point.get_coordinate("0").is_err());
    }

    #[test]
    fn test_multi_polygon_removes_empty_polygon() {
        let Geometry::Polygon(rings) = square() else {
            unreachable!()
        };
        let mut multi = Geometry::MultiPolygon(vec![rings.clone(), rings]);
        multi.remove_coordinate("1.0.0").expect("Vertex existiert");
        multi.remove_coordinate("1.0.0").expect("Vertex existiert");
        let Geometry::MultiPolygon(polygons) = &multi else {
            panic!("MultiPolygon erwartet");
        };
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn test_remove_coordinates_keeps_following_polygons_in_place() {
        let Geometry::Polygon(rings) = square() else {
            unreachable!()
        };
        let shifted: Vec<Vec<Position>> = rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|pos| vec![pos[0] + 10.0, pos[1]])
                    .collect()
            })
            .collect();
        let mut multi =
            Geometry::MultiPolygon(vec![rings.clone(), rings.clone(), shifted.clone()]);

        multi
            .remove_coordinates(&["1.0.0", "1.0.1", "1.0.2"])
            .expect("Vertices existieren");

        assert_eq!(multi, Geometry::MultiPolygon(vec![rings, shifted]));
    }

    #[test]
    fn test_remove_coordinates_rejects_invalid_path_without_change() {
        let mut polygon = square();
        assert!(polygon.remove_coordinates(&["0.1", "0.4"]).is_err());
        assert_eq!(polygon, square());
    }

    #[test]
    fn test_update_coordinate_with_computed_offsets() {
        let mut line = Geometry::LineString(vec![vec![0.1, 0.2], vec![1.0, 1.0]]);
        let pos = line.get_coordinate("0").expect("Vertex");
        line.update_coordinate("0", pos[0] + 0.2, pos[1] * 3.0)
            .expect("Vertex existiert");
        let moved = line.get_coordinate("0").expect("Vertex");
        assert_relative_eq!(moved[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(moved[1], 0.6, epsilon = 1e-12);
    }
}
