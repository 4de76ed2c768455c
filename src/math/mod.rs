pub mod polygon_2d;

/// UV-space point type.
pub type Point2 = nalgebra::Point2<f64>;

/// Mesh-space point type.
pub type Point3 = nalgebra::Point3<f64>;

/// UV-space displacement type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Quantizes a UV position to integer grid coordinates for hashing.
///
/// Positions that fall in the same cell of a grid with spacing `tolerance`
/// produce the same key.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn quantize(p: &Point2, tolerance: f64) -> (i64, i64) {
    let inv_grid = 1.0 / tolerance.max(TOLERANCE);
    (
        (p.x * inv_grid).round() as i64,
        (p.y * inv_grid).round() as i64,
    )
}

/// Arithmetic mean of a set of UV positions, or `None` for an empty set.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn average(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantize_merges_close_points() {
        let a = Point2::new(0.25, 0.5);
        let b = Point2::new(0.250_000_000_1, 0.5);
        assert_eq!(quantize(&a, 1e-6), quantize(&b, 1e-6));
    }

    #[test]
    fn quantize_separates_distinct_points() {
        let a = Point2::new(0.25, 0.5);
        let b = Point2::new(0.26, 0.5);
        assert_ne!(quantize(&a, 1e-6), quantize(&b, 1e-6));
    }

    #[test]
    fn average_of_points() {
        let avg = average(&[Point2::new(0.0, 0.0), Point2::new(1.0, 2.0)]);
        let avg = avg.unwrap_or_else(Point2::origin);
        assert_relative_eq!(avg.x, 0.5);
        assert_relative_eq!(avg.y, 1.0);
        assert!(average(&[]).is_none());
    }
}
