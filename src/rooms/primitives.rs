//! Rectangle and point-set primitives drawn from the shared stream
//!
//! Every draw goes through [`uniform`], which always consumes exactly one
//! value from the stream (even for a degenerate range), so the draw order of
//! a synthesis run depends only on its configuration.

use rand::{Rng, RngCore};
use serde::Deserialize;

use crate::geometry::{Point, Polygon};

use super::RoomError;

/// One draw in `[min, max)`; a degenerate range still consumes the draw
pub(crate) fn uniform(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

/// Axis-aligned rectangle from its centre and side lengths
pub fn rectangle(x_center: f64, y_center: f64, delta_x: f64, delta_y: f64) -> Result<Polygon, RoomError> {
    if !(delta_x > 0.0) || !(delta_y > 0.0) {
        return Err(RoomError::invalid(format!(
            "rectangle sides must be positive, got {} x {}",
            delta_x, delta_y
        )));
    }
    Ok(Polygon::rectangle(
        x_center - delta_x / 2.0,
        y_center - delta_y / 2.0,
        x_center + delta_x / 2.0,
        y_center + delta_y / 2.0,
    )?)
}

/// Rectangle size rule shared by single rooms and clusters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RectangleSize {
    pub delta_x_min: f64,
    pub delta_x_max: f64,
    pub delta_y_min: f64,
    pub delta_y_max: f64,
}

impl Default for RectangleSize {
    fn default() -> Self {
        Self {
            delta_x_min: 2.0,
            delta_x_max: 15.0,
            delta_y_min: 2.0,
            delta_y_max: 15.0,
        }
    }
}

impl RectangleSize {
    pub fn new(delta_x: (f64, f64), delta_y: (f64, f64)) -> Self {
        Self {
            delta_x_min: delta_x.0,
            delta_x_max: delta_x.1,
            delta_y_min: delta_y.0,
            delta_y_max: delta_y.1,
        }
    }

    pub fn validate(&self) -> Result<(), RoomError> {
        let ok = self.delta_x_min > 0.0
            && self.delta_y_min > 0.0
            && self.delta_x_min < self.delta_x_max
            && self.delta_y_min < self.delta_y_max;
        if !ok {
            return Err(RoomError::invalid(format!(
                "need 0 < delta_min < delta_max, got x [{}, {}] y [{}, {}]",
                self.delta_x_min, self.delta_x_max, self.delta_y_min, self.delta_y_max
            )));
        }
        Ok(())
    }

    /// `max(delta_min, uniform(0, delta_max))` per axis, x first
    pub fn sample(&self, rng: &mut dyn RngCore) -> (f64, f64) {
        let dx = self.delta_x_min.max(uniform(rng, 0.0, self.delta_x_max));
        let dy = self.delta_y_min.max(uniform(rng, 0.0, self.delta_y_max));
        (dx, dy)
    }
}

/// Single rectangular room
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RectangleFields")]
pub struct RectangleConfig {
    pub x_center: (f64, f64),
    pub y_center: (f64, f64),
    pub size: RectangleSize,
}

/// Flat TOML form of [`RectangleConfig`]
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RectangleFields {
    x_center: (f64, f64),
    y_center: (f64, f64),
    delta_x_min: f64,
    delta_x_max: f64,
    delta_y_min: f64,
    delta_y_max: f64,
}

impl Default for RectangleFields {
    fn default() -> Self {
        let config = RectangleConfig::default();
        Self {
            x_center: config.x_center,
            y_center: config.y_center,
            delta_x_min: config.size.delta_x_min,
            delta_x_max: config.size.delta_x_max,
            delta_y_min: config.size.delta_y_min,
            delta_y_max: config.size.delta_y_max,
        }
    }
}

impl From<RectangleFields> for RectangleConfig {
    fn from(fields: RectangleFields) -> Self {
        Self {
            x_center: fields.x_center,
            y_center: fields.y_center,
            size: RectangleSize::new(
                (fields.delta_x_min, fields.delta_x_max),
                (fields.delta_y_min, fields.delta_y_max),
            ),
        }
    }
}

impl Default for RectangleConfig {
    fn default() -> Self {
        Self {
            x_center: (0.0, 0.0),
            y_center: (0.0, 0.0),
            size: RectangleSize::default(),
        }
    }
}

impl RectangleConfig {
    pub fn new(size: RectangleSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_center_range(mut self, x: (f64, f64), y: (f64, f64)) -> Self {
        self.x_center = x;
        self.y_center = y;
        self
    }
}

fn check_range(label: &str, range: (f64, f64)) -> Result<(), RoomError> {
    if range.0 > range.1 || !range.0.is_finite() || !range.1.is_finite() {
        return Err(RoomError::invalid(format!(
            "{} range [{}, {}] is reversed or not finite",
            label, range.0, range.1
        )));
    }
    Ok(())
}

pub(crate) fn sample_center(
    rng: &mut dyn RngCore,
    x: (f64, f64),
    y: (f64, f64),
) -> Result<Point, RoomError> {
    check_range("x center", x)?;
    check_range("y center", y)?;
    let cx = uniform(rng, x.0, x.1);
    let cy = uniform(rng, y.0, y.1);
    Ok(Point::new(cx, cy))
}

/// Draws: centre x, centre y, width, height
pub fn random_rectangle(config: &RectangleConfig, rng: &mut dyn RngCore) -> Result<Polygon, RoomError> {
    config.size.validate()?;
    let center = sample_center(rng, config.x_center, config.y_center)?;
    let (dx, dy) = config.size.sample(rng);
    rectangle(center.x, center.y, dx, dy)
}

/// `n` uniform points in a box: every x first, then every y
pub fn random_points(
    n: usize,
    x: (f64, f64),
    y: (f64, f64),
    rng: &mut dyn RngCore,
) -> Result<Vec<Point>, RoomError> {
    if x.0 >= x.1 || y.0 >= y.1 {
        return Err(RoomError::invalid(format!(
            "point box must have min < max, got x [{}, {}] y [{}, {}]",
            x.0, x.1, y.0, y.1
        )));
    }
    let xs: Vec<f64> = (0..n).map(|_| uniform(rng, x.0, x.1)).collect();
    let ys: Vec<f64> = (0..n).map(|_| uniform(rng, y.0, y.1)).collect();
    Ok(xs.into_iter().zip(ys).map(|(x, y)| Point::new(x, y)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rectangle_extent() {
        let r = rectangle(1.0, 2.0, 4.0, 6.0).unwrap();
        assert_eq!(r.bounds().as_tuple(), (-1.0, -1.0, 3.0, 5.0));
        assert!(rectangle(0.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_width_respects_minimum() {
        let config = RectangleConfig::new(RectangleSize::new((15.0, 20.0), (15.0, 20.0)));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let b = random_rectangle(&config, &mut rng).unwrap().bounds();
            assert!(b.width() >= 15.0 - 1e-9 && b.width() < 20.0);
            assert!(b.height() >= 15.0 - 1e-9 && b.height() < 20.0);
        }
    }

    #[test]
    fn test_invalid_size_rejected() {
        let config = RectangleConfig::new(RectangleSize::new((5.0, 5.0), (1.0, 2.0)));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            random_rectangle(&config, &mut rng),
            Err(RoomError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_random_points_in_box() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = random_points(20, (-1.0, 1.0), (2.0, 3.0), &mut rng).unwrap();
        assert_eq!(points.len(), 20);
        assert!(points
            .iter()
            .all(|p| (-1.0..1.0).contains(&p.x) && (2.0..3.0).contains(&p.y)));
    }
}
