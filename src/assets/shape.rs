//! Primitive shape descriptions and the geometry they resolve to

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::{Rotation3, Vector3};
use rand::{Rng, RngCore};
use serde::Deserialize;

use crate::geometry::{self, convex_hull, MultiPolygon, Point, Polygon, QUAD_SEGMENTS};

use super::{AssetError, AssetFactory, ModelGeometry};

/// A dimension that is either fixed or drawn when a model is instantiated
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Fixed(f64),
    Uniform { min: f64, max: f64 },
}

impl Scalar {
    /// Resolve the value; uniform dimensions consume one draw
    pub fn resolve(&self, rng: &mut dyn RngCore) -> f64 {
        match *self {
            Scalar::Fixed(v) => v,
            Scalar::Uniform { min, max } if max > min => rng.gen_range(min..max),
            Scalar::Uniform { min, .. } => min,
        }
    }

    fn check(&self, name: &'static str) -> Result<(), AssetError> {
        let (lo, hi) = match *self {
            Scalar::Fixed(v) => (v, v),
            Scalar::Uniform { min, max } => (min, max),
        };
        if !(lo > 0.0) || hi < lo || !hi.is_finite() {
            return Err(AssetError::InvalidDimension {
                name,
                value: format!("{:?}", self),
            });
        }
        Ok(())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Fixed(v)
    }
}

/// Unresolved shape of an asset
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDescription {
    Box { size: [Scalar; 3] },
    Cylinder { radius: Scalar, length: Scalar },
    Sphere { radius: Scalar },
    /// Vertical extrusion of a footprint, centred on z = 0
    Prism { footprint: MultiPolygon, height: Scalar },
}

impl ShapeDescription {
    pub fn cuboid(x: f64, y: f64, z: f64) -> Self {
        ShapeDescription::Box {
            size: [x.into(), y.into(), z.into()],
        }
    }

    pub fn cylinder(radius: f64, length: f64) -> Self {
        ShapeDescription::Cylinder {
            radius: radius.into(),
            length: length.into(),
        }
    }

    pub fn sphere(radius: f64) -> Self {
        ShapeDescription::Sphere {
            radius: radius.into(),
        }
    }

    pub fn prism(footprint: impl Into<MultiPolygon>, height: f64) -> Self {
        ShapeDescription::Prism {
            footprint: footprint.into(),
            height: height.into(),
        }
    }

    /// Check every dimension range without drawing anything
    pub fn validate(&self) -> Result<(), AssetError> {
        match self {
            ShapeDescription::Box { size } => {
                size[0].check("size.x")?;
                size[1].check("size.y")?;
                size[2].check("size.z")
            }
            ShapeDescription::Cylinder { radius, length } => {
                radius.check("radius")?;
                length.check("length")
            }
            ShapeDescription::Sphere { radius } => radius.check("radius"),
            ShapeDescription::Prism { footprint, height } => {
                if footprint.is_empty() {
                    return Err(AssetError::InvalidDimension {
                        name: "footprint",
                        value: "empty".to_string(),
                    });
                }
                height.check("height")
            }
        }
    }

    /// Draw the random dimensions in declaration order
    pub fn resolve(&self, rng: &mut dyn RngCore) -> Shape {
        match self {
            ShapeDescription::Box { size } => Shape::Box {
                size: [size[0].resolve(rng), size[1].resolve(rng), size[2].resolve(rng)],
            },
            ShapeDescription::Cylinder { radius, length } => Shape::Cylinder {
                radius: radius.resolve(rng),
                length: length.resolve(rng),
            },
            ShapeDescription::Sphere { radius } => Shape::Sphere {
                radius: radius.resolve(rng),
            },
            ShapeDescription::Prism { footprint, height } => Shape::Prism {
                footprint: footprint.clone(),
                height: height.resolve(rng),
            },
        }
    }
}

/// Concrete shape with resolved dimensions, centred on its local origin
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
    Prism { footprint: MultiPolygon, height: f64 },
}

impl Shape {
    /// Vertices of a convex body enclosing the shape
    fn hull_vertices(&self) -> Vec<Vector3<f64>> {
        match self {
            Shape::Box { size } => {
                let [hx, hy, hz] = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
                let mut corners = Vec::with_capacity(8);
                for sx in [-hx, hx] {
                    for sy in [-hy, hy] {
                        for sz in [-hz, hz] {
                            corners.push(Vector3::new(sx, sy, sz));
                        }
                    }
                }
                corners
            }
            Shape::Cylinder { radius, length } => {
                let n = 4 * QUAD_SEGMENTS;
                let mut rim = Vec::with_capacity(2 * n);
                for i in 0..n {
                    let angle = 2.0 * PI * i as f64 / n as f64;
                    for z in [-length / 2.0, length / 2.0] {
                        rim.push(Vector3::new(radius * angle.cos(), radius * angle.sin(), z));
                    }
                }
                rim
            }
            Shape::Sphere { .. } => Vec::new(),
            Shape::Prism { footprint, height } => footprint
                .iter()
                .flat_map(|poly| poly.exterior().iter().copied())
                .flat_map(|p| {
                    [
                        Vector3::new(p.x, p.y, -height / 2.0),
                        Vector3::new(p.x, p.y, height / 2.0),
                    ]
                })
                .collect(),
        }
    }

    fn upright_footprint(&self) -> Result<MultiPolygon, AssetError> {
        let footprint = match self {
            Shape::Box { size } => Polygon::rectangle(
                -size[0] / 2.0,
                -size[1] / 2.0,
                size[0] / 2.0,
                size[1] / 2.0,
            )?
            .into(),
            Shape::Cylinder { radius, .. } | Shape::Sphere { radius } => {
                geometry::circle(Point::new(0.0, 0.0), *radius)?.into()
            }
            Shape::Prism { footprint, .. } => footprint.clone(),
        };
        Ok(footprint)
    }
}

/// Resolved shape plus its static flag, with the footprint computed once
#[derive(Debug, Clone)]
pub struct Body {
    shape: Shape,
    is_static: bool,
    footprint: MultiPolygon,
}

impl Body {
    pub fn new(shape: Shape, is_static: bool) -> Result<Self, AssetError> {
        let footprint = shape.upright_footprint()?;
        Ok(Self {
            shape,
            is_static,
            footprint,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl ModelGeometry for Body {
    fn footprint(&self) -> &MultiPolygon {
        &self.footprint
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn support(&self, rotation: &Rotation3<f64>, direction: &Vector3<f64>) -> f64 {
        let local = rotation.inverse() * direction;
        match &self.shape {
            Shape::Box { size } => {
                (local.x.abs() * size[0] + local.y.abs() * size[1] + local.z.abs() * size[2]) / 2.0
            }
            Shape::Cylinder { radius, length } => {
                local.z.abs() * length / 2.0 + radius * local.x.hypot(local.y)
            }
            Shape::Sphere { radius } => radius * direction.norm(),
            Shape::Prism { .. } => self
                .shape
                .hull_vertices()
                .iter()
                .map(|v| v.dot(&local))
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }

    fn projected_footprint(&self, rotation: &Rotation3<f64>) -> MultiPolygon {
        if let Shape::Sphere { .. } = self.shape {
            return self.footprint.clone();
        }
        let projected: Vec<Point> = self
            .shape
            .hull_vertices()
            .iter()
            .map(|v| {
                let r = rotation * v;
                Point::new(r.x, r.y)
            })
            .collect();
        // a body seen edge-on can project to a segment; keep the upright outline then
        convex_hull(&projected)
            .map(MultiPolygon::from)
            .unwrap_or_else(|_| self.footprint.clone())
    }
}

/// Factory for assets described by a primitive shape
#[derive(Debug, Clone)]
pub struct ShapeAsset {
    description: ShapeDescription,
    is_static: bool,
}

impl ShapeAsset {
    pub fn new(description: ShapeDescription, is_static: bool) -> Result<Self, AssetError> {
        description.validate()?;
        Ok(Self {
            description,
            is_static,
        })
    }

    pub fn description(&self) -> &ShapeDescription {
        &self.description
    }
}

impl AssetFactory for ShapeAsset {
    fn build(&self, rng: &mut dyn RngCore) -> Result<Arc<dyn ModelGeometry>, AssetError> {
        let shape = self.description.resolve(rng);
        Ok(Arc::new(Body::new(shape, self.is_static)?))
    }

    fn is_static(&self) -> bool {
        self.is_static
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_box_support_upright() {
        let body = Body::new(Shape::Box { size: [1.0, 2.0, 0.4] }, false).unwrap();
        let down = Vector3::new(0.0, 0.0, -1.0);
        assert!((body.support(&Rotation3::identity(), &down) - 0.2).abs() < 1e-12);
        assert!((body.footprint().area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cylinder_support_on_its_side() {
        let body = Body::new(Shape::Cylinder { radius: 0.3, length: 2.0 }, false).unwrap();
        let lying = Rotation3::from_euler_angles(std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        let down = Vector3::new(0.0, 0.0, -1.0);
        assert!((body.support(&lying, &down) - 0.3).abs() < 1e-9);
        let upright = body.support(&Rotation3::identity(), &down);
        assert!((upright - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tilted_box_projection_grows() {
        let body = Body::new(Shape::Box { size: [1.0, 1.0, 1.0] }, false).unwrap();
        let tilted = Rotation3::from_euler_angles(std::f64::consts::FRAC_PI_4, 0.0, 0.0);
        let projected = body.projected_footprint(&tilted);
        assert!((projected.area() - std::f64::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_scalar_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let scalar = Scalar::Uniform { min: 0.1, max: 1.0 };
        for _ in 0..100 {
            let v = scalar.resolve(&mut rng);
            assert!((0.1..1.0).contains(&v));
        }
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(ShapeAsset::new(ShapeDescription::sphere(0.0), false).is_err());
        let reversed = ShapeDescription::Box {
            size: [Scalar::Uniform { min: 2.0, max: 1.0 }, 1.0.into(), 1.0.into()],
        };
        assert!(matches!(
            ShapeAsset::new(reversed, false),
            Err(AssetError::InvalidDimension { name: "size.x", .. })
        ));
    }

    #[test]
    fn test_shape_asset_builds_static_flag() {
        let asset = ShapeAsset::new(ShapeDescription::cuboid(1.0, 1.0, 1.0), true).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let model = asset.build(&mut rng).unwrap();
        assert!(model.is_static());
        assert!(asset.is_static());
    }
}
