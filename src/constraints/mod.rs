//! Named placement constraints
//!
//! A constraint is immutable once registered. Engines look constraints up
//! by name and only ever read them.

mod registry;

pub use registry::ConstraintRegistry;

use nalgebra::Vector3;
use rand::RngCore;
use thiserror::Error;

use crate::assets::ModelGeometry;
use crate::geometry::{MultiPolygon, Point, EPSILON};
use crate::pose::{Dof, Pose};
use crate::rooms::uniform;
use crate::world::lower_extent;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    #[error("workspace '{name}' has no area")]
    EmptyWorkspace { name: String },

    #[error("tangent plane normal must be non-zero")]
    ZeroNormal,
}

/// A typed placement predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Translational x/y must lie inside `region`
    Workspace { region: MultiPolygon },
    /// The lowest point of the model along `normal` touches the plane
    Tangent {
        origin: Vector3<f64>,
        /// Unit length
        normal: Vector3<f64>,
    },
}

impl Constraint {
    pub fn workspace(name: &str, region: MultiPolygon) -> Result<Self, ConstraintError> {
        if region.is_empty() {
            return Err(ConstraintError::EmptyWorkspace {
                name: name.to_string(),
            });
        }
        Ok(Constraint::Workspace { region })
    }

    /// Plane through `origin`; the normal is normalized here
    pub fn tangent(origin: [f64; 3], normal: [f64; 3]) -> Result<Self, ConstraintError> {
        let normal = Vector3::from(normal);
        let length = normal.norm();
        if !(length > EPSILON) {
            return Err(ConstraintError::ZeroNormal);
        }
        Ok(Constraint::Tangent {
            origin: Vector3::from(origin),
            normal: normal / length,
        })
    }

    /// The ground plane z = 0
    pub fn ground() -> Self {
        Constraint::Tangent {
            origin: Vector3::zeros(),
            normal: Vector3::z(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Workspace { .. } => "workspace",
            Constraint::Tangent { .. } => "tangent",
        }
    }

    pub fn region(&self) -> Option<&MultiPolygon> {
        match self {
            Constraint::Workspace { region } => Some(region),
            Constraint::Tangent { .. } => None,
        }
    }

    /// Force the pose onto the constraint where it can be computed
    ///
    /// Tangent constraints move the translational DOF with the largest
    /// normal component until the model touches the plane. Workspace
    /// constraints only validate.
    pub fn apply(&self, geometry: &dyn ModelGeometry, pose: &mut Pose) {
        if let Constraint::Tangent { origin, normal } = self {
            let (axis, component) = dominant_axis(normal);
            let gap = lower_extent(geometry, pose, normal) - normal.dot(origin);
            if let Some(dof) = Dof::from_axis(axis) {
                pose.set(dof, pose.get(dof) - gap / component);
            }
        }
    }

    pub fn is_satisfied(&self, geometry: &dyn ModelGeometry, pose: &Pose) -> bool {
        match self {
            Constraint::Workspace { region } => region.contains_point(Point::new(pose.x, pose.y)),
            Constraint::Tangent { origin, normal } => {
                (lower_extent(geometry, pose, normal) - normal.dot(origin)).abs() <= EPSILON
            }
        }
    }
}

fn dominant_axis(normal: &Vector3<f64>) -> (usize, f64) {
    let mut axis = 0;
    for k in 1..3 {
        if normal[k].abs() > normal[axis].abs() {
            axis = k;
        }
    }
    (axis, normal[axis])
}

/// Uniform point inside `region` by rejection in its bounding box
///
/// Each try draws x then y. Returns `None` once `max_attempts` tries have
/// missed.
pub fn sample_in_region(region: &MultiPolygon, rng: &mut dyn RngCore, max_attempts: usize) -> Option<Point> {
    let bounds = region.bounds()?;
    for _ in 0..max_attempts {
        let x = uniform(rng, bounds.min_x, bounds.max_x);
        let y = uniform(rng, bounds.min_y, bounds.max_y);
        let point = Point::new(x, y);
        if region.contains_point(point) {
            return Some(point);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Body, Shape};
    use crate::geometry::Polygon;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cube(size: f64) -> Body {
        Body::new(Shape::Box { size: [size, size, size] }, false).unwrap()
    }

    #[test]
    fn test_ground_tangency_sets_z() {
        let body = cube(2.0);
        let mut pose = Pose::new(3.0, 4.0, 17.0, 0.0, 0.0, 0.7);
        Constraint::ground().apply(&body, &mut pose);
        assert!((pose.z - 1.0).abs() < 1e-9);
        assert_eq!((pose.x, pose.y), (3.0, 4.0));
        assert!(Constraint::ground().is_satisfied(&body, &pose));
    }

    #[test]
    fn test_tilted_body_rests_on_its_corner() {
        let body = cube(2.0);
        let mut pose = Pose::new(0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_4, 0.0, 0.0);
        Constraint::ground().apply(&body, &mut pose);
        // rolled 45 degrees, the lowest edge is sqrt(2) below the centre
        assert!((pose.z - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_raised_wall_plane_moves_x() {
        let constraint = Constraint::tangent([5.0, 0.0, 0.0], [-2.0, 0.0, 0.0]).unwrap();
        let body = cube(1.0);
        let mut pose = Pose::new(0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        constraint.apply(&body, &mut pose);
        assert!((pose.x - 4.5).abs() < 1e-9);
        assert!(constraint.is_satisfied(&body, &pose));
    }

    #[test]
    fn test_zero_normal_rejected() {
        assert_eq!(
            Constraint::tangent([0.0; 3], [0.0; 3]),
            Err(ConstraintError::ZeroNormal)
        );
    }

    #[test]
    fn test_workspace_sampling_stays_inside() {
        let region: MultiPolygon = Polygon::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap()
        .into();
        let constraint = Constraint::workspace("tri", region.clone()).unwrap();
        let body = cube(0.1);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..100 {
            let p = sample_in_region(&region, &mut rng, 1000).unwrap();
            assert!(constraint.is_satisfied(&body, &Pose::new(p.x, p.y, 0.0, 0.0, 0.0, 0.0)));
        }
    }

    #[test]
    fn test_empty_workspace_rejected() {
        assert!(matches!(
            Constraint::workspace("nothing", MultiPolygon::empty()),
            Err(ConstraintError::EmptyWorkspace { .. })
        ));
    }
}
