//! Assets: named templates that instantiate into placeable models
//!
//! The placement core only sees the [`ModelGeometry`] capability of an
//! instantiated model. Primitive shapes are provided by [`ShapeAsset`];
//! anything else (meshes, external factories) plugs in as an
//! [`AssetFactory`].

mod registry;
mod shape;

pub use registry::{Asset, AssetRegistry};
pub use shape::{Body, Scalar, Shape, ShapeAsset, ShapeDescription};

use std::fmt;
use std::sync::Arc;

use nalgebra::{Rotation3, Vector3};
use rand::RngCore;
use thiserror::Error;

use crate::geometry::{GeometryError, MultiPolygon};

/// Errors raised while describing or instantiating an asset
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    /// A dimension is non-positive or its range is reversed
    #[error("invalid dimension '{name}': {value}")]
    InvalidDimension { name: &'static str, value: String },

    /// The resolved shape produced an invalid footprint
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// What the placement core needs to know about an instantiated model
pub trait ModelGeometry: fmt::Debug + Send + Sync {
    /// Footprint in the model frame with zero roll and pitch
    fn footprint(&self) -> &MultiPolygon;

    /// Static models never move once placed
    fn is_static(&self) -> bool;

    /// Largest extent of the rotated body along `direction`
    fn support(&self, rotation: &Rotation3<f64>, direction: &Vector3<f64>) -> f64;

    /// Footprint of the body after `rotation`, in the model frame
    fn projected_footprint(&self, rotation: &Rotation3<f64>) -> MultiPolygon;
}

/// Builds models for an asset tag, drawing any randomized dimensions from the
/// shared stream
pub trait AssetFactory: fmt::Debug + Send + Sync {
    fn build(&self, rng: &mut dyn RngCore) -> Result<Arc<dyn ModelGeometry>, AssetError>;

    fn is_static(&self) -> bool;
}
