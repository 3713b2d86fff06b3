//! Poses and their individually addressable degrees of freedom

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// One pose component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dof {
    X,
    Y,
    Z,
    Roll,
    Pitch,
    Yaw,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::X, Dof::Y, Dof::Z, Dof::Roll, Dof::Pitch, Dof::Yaw];

    pub fn is_translational(&self) -> bool {
        matches!(self, Dof::X | Dof::Y | Dof::Z)
    }

    /// Translation axis index (x = 0, y = 1, z = 2)
    pub fn axis(&self) -> Option<usize> {
        match self {
            Dof::X => Some(0),
            Dof::Y => Some(1),
            Dof::Z => Some(2),
            _ => None,
        }
    }

    pub fn from_axis(axis: usize) -> Option<Dof> {
        match axis {
            0 => Some(Dof::X),
            1 => Some(Dof::Y),
            2 => Some(Dof::Z),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dof::X => "x",
            Dof::Y => "y",
            Dof::Z => "z",
            Dof::Roll => "roll",
            Dof::Pitch => "pitch",
            Dof::Yaw => "yaw",
        }
    }
}

/// Position and roll/pitch/yaw orientation (radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// Pose from `[x, y, z, roll, pitch, yaw]`
    pub fn from_array(values: [f64; 6]) -> Self {
        let [x, y, z, roll, pitch, yaw] = values;
        Self::new(x, y, z, roll, pitch, yaw)
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
    }

    pub fn get(&self, dof: Dof) -> f64 {
        match dof {
            Dof::X => self.x,
            Dof::Y => self.y,
            Dof::Z => self.z,
            Dof::Roll => self.roll,
            Dof::Pitch => self.pitch,
            Dof::Yaw => self.yaw,
        }
    }

    pub fn set(&mut self, dof: Dof, value: f64) {
        match dof {
            Dof::X => self.x = value,
            Dof::Y => self.y = value,
            Dof::Z => self.z = value,
            Dof::Roll => self.roll = value,
            Dof::Pitch => self.pitch = value,
            Dof::Yaw => self.yaw = value,
        }
    }

    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Extrinsic roll, then pitch, then yaw
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    /// Roll and pitch are both (numerically) zero
    pub fn is_upright(&self) -> bool {
        self.roll.abs() <= f64::EPSILON && self.pitch.abs() <= f64::EPSILON
    }
}
