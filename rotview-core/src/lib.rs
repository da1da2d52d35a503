//! Core data structures for rotview
//!
//! This crate provides the types shared by every rotview crate: the error
//! taxonomy, backend handles, quaternion component ordering, object poses
//! and the triangle meshes used as visual assets.

pub mod error;
pub mod handle;
pub mod mesh;
pub mod orientation;
pub mod pose;

pub use error::*;
pub use handle::*;
pub use mesh::*;
pub use orientation::*;
pub use pose::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
