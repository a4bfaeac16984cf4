//! Water, lava, and cloud surface meshes

pub mod planes;

pub use planes::{cloud_mesh, lava_mesh, water_mesh};
