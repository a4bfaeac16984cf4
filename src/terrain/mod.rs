//! Heightmap terrain: elevation data, grid meshing, and cloud noise

pub mod height_field;
pub mod mesh;
pub mod noise;

pub use height_field::HeightField;
pub use mesh::MeshData;
