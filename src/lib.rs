//! Caldera - a real-time volcanic island terrain demo

pub mod config;
pub mod core;
pub mod environment;
pub mod math;
pub mod particles;
pub mod render;
pub mod scene;
pub mod terrain;
pub mod vegetation;
