//! Core building blocks: simulated time and geometry

pub mod geometry;
pub mod time;
