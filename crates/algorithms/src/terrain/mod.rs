//! Terrain-style surface analysis

mod hillshade;

pub use hillshade::{hillshade, HillshadeParams};
