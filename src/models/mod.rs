// src/models/mod.rs

pub mod draft;
pub mod enums;
pub mod item;

pub use draft::*;
pub use enums::*;
pub use item::*;
