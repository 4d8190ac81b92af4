pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod heat;
pub mod impute;
pub mod layout;
pub mod model;
pub mod parser;
pub mod progress;
pub mod scanner;
pub mod svg;
pub mod treemap;

pub use config::TreemapConfig;
pub use error::*;
pub use layout::{build_layout, build_treemap, UiBox, UiText};
pub use model::*;
pub use treemap::{squarify, Rect};
