//! Build steps shipped with thrasher

pub mod dump;
pub mod tsconfig;

pub use dump::Dump;
pub use tsconfig::{CreateTsConfigs, FORBIDDEN_OPTIONS, TSCONFIG_FILE};
