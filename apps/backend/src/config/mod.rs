pub mod engine;
pub mod store;

pub use engine::{EngineConfig, Timings, TotalPointsMode};
pub use store::StoreConfig;
