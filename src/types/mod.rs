//! Type definitions for the traffic volume predictor

pub mod prediction;
pub mod record;

pub use prediction::{PredictionRow, PredictionTable};
pub use record::{FeatureValue, RawRecord};
