//! Traffic Volume Predictor Library
//!
//! Encodes raw traffic observations against a fixed reference schema, runs a
//! pre-trained interval regressor and serves the results from a single-page
//! web form.

pub mod config;
pub mod feature_encoder;
pub mod models;
pub mod reference;
pub mod schema;
pub mod types;
pub mod upload;
pub mod web;

pub use config::AppConfig;
pub use feature_encoder::FeatureEncoder;
pub use models::inference::InferenceEngine;
pub use schema::ReferenceSchema;
pub use types::{prediction::PredictionTable, record::RawRecord};
