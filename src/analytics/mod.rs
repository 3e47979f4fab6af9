//! Analytics computations over recorded traces

pub mod geo;

pub use geo::{GeoAggregation, GeoPoint, aggregate, normalize_label};
