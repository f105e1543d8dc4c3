//! Metrics-facing encodings of per-statement metadata

mod params;

pub use params::{BoundParam, ParamBuf, ParamBufKind, QueryParams};
