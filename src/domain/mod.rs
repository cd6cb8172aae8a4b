//! Domain layer: models, errors and ports of the verification core.

pub mod errors;
pub mod models;
pub mod ports;
