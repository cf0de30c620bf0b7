//! Scenario impact simulation: baseline modelling, scenario interpretation,
//! impact synthesis, and comparative aggregation.

pub mod analysis;
pub mod baseline;
pub mod scenario;
pub mod taxonomy;
