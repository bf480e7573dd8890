//! Vehicle sale price analysis: load a sale table once, then filter it by
//! vehicle type, mileage and age and derive quarterly median prices.

pub mod config;
pub mod data;
