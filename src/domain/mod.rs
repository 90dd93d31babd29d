// Domain layer: data model and the configuration port. No I/O here.

pub mod model;
pub mod ports;
