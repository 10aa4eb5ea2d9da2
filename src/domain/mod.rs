// Domain layer: data model and ports. No HTTP or file access here.

pub mod model;
pub mod ports;
