// Domain layer: value objects, fetch outcomes and ports. Adapters implement the ports.

pub mod model;
pub mod outcome;
pub mod ports;
