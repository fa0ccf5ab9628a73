// Adapters layer: concrete implementations of the domain ports (GeoDB API, stores, files).

pub mod geodb;
pub mod memory;
pub mod storage;
