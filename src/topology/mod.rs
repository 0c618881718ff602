// Inner modules
mod snapshot;

// Exports
pub use snapshot::TopologySnapshot;
