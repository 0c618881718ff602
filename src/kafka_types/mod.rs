mod broker;
mod partition;
mod topic;

pub use broker::Broker;
pub use partition::{Partition, NO_LEADER};
pub use topic::Topic;
