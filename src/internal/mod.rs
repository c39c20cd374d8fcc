//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod init;

pub(crate) use circular::Node;
pub(crate) use init::{InitCallback, InitCallbacks};
