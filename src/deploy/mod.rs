//! Deployment: options, work-tree packaging and the build-graph-then-serve sequence.

pub mod archive;
pub mod options;
pub mod sequence;

pub use options::{DeploymentOptions, GoArgs};
pub use sequence::{Sequencer, build_image};
