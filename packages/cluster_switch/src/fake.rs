//! Fake SoC implementation for testing.
//!
//! This module simulates SoC configurations for testing purposes: parts with the slow cluster
//! fuse-disabled, scripted firmware responses, firmware communication faults and arbitrary
//! boot clusters. It also records what the switch machinery asked the hardware to do, so tests
//! can assert on dispatched park tasks, completed handoffs and mailbox traffic.
//!
//! Only available when the `test-util` feature is enabled.
//!
//! # Basic usage
//!
//! ```
//! use cluster_switch::fake::{FakeSoc, SocBuilder};
//! use cluster_switch::{Cluster, ClusterSwitcher, SwitchRequest};
//!
//! let soc = FakeSoc::new(SocBuilder::new());
//! let switcher = ClusterSwitcher::fake(&soc);
//!
//! switcher
//!     .perform_switch(SwitchRequest::slow())
//!     .expect("the fake firmware accepts switch requests by default");
//!
//! assert_eq!(switcher.current_cluster(), Cluster::Slow);
//!
//! // CPUs 1..=3 were parked remotely; CPU 0 performed the handoff itself.
//! soc.settle();
//! assert_eq!(soc.quiesced_cpus(), vec![1, 2, 3]);
//! assert_eq!(soc.cluster_transitions(), 1);
//! ```
//!
//! # Simulating restricted parts
//!
//! ```
//! use cluster_switch::fake::{FakeSoc, SocBuilder};
//! use cluster_switch::{ClusterSwitcher, SwitchError, SwitchRequest};
//!
//! let soc = FakeSoc::new(SocBuilder::new().blow_slow_cluster_fuse());
//! let switcher = ClusterSwitcher::fake(&soc);
//!
//! assert!(!switcher.is_slow_cluster_supported());
//!
//! let result = switcher.perform_switch(SwitchRequest::slow());
//! assert!(matches!(result, Err(SwitchError::SlowClusterUnavailable)));
//! ```

mod builder;
mod platform;
mod soc;

pub use builder::*;
pub(crate) use platform::*;
pub use soc::*;
