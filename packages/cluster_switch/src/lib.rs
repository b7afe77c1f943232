#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Atomic migration of every logical CPU between the fast and slow clusters of a
//! heterogeneous two-cluster SoC.
//!
//! # Why should one care?
//!
//! Parts with a high-performance cluster and a power-efficient cluster get their battery-life
//! wins from actually moving work to the efficient cluster when load allows it. On the SoCs
//! this crate targets the move is all-or-nothing: the power management firmware migrates every
//! logical CPU at once, and getting there requires a cross-core rendezvous, a request/response
//! exchange with the firmware coprocessor, strict mutual exclusion and a notification fan-out
//! to the subsystems that care — all without ever leaving a CPU executing on an undefined
//! cluster topology.
//!
//! This crate is that coordination core. It does not decide *when* to switch; that policy
//! belongs to a power governor built on top of it.
//!
//! # How a switch runs
//!
//! 1. The caller's request is resolved to a destination cluster and checked against the
//!    part's fuses (some parts permanently disable the slow cluster).
//! 2. The switch serializer is acquired; at most one switch runs system-wide.
//! 3. Registered observers receive the pre-switch event.
//! 4. The firmware is asked to switch clusters and answers with the set of logical CPUs that
//!    will be resident in the destination cluster.
//! 5. Every resident CPU except the initiating one is sent a fire-and-forget park task that
//!    retires it into core-level retention.
//! 6. The initiating CPU suspends itself into cluster-level retention. That suspend is the
//!    trigger the hardware uses to complete the physical handoff; the CPU resumes in the
//!    destination cluster.
//! 7. Observers receive the post-switch event and the serializer is released.
//!
//! A firmware communication failure aborts the switch at step 4 with no state change, so a
//! caller can simply retry.
//!
//! # Quick start
//!
//! ```
//! use cluster_switch::{Cluster, ClusterSwitcher, SwitchRequest};
//!
//! let switcher = ClusterSwitcher::system();
//!
//! if switcher.is_slow_cluster_supported() {
//!     switcher
//!         .perform_switch(SwitchRequest::slow())
//!         .expect("firmware refused the switch");
//!
//!     assert_eq!(switcher.current_cluster(), Cluster::Slow);
//! }
//! ```
//!
//! # Observing switches
//!
//! Subsystems whose state depends on the current cluster register a
//! [`SwitchObserver`] and are informed synchronously before and after every switch, in
//! registration order. Observers cannot veto a switch; a panicking observer is logged and the
//! broadcast continues.
//!
//! # Testing with fake hardware
//!
//! The `test-util` feature enables the `fake` module: a configurable in-process SoC that
//! records what the switch machinery asks the hardware to do. Accept a
//! [`ClusterSwitcher`] as a value instead of always calling
//! [`ClusterSwitcher::system()`] and tests can substitute a fake-backed instance.
//!
//! # Hardware binding
//!
//! All hardware endpoints — the fuse block, the firmware mailbox, per-core suspend entry,
//! power management notifications and interrupt/preemption control — sit behind a private
//! platform layer. In this tree the build-target platform is a deterministic in-process model
//! of the SoC, so the crate compiles and its logic runs anywhere; binding to actual silicon
//! replaces that model behind the same seam and is a vendor kernel integration concern, out
//! of scope here.

mod capability;
mod cluster_cell;
mod cpu_mask;
mod error;
mod firmware;
mod notifier;
mod pal;
mod power_state;
mod primitive_types;
mod quiesce;
mod request;
mod serializer;
mod switcher;
mod transition;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use cpu_mask::{CpuMask, LOGICAL_CPU_SLOTS};
pub use error::SwitchError;
pub use notifier::{ObserverToken, SwitchEvent, SwitchObserver, SwitchPhase};
pub use primitive_types::*;
pub use request::{SwitchFlags, SwitchRequest};
pub use switcher::{ClusterSwitcher, SwitchOutcome};
