//! Peer device coordination.
//!
//! Several identical Aptor devices may be mounted on the same vessel; only
//! one of them - the primary - owns a computation session and shows the
//! stage info surface. This module elects that primary:
//!
//! - [`DeviceRegistry`] - Owns the [`DeviceInstance`]s for one vessel tree
//!   and handles attach/detach/destroy notifications from the host
//! - [`LeadershipEvent`] - Promotion/demotion notifications returned to the
//!   host, in the order they occurred
//!
//! # Election
//!
//! The primary is the attached device hosted on the earliest part in the
//! tree's canonical ordering. The instigating device performs the full
//! recompute; at most one other device receives a cheap local recheck (a
//! pure re-derivation of "am I first?"), which never propagates further.
//! This keeps churny attach/detach batches linear instead of quadratic and
//! is sound because "first attached" is a pure function of tree order and
//! attachment flags, both updated before any recheck runs.
//!
//! The host serializes tree mutation; no locking happens here.

mod registry;

pub use registry::{DeviceId, DeviceInstance, DeviceRegistry, LeadershipEvent};
