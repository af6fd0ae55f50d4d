//! Native hosting for perch.
//!
//! Re-exports [`perch_core`] and adds the pieces that talk to a host toolkit: the
//! [`HostingController`] measurement interface and a [`Host`] that keeps a controller's preferred
//! size in sync with observable state.

mod controller;
mod host;

pub use controller::HostingController;
pub use host::Host;
pub use perch_core::*;
