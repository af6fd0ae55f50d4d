//! Core of the perch UI extension layer.
//!
//! # Conceptual overview
//! Perch sits between a declarative view framework and the native view controllers that host it.
//! This crate holds the two pieces that don't depend on any host: observable values and size
//! negotiation.
//!
//! ## Observables
//! Application state lives in root [`Observable`]s. A control that only cares about one part of
//! that state projects it with a [`KeyPath`] and gets back another `Observable` (or, if it only
//! needs to read and write, a [`Binding`]). Projections can be projected again, to any depth;
//! reads and writes always go through to the root, so there is exactly one copy of the state.
//!
//! Changes are announced twice: before (*will change*) and after (*did change*) the value is
//! replaced. The announcement starts at the cell that owns the storage and travels down through
//! every live projection, so a view bound to a projection re-renders when any write touches the
//! root it came from.
//!
//! Projections don't own their parents. UI bindings create projections on the fly and drop them
//! just as quickly; the state they point into must be owned somewhere else.
//!
//! ## Size negotiation
//! A host asks a view how large it wants to be with a [`SizeProposal`]: a target size, a maximum
//! size, and per-axis [`LayoutPriority`]. [`SizeResolver`] turns that into calls to the native
//! measurement primitive and repairs whatever comes back (expanded sentinels, infinities,
//! zero-sized axes) into a size no larger than the maximum. That size is finite on every axis the
//! proposal bounds with a maximum; an axis without one may stay infinite if the primitive keeps
//! saying so.
//!
//! ## Threading
//! Everything here is meant to be used from the UI thread. Handles are `Send + Sync`, and no lock
//! is held while notifications are delivered, so subscribers may freely read and write other
//! observables. Concurrent writers must be ordered by the caller.

#[macro_use]
mod key_path;
mod binding;
mod dimensions;
pub mod observable;
pub mod publisher;
pub mod sizing;

pub use binding::Binding;
pub use dimensions::{clamp_size, OptionalDimensions, Size};
pub use key_path::{KeyPath, ReferenceKeyPath};
pub use observable::{
    Observable, ObservableError, ObservableObject, ObservableValue, WeakObservable,
};
pub use publisher::{Publisher, Subscription, SubscriptionId};
pub use sizing::{
    resolve, Fit, FittingSentinels, LayoutPriority, SizeProposal, SizeResolver, SizingConstraints,
};
