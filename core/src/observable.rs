//! Observable values and projections into their parts.
//!
//! An [`Observable`] is a shared handle to a cell. A root cell owns its value; derived cells are
//! created with [`Observable::project`] (through a [`KeyPath`] into the parent's value) or
//! [`Observable::from_object`] (through a [`ReferenceKeyPath`] into a shared object) and read and
//! write through their parent.
//!
//! # Notifications
//! Every cell has two payload-free channels: *will change*, sent before the stored value is
//! replaced, and *did change*, sent after. Notifications always start at the cell that owns the
//! storage and are forwarded down to derived cells through subscriptions made at construction.
//! Writing to a cell at depth `k` therefore notifies each of its `k` ancestors and the cell
//! itself exactly once per channel (along with any other live descendants of the root, whose
//! values may have changed too).
//!
//! # Ownership
//! Derived cells only hold their parent weakly. Keeping a derived cell around does not keep its
//! parent alive; reading or writing a derived cell whose parent has been dropped is a programming
//! error and panics. Use [`Observable::try_get`]/[`Observable::try_set`] to check instead.

use crate::binding::Binding;
use crate::key_path::{KeyPath, ReferenceKeyPath};
use crate::publisher::{Publisher, Subscription};
use crossbeam::channel::Receiver;
use core::fmt;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Errors from accessing a cell through a dead link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ObservableError {
    /// The parent cell (or object) of a derived cell has been dropped.
    #[error("the parent of this derived observable has been released")]
    ParentReleased,
}

/// The capabilities of an observable cell.
///
/// Implemented by the root, value-member and object-member cells; use through [`Observable`].
pub trait ObservableValue<T>: Send + Sync {
    /// Reads the current value.
    fn try_get(&self) -> Result<T, ObservableError>;

    /// Replaces the current value, sending notifications.
    fn try_set(&self, value: T) -> Result<(), ObservableError>;

    /// Sent before the value changes.
    fn object_will_change(&self) -> &Publisher;

    /// Sent after the value changed.
    fn object_did_change(&self) -> &Publisher;
}

/// A reference-identity object that announces its own mutations.
///
/// Objects must send `object_will_change` before mutating state that an
/// [`Observable::from_object`] projection may read.
pub trait ObservableObject: Send + Sync + 'static {
    fn object_will_change(&self) -> &Publisher;
}

/// A shared handle to an observable cell.
///
/// Cloning the handle does not clone the cell.
pub struct Observable<T> {
    cell: Arc<dyn ObservableValue<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Creates a root cell owning `value`.
    pub fn new(value: T) -> Observable<T> {
        Observable {
            cell: Arc::new(Root {
                value: RwLock::new(value),
                will_change: Publisher::new(),
                did_change: Publisher::new(),
            }),
        }
    }

    /// Projects a part of an object as an observable cell.
    ///
    /// The cell holds the object weakly.
    pub fn from_object<O: ObservableObject>(
        object: &Arc<O>,
        key_path: ReferenceKeyPath<O, T>,
    ) -> Observable<T> {
        Observable {
            cell: Arc::new(ObjectMember::new(object, key_path)),
        }
    }

    /// Derives a cell for the part of this value at `key_path`.
    ///
    /// The derived cell holds this cell weakly, so it stays usable only while someone else keeps
    /// this cell alive.
    pub fn project<V>(&self, key_path: KeyPath<T, V>) -> Observable<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        Observable {
            cell: Arc::new(ValueMember::new(self, key_path)),
        }
    }

    /// Derives a get/set binding for the part of this value at `key_path`.
    ///
    /// Unlike [`project`](Observable::project), the binding keeps this cell alive and cannot be
    /// projected further.
    pub fn binding<V>(&self, key_path: KeyPath<T, V>) -> Binding<V>
    where
        V: 'static,
    {
        let getter = self.clone();
        let get_path = key_path.clone();
        let setter = self.clone();
        Binding::new(
            move || get_path.get(&getter.get()),
            move |value| setter.update(|root| key_path.set(root, value)),
        )
    }

    /// A binding to the whole value.
    pub fn as_binding(&self) -> Binding<T> {
        let getter = self.clone();
        let setter = self.clone();
        Binding::new(move || getter.get(), move |value| setter.set(value))
    }

    /// Reads the current value.
    ///
    /// # Panics
    /// - if this is a derived cell whose parent has been released
    pub fn get(&self) -> T {
        match self.cell.try_get() {
            Ok(value) => value,
            Err(err) => panic!("Observable::get: {}", err),
        }
    }

    /// Writes a new value, notifying this cell, its ancestors and their live descendants.
    ///
    /// Notifications start at the root, so sibling projections (say `doc.a` when writing
    /// `doc.b`) are notified once as well, even if their own value did not change.
    ///
    /// # Panics
    /// - if this is a derived cell whose parent has been released
    pub fn set(&self, value: T) {
        if let Err(err) = self.cell.try_set(value) {
            panic!("Observable::set: {}", err);
        }
    }

    pub fn try_get(&self) -> Result<T, ObservableError> {
        self.cell.try_get()
    }

    pub fn try_set(&self, value: T) -> Result<(), ObservableError> {
        self.cell.try_set(value)
    }

    /// Reads, modifies and writes back the value.
    ///
    /// # Panics
    /// - if this is a derived cell whose parent has been released
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }
}

impl<T> Observable<T> {
    pub fn object_will_change(&self) -> &Publisher {
        self.cell.object_will_change()
    }

    pub fn object_did_change(&self) -> &Publisher {
        self.cell.object_did_change()
    }

    /// Calls `f` after every change.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cell.object_did_change().subscribe(f)
    }

    /// Calls `f` before every change.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_will_change<F>(&self, f: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cell.object_will_change().subscribe(f)
    }

    /// A channel receiving one tick per change.
    #[must_use = "dropping the subscription disconnects the receiver"]
    pub fn changes(&self) -> (Subscription, Receiver<()>) {
        self.cell.object_did_change().channel()
    }

    pub fn downgrade(&self) -> WeakObservable<T> {
        WeakObservable {
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Returns true if both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Observable<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: fmt::Debug + Clone + Send + Sync + 'static> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.try_get() {
            Ok(value) => f.debug_tuple("Observable").field(&value).finish(),
            Err(_) => write!(f, "Observable(<released>)"),
        }
    }
}

/// A non-owning handle to an observable cell.
pub struct WeakObservable<T> {
    cell: Weak<dyn ObservableValue<T>>,
}

impl<T> WeakObservable<T> {
    pub fn upgrade(&self) -> Option<Observable<T>> {
        self.cell.upgrade().map(|cell| Observable { cell })
    }

    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl<T> Clone for WeakObservable<T> {
    fn clone(&self) -> Self {
        WeakObservable {
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for WeakObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WeakObservable(alive: {})", self.is_alive())
    }
}

/// A cell owning its value.
struct Root<T> {
    value: RwLock<T>,
    will_change: Publisher,
    did_change: Publisher,
}

impl<T: Clone + Send + Sync> ObservableValue<T> for Root<T> {
    fn try_get(&self) -> Result<T, ObservableError> {
        Ok(self.value.read().clone())
    }

    fn try_set(&self, value: T) -> Result<(), ObservableError> {
        tracing::trace!("root observable: write");
        self.will_change.send();
        // the lock must be released before did_change: subscribers read the new value
        *self.value.write() = value;
        self.did_change.send();
        Ok(())
    }

    fn object_will_change(&self) -> &Publisher {
        &self.will_change
    }

    fn object_did_change(&self) -> &Publisher {
        &self.did_change
    }
}

/// Forwards both channels of a parent to a child's publishers.
fn forward(
    parent_will: &Publisher,
    parent_did: &Publisher,
    will_change: &Publisher,
    did_change: &Publisher,
) -> [Subscription; 2] {
    let will = will_change.clone();
    let did = did_change.clone();
    [
        parent_will.subscribe(move || will.send()),
        parent_did.subscribe(move || did.send()),
    ]
}

/// A cell for a part of another cell's value.
struct ValueMember<R, V> {
    parent: Weak<dyn ObservableValue<R>>,
    key_path: KeyPath<R, V>,
    will_change: Publisher,
    did_change: Publisher,
    _subscriptions: [Subscription; 2],
}

impl<R, V> ValueMember<R, V> {
    fn new(parent: &Observable<R>, key_path: KeyPath<R, V>) -> Self {
        let will_change = Publisher::new();
        let did_change = Publisher::new();
        let subscriptions = forward(
            parent.cell.object_will_change(),
            parent.cell.object_did_change(),
            &will_change,
            &did_change,
        );

        ValueMember {
            parent: Arc::downgrade(&parent.cell),
            key_path,
            will_change,
            did_change,
            _subscriptions: subscriptions,
        }
    }

    fn parent(&self) -> Result<Arc<dyn ObservableValue<R>>, ObservableError> {
        self.parent.upgrade().ok_or(ObservableError::ParentReleased)
    }
}

impl<R, V> ObservableValue<V> for ValueMember<R, V> {
    fn try_get(&self) -> Result<V, ObservableError> {
        let root = self.parent()?.try_get()?;
        Ok(self.key_path.get(&root))
    }

    fn try_set(&self, value: V) -> Result<(), ObservableError> {
        let parent = self.parent()?;
        let mut root = parent.try_get()?;
        self.key_path.set(&mut root, value);
        // our own notifications arrive through the parent
        parent.try_set(root)
    }

    fn object_will_change(&self) -> &Publisher {
        &self.will_change
    }

    fn object_did_change(&self) -> &Publisher {
        &self.did_change
    }
}

/// A cell for a part of a shared object.
struct ObjectMember<O, V> {
    object: Weak<O>,
    key_path: ReferenceKeyPath<O, V>,
    will_change: Publisher,
    did_change: Publisher,
    _subscription: Subscription,
}

impl<O: ObservableObject, V> ObjectMember<O, V> {
    fn new(object: &Arc<O>, key_path: ReferenceKeyPath<O, V>) -> Self {
        let will_change = Publisher::new();
        let will = will_change.clone();
        let subscription = object.object_will_change().subscribe(move || will.send());

        ObjectMember {
            object: Arc::downgrade(object),
            key_path,
            will_change,
            did_change: Publisher::new(),
            _subscription: subscription,
        }
    }

    fn object(&self) -> Result<Arc<O>, ObservableError> {
        self.object.upgrade().ok_or(ObservableError::ParentReleased)
    }
}

impl<O: ObservableObject, V> ObservableValue<V> for ObjectMember<O, V> {
    fn try_get(&self) -> Result<V, ObservableError> {
        Ok(self.key_path.get(&*self.object()?))
    }

    fn try_set(&self, value: V) -> Result<(), ObservableError> {
        let object = self.object()?;
        tracing::trace!("object member: write");
        object.object_will_change().send();
        self.key_path.set(&*object, value);
        // objects have no did-change channel of their own
        self.did_change.send();
        Ok(())
    }

    fn object_will_change(&self) -> &Publisher {
        &self.will_change
    }

    fn object_did_change(&self) -> &Publisher {
        &self.did_change
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn projection_is_transparent(a in any::<i64>(), b in any::<i64>(), x in any::<i64>()) {
            let root = Observable::new((a, b));
            let first = root.project(KeyPath::new(|v: &(i64, i64)| v.0, |v, n| v.0 = n));
            prop_assert_eq!(first.get(), a);

            first.set(x);
            prop_assert_eq!(first.get(), x);
            prop_assert_eq!(root.get(), (x, b));
        }
    }
}
