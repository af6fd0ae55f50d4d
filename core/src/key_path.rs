//! Writable key paths: explicit getter/setter pairs into a part of a value.

use core::fmt;
use std::sync::Arc;

/// A getter/setter pair from a `Root` value to one of its parts.
///
/// Setting a value and then getting it from the same root must yield the set value.
///
/// Usually built with the [`key_path`](crate::key_path!) macro.
pub struct KeyPath<Root, Value> {
    get: Arc<dyn Fn(&Root) -> Value + Send + Sync>,
    set: Arc<dyn Fn(&mut Root, Value) + Send + Sync>,
}

impl<Root, Value> KeyPath<Root, Value> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&Root) -> Value + Send + Sync + 'static,
        S: Fn(&mut Root, Value) + Send + Sync + 'static,
    {
        KeyPath {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, root: &Root) -> Value {
        (self.get)(root)
    }

    pub fn set(&self, root: &mut Root, value: Value) {
        (self.set)(root, value)
    }

    /// Returns a copy of `root` with the part at this key path replaced.
    pub fn with(&self, mut root: Root, value: Value) -> Root {
        self.set(&mut root, value);
        root
    }
}

impl<Root: 'static, Value: 'static> KeyPath<Root, Value> {
    /// Appends another key path.
    pub fn then<Sub: 'static>(self, next: KeyPath<Value, Sub>) -> KeyPath<Root, Sub> {
        let outer_get = Arc::clone(&self.get);
        let inner_get = Arc::clone(&next.get);
        KeyPath::new(
            move |root| inner_get(&outer_get(root)),
            move |root, value| {
                let mut part = self.get(root);
                next.set(&mut part, value);
                self.set(root, part);
            },
        )
    }
}

impl<Root: Clone + 'static> KeyPath<Root, Root> {
    /// The key path from a value to itself.
    pub fn identity() -> Self {
        KeyPath::new(Root::clone, |root, value| *root = value)
    }
}

impl<Root, Value> Clone for KeyPath<Root, Value> {
    fn clone(&self) -> Self {
        KeyPath {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<Root, Value> fmt::Debug for KeyPath<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyPath(..)")
    }
}

/// A getter/setter pair into an object that is mutated in place (through interior mutability).
pub struct ReferenceKeyPath<Object: ?Sized, Value> {
    get: Arc<dyn Fn(&Object) -> Value + Send + Sync>,
    set: Arc<dyn Fn(&Object, Value) + Send + Sync>,
}

impl<Object: ?Sized, Value> ReferenceKeyPath<Object, Value> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&Object) -> Value + Send + Sync + 'static,
        S: Fn(&Object, Value) + Send + Sync + 'static,
    {
        ReferenceKeyPath {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, object: &Object) -> Value {
        (self.get)(object)
    }

    pub fn set(&self, object: &Object, value: Value) {
        (self.set)(object, value)
    }
}

impl<Object: ?Sized, Value> Clone for ReferenceKeyPath<Object, Value> {
    fn clone(&self) -> Self {
        ReferenceKeyPath {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<Object: ?Sized, Value> fmt::Debug for ReferenceKeyPath<Object, Value> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ReferenceKeyPath(..)")
    }
}

/// Builds a [`KeyPath`] from a field path.
///
/// The field type must be `Clone`.
///
/// Syntax:
///
/// ```text
/// key_path!(RootType => field.subfield.etc)
/// ```
#[macro_export]
macro_rules! key_path {
    ($root:ty => $($field:tt).+) => {
        $crate::KeyPath::new(
            |root: &$root| ::core::clone::Clone::clone(&root.$($field).+),
            |root: &mut $root, value| root.$($field).+ = value,
        )
    };
}
