//! Two-way bindings: the get/set handle a control needs, without further projection.

use crate::key_path::KeyPath;
use core::fmt;
use std::sync::Arc;

/// A get/set pair over some storage.
///
/// Cloning a binding shares the same storage.
pub struct Binding<T> {
    get: Arc<dyn Fn() -> T + Send + Sync>,
    set: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Binding<T> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Binding {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self) -> T {
        (self.get)()
    }

    pub fn set(&self, value: T) {
        (self.set)(value)
    }
}

impl<T: Clone + Send + Sync + 'static> Binding<T> {
    /// A binding that always reads `value` and ignores writes.
    pub fn constant(value: T) -> Self {
        Binding::new(move || value.clone(), |_| {})
    }
}

impl<T: 'static> Binding<T> {
    /// A binding to the part of this binding's value at `key_path`.
    pub fn map<V: 'static>(&self, key_path: KeyPath<T, V>) -> Binding<V> {
        let get = Arc::clone(&self.get);
        let set = Arc::clone(&self.set);
        let get_path = key_path.clone();
        let current = Arc::clone(&self.get);
        Binding::new(
            move || get_path.get(&get()),
            move |value| set(key_path.with(current(), value)),
        )
    }
}

impl Binding<bool> {
    /// A binding that is true while `selection` holds `tag`.
    ///
    /// Writing true selects `tag`; writing false clears the selection.
    pub fn tagged<H>(selection: Binding<Option<H>>, tag: H) -> Binding<bool>
    where
        H: PartialEq + Clone + Send + Sync + 'static,
    {
        let reader = selection.clone();
        let read_tag = tag.clone();
        Binding::new(
            move || reader.get().as_ref() == Some(&read_tag),
            move |selected| {
                if selected {
                    selection.set(Some(tag.clone()));
                } else {
                    selection.set(None);
                }
            },
        )
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Binding {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Observable;

    #[test]
    fn constant_ignores_writes() {
        let b = Binding::constant(3);
        b.set(4);
        assert_eq!(b.get(), 3);
    }

    #[test]
    fn tagged_binding_tracks_selection() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Sheet {
            Settings,
            About,
        }

        let selection = Observable::new(None::<Sheet>);
        let settings = Binding::tagged(selection.as_binding(), Sheet::Settings);
        let about = Binding::tagged(selection.as_binding(), Sheet::About);

        assert!(!settings.get());
        settings.set(true);
        assert!(settings.get());
        assert!(!about.get());

        about.set(true);
        assert_eq!(selection.get(), Some(Sheet::About));
        assert!(!settings.get());

        about.set(false);
        assert_eq!(selection.get(), None);
    }

    #[test]
    fn mapped_binding_writes_whole_value_back() {
        #[derive(Debug, Clone, PartialEq)]
        struct Range {
            start: u32,
            end: u32,
        }

        let range = Observable::new(Range { start: 1, end: 5 });
        let end = range.as_binding().map(key_path!(Range => end));

        end.set(9);

        assert_eq!(range.get(), Range { start: 1, end: 9 });
        assert_eq!(end.get(), 9);
    }
}
