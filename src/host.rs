use crate::controller::HostingController;
use crossbeam::channel::{Receiver, TryRecvError};
use perch_core::{Observable, Size, SizeProposal, Subscription};

/// A watched observable: the subscription keeps the channel connected.
struct Watch {
    _subscription: Subscription,
    changes: Receiver<()>,
    is_alive: Box<dyn Fn() -> bool + Send + Sync>,
}

/// Connects observable state to a hosting controller.
///
/// The host remembers the last proposal it was given and, on [`poll`](Host::poll), re-resolves the
/// preferred size if any watched observable changed since the previous poll.
pub struct Host<C> {
    pub controller: C,
    proposal: SizeProposal,
    preferred_size: Option<Size>,
    watches: Vec<Watch>,
}

impl<C: HostingController> Host<C> {
    /// Creates a new Host.
    ///
    /// Nothing is measured until you call [`propose`](Host::propose) or [`poll`](Host::poll).
    pub fn new(controller: C) -> Host<C> {
        Host {
            controller,
            proposal: SizeProposal::default(),
            preferred_size: None,
            watches: Vec::new(),
        }
    }

    /// Re-measures whenever `observable` changes.
    ///
    /// The host does not keep `observable` alive.
    pub fn watch<T: 'static>(&mut self, observable: &Observable<T>) {
        let (subscription, changes) = observable.changes();
        let weak = observable.downgrade();
        self.watches.push(Watch {
            _subscription: subscription,
            changes,
            is_alive: Box::new(move || weak.is_alive()),
        });
    }

    /// Number of observables still being watched.
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    /// Sets a new proposal and resolves the preferred size immediately.
    pub fn propose(&mut self, proposal: SizeProposal) -> Size {
        self.proposal = proposal;
        self.measure()
    }

    /// The last resolved size.
    pub fn preferred_size(&self) -> Option<Size> {
        self.preferred_size
    }

    /// Receives all change ticks and re-measures if there were any.
    ///
    /// Returns the new preferred size if it changed.
    pub fn poll(&mut self) -> Option<Size> {
        let mut changed = false;

        self.watches.retain(|watch| {
            loop {
                match watch.changes.try_recv() {
                    Ok(()) => changed = true,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            if (watch.is_alive)() {
                true
            } else {
                tracing::warn!("watched observable has been released; no longer watching it");
                false
            }
        });

        if !changed && self.preferred_size.is_some() {
            return None;
        }

        let previous = self.preferred_size;
        let size = self.measure();
        if previous == Some(size) {
            None
        } else {
            Some(size)
        }
    }

    fn measure(&mut self) -> Size {
        let size = self.controller.size_that_fits(&self.proposal);
        tracing::debug!(width = size.x, height = size.y, "resolved preferred size");
        self.preferred_size = Some(size);
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::{key_path, OptionalDimensions};

    #[derive(Debug, Clone, PartialEq)]
    struct Model {
        title: String,
        badge: u32,
    }

    /// One character is 10 points wide and 20 tall.
    struct TitleView {
        title: Observable<String>,
    }

    impl HostingController for TitleView {
        fn size_that_fits_in(&self, size: Size) -> Size {
            let width = self.title.get().chars().count() as f64 * 10.;
            Size::new(width.min(size.x), 20.)
        }
    }

    fn proposal() -> SizeProposal {
        SizeProposal::new(OptionalDimensions::unspecified(), (400., 100.), None, None)
    }

    #[test]
    fn poll_remeasures_after_changes() {
        let model = Observable::new(Model {
            title: "hi".into(),
            badge: 0,
        });
        let title = model.project(key_path!(Model => title));
        let mut host = Host::new(TitleView {
            title: title.clone(),
        });
        host.watch(&title);

        assert_eq!(host.propose(proposal()), Size::new(20., 20.));
        assert_eq!(host.poll(), None);

        title.set("hello".into());
        assert_eq!(host.poll(), Some(Size::new(50., 20.)));
        assert_eq!(host.preferred_size(), Some(Size::new(50., 20.)));

        // a change elsewhere in the model reaches the projection but doesn't change the size
        model.update(|m| m.badge += 1);
        assert_eq!(host.poll(), None);
    }

    #[test]
    fn first_poll_measures() {
        let title = Observable::new(String::from("abc"));
        let mut host = Host::new(TitleView {
            title: title.clone(),
        });
        assert_eq!(host.poll(), Some(Size::new(30., 20.)));
    }

    #[test]
    fn released_observables_are_dropped_from_watch_list() {
        let title = Observable::new(String::from("abc"));
        let mut host = Host::new(TitleView {
            title: Observable::new(String::new()),
        });
        host.watch(&title);
        host.propose(proposal());
        assert_eq!(host.watch_count(), 1);

        drop(title);
        host.poll();
        assert_eq!(host.watch_count(), 0);
    }
}
