//! Size negotiation.
//!
//! Native measurement primitives answer "how large do you want to be in this size?" and signal
//! "as large as you let me" with magic values: a toolkit-specific expanded size,
//! `f64::MAX`, or infinity. [`SizeResolver`] turns a [`SizeProposal`] into a call (or two) to
//! such a primitive. The result is finite on every axis the proposal gives a maximum for; on an
//! axis without one, a primitive that keeps answering "unbounded" is passed through.

use crate::dimensions::{clamp_size, OptionalDimensions, Size};

/// How strongly an axis should stick to its target size.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LayoutPriority(pub f32);

impl LayoutPriority {
    pub const REQUIRED: LayoutPriority = LayoutPriority(1000.);
    pub const DEFAULT_HIGH: LayoutPriority = LayoutPriority(750.);
    pub const DEFAULT_LOW: LayoutPriority = LayoutPriority(250.);
    pub const FITTING_SIZE_LEVEL: LayoutPriority = LayoutPriority(50.);

    pub fn is_required(self) -> bool {
        self == LayoutPriority::REQUIRED
    }
}

fn is_required(priority: Option<LayoutPriority>) -> bool {
    priority.map_or(false, LayoutPriority::is_required)
}

/// Per-axis fitting priority. Unspecified axes are flexible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fit {
    pub horizontal: Option<LayoutPriority>,
    pub vertical: Option<LayoutPriority>,
}

impl Fit {
    pub fn new(horizontal: Option<LayoutPriority>, vertical: Option<LayoutPriority>) -> Self {
        Fit {
            horizontal,
            vertical,
        }
    }
}

/// Minimum, target and maximum size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizingConstraints {
    pub minimum: OptionalDimensions,
    pub target: OptionalDimensions,
    pub maximum: OptionalDimensions,
}

/// A request to measure a view.
///
/// `SizeProposal::default()` leaves everything unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeProposal {
    size: SizingConstraints,
    fit: Fit,
}

impl SizeProposal {
    pub fn new(
        target: impl Into<OptionalDimensions>,
        maximum: impl Into<OptionalDimensions>,
        horizontal: Option<LayoutPriority>,
        vertical: Option<LayoutPriority>,
    ) -> Self {
        SizeProposal {
            size: SizingConstraints {
                minimum: OptionalDimensions::unspecified(),
                target: target.into(),
                maximum: maximum.into(),
            },
            fit: Fit::new(horizontal, vertical),
        }
    }

    /// A proposal with a target size and no maximum.
    pub fn with_target(
        target: impl Into<OptionalDimensions>,
        horizontal: Option<LayoutPriority>,
        vertical: Option<LayoutPriority>,
    ) -> Self {
        SizeProposal::new(target, OptionalDimensions::unspecified(), horizontal, vertical)
    }

    /// A proposal with per-axis fixed-size flags.
    ///
    /// Fixed axes are required; the others get the lowest default flexible priority.
    pub fn fixed(
        target: impl Into<OptionalDimensions>,
        (horizontal, vertical): (bool, bool),
    ) -> Self {
        let priority = |fixed: bool| {
            Some(if fixed {
                LayoutPriority::REQUIRED
            } else {
                LayoutPriority::DEFAULT_LOW
            })
        };
        SizeProposal::with_target(target, priority(horizontal), priority(vertical))
    }

    /// A proposal from a `(target, maximum)` pair and a fit.
    pub fn from_parts(
        (target, maximum): (OptionalDimensions, OptionalDimensions),
        fit: Fit,
    ) -> Self {
        SizeProposal::new(target, maximum, fit.horizontal, fit.vertical)
    }

    pub fn constraints(&self) -> &SizingConstraints {
        &self.size
    }

    pub fn fit(&self) -> Fit {
        self.fit
    }

    /// True if both axes are required.
    pub fn is_fixed_size(&self) -> bool {
        is_required(self.fit.horizontal) && is_required(self.fit.vertical)
    }

    /// The target size, with unspecified axes expanded.
    pub fn target_size(&self, sentinels: &FittingSentinels) -> Size {
        Size::new(
            self.size.target.width.unwrap_or(sentinels.expanded.x),
            self.size.target.height.unwrap_or(sentinels.expanded.y),
        )
    }

    /// The size to measure in first.
    ///
    /// Required axes use the clamped target (compressed if unspecified); flexible axes use the
    /// maximum (expanded if unspecified).
    pub fn fit_size(&self, sentinels: &FittingSentinels) -> Size {
        let clamped_target = self.size.target.clamped(self.size.maximum);
        let width = if is_required(self.fit.horizontal) {
            clamped_target.width.unwrap_or(sentinels.compressed.x)
        } else {
            self.size.maximum.width.unwrap_or(sentinels.expanded.x)
        };
        let height = if is_required(self.fit.vertical) {
            clamped_target.height.unwrap_or(sentinels.compressed.y)
        } else {
            self.size.maximum.height.unwrap_or(sentinels.expanded.y)
        };
        Size::new(width, height)
    }
}

/// The sizes a host toolkit uses to mean "as large as possible" and "as small as possible".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittingSentinels {
    pub expanded: Size,
    pub compressed: Size,
}

impl Default for FittingSentinels {
    fn default() -> Self {
        FittingSentinels {
            expanded: Size::new(10_000_000., 10_000_000.),
            compressed: Size::new(0., 0.),
        }
    }
}

/// The ways a measurement primitive spells "unbounded" on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unbounded {
    Expanded,
    Max,
    Infinite,
}

impl FittingSentinels {
    fn unbounded(value: f64, expanded: f64) -> Option<Unbounded> {
        if value == expanded {
            Some(Unbounded::Expanded)
        } else if value == f64::MAX {
            Some(Unbounded::Max)
        } else if value.is_infinite() {
            Some(Unbounded::Infinite)
        } else {
            None
        }
    }
}

/// Which repair a measurement needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    None,
    Unbounded,
    UnboundedWidth,
    UnboundedHeight,
    ZeroWidth,
    ZeroHeight,
    ZeroSize,
}

/// Resolves size proposals against a measurement primitive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeResolver {
    pub sentinels: FittingSentinels,
}

impl SizeResolver {
    pub fn new(sentinels: FittingSentinels) -> Self {
        SizeResolver { sentinels }
    }

    /// Resolves the size a view should report for `proposal`.
    ///
    /// `measure` is the native "size that fits in" primitive. It is called at most twice, and not
    /// at all for fixed-size proposals.
    pub fn resolve<M>(&self, proposal: &SizeProposal, mut measure: M) -> Size
    where
        M: FnMut(Size) -> Size,
    {
        let sentinels = &self.sentinels;
        let target = proposal.target_size(sentinels);

        if proposal.is_fixed_size() {
            return target;
        }

        let maximum = proposal.size.maximum;
        let fit = proposal.fit_size(sentinels);
        let clamped_target = clamp_size(target, maximum);

        let mut result = measure(fit);

        let repair = self.classify(result, target);
        tracing::trace!(?repair, width = result.x, height = result.y, "measured fit size");

        match repair {
            Repair::None => {}
            Repair::Unbounded => result = measure(clamped_target),
            Repair::UnboundedWidth => result = measure(Size::new(clamped_target.x, fit.y)),
            Repair::UnboundedHeight => result = measure(Size::new(fit.x, clamped_target.y)),
            Repair::ZeroWidth => result = measure(Size::new(sentinels.expanded.x, fit.y)),
            // uses the expanded *width* for the height; see DESIGN.md
            Repair::ZeroHeight => result = measure(Size::new(fit.x, sentinels.expanded.x)),
            Repair::ZeroSize => result = measure(sentinels.expanded),
        }

        if is_required(proposal.fit.horizontal) {
            result.x = target.x;
        }
        if is_required(proposal.fit.vertical) {
            result.y = target.y;
        }

        // a view that is zero on only one axis would vanish; give it a minimum extent
        if result.x == 0. && result.y != 0. {
            result.x = 1.;
        } else if result.x != 0. && result.y == 0. {
            result.y = 1.;
        }

        clamp_size(result, maximum)
    }

    fn classify(&self, result: Size, target: Size) -> Repair {
        let expanded = self.sentinels.expanded;
        let width = FittingSentinels::unbounded(result.x, expanded.x);
        let height = FittingSentinels::unbounded(result.y, expanded.y);

        // both axes only count as unbounded when they agree on the spelling; a mixed answer
        // is repaired on the width alone
        if width.is_some() && width == height {
            Repair::Unbounded
        } else if width.is_some() {
            // a zero target can't bound anything
            if target.x != 0. {
                Repair::UnboundedWidth
            } else {
                Repair::None
            }
        } else if height.is_some() {
            if target.y != 0. {
                Repair::UnboundedHeight
            } else {
                Repair::None
            }
        } else if result.x == 0. && result.y > 0. {
            Repair::ZeroWidth
        } else if result.x > 0. && result.y == 0. {
            Repair::ZeroHeight
        } else if result.x == 0. && result.y == 0. {
            Repair::ZeroSize
        } else {
            Repair::None
        }
    }
}

/// Resolves `proposal` with the default sentinels.
pub fn resolve<M>(proposal: &SizeProposal, measure: M) -> Size
where
    M: FnMut(Size) -> Size,
{
    SizeResolver::default().resolve(proposal, measure)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn measurement() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(0.),
            Just(f64::INFINITY),
            Just(f64::MAX),
            Just(10_000_000.),
            0f64..5_000.,
        ]
    }

    proptest! {
        #[test]
        fn result_never_exceeds_maximum(
            target in (0f64..2_000., 0f64..2_000.),
            maximum in (1f64..1_000., 1f64..1_000.),
            first in (measurement(), measurement()),
            second in (measurement(), measurement()),
            required in (any::<bool>(), any::<bool>()),
        ) {
            let priority = |required: bool| {
                Some(if required {
                    LayoutPriority::REQUIRED
                } else {
                    LayoutPriority::DEFAULT_LOW
                })
            };
            let proposal = SizeProposal::new(
                target,
                maximum,
                priority(required.0),
                priority(required.1),
            );
            let mut calls = 0;
            let size = resolve(&proposal, |_| {
                calls += 1;
                if calls == 1 {
                    Size::new(first.0, first.1)
                } else {
                    Size::new(second.0, second.1)
                }
            });

            prop_assert!(calls <= 2);
            if !proposal.is_fixed_size() {
                prop_assert!(size.x <= maximum.0);
                prop_assert!(size.y <= maximum.1);
                prop_assert!(size.x.is_finite() && size.y.is_finite());
            }
        }
    }
}
