//! The interface to native hosting controllers.

use perch_core::{
    FittingSentinels, LayoutPriority, OptionalDimensions, Size, SizeProposal, SizeResolver,
};

/// A native view controller hosting declarative content.
///
/// Implementors only provide the measurement primitive; everything else has a default that
/// routes through [`SizeResolver`].
pub trait HostingController {
    /// The native "size that fits in" primitive.
    ///
    /// May return sentinel values (the expanded size, `f64::MAX`, infinity) on axes where the
    /// content would grow without bound, and zero on axes where it has no opinion.
    fn size_that_fits_in(&self, size: Size) -> Size;

    /// Lays out the hosted view immediately if it has pending layout.
    fn layout_if_needed(&self) {}

    /// The sentinel values this toolkit uses.
    fn fitting_sentinels(&self) -> FittingSentinels {
        FittingSentinels::default()
    }

    /// Resolves the size this controller's view wants for `proposal`, laying it out first.
    fn size_that_fits(&self, proposal: &SizeProposal) -> Size {
        self.size_that_fits_with(proposal, true)
    }

    /// Resolves the size this controller's view wants for `proposal`.
    ///
    /// - `layout_immediately`: if true, pending layout is flushed before measuring. Fixed-size
    ///   proposals never lay out or measure.
    fn size_that_fits_with(&self, proposal: &SizeProposal, layout_immediately: bool) -> Size {
        let resolver = SizeResolver::new(self.fitting_sentinels());

        if proposal.is_fixed_size() {
            return proposal.target_size(&resolver.sentinels);
        }

        if layout_immediately {
            self.layout_if_needed();
        }

        resolver.resolve(proposal, |size| self.size_that_fits_in(size))
    }

    /// Resolves the size for a target size with optional per-axis fitting priorities.
    fn size_that_fits_prioritized(
        &self,
        size: OptionalDimensions,
        horizontal: Option<LayoutPriority>,
        vertical: Option<LayoutPriority>,
    ) -> Size {
        self.size_that_fits(&SizeProposal::with_target(size, horizontal, vertical))
    }
}
