//! Sizes and per-axis optional dimensions.

use cgmath::Vector2;

/// A size. `x` is the width and `y` the height.
pub type Size = Vector2<f64>;

/// A width and a height, each of which may be unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OptionalDimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl OptionalDimensions {
    pub fn new(width: impl Into<Option<f64>>, height: impl Into<Option<f64>>) -> Self {
        OptionalDimensions {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Both dimensions unspecified.
    pub fn unspecified() -> Self {
        OptionalDimensions::default()
    }

    /// Clamps every specified dimension to the corresponding specified dimension of `maximum`.
    ///
    /// Unspecified dimensions stay unspecified.
    pub fn clamped(self, maximum: OptionalDimensions) -> Self {
        OptionalDimensions {
            width: clamp_axis(self.width, maximum.width),
            height: clamp_axis(self.height, maximum.height),
        }
    }
}

impl From<Size> for OptionalDimensions {
    fn from(size: Size) -> Self {
        OptionalDimensions::new(size.x, size.y)
    }
}

impl From<(f64, f64)> for OptionalDimensions {
    fn from((width, height): (f64, f64)) -> Self {
        OptionalDimensions::new(width, height)
    }
}

fn clamp_axis(value: Option<f64>, maximum: Option<f64>) -> Option<f64> {
    match (value, maximum) {
        (Some(value), Some(maximum)) => Some(value.min(maximum)),
        (value, _) => value,
    }
}

/// Clamps a size to a maximum; unspecified maximum dimensions don't constrain.
pub fn clamp_size(size: Size, maximum: OptionalDimensions) -> Size {
    Size::new(
        maximum.width.map_or(size.x, |max| size.x.min(max)),
        maximum.height.map_or(size.y, |max| size.y.min(max)),
    )
}
