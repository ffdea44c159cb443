use terrapath_core::{CostField, Point, Range};

/// Read-only source of per-cell speed multipliers.
///
/// The engine only ever reads through this trait, so any rectangular grid
/// that can answer "how fast is this cell" can be searched.
pub trait SpeedMap {
    /// Rectangle of valid coordinates.
    fn bounds(&self) -> Range;

    /// Multiplier at `p`; `None` outside [`bounds`](Self::bounds).
    /// Must be finite and non-negative, 0 meaning impassable. The engine
    /// also walls off positive values below [`MIN_SPEED`].
    ///
    /// [`MIN_SPEED`]: terrapath_core::MIN_SPEED
    fn speed(&self, p: Point) -> Option<f32>;

    /// Whether `p` is inside the map and can be entered.
    fn is_traversable(&self, p: Point) -> bool {
        self.speed(p).is_some_and(|s| s > 0.0)
    }

    /// Largest multiplier anywhere in the map.
    fn max_speed(&self) -> f32 {
        self.bounds()
            .iter()
            .filter_map(|p| self.speed(p))
            .fold(0.0, f32::max)
    }
}

impl SpeedMap for CostField {
    #[inline]
    fn bounds(&self) -> Range {
        CostField::bounds(self)
    }

    #[inline]
    fn speed(&self, p: Point) -> Option<f32> {
        self.get(p)
    }

    fn max_speed(&self) -> f32 {
        CostField::max_speed(self)
    }
}
