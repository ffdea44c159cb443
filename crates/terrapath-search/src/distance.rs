use terrapath_core::Point;

/// Cost of an orthogonal step across baseline terrain.
pub const ORTHOGONAL_STEP: f32 = 1.0;

/// Cost of a diagonal step across baseline terrain.
pub const DIAGONAL_STEP: f32 = std::f32::consts::SQRT_2;

/// Octile distance: the cheapest 8-connected walk between `a` and `b` on
/// baseline terrain.
#[inline]
pub fn octile(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    ORTHOGONAL_STEP * (dx + dy) as f32
        + (DIAGONAL_STEP - 2.0 * ORTHOGONAL_STEP) * dx.min(dy) as f32
}
