use crate::foundation::core::{Anchor, HAlign, VAlign};

/// Top-left offset that places a `wm` sized watermark at `anchor` inside `base`.
///
/// Offsets are not clamped: a watermark larger than the base (minus margins) gets negative or
/// overflowing coordinates and the blender clips it.
pub fn resolve_position(
    anchor: Anchor,
    margin: u32,
    base: (u32, u32),
    wm: (u32, u32),
) -> (i64, i64) {
    let margin = i64::from(margin);
    let (bw, bh) = (i64::from(base.0), i64::from(base.1));
    let (ww, wh) = (i64::from(wm.0), i64::from(wm.1));

    let x = match anchor.horizontal() {
        HAlign::Left => margin,
        HAlign::Center => (bw - ww) / 2,
        HAlign::Right => bw - ww - margin,
    };
    let y = match anchor.vertical() {
        VAlign::Top => margin,
        VAlign::Middle => (bh - wh) / 2,
        VAlign::Bottom => bh - wh - margin,
    };
    (x, y)
}
