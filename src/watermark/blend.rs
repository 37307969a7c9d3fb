use crate::foundation::core::{PixelBuffer, Rgba16};

const MAX: u64 = u16::MAX as u64;

/// Straight-alpha source-over for one pixel, 16 bits per channel.
///
/// `out_a = sa + da*(1-sa)`, `out_c = (sc*sa + dc*da*(1-sa)) / out_a`, evaluated in integers with
/// rounding.
pub fn over(dst: Rgba16, src: Rgba16) -> Rgba16 {
    let sa = u64::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == MAX {
        return src;
    }

    let da = u64::from(dst[3]);
    let inv = MAX - sa;
    // Both terms carry a factor of MAX^2.
    let src_w = sa * MAX;
    let dst_w = da * inv;
    let out_a2 = src_w + dst_w;

    let mut out = [0u16; 4];
    for i in 0..3 {
        let num = u64::from(src[i]) * src_w + u64::from(dst[i]) * dst_w;
        out[i] = ((num + out_a2 / 2) / out_a2).min(MAX) as u16;
    }
    out[3] = ((out_a2 + MAX / 2) / MAX).min(MAX) as u16;
    out
}

/// Composite `watermark` onto `base` with its top-left corner at `offset`.
///
/// Watermark pixels that land outside the base are dropped. The result has the base's
/// dimensions and base pixels outside the covered area are untouched.
#[tracing::instrument(skip(base, watermark), fields(
    base_w = base.width(),
    base_h = base.height(),
    wm_w = watermark.width(),
    wm_h = watermark.height(),
))]
pub fn composite(mut base: PixelBuffer, watermark: &PixelBuffer, offset: (i64, i64)) -> PixelBuffer {
    let (bw, bh) = (i64::from(base.width()), i64::from(base.height()));
    let (ww, wh) = (i64::from(watermark.width()), i64::from(watermark.height()));
    let (ox, oy) = offset;

    // Visible window in watermark coordinates.
    let x0 = (-ox).max(0);
    let y0 = (-oy).max(0);
    let x1 = ww.min(bw - ox);
    let y1 = wh.min(bh - oy);
    if x0 >= x1 || y0 >= y1 {
        tracing::debug!("watermark lies entirely outside the base image");
        return base;
    }

    for wy in y0..y1 {
        let by = (oy + wy) as u32;
        for wx in x0..x1 {
            let bx = (ox + wx) as u32;
            let src = watermark.pixel(wx as u32, wy as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = base.pixel(bx, by);
            base.put_pixel(bx, by, over(dst, src));
        }
    }
    base
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/blend.rs"]
mod tests;
