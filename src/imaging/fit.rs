//! Pure geometry for fitting images into their target boxes.
//!
//! Two fit strategies exist. Thumbnails cover-crop: scale until the
//! target box is completely covered, then cut the overflow from the
//! center, so the output is always exactly the requested size. Inline
//! images width-cap: scale down to a maximum width, height follows the
//! aspect ratio, and images already narrow enough pass through
//! untouched.
//!
//! Everything in this module is integer math on dimensions. No pixels,
//! no I/O.

/// Scaled dimensions that completely cover a target box.
///
/// The source is scaled (up or down) until both target dimensions are
/// covered, preserving aspect ratio. The returned size is what the
/// image must be resized to before the center crop; at least one axis
/// matches the target exactly and the other meets or exceeds it.
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_width, src_height) = source;
    let (target_width, target_height) = target;

    if src_width == 0 || src_height == 0 {
        return target;
    }

    let src_aspect = src_width as f64 / src_height as f64;
    let target_aspect = target_width as f64 / target_height as f64;

    if src_aspect > target_aspect {
        // Source is wider than the box: match height, let width overflow.
        let height = target_height;
        let width = (height as f64 * src_aspect).round() as u32;
        (width.max(target_width), height)
    } else {
        // Source is taller (or same shape): match width, let height overflow.
        let width = target_width;
        let height = (width as f64 / src_aspect).round() as u32;
        (width, height.max(target_height))
    }
}

/// Top-left corner of a centered crop of `target` out of `scaled`.
///
/// Callers pass the output of [`cover_dimensions`], which guarantees
/// `scaled >= target` on both axes; the saturating subtraction keeps
/// degenerate inputs from panicking.
pub fn crop_origin(scaled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let x = scaled.0.saturating_sub(target.0) / 2;
    let y = scaled.1.saturating_sub(target.1) / 2;
    (x, y)
}

/// Dimensions after capping width at `max_width`, preserving aspect
/// ratio. Returns `None` when the source is already within the cap,
/// meaning the image should not be resampled at all.
pub fn width_capped(source: (u32, u32), max_width: u32) -> Option<(u32, u32)> {
    let (src_width, src_height) = source;
    if src_width <= max_width || src_width == 0 {
        return None;
    }

    let height = (max_width as f64 * src_height as f64 / src_width as f64).round() as u32;
    Some((max_width, height.max(1)))
}
