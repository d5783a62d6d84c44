//! Height-based block colors.
//!
//! Blocks are shaded with a green gradient that brightens with height, so
//! terrain relief stays readable without textures or lighting.

/// Background color, in 8-bit sRGB.
pub const SKY_BLUE: [u8; 4] = [102, 191, 255, 255];

/// Color of a block at height `y` in a world whose tallest column is
/// `max_height`, in 8-bit sRGB.
///
/// With `t = y / max(max_height, 1)` the channels are `20 + 50t`, `100 + 100t`
/// and `20 + 40t`, truncated, with full alpha.
pub fn color_for(y: u32, max_height: u32) -> [u8; 4] {
    let t = y as f32 / max_height.max(1) as f32;
    [
        (20.0 + 50.0 * t) as u8,
        (100.0 + 100.0 * t) as u8,
        (20.0 + 40.0 * t) as u8,
        255,
    ]
}

/// Converts one 8-bit sRGB channel into linear light.
pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts an 8-bit sRGB color into the linear floats a render target expects.
pub fn to_linear(color: [u8; 4]) -> [f32; 4] {
    [
        srgb_to_linear(color[0]),
        srgb_to_linear(color[1]),
        srgb_to_linear(color[2]),
        color[3] as f32 / 255.0,
    ]
}

/// Clear color for the render pass.
pub fn clear_color() -> wgpu::Color {
    let [r, g, b, a] = to_linear(SKY_BLUE);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_level_is_darkest_green() {
        assert_eq!(color_for(0, 31), [20, 100, 20, 255]);
    }

    #[test]
    fn top_of_world_is_lightest_green() {
        assert_eq!(color_for(31, 31), [70, 200, 60, 255]);
    }

    #[test]
    fn midpoint_truncates() {
        // t = 0.5 -> 45, 150, 40
        assert_eq!(color_for(2, 4), [45, 150, 40, 255]);
        // t = 1/3 -> 36.67, 133.33, 33.33
        assert_eq!(color_for(1, 3), [36, 133, 33, 255]);
    }

    #[test]
    fn flat_zero_world_does_not_divide_by_zero() {
        assert_eq!(color_for(0, 0), [20, 100, 20, 255]);
    }

    #[test]
    fn brightness_grows_with_height() {
        let mut previous = color_for(0, 20);
        for y in 1..=20 {
            let color = color_for(y, 20);
            assert!(color[1] >= previous[1]);
            previous = color;
        }
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(128) < 128.0 / 255.0);
    }
}
