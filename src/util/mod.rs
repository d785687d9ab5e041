mod stats;

pub use stats::FrameTimes;

use crate::geometry::FloatType;

/// Linear RGB color, channels nominally in [0, 1].
pub type Color = rgb::RGB<FloatType>;

pub fn gray(value: FloatType) -> Color {
    Color::new(value, value, value)
}

pub fn lerp(a: Color, b: Color, t: FloatType) -> Color {
    a + (b - a) * t
}

/// Clamps each channel to [0, 1] and scales it to a byte, truncating.
pub fn color_to_bytes(color: Color) -> [u8; 3] {
    let channel = |c: FloatType| (c.clamp(0.0, 1.0) * 255.0) as u8;
    [channel(color.r), channel(color.g), channel(color.b)]
}

/// Box filter over samples.
pub fn average(samples: impl IntoIterator<Item = Color>) -> Color {
    let mut count = 0usize;
    let mut sum = gray(0.0);
    for sample in samples {
        sum += sample;
        count += 1;
    }
    if count == 0 {
        sum
    } else {
        sum * (1.0 / count as FloatType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    #[test_case(0.0, 0 ; "black")]
    #[test_case(1.0, 255 ; "white")]
    #[test_case(-0.5, 0 ; "clamped_low")]
    #[test_case(7.0, 255 ; "clamped_high")]
    #[test_case(0.5, 127 ; "truncated")]
    #[test_case(0.999, 254 ; "no_rounding")]
    fn channel_bytes(value: f64, expected: u8) {
        assert!(color_to_bytes(gray(value)) == [expected; 3]);
    }

    #[test]
    fn channels_are_independent() {
        assert!(color_to_bytes(Color::new(1.0, 0.0, 0.2)) == [255, 0, 51]);
    }

    #[test]
    fn average_of_four() {
        let avg = average([gray(0.0), gray(1.0), gray(0.5), gray(0.5)]);
        assert!(avg == gray(0.5));
    }

    #[test]
    fn average_of_nothing_is_black() {
        assert!(average(std::iter::empty()) == gray(0.0));
    }

    #[test]
    fn lerp_ends() {
        assert!(lerp(gray(0.2), gray(0.6), 0.0) == gray(0.2));
        assert!((lerp(gray(0.2), gray(0.6), 0.5).g - 0.4).abs() < 1e-12);
    }
}
