//! Pre-inference exposure and detail heuristics.

use image::{GrayImage, Luma, RgbImage};
use smartcat_contracts::i18n::MessageId;

const DARK_BUCKETS: usize = 24;
const BRIGHT_BUCKETS: usize = 24;
const EXPOSURE_RATIO: f64 = 0.95;
const DARK_MEAN_MAX: f64 = 20.0;
const BRIGHT_MEAN_MIN: f64 = 235.0;
const EXPOSURE_STDDEV_MAX: f64 = 10.0;
const CONTRAST_MIN: u8 = 15;
const CONTRAST_STDDEV_MAX: f64 = 12.0;
const ENTROPY_MIN: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityVerdict {
    Ok,
    TooDark,
    TooBright,
    LowContrast,
    LowEntropy,
}

impl QualityVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityVerdict::Ok => "ok",
            QualityVerdict::TooDark => "too_dark",
            QualityVerdict::TooBright => "too_bright",
            QualityVerdict::LowContrast => "low_contrast",
            QualityVerdict::LowEntropy => "low_entropy",
        }
    }

    pub fn is_ok(self) -> bool {
        self == QualityVerdict::Ok
    }

    /// Refusal text shown for a rejected image; `None` for `Ok`.
    pub fn message_id(self) -> Option<MessageId> {
        match self {
            QualityVerdict::Ok => None,
            QualityVerdict::TooDark => Some(MessageId::TooDark),
            QualityVerdict::TooBright => Some(MessageId::TooBright),
            QualityVerdict::LowContrast | QualityVerdict::LowEntropy => Some(MessageId::LowDetail),
        }
    }
}

/// First-order statistics of a luma histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaStats {
    pub mean: f64,
    pub stddev: f64,
    pub dark_ratio: f64,
    pub bright_ratio: f64,
    pub entropy: f64,
    pub contrast: u8,
}

impl LumaStats {
    pub fn from_histogram(histogram: &[u64; 256]) -> Self {
        let total_raw: u64 = histogram.iter().sum();
        let total = total_raw.max(1) as f64;

        let mut sum = 0f64;
        let mut sum_sq = 0f64;
        let mut entropy = 0f64;
        for (level, count) in histogram.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let weight = *count as f64;
            let value = level as f64;
            sum += value * weight;
            sum_sq += value * value * weight;
            let probability = weight / total;
            entropy -= probability * probability.log2();
        }
        let mean = sum / total;
        let variance = (sum_sq / total) - mean * mean;

        let dark: u64 = histogram[..DARK_BUCKETS].iter().sum();
        let bright: u64 = histogram[256 - BRIGHT_BUCKETS..].iter().sum();
        let min_level = histogram.iter().position(|count| *count > 0).unwrap_or(0);
        let max_level = histogram.iter().rposition(|count| *count > 0).unwrap_or(0);

        Self {
            mean,
            stddev: variance.max(0.0).sqrt(),
            dark_ratio: dark as f64 / total,
            bright_ratio: bright as f64 / total,
            entropy,
            contrast: (max_level - min_level) as u8,
        }
    }

    pub fn of(luma: &GrayImage) -> Self {
        let mut histogram = [0u64; 256];
        for pixel in luma.pixels() {
            histogram[pixel[0] as usize] += 1;
        }
        Self::from_histogram(&histogram)
    }

    /// Fixed-priority decision: dark, bright, contrast, entropy, ok.
    pub fn verdict(&self) -> QualityVerdict {
        if self.dark_ratio > EXPOSURE_RATIO
            && self.mean < DARK_MEAN_MAX
            && self.stddev < EXPOSURE_STDDEV_MAX
        {
            return QualityVerdict::TooDark;
        }
        if self.bright_ratio > EXPOSURE_RATIO
            && self.mean > BRIGHT_MEAN_MIN
            && self.stddev < EXPOSURE_STDDEV_MAX
        {
            return QualityVerdict::TooBright;
        }
        if self.contrast < CONTRAST_MIN && self.stddev < CONTRAST_STDDEV_MAX {
            return QualityVerdict::LowContrast;
        }
        if self.entropy < ENTROPY_MIN {
            return QualityVerdict::LowEntropy;
        }
        QualityVerdict::Ok
    }
}

/// BT.601 luma with the same fixed-point rounding as common imaging
/// libraries, so thresholds line up with what users see elsewhere.
pub fn to_luma(rgb: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = (u32::from(r) * 19_595 + u32::from(g) * 38_470 + u32::from(b) * 7_471 + 0x8000) >> 16;
        gray.put_pixel(x, y, Luma([luma.min(255) as u8]));
    }
    gray
}

/// Evaluate an RGB sample. The sample itself is left untouched.
pub fn evaluate(image: &RgbImage) -> QualityVerdict {
    let stats = LumaStats::of(&to_luma(image));
    let verdict = stats.verdict();
    log::debug!(
        "quality: mean={:.1} stddev={:.1} dark={:.3} bright={:.3} entropy={:.3} contrast={} -> {}",
        stats.mean,
        stats.stddev,
        stats.dark_ratio,
        stats.bright_ratio,
        stats.entropy,
        stats.contrast,
        verdict.as_str()
    );
    verdict
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let level = ((x * 7 + y * 13) % 256) as u8;
            Rgb([level, level.wrapping_mul(3), 255 - level])
        })
    }

    #[test]
    fn black_image_is_too_dark() {
        assert_eq!(evaluate(&solid(64, 64, [0, 0, 0])), QualityVerdict::TooDark);
    }

    #[test]
    fn white_image_is_too_bright() {
        assert_eq!(evaluate(&solid(32, 48, [255, 255, 255])), QualityVerdict::TooBright);
    }

    #[test]
    fn flat_mid_grey_is_low_contrast() {
        assert_eq!(evaluate(&solid(16, 16, [128, 128, 128])), QualityVerdict::LowContrast);
    }

    #[test]
    fn two_tone_image_is_low_entropy() {
        // Half black, half white: contrast and stddev are high, entropy is 1 bit.
        let mut histogram = [0u64; 256];
        histogram[0] = 100;
        histogram[255] = 100;
        let stats = LumaStats::from_histogram(&histogram);
        assert!((stats.entropy - 1.0).abs() < 1e-9);
        assert_eq!(stats.verdict(), QualityVerdict::Ok);

        histogram[255] = 10;
        let skewed = LumaStats::from_histogram(&histogram);
        assert!(skewed.entropy < 1.0);
        assert!(skewed.stddev >= CONTRAST_STDDEV_MAX);
        assert_eq!(skewed.verdict(), QualityVerdict::LowEntropy);
    }

    #[test]
    fn textured_image_passes() {
        assert_eq!(evaluate(&gradient(64, 64)), QualityVerdict::Ok);
    }

    #[test]
    fn dark_histogram_is_exclusively_too_dark() {
        // 96% of mass in the lowest buckets, mean well under 20, stddev under 10.
        let mut histogram = [0u64; 256];
        histogram[0] = 900;
        histogram[10] = 60;
        histogram[30] = 40;
        let stats = LumaStats::from_histogram(&histogram);
        assert!(stats.dark_ratio > 0.95);
        assert!(stats.mean < 20.0);
        assert!(stats.stddev < 10.0);
        assert_eq!(stats.verdict(), QualityVerdict::TooDark);
    }

    #[test]
    fn histogram_stats_match_hand_computation() {
        let mut histogram = [0u64; 256];
        histogram[10] = 1;
        histogram[30] = 1;
        let stats = LumaStats::from_histogram(&histogram);
        assert!((stats.mean - 20.0).abs() < 1e-9);
        assert!((stats.stddev - 10.0).abs() < 1e-9);
        assert_eq!(stats.contrast, 20);
        assert!((stats.dark_ratio - 0.5).abs() < 1e-9);
        assert_eq!(stats.bright_ratio, 0.0);
    }

    #[test]
    fn luma_uses_bt601_weights() {
        let luma = to_luma(&solid(1, 1, [255, 0, 0]));
        assert_eq!(luma.get_pixel(0, 0)[0], 76);
        let luma = to_luma(&solid(1, 1, [0, 255, 0]));
        assert_eq!(luma.get_pixel(0, 0)[0], 150);
        let luma = to_luma(&solid(1, 1, [255, 255, 255]));
        assert_eq!(luma.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn rejected_verdicts_map_to_messages() {
        assert_eq!(QualityVerdict::Ok.message_id(), None);
        assert_eq!(QualityVerdict::TooDark.message_id(), Some(MessageId::TooDark));
        assert_eq!(QualityVerdict::LowEntropy.message_id(), Some(MessageId::LowDetail));
        assert_eq!(QualityVerdict::LowContrast.message_id(), Some(MessageId::LowDetail));
    }
}
