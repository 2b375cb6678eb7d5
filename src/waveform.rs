//! Decorative waveform shown under the seek slider
//!
//! Bar heights are noise, not audio analysis. Only the active/inactive
//! split carries meaning: it mirrors playback progress.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of bars in the waveform strip
pub const BAR_COUNT: usize = 100;

/// Palette slot a player is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemColor {
    #[default]
    Primary,
    Secondary,
    Accent,
}

impl StemColor {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            StemColor::Primary => (0x8B, 0x5C, 0xF6),
            StemColor::Secondary => (0xD9, 0x46, 0xEF),
            StemColor::Accent => (0x0E, 0xA5, 0xE9),
        }
    }

    /// Colour of played bars, e.g. `#8B5CF6`
    pub fn active_hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Colour of unplayed bars, e.g. `rgba(139, 92, 246, 0.2)`
    pub fn inactive_rgba(self) -> String {
        let (r, g, b) = self.rgb();
        format!("rgba({}, {}, {}, 0.2)", r, g, b)
    }
}

/// Number of bars that count as played
///
/// `floor(current_time / duration * 100)`, clamped to `[0, BAR_COUNT]`.
pub fn active_bar_count(current_time: f64, duration: f64) -> usize {
    if !(duration > 0.0) || !current_time.is_finite() {
        return 0;
    }

    let percent = (current_time / duration * BAR_COUNT as f64).floor();
    percent.clamp(0.0, BAR_COUNT as f64) as usize
}

/// One bar of the strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Height as a percentage of the strip
    pub height: f32,
    pub active: bool,
}

/// Rendered waveform for one frame
#[derive(Debug, Clone)]
pub struct Waveform {
    bars: Vec<Bar>,
    active: usize,
    color: StemColor,
}

impl Waveform {
    pub fn render<R: Rng + ?Sized>(
        current_time: f64,
        duration: f64,
        color: StemColor,
        rng: &mut R,
    ) -> Self {
        let active = active_bar_count(current_time, duration);
        let phase = if current_time.is_finite() { current_time } else { 0.0 };

        let bars = (0..BAR_COUNT)
            .map(|i| {
                let wave = ((i as f64) * 0.5 + phase).sin() * 30.0 + 50.0;
                let jitter = rng.gen::<f64>() * 20.0;
                Bar {
                    height: (wave + jitter) as f32,
                    active: i < active,
                }
            })
            .collect();

        Self {
            bars,
            active,
            color,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn color(&self) -> StemColor {
        self.color
    }

    /// Fill colour for the bar at `index`
    pub fn bar_color(&self, index: usize) -> String {
        if index < self.active {
            self.color.active_hex()
        } else {
            self.color.inactive_rgba()
        }
    }

    /// Terminal rendering, `width` columns wide
    pub fn to_ascii(&self, width: usize) -> String {
        const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

        let width = width.clamp(1, BAR_COUNT);
        (0..width)
            .map(|col| {
                let index = col * BAR_COUNT / width;
                let bar = self.bars[index];
                if bar.active {
                    let level = ((bar.height / 100.0) * LEVELS.len() as f32) as usize;
                    LEVELS[level.min(LEVELS.len() - 1)]
                } else {
                    '·'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_active_bar_count() {
        assert_eq!(active_bar_count(0.0, 204.0), 0);
        assert_eq!(active_bar_count(51.0, 204.0), 25);
        assert_eq!(active_bar_count(1.0, 3.0), 33);
        assert_eq!(active_bar_count(204.0, 204.0), 100);
        assert_eq!(active_bar_count(300.0, 204.0), 100);
        assert_eq!(active_bar_count(-5.0, 204.0), 0);
        assert_eq!(active_bar_count(5.0, 0.0), 0);
        assert_eq!(active_bar_count(5.0, f64::NAN), 0);
    }

    #[test]
    fn test_render_marks_leading_bars_active() {
        let mut rng = StdRng::seed_from_u64(7);
        let waveform = Waveform::render(102.0, 204.0, StemColor::Accent, &mut rng);

        assert_eq!(waveform.bars().len(), BAR_COUNT);
        assert_eq!(waveform.active_count(), 50);
        assert!(waveform.bars()[..50].iter().all(|b| b.active));
        assert!(waveform.bars()[50..].iter().all(|b| !b.active));
        assert!(waveform.bars().iter().all(|b| (20.0..=100.0).contains(&b.height)));
    }

    #[test]
    fn test_palette() {
        assert_eq!(StemColor::Primary.active_hex(), "#8B5CF6");
        assert_eq!(StemColor::Secondary.active_hex(), "#D946EF");
        assert_eq!(StemColor::Accent.inactive_rgba(), "rgba(14, 165, 233, 0.2)");

        let mut rng = StdRng::seed_from_u64(1);
        let waveform = Waveform::render(10.0, 100.0, StemColor::Primary, &mut rng);
        assert_eq!(waveform.bar_color(0), "#8B5CF6");
        assert_eq!(waveform.bar_color(10), "rgba(139, 92, 246, 0.2)");
    }

    #[test]
    fn test_ascii_width() {
        let mut rng = StdRng::seed_from_u64(3);
        let waveform = Waveform::render(0.0, 100.0, StemColor::Primary, &mut rng);
        let line = waveform.to_ascii(40);
        assert_eq!(line.chars().count(), 40);
        assert!(line.chars().all(|c| c == '·'));
    }

    proptest! {
        #[test]
        fn prop_active_bar_count_is_floored_percent(
            current_time in -1.0e6f64..1.0e6,
            duration in prop::num::f64::POSITIVE | prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL,
        ) {
            let expected = (current_time / duration * 100.0).floor().clamp(0.0, 100.0) as usize;
            prop_assert_eq!(active_bar_count(current_time, duration), expected);
        }

        #[test]
        fn prop_render_marks_leading_bars(
            current_time in -10.0f64..300.0,
            duration in 0.0f64..300.0,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let waveform = Waveform::render(current_time, duration, StemColor::default(), &mut rng);
            let count = active_bar_count(current_time, duration);

            prop_assert_eq!(waveform.active_count(), count);
            for (index, bar) in waveform.bars().iter().enumerate() {
                prop_assert_eq!(bar.active, index < count);
            }
        }
    }
}
