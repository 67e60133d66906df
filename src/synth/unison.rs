use crate::MAX_UNISON;

/// Pitch ratios for the stacked oscillators of one voice.
///
/// For `N` oscillators detuned by `D` semitones, oscillator `i` plays at
///
/// ```text
/// ratio[i] = 2^(((i - N/2) * D) / 12)        (N/2 rounds down)
/// ```
///
/// so the stack fans out around the played pitch, one detune step apart. With
/// an even `N` the stack leans one step flat. `D = 0` collapses every
/// oscillator onto ratio 1.0.
///
/// The ratios are stored inline so the layout is `Copy`: the control thread
/// computes it and hands the whole value to the audio thread. A reader can
/// never see a size that disagrees with the ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnisonLayout {
    ratios: [f32; MAX_UNISON],
    size: usize,
    detune: f32,
}

impl UnisonLayout {
    /// Build a layout. Size is clamped to `1..=MAX_UNISON`; a non-finite
    /// detune is treated as zero.
    pub fn new(size: usize, detune: f32) -> Self {
        let size = size.clamp(1, MAX_UNISON);
        let detune = if detune.is_finite() { detune } else { 0.0 };

        let mut ratios = [1.0; MAX_UNISON];
        let center = (size / 2) as i32;
        for (i, ratio) in ratios.iter_mut().enumerate().take(size) {
            let offset = (i as i32 - center) as f32 * detune;
            *ratio = 2.0_f32.powf(offset / 12.0);
        }

        Self {
            ratios,
            size,
            detune,
        }
    }

    pub fn with_size(self, size: usize) -> Self {
        Self::new(size, self.detune)
    }

    pub fn with_detune(self, detune: f32) -> Self {
        Self::new(self.size, detune)
    }

    /// The active ratios; always exactly `size()` long.
    #[inline]
    pub fn ratios(&self) -> &[f32] {
        &self.ratios[..self.size]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn detune(&self) -> f32 {
        self.detune
    }
}

impl Default for UnisonLayout {
    fn default() -> Self {
        Self::new(1, 0.0)
    }
}
