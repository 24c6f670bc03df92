use super::Sound;
use crate::pad::{CellId, PadMode};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Playback position inside one sound, resampled to the output rate
#[derive(Clone, Debug)]
pub struct Voice {
    sound: Sound,
    pos: f64,
    step: f64,
    looping: bool,
}

impl Voice {
    pub fn new(sound: Sound, output_rate: u32, looping: bool) -> Self {
        let step = sound.sample_rate() as f64 / output_rate.max(1) as f64;
        Self {
            sound,
            pos: 0.0,
            step,
            looping,
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Next output sample, or None once a non-looping voice has run out
    pub fn next_sample(&mut self) -> Option<f32> {
        let data = self.sound.samples();
        let len = data.len() as f64;

        if self.pos >= len {
            if !self.looping {
                return None;
            }
            self.pos %= len;
        }

        let i = self.pos as usize;
        let frac = (self.pos - i as f64) as f32;
        let s0 = data[i];
        let s1 = match data.get(i + 1) {
            Some(&s) => s,
            None if self.looping => data[0],
            None => s0,
        };

        self.pos += self.step;
        Some(lerp(s0, s1, frac))
    }
}

/// One voice slot per cell plus a preview slot
pub struct VoiceBank {
    output_rate: u32,
    voices: Vec<Option<Voice>>,
    preview: Option<Voice>,
}

impl VoiceBank {
    pub fn new(cells: usize, output_rate: u32) -> Self {
        Self {
            output_rate,
            voices: vec![None; cells],
            preview: None,
        }
    }

    /// Apply a cell trigger according to its mode. Returns whether a voice is now playing.
    pub fn trigger(&mut self, cell: CellId, sound: Sound, mode: PadMode) -> bool {
        let Some(slot) = self.voices.get_mut(cell) else {
            return false;
        };

        match mode {
            PadMode::Cut => {
                *slot = Some(Voice::new(sound, self.output_rate, false));
            }
            PadMode::Loop => {
                if slot.as_ref().is_some_and(Voice::is_looping) {
                    *slot = None;
                } else {
                    *slot = Some(Voice::new(sound, self.output_rate, true));
                }
            }
            PadMode::OneShot => {
                if slot.is_none() {
                    *slot = Some(Voice::new(sound, self.output_rate, false));
                }
            }
        }
        slot.is_some()
    }

    pub fn stop(&mut self, cell: CellId) {
        if let Some(slot) = self.voices.get_mut(cell) {
            *slot = None;
        }
    }

    /// Replace whatever is previewing with `sound`, played once
    pub fn preview(&mut self, sound: Sound) {
        self.preview = Some(Voice::new(sound, self.output_rate, false));
    }

    pub fn stop_all(&mut self) {
        self.voices.iter_mut().for_each(|v| *v = None);
        self.preview = None;
    }

    pub fn is_active(&self, cell: CellId) -> bool {
        self.voices.get(cell).is_some_and(Option::is_some)
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Copy per-cell activity into `mask`
    pub fn active_mask(&self, mask: &mut [bool]) {
        for (cell, flag) in mask.iter_mut().enumerate() {
            *flag = self.is_active(cell);
        }
    }

    /// Mix one mono sample from every running voice
    pub fn next_sample(&mut self) -> f32 {
        let mut mix = 0.0;
        for slot in self.voices.iter_mut().chain(std::iter::once(&mut self.preview)) {
            if let Some(voice) = slot {
                match voice.next_sample() {
                    Some(s) => mix += s,
                    None => *slot = None,
                }
            }
        }
        mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, rate: u32) -> Sound {
        let samples = (0..len).map(|i| i as f32 / len as f32).collect();
        Sound::from_samples("ramp", samples, rate).unwrap()
    }

    fn render(bank: &mut VoiceBank, n: usize) -> Vec<f32> {
        (0..n).map(|_| bank.next_sample()).collect()
    }

    #[test]
    fn test_cut_restarts_from_the_top() {
        let mut bank = VoiceBank::new(4, 100);
        let snd = ramp(4, 100);

        bank.trigger(0, snd.clone(), PadMode::Cut);
        assert_eq!(render(&mut bank, 2), vec![0.0, 0.25]);

        assert!(bank.trigger(0, snd, PadMode::Cut));
        assert_eq!(render(&mut bank, 1), vec![0.0]);
    }

    #[test]
    fn test_voice_ends_after_last_sample() {
        let mut bank = VoiceBank::new(1, 100);
        bank.trigger(0, ramp(4, 100), PadMode::Cut);

        assert_eq!(render(&mut bank, 4), vec![0.0, 0.25, 0.5, 0.75]);
        assert!(bank.is_active(0));
        assert_eq!(bank.next_sample(), 0.0);
        assert!(!bank.is_active(0));
    }

    #[test]
    fn test_loop_wraps_and_second_trigger_stops() {
        let mut bank = VoiceBank::new(2, 100);
        let snd = ramp(2, 100);

        assert!(bank.trigger(1, snd.clone(), PadMode::Loop));
        assert_eq!(render(&mut bank, 5), vec![0.0, 0.5, 0.0, 0.5, 0.0]);
        assert!(bank.is_active(1));

        assert!(!bank.trigger(1, snd, PadMode::Loop));
        assert!(!bank.is_active(1));
    }

    #[test]
    fn test_loop_replaces_a_one_shot_voice() {
        let mut bank = VoiceBank::new(1, 100);
        let snd = ramp(8, 100);

        bank.trigger(0, snd.clone(), PadMode::OneShot);
        assert!(bank.trigger(0, snd, PadMode::Loop));
        assert!(bank.is_active(0));
    }

    #[test]
    fn test_one_shot_ignores_retrigger_while_playing() {
        let mut bank = VoiceBank::new(1, 100);
        let snd = ramp(4, 100);

        bank.trigger(0, snd.clone(), PadMode::OneShot);
        render(&mut bank, 2);
        assert!(bank.trigger(0, snd.clone(), PadMode::OneShot));
        // Still at the third sample, not restarted
        assert_eq!(bank.next_sample(), 0.5);

        render(&mut bank, 2);
        assert!(!bank.is_active(0));
        bank.trigger(0, snd, PadMode::OneShot);
        assert_eq!(bank.next_sample(), 0.0);
    }

    #[test]
    fn test_resampling_interpolates() {
        let mut bank = VoiceBank::new(1, 200);
        bank.trigger(0, ramp(2, 100), PadMode::Cut);

        assert_eq!(render(&mut bank, 4), vec![0.0, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn test_preview_mixes_with_cells_and_stop_all() {
        let mut bank = VoiceBank::new(3, 100);
        let one = Sound::from_samples("one", vec![0.5; 4], 100).unwrap();

        bank.trigger(2, one.clone(), PadMode::Cut);
        bank.preview(one);
        assert!(bank.is_previewing());
        assert_eq!(bank.next_sample(), 1.0);

        let mut mask = [false; 3];
        bank.active_mask(&mut mask);
        assert_eq!(mask, [false, false, true]);

        bank.stop_all();
        assert_eq!(bank.next_sample(), 0.0);
        assert!(!bank.is_previewing());
    }

    #[test]
    fn test_out_of_range_cell_is_ignored() {
        let mut bank = VoiceBank::new(2, 100);
        assert!(!bank.trigger(9, ramp(4, 100), PadMode::Cut));
        bank.stop(9);
        assert!(!bank.is_active(9));
    }
}
