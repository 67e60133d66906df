#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIN_TIME;

/*
ADSR Envelope
=============

A linear attack/decay/sustain/release generator. It shapes a voice's
loudness: the oscillator output is multiplied by `level` every sample.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
         A    D      S         R

Each stage is a straight line. A stage lasting `t` seconds moves the level
by `delta` in `t * sample_rate` steps, so the per-sample step is

    step = delta / (t * sample_rate)

Stage transitions
-----------------

    Idle ──note_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
      ↑                  │                  │                  │
      │                  └────── note_off ──┴──────────────────┘
      │                                     ↓
      └─────────────── level=0 ─────── Release

note_on always restarts from zero (hard retrigger). note_off starts Release
from the CURRENT level, so releasing mid-attack does not click.

Release is interpolated from a snapshot taken at note_off
(start level, total samples) so it lands exactly on 0.0.

Times are floored to MIN_TIME (one sample at 48kHz) to keep the step finite.
*/

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// The four ADSR values. Times in seconds, sustain as a level in [0, 1].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Floor times and clamp sustain into range.
    pub fn sanitized(self) -> Self {
        Self {
            attack: self.attack.max(MIN_TIME),
            decay: self.decay.max(MIN_TIME),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(MIN_TIME),
        }
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.5,
            decay: 1.0,
            sustain: 0.8,
            release: 1.5,
        }
    }
}

pub struct Envelope {
    params: Adsr,
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,

    decay_start_level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, Adsr::default())
    }

    pub fn with_params(sample_rate: f32, params: Adsr) -> Self {
        Self {
            params: params.sanitized(),
            sample_rate,
            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Replace the ADSR values. Takes effect on the next sample; a release
    /// already in flight keeps the length it started with.
    pub fn set_params(&mut self, params: Adsr) {
        self.params = params.sanitized();
    }

    pub fn params(&self) -> Adsr {
        self.params
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Gate high: restart the attack from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: ramp from the current level down to zero.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples =
            (self.params.release * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.params.attack * self.sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.params.sustain;
                let total_drop = self.decay_start_level - target;
                self.level -= total_drop / (self.params.decay * self.sample_rate);

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn first_sample_of_attack_is_audible() {
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.5, 0.1, 0.7, 0.2));
        env.note_on();
        assert!(env.next_sample() > 0.0);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.01, 0.1, 0.7, 0.2));

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.01, 0.05, sustain, 0.2));

        env.note_on();
        render_samples(&mut env, ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 1e-6);
    }

    #[test]
    fn full_sustain_skips_decay() {
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.01, 0.05, 1.0, 0.2));
        env.note_on();
        render_samples(&mut env, 12);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(env.level(), 1.0);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.01, 0.05, 0.5, release));

        env.note_on();
        render_samples(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Release);
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.1, 0.1, 0.5, 0.1));
        env.note_on();
        render_samples(&mut env, 50);
        let before = env.level();
        assert!(before > 0.4 && before < 0.6);

        env.note_off();
        let first = env.next_sample();
        assert!((first - before).abs() < 1e-6, "release must not jump");
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn retrigger_restarts_from_zero() {
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.01, 0.05, 0.5, 0.2));
        env.note_on();
        render_samples(&mut env, 100);
        assert!(env.level() > 0.0);

        env.note_on();
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let adsr = Adsr::new(-1.0, 0.0, 1.5, -0.2).sanitized();
        assert_eq!(adsr.attack, MIN_TIME);
        assert_eq!(adsr.decay, MIN_TIME);
        assert_eq!(adsr.sustain, 1.0);
        assert_eq!(adsr.release, MIN_TIME);
    }
}
