use crate::difficulty::{Difficulty, Tiered};
use crate::error::InputError;
use crate::games::GameId;
use crate::policy::{Game, GamePolicy, Outcome, RoundPlan, ScoringRule, SessionConfig};
use crate::random::RandomSource;
use crate::records::{Metric, RecordSpec};
use crate::util::mean;

pub static POLICY: GamePolicy = GamePolicy {
    id: GameId::ColorMixer,
    name: "Color Mixer",
    description: "Mix red, green and blue until you match the target color",
    rounds: RoundPlan::Single,
    scoring: ScoringRule::Distance {
        difficulty_bonus: Tiered::new(50, 100, 150),
    },
    records: &[RecordSpec::higher("BestScore", Metric::Score)],
    reveal_delay: None,
};

/// Target generation grid and match tolerance for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub max_value: u32,
    pub step: u32,
    pub tolerance: u8,
}

pub const PALETTES: Tiered<Palette> = Tiered::new(
    Palette {
        max_value: 100,
        step: 20,
        tolerance: 30,
    },
    Palette {
        max_value: 150,
        step: 15,
        tolerance: 20,
    },
    Palette {
        max_value: 255,
        step: 10,
        tolerance: 15,
    },
);

pub fn palette(difficulty: Difficulty) -> Palette {
    PALETTES.get(difficulty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

const CHANNELS: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    TooHigh,
    TooLow,
}

/// Channels outside tolerance and which way each is off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorHint {
    pub off: Vec<(Channel, Nudge)>,
}

#[derive(Debug, Clone)]
pub struct ColorTarget {
    pub target: Rgb,
    pub tolerance: u8,
    matched: Option<Rgb>,
}

impl ColorTarget {
    pub fn new(target: Rgb, tolerance: u8) -> Self {
        Self {
            target,
            tolerance,
            matched: None,
        }
    }

    pub fn matched(&self) -> Option<Rgb> {
        self.matched
    }

    fn diffs(&self, candidate: &Rgb) -> [u8; 3] {
        let t = self.target.channels();
        let c = candidate.channels();
        [t[0].abs_diff(c[0]), t[1].abs_diff(c[1]), t[2].abs_diff(c[2])]
    }

    /// Mean per-channel difference between target and `candidate`
    pub fn deviation_from(&self, candidate: &Rgb) -> f64 {
        let diffs = self.diffs(candidate).map(f64::from);
        mean(&diffs).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMixer;

impl Game for ColorMixer {
    type Params = ();
    type Challenge = ColorTarget;
    type Answer = Rgb;
    type Feedback = ColorHint;

    fn policy(&self) -> &'static GamePolicy {
        &POLICY
    }

    fn generate(&self, config: &SessionConfig<()>, rng: &mut dyn RandomSource) -> ColorTarget {
        let p = palette(config.difficulty);
        let slots = p.max_value as f64 / p.step as f64;
        let mut channel = || ((rng.next_unit() * slots).floor() as u32 * p.step).min(255) as u8;
        let target = Rgb::new(channel(), channel(), channel());
        ColorTarget::new(target, p.tolerance)
    }

    fn evaluate(
        &self,
        _config: &SessionConfig<()>,
        challenge: &mut ColorTarget,
        candidate: &Rgb,
    ) -> Outcome<ColorHint> {
        let diffs = challenge.diffs(candidate);
        if diffs.iter().all(|d| *d <= challenge.tolerance) {
            challenge.matched = Some(*candidate);
            return Outcome::Correct;
        }

        let target = challenge.target.channels();
        let mine = candidate.channels();
        let off = CHANNELS
            .iter()
            .enumerate()
            .filter(|(i, _)| diffs[*i] > challenge.tolerance)
            .map(|(i, channel)| {
                let nudge = if mine[i] > target[i] {
                    Nudge::TooHigh
                } else {
                    Nudge::TooLow
                };
                (*channel, nudge)
            })
            .collect();
        Outcome::Incorrect(Some(ColorHint { off }))
    }

    fn deviation(&self, challenge: &ColorTarget) -> f64 {
        challenge
            .matched
            .map(|m| challenge.deviation_from(&m))
            .unwrap_or(0.0)
    }

    fn final_metrics(
        &self,
        challenge: &ColorTarget,
        _elapsed: std::time::Duration,
    ) -> Vec<(Metric, u32)> {
        let accuracy = (100.0 - self.deviation(challenge)).max(0.0).round() as u32;
        vec![(Metric::Accuracy, accuracy)]
    }
}

/// Parse "r g b" or "r,g,b" with each channel in 0..=255
pub fn parse_rgb(input: &str) -> Result<Rgb, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(InputError::NotANumber(input.to_string()));
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value: i64 = part
            .parse()
            .map_err(|_| InputError::NotANumber(part.to_string()))?;
        *slot = u8::try_from(value).map_err(|_| InputError::OutOfRange { min: 0, max: 255 })?;
    }
    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}
