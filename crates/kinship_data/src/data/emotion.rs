use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Emotion category carried by an agent. `Neutral` is the resting baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Excited,
    Calm,
    Anxious,
    Confident,
    Curious,
    Playful,
    Lonely,
}

impl Emotion {
    pub const ALL: [Emotion; 12] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Excited,
        Emotion::Calm,
        Emotion::Anxious,
        Emotion::Confident,
        Emotion::Curious,
        Emotion::Playful,
        Emotion::Lonely,
    ];

    #[inline]
    pub fn is_neutral(self) -> bool {
        self == Emotion::Neutral
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Current emotional state of an agent.
///
/// `intensity` lives in `[0, 1]`. A non-neutral emotion always has a positive
/// intensity; the contagion system resets the state to [`EmotionalState::neutral`]
/// once intensity falls under its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub emotion: Emotion,
    pub intensity: f32,
    /// Simulation time (seconds) at which this emotion took hold.
    pub started_at: f64,
    /// Agent whose emotion this one was caught from, if any.
    pub source: Option<Uuid>,
}

impl EmotionalState {
    pub fn neutral() -> Self {
        Self {
            emotion: Emotion::Neutral,
            intensity: 0.0,
            started_at: 0.0,
            source: None,
        }
    }

    pub fn new(emotion: Emotion, intensity: f32) -> Self {
        let mut state = Self {
            emotion,
            intensity: intensity.clamp(0.0, 1.0),
            started_at: 0.0,
            source: None,
        };
        if state.emotion.is_neutral() || state.intensity <= 0.0 {
            state.reset();
        }
        state
    }

    pub fn reset(&mut self) {
        self.emotion = Emotion::Neutral;
        self.intensity = 0.0;
        self.source = None;
    }

    /// True when the state satisfies `Neutral <=> intensity == 0` and the
    /// intensity bounds.
    pub fn is_consistent(&self) -> bool {
        (0.0..=1.0).contains(&self.intensity)
            && (self.emotion.is_neutral() == (self.intensity == 0.0))
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// How readily an agent catches the emotions of others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpathyProfile {
    pub level: f32,
    pub contagion_events: u32,
    pub last_contagion_at: Option<f64>,
}

impl EmpathyProfile {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            contagion_events: 0,
            last_contagion_at: None,
        }
    }
}

impl Default for EmpathyProfile {
    fn default() -> Self {
        Self::new(0.5)
    }
}
