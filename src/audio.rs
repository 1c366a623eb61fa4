//! Sound cues. The crate never plays audio itself; it queues what should be
//! heard and the page drains the queue into its `<audio>` elements.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// UI button click.
    Click,
    /// Capsule tap.
    Tap,
    /// Mega-combo burst.
    Mega,
    /// Start (or resume) the looping background track.
    MusicPlay,
    MusicPause,
}

impl SoundCue {
    pub fn is_music(self) -> bool {
        matches!(self, SoundCue::MusicPlay | SoundCue::MusicPause)
    }

    /// Asset the page should play for this cue.
    pub fn asset(self) -> &'static str {
        match self {
            SoundCue::Click => "/audio/click.mp3",
            SoundCue::Tap | SoundCue::Mega => "/audio/tap.mp3",
            SoundCue::MusicPlay | SoundCue::MusicPause => "/audio/bgm.mp3",
        }
    }
}

/// Pending cues, filtered by the player's audio switches at push time.
#[derive(Debug, Default)]
pub struct CueQueue {
    pending: Vec<SoundCue>,
}

impl CueQueue {
    /// Queues an effect cue when effects are on.
    pub fn effect(&mut self, cue: SoundCue, effects_enabled: bool) {
        if effects_enabled {
            self.pending.push(cue);
        }
    }

    /// Music cues always go through: pausing must work after muting.
    pub fn music(&mut self, cue: SoundCue) {
        debug_assert!(cue.is_music());
        self.pending.push(cue);
    }

    pub fn drain(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
