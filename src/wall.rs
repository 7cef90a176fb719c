//! Slot and audio state for the video wall.
//!
//! [`VideoWall`] owns a fixed number of slots and the single audio selection.
//! It tracks only what each slot shows; live player objects belong to
//! whatever renders the wall and are keyed by slot id.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{ParsedVideo, Platform};
use crate::error::{Result, TwillError};

/// Grid layout, which fixes the number of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Four equal slots
    Quad,
    /// Two stage slots flanked by three side slots on each edge
    #[default]
    Stage,
}

impl Layout {
    pub fn slot_count(&self) -> usize {
        match self {
            Layout::Quad => 4,
            Layout::Stage => 8,
        }
    }
}

/// Video reference held by an occupied slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotVideo {
    pub platform: Platform,
    pub video_id: String,
    pub is_live: bool,
}

impl SlotVideo {
    /// URL the slot's content can be fetched from
    pub fn source_url(&self) -> String {
        ParsedVideo::from(self).source_url()
    }
}

impl From<&SlotVideo> for ParsedVideo {
    fn from(video: &SlotVideo) -> Self {
        ParsedVideo {
            platform: video.platform,
            video_id: video.video_id.clone(),
            is_live: video.is_live,
        }
    }
}

/// One fixed position in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: usize,
    pub video: Option<SlotVideo>,
}

impl Slot {
    fn empty(id: usize) -> Self {
        Self { id, video: None }
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_none()
    }
}

/// Which slot, if any, is audible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioState {
    pub active_slot: Option<usize>,
    pub mute_all: bool,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            active_slot: None,
            mute_all: true,
        }
    }
}

/// Serializable view of the wall for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSnapshot {
    pub slots: Vec<Slot>,
    pub audio: AudioState,
    pub has_capacity: bool,
}

#[derive(Debug, Clone)]
pub struct VideoWall {
    slots: Vec<Slot>,
    audio: AudioState,
}

impl VideoWall {
    pub fn new(layout: Layout) -> Self {
        Self::with_capacity(layout.slot_count())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(Slot::empty).collect(),
            audio: AudioState::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: usize) -> Result<&Slot> {
        self.check_slot(slot_id)?;
        Ok(&self.slots[slot_id])
    }

    pub fn audio(&self) -> AudioState {
        self.audio
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn has_capacity(&self) -> bool {
        self.slots.iter().any(Slot::is_empty)
    }

    /// Whether the slot's audio should currently be heard
    pub fn is_audible(&self, slot_id: usize) -> bool {
        !self.audio.mute_all && self.audio.active_slot == Some(slot_id)
    }

    pub fn snapshot(&self) -> WallSnapshot {
        WallSnapshot {
            slots: self.slots.clone(),
            audio: self.audio,
            has_capacity: self.has_capacity(),
        }
    }

    /// Place a video into the lowest-numbered empty slot and return its id.
    ///
    /// The id is taken in the platform's usual form: a YouTube video, a
    /// Twitch or Kick channel. A full wall is rejected with
    /// [`TwillError::CapacityExhausted`] and left untouched.
    pub fn add(&mut self, platform: Platform, video_id: impl Into<String>) -> Result<usize> {
        let is_live = platform != Platform::YouTube;
        self.place(SlotVideo {
            platform,
            video_id: video_id.into(),
            is_live,
        })
    }

    /// Like [`VideoWall::add`], keeping the liveness the classifier found
    pub fn add_parsed(&mut self, video: &ParsedVideo) -> Result<usize> {
        self.place(SlotVideo {
            platform: video.platform,
            video_id: video.video_id.clone(),
            is_live: video.is_live,
        })
    }

    fn place(&mut self, video: SlotVideo) -> Result<usize> {
        let capacity = self.capacity();
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.is_empty())
            .ok_or(TwillError::CapacityExhausted { capacity })?;

        info!("Adding {} video {} to slot {}", video.platform, video.video_id, slot.id);
        slot.video = Some(video);
        Ok(slot.id)
    }

    /// Empty a slot. Clearing the audible slot drops the audio selection but
    /// leaves `mute_all` as it was.
    pub fn clear(&mut self, slot_id: usize) -> Result<()> {
        self.check_slot(slot_id)?;

        if self.slots[slot_id].video.take().is_some() {
            info!("Cleared slot {}", slot_id);
        }
        if self.audio.active_slot == Some(slot_id) {
            debug!("Cleared slot {} held the audio selection", slot_id);
            self.audio.active_slot = None;
        }
        Ok(())
    }

    /// Exchange the contents of two slots. The audio selection stays with the
    /// slot position, not with the video that moved.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_slot(a)?;
        self.check_slot(b)?;
        if a == b {
            return Ok(());
        }

        let moved = self.slots[a].video.take();
        self.slots[a].video = std::mem::replace(&mut self.slots[b].video, moved);
        debug!("Swapped slots {} and {}", a, b);
        Ok(())
    }

    /// Plain setter for the audio selection. `None` selects nothing and
    /// mutes everything; a slot id unmutes and selects that slot.
    pub fn set_active_audio_slot(&mut self, slot_id: Option<usize>) -> Result<()> {
        if let Some(id) = slot_id {
            self.check_slot(id)?;
        }
        self.audio = AudioState {
            active_slot: slot_id,
            mute_all: slot_id.is_none(),
        };
        debug!("Audio state now {:?}", self.audio);
        Ok(())
    }

    /// Flip the global mute. Muting always drops the selection; unmuting
    /// leaves it as it was, which may still be nothing.
    pub fn toggle_mute_all(&mut self) -> bool {
        self.audio.mute_all = !self.audio.mute_all;
        if self.audio.mute_all {
            self.audio.active_slot = None;
        }
        debug!("Audio state now {:?}", self.audio);
        self.audio.mute_all
    }

    fn check_slot(&self, slot_id: usize) -> Result<()> {
        if slot_id < self.capacity() {
            Ok(())
        } else {
            warn!(
                "Rejected out-of-range slot {} (wall has {} slots)",
                slot_id,
                self.capacity()
            );
            Err(TwillError::InvalidSlot {
                slot: slot_id,
                capacity: self.capacity(),
            })
        }
    }
}

impl Default for VideoWall {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}
