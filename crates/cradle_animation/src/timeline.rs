//! Timeline orchestration
//!
//! A [`Timeline`] is the ordered keyframe track of one element. Keyframes are
//! appended and never read back by the producer; playback samples them.
//! A [`MasterTimeline`] composes several tracks so they play together.

use crate::easing::Easing;
use crate::keyframe::{ElementId, Keyframe};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct TrackId;
}

/// An entry in a timeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Offset in seconds from timeline start
    pub offset: f32,
    /// Duration of the transition in seconds
    pub duration: f32,
    pub start_value: f32,
    pub end_value: f32,
    pub easing: Easing,
}

impl TimelineEntry {
    /// Time at which this entry reaches its end value
    pub fn end(&self) -> f32 {
        self.offset + self.duration
    }

    fn sample(&self, time: f32) -> f32 {
        let local_time = time - self.offset;

        if local_time <= 0.0 && self.duration > 0.0 {
            return self.start_value;
        }

        if local_time >= self.duration {
            return self.end_value;
        }

        let eased = self.easing.apply(local_time / self.duration);
        self.start_value + (self.end_value - self.start_value) * eased
    }
}

/// A keyframe track for a single element
///
/// Tracks are sampled by time and played through a [`MasterTimeline`]; a
/// track has no clock of its own.
#[derive(Clone, Debug)]
pub struct Timeline {
    /// Entries sorted by offset
    entries: Vec<TimelineEntry>,
    initial_value: f32,
    /// Cached end of the latest-ending entry
    end_time: f32,
    /// Cached value of the latest-ending entry
    end_value: f32,
}

impl Timeline {
    pub fn new(initial_value: f32) -> Self {
        Self {
            entries: Vec::new(),
            initial_value,
            end_time: 0.0,
            end_value: initial_value,
        }
    }

    /// Add a transition at an explicit offset
    pub fn add(
        &mut self,
        offset: f32,
        duration: f32,
        start_value: f32,
        end_value: f32,
        easing: Easing,
    ) {
        let entry = TimelineEntry {
            offset: offset.max(0.0),
            duration: duration.max(0.0),
            start_value,
            end_value,
            easing,
        };

        if entry.end() >= self.end_time {
            self.end_time = entry.end();
            self.end_value = entry.end_value;
        }

        match self.entries.last() {
            Some(last) if last.offset > entry.offset => {
                let idx = self.entries.partition_point(|e| e.offset <= entry.offset);
                self.entries.insert(idx, entry);
            }
            _ => self.entries.push(entry),
        }
    }

    /// Append a keyframe request.
    ///
    /// The transition starts at `at` or when the track's last transition
    /// ends, whichever is later, and departs from the value the track holds
    /// at that point. Returns the time the keyframe finishes.
    pub fn push_keyframe(&mut self, keyframe: &Keyframe, at: f32) -> f32 {
        let offset = at.max(self.end_time);
        self.add(
            offset,
            keyframe.duration,
            self.end_value,
            keyframe.value,
            keyframe.easing,
        );
        offset + keyframe.duration.max(0.0)
    }

    /// Total length of the track in seconds
    pub fn duration(&self) -> f32 {
        self.end_time
    }

    /// Value the track settles on once every entry has played
    pub fn end_value(&self) -> f32 {
        self.end_value
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sample the track at an absolute time
    pub fn value_at(&self, time: f32) -> f32 {
        let idx = self.entries.partition_point(|e| e.offset <= time);
        match idx {
            0 => self
                .entries
                .first()
                .map_or(self.initial_value, |e| e.start_value),
            _ => self.entries[idx - 1].sample(time),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(0.0)
    }
}

struct Track {
    element: ElementId,
    timeline: Timeline,
}

/// Several element tracks played against one clock
pub struct MasterTimeline {
    tracks: SlotMap<TrackId, Track>,
    current_time: f32,
    playing: bool,
}

impl MasterTimeline {
    pub fn new() -> Self {
        Self {
            tracks: SlotMap::with_key(),
            current_time: 0.0,
            playing: false,
        }
    }

    /// Add an element's track; all tracks start at time zero
    pub fn add(&mut self, element: ElementId, timeline: Timeline) -> TrackId {
        tracing::trace!(%element, entries = timeline.len(), "adding track to master timeline");
        self.tracks.insert(Track { element, timeline })
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Length of the longest track
    pub fn duration(&self) -> f32 {
        self.tracks
            .values()
            .map(|t| t.timeline.duration())
            .fold(0.0, f32::max)
    }

    /// Sample every track at `time`, ordered by element
    pub fn sample_at(&self, time: f32) -> Vec<(ElementId, f32)> {
        let mut samples: Vec<(ElementId, f32)> = self
            .tracks
            .values()
            .map(|t| (t.element, t.timeline.value_at(time)))
            .collect();
        samples.sort_by_key(|(element, _)| *element);
        samples
    }

    /// Sample every track at the current playback position
    pub fn sample(&self) -> Vec<(ElementId, f32)> {
        self.sample_at(self.current_time)
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.playing = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance playback by `dt` seconds, stopping at the end
    pub fn tick(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        self.current_time += dt;

        let duration = self.duration();
        if self.current_time >= duration {
            self.current_time = duration;
            self.playing = false;
        }
    }
}

impl Default for MasterTimeline {
    fn default() -> Self {
        Self::new()
    }
}
