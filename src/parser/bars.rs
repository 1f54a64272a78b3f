//! Per-voice bar bookkeeping: barlines, repeat ranges and line starts.
//!
//! A voice always has one open bar at the end of `bars`. Barlines that start a
//! bar close the open one first; an open bar that is still empty is reused, so
//! `| |` never produces an empty bar. The "bar count" used by repeat markers is
//! the index of the open bar, which is also the number of closed bars.

use crate::model::{Music, Voice};
use log::{debug, trace};

/// `[start, end)` is copied and inserted before bar `insert_at` during finalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RepeatRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub insert_at: Option<usize>,
}

impl RepeatRange {
    fn complete(&self) -> Option<(usize, usize, usize)> {
        Some((self.start?, self.end?, self.insert_at?))
    }
}

/// Where the next lyric line starts aligning: a bar and an element inside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BarPosition {
    pub bar: usize,
    pub element: usize,
}

#[derive(Debug)]
pub(crate) struct VoiceState {
    pub name: String,
    pub bars: Vec<Vec<Music>>,
    pub repeats: Vec<RepeatRange>,
    pub line_start: BarPosition,
}

impl VoiceState {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bars: vec![Vec::new()],
            repeats: vec![RepeatRange::default()],
            line_start: BarPosition::default(),
        }
    }

    pub fn push(&mut self, music: Music) {
        if let Some(bar) = self.bars.last_mut() {
            bar.push(music);
        }
    }

    fn bar_count(&self) -> usize {
        self.bars.len() - 1
    }

    fn close_bar(&mut self) {
        if self.bars.last().is_some_and(|bar| !bar.is_empty()) {
            self.bars.push(Vec::new());
        }
    }

    fn open_range(&mut self) -> &mut RepeatRange {
        if self.repeats.is_empty() {
            self.repeats.push(RepeatRange::default());
        }
        let last = self.repeats.len() - 1;
        &mut self.repeats[last]
    }

    /// Repeat start used by `:|` when no `|:` was seen.
    fn previous_insert_point(&self) -> usize {
        self.repeats
            .iter()
            .rev()
            .skip(1)
            .find_map(|range| range.insert_at)
            .unwrap_or(0)
    }

    pub fn apply_barline(&mut self, text: &str) {
        match text {
            "|:" | "[|" => {
                self.close_bar();
                let count = self.bar_count();
                self.open_range().start.get_or_insert(count);
            }
            ":|" => {
                self.close_bar();
                let count = self.bar_count();
                let fallback_start = self.previous_insert_point();
                let range = self.open_range();
                range.start.get_or_insert(fallback_start);
                range.end.get_or_insert(count);
                range.insert_at = Some(count);
                let closed = *range;
                trace!("Voice {}: repeat closed {:?}", self.name, closed);
                self.repeats.push(RepeatRange::default());
            }
            "[1" => {
                let count = self.bar_count();
                self.open_range().end = Some(count);
            }
            "[2" => {}
            _ => self.close_bar(),
        }
    }

    pub fn mark_line_end(&mut self) {
        let bar = self.bar_count();
        let element = self.bars.last().map_or(0, Vec::len);
        self.line_start = BarPosition { bar, element };
    }

    /// Expand repeats and flatten the bars into a finished [`Voice`].
    pub fn into_voice(self) -> Voice {
        let bars = expand_repeats(self.bars, &self.repeats);
        debug!("Voice {}: {} bar(s) after repeat expansion", self.name, bars.len());
        let music: Vec<Music> = bars.into_iter().flatten().collect();
        Voice::new(self.name, &music)
    }
}

/// Insert a copy of each complete range, in order. Later ranges are shifted by
/// the number of bars already inserted; partial ranges are dropped.
pub(crate) fn expand_repeats<T: Clone>(mut bars: Vec<Vec<T>>, ranges: &[RepeatRange]) -> Vec<Vec<T>> {
    let mut inserted = 0;
    for range in ranges {
        let Some((start, end, insert_at)) = range.complete() else {
            continue;
        };
        let (start, end, insert_at) = (start + inserted, end + inserted, insert_at + inserted);
        if start >= end || end > bars.len() || insert_at > bars.len() {
            continue;
        }
        let copy: Vec<Vec<T>> = bars[start..end].to_vec();
        let added = copy.len();
        bars.splice(insert_at..insert_at, copy);
        inserted += added;
    }
    bars
}
