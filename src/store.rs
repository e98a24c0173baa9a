use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::{self, Record};
use crate::frame::FrameRecord;

/// Counters collected while scanning one annotation source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub frames: usize,
    pub detections: usize,
    /// Lines that were neither blank nor a valid record.
    pub malformed: usize,
    /// Detections seen before any frame header.
    pub orphaned: usize,
    /// Headers repeating a frame number already present; the later one wins.
    pub duplicate_frames: usize,
}

/// Frame-indexed detections parsed from one annotation file.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    frames: HashMap<u32, FrameRecord>,
    stats: ParseStats,
    loaded: bool,
}

/// The annotation file that sits next to `video`: same directory and stem,
/// `.txt` extension.
pub fn annotation_path_for(video: impl AsRef<Path>) -> PathBuf {
    video.as_ref().with_extension("txt")
}

impl AnnotationStore {
    /// An empty store that has not been loaded from anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |source: std::io::Error| Error::FileUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(unreadable)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(unreadable)?;

        let store = Self::parse_str(&String::from_utf8_lossy(&buf));
        log::debug!(
            "loaded {:?}: {} frames, {} detections, {} malformed lines",
            path,
            store.stats.frames,
            store.stats.detections,
            store.stats.malformed
        );

        Ok(store)
    }

    /// Reads the whole source before parsing. Read failures are reported as
    /// [`Error::FileUnreadable`] with the path `-`.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|source| Error::FileUnreadable {
                path: PathBuf::from("-"),
                source,
            })?;

        Ok(Self::parse_str(&String::from_utf8_lossy(&buf)))
    }

    /// Replaces the whole content with `path`. On failure the current
    /// content is kept as is.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<ParseStats> {
        *self = Self::load(path)?;

        Ok(self.stats)
    }

    /// Single pass over the lines. A frame is inserted only once it is
    /// closed by the next valid header or by the end of input.
    pub fn parse_str(text: &str) -> Self {
        let mut store = Self {
            loaded: true,
            ..Self::default()
        };
        let mut open: Option<FrameRecord> = None;

        for (idx, line) in text.lines().enumerate() {
            store.stats.lines += 1;

            match format::decode_line(idx + 1, line) {
                Ok(None) => {}
                Ok(Some(Record::Header {
                    frame_number,
                    width,
                    height,
                })) => {
                    if let Some(frame) = open.take() {
                        store.finalize(frame);
                    }
                    open = Some(FrameRecord::new(frame_number, width, height));
                }
                Ok(Some(Record::Detection(det))) => match open.as_mut() {
                    Some(frame) => {
                        frame.detections.push(det);
                        store.stats.detections += 1;
                    }
                    None => store.stats.orphaned += 1,
                },
                Err(err) => {
                    log::trace!("skipping: {}", err);
                    store.stats.malformed += 1;
                }
            }
        }

        if let Some(frame) = open.take() {
            store.finalize(frame);
        }

        if store.stats.frames == 0 {
            log::warn!(
                "no frame headers found in {} lines",
                store.stats.lines
            );
        }

        if store.stats.orphaned > 0 {
            log::warn!(
                "dropped {} detections that precede the first frame header",
                store.stats.orphaned
            );
        }

        store
    }

    fn finalize(&mut self, frame: FrameRecord) {
        match self.frames.entry(frame.frame_number) {
            Entry::Occupied(mut slot) => {
                log::warn!(
                    "frame {} appears more than once, keeping the last one",
                    frame.frame_number
                );
                self.stats.duplicate_frames += 1;
                self.stats.detections -= slot.get().len();
                slot.insert(frame);
            }
            Entry::Vacant(slot) => {
                self.stats.frames += 1;
                slot.insert(frame);
            }
        }
    }

    #[inline]
    pub fn get(&self, frame_number: u32) -> Option<&FrameRecord> {
        self.frames.get(&frame_number)
    }

    #[inline]
    pub fn contains(&self, frame_number: u32) -> bool {
        self.frames.contains_key(&frame_number)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `false` only for a store created with [`AnnotationStore::new`] and
    /// never populated.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[inline]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Frame numbers in ascending order.
    pub fn frame_numbers(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = self.frames.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Frames in no particular order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.values()
    }
}
