use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{AccessClass, CrioError, FrameId, Result, Timestamp};

/// Tracks access history for a single frame.
#[derive(Debug)]
struct FrameAccessInfo {
    /// History of access timestamps (most recent at back).
    history: VecDeque<Timestamp>,
    /// Whether this frame is currently evictable.
    is_evictable: bool,
    /// Most recent access-class hint recorded for this frame.
    access_class: AccessClass,
}

impl FrameAccessInfo {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            is_evictable: false,
            access_class: AccessClass::Unknown,
        }
    }

    /// Records an access at the given timestamp.
    fn record_access(&mut self, timestamp: Timestamp, k: usize, class: AccessClass) {
        self.history.push_back(timestamp);
        while self.history.len() > k {
            self.history.pop_front();
        }
        self.access_class = class;
    }

    /// Returns the k-distance (backward k-distance from current timestamp).
    /// Returns None if this frame has fewer than k accesses (meaning +inf distance).
    fn k_distance(&self, current_timestamp: Timestamp, k: usize) -> Option<Timestamp> {
        if self.history.len() < k {
            None
        } else {
            Some(current_timestamp - self.history[self.history.len() - k])
        }
    }

    /// Returns the earliest timestamp in the history.
    fn earliest_timestamp(&self) -> Option<Timestamp> {
        self.history.front().copied()
    }
}

/// LRU-K Replacement Policy.
///
/// Evicts the evictable frame whose backward k-distance is the maximum of
/// all tracked frames. Backward k-distance is the difference between the
/// current timestamp and the timestamp of the kth-most-recent access. A
/// frame with fewer than k historical accesses is given +inf as its
/// backward k-distance; among +inf frames, the one with the earliest
/// overall timestamp is evicted (classic LRU tie-break, and the sole
/// behavior when k=1).
pub struct LruKReplacer {
    k: usize,
    max_frames: usize,
    current_timestamp: AtomicU64,
    frame_info: Mutex<HashMap<FrameId, FrameAccessInfo>>,
    num_evictable: Mutex<usize>,
}

impl LruKReplacer {
    /// Creates a new LRU-K replacer with the given k value and maximum frame count.
    pub fn new(k: usize, max_frames: usize) -> Self {
        Self {
            k,
            max_frames,
            current_timestamp: AtomicU64::new(0),
            frame_info: Mutex::new(HashMap::new()),
            num_evictable: Mutex::new(0),
        }
    }

    /// Evicts the frame with the largest backward k-distance.
    /// Returns None if there are no evictable frames.
    pub fn evict(&self) -> Option<FrameId> {
        let mut frame_info = self.frame_info.lock();
        let mut num_evictable = self.num_evictable.lock();

        if *num_evictable == 0 {
            return None;
        }

        let current_ts = self.current_timestamp.load(Ordering::Relaxed);

        let mut victim: Option<FrameId> = None;
        let mut victim_k_dist: Option<Timestamp> = None;
        let mut victim_earliest_ts: Option<Timestamp> = None;

        for (frame_id, info) in frame_info.iter() {
            if !info.is_evictable {
                continue;
            }

            let k_dist = info.k_distance(current_ts, self.k);
            let earliest_ts = info.earliest_timestamp();

            let should_replace = match (victim_k_dist, k_dist) {
                (None, Some(_)) => false,
                (Some(_), None) => true,
                (None, None) => match (victim_earliest_ts, earliest_ts) {
                    (Some(v_ts), Some(c_ts)) => c_ts < v_ts,
                    (None, Some(_)) => true,
                    _ => false,
                },
                (Some(v_dist), Some(c_dist)) => c_dist > v_dist,
            };

            if victim.is_none() || should_replace {
                victim = Some(*frame_id);
                victim_k_dist = k_dist;
                victim_earliest_ts = earliest_ts;
            }
        }

        if let Some(frame_id) = victim {
            frame_info.remove(&frame_id);
            *num_evictable -= 1;
        }

        victim
    }

    /// Records that the given frame was accessed at the current timestamp,
    /// tagged with an access-class hint. Call after a page is pinned.
    pub fn record_access(&self, frame_id: FrameId, class: AccessClass) {
        if frame_id.as_usize() >= self.max_frames {
            return;
        }

        let timestamp = self.current_timestamp.fetch_add(1, Ordering::Relaxed);
        let mut frame_info = self.frame_info.lock();

        frame_info
            .entry(frame_id)
            .or_insert_with(FrameAccessInfo::new)
            .record_access(timestamp, self.k, class);
    }

    /// Sets whether a frame is evictable. Call when a frame's pin count
    /// transitions to/from zero.
    pub fn set_evictable(&self, frame_id: FrameId, is_evictable: bool) {
        if frame_id.as_usize() >= self.max_frames {
            return;
        }

        let mut frame_info = self.frame_info.lock();
        let mut num_evictable = self.num_evictable.lock();

        if let Some(info) = frame_info.get_mut(&frame_id) {
            if info.is_evictable != is_evictable {
                if is_evictable {
                    *num_evictable += 1;
                } else {
                    *num_evictable -= 1;
                }
                info.is_evictable = is_evictable;
            }
        } else if is_evictable {
            let mut info = FrameAccessInfo::new();
            info.is_evictable = true;
            frame_info.insert(frame_id, info);
            *num_evictable += 1;
        }
    }

    /// Removes a frame from the replacer entirely. Fails if the frame is
    /// known and currently marked non-evictable (it must be unpinned first);
    /// a no-op if the frame was never seen.
    pub fn remove(&self, frame_id: FrameId) -> Result<()> {
        let mut frame_info = self.frame_info.lock();

        match frame_info.get(&frame_id) {
            Some(info) if !info.is_evictable => Err(CrioError::EvictionFailed),
            Some(_) => {
                frame_info.remove(&frame_id);
                let mut num_evictable = self.num_evictable.lock();
                *num_evictable -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Returns the number of evictable frames.
    pub fn size(&self) -> usize {
        *self.num_evictable.lock()
    }

    /// Returns the k value of this replacer.
    pub fn k(&self) -> usize {
        self.k
    }
}
