//! Recent-sample history shared between the audio callback and the level meter

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;

use crate::application::ports::SignalTap;

/// Bounded history of the most recent mono samples.
///
/// Overflow drops the oldest samples. Once detached, writes are ignored
/// and reads return silence.
#[derive(Debug)]
pub struct LatestSamples {
    history: StdMutex<VecDeque<f32>>,
    capacity: usize,
    attached: AtomicBool,
}

impl LatestSamples {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: StdMutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            attached: AtomicBool::new(true),
        }
    }

    pub fn write(&self, samples: &[f32]) {
        if !self.attached.load(Ordering::Relaxed) || self.capacity == 0 {
            return;
        }
        let tail = &samples[samples.len().saturating_sub(self.capacity)..];
        if let Ok(mut history) = self.history.lock() {
            let overflow = (history.len() + tail.len()).saturating_sub(self.capacity);
            history.drain(..overflow);
            history.extend(tail.iter().copied());
        }
    }

    /// Stop collecting and drop the history
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Relaxed);
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Relaxed)
    }
}

impl SignalTap for LatestSamples {
    fn read_latest(&self, out: &mut [f32]) {
        out.fill(0.0);
        let Ok(history) = self.history.lock() else {
            return;
        };
        let take = history.len().min(out.len());
        let start = out.len() - take;
        for (slot, sample) in out[start..]
            .iter_mut()
            .zip(history.iter().skip(history.len() - take))
        {
            *slot = *sample;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_is_zero_padded_at_front() {
        let tap = LatestSamples::new(8);
        tap.write(&[1.0, 2.0]);
        let mut out = [9.0; 4];
        tap.read_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn overflow_keeps_newest() {
        let tap = LatestSamples::new(3);
        tap.write(&[1.0, 2.0]);
        tap.write(&[3.0, 4.0]);
        let mut out = [0.0; 3];
        tap.read_latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn oversized_write_keeps_tail() {
        let tap = LatestSamples::new(2);
        tap.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut out = [0.0; 2];
        tap.read_latest(&mut out);
        assert_eq!(out, [4.0, 5.0]);
    }

    #[test]
    fn detached_tap_reads_silence() {
        let tap = LatestSamples::new(4);
        tap.write(&[1.0; 4]);
        tap.detach();
        tap.write(&[1.0; 4]);
        let mut out = [5.0; 4];
        tap.read_latest(&mut out);
        assert_eq!(out, [0.0; 4]);
        assert!(!tap.is_attached());
    }
}
