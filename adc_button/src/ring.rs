//! Per-button fixed-capacity event ring buffer.

use crate::state::ButtonState;

/// Default ring capacity, per spec: 8 events per button.
pub const MAX_EVENTS: usize = 8;

/// One press/release pair. `up_ms == 0` means still pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    pub down_ms: u64,
    pub up_ms: u64,
}

/// A fixed-capacity ring of [Event]s for one button, overwriting the
/// oldest entry once full.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonRing<const CAP: usize = MAX_EVENTS> {
    events: [Event; CAP],
    len: usize,
    next: usize,
}

impl<const CAP: usize> Default for ButtonRing<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> ButtonRing<CAP> {
    pub const fn new() -> Self {
        Self {
            events: [Event { down_ms: 0, up_ms: 0 }; CAP],
            len: 0,
            next: 0,
        }
    }

    /// Number of events currently stored (`<= CAP`).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, event: Event) {
        self.events[self.next] = event;
        self.next = (self.next + 1) % CAP;
        if self.len < CAP {
            self.len += 1;
        }
    }

    /// Iterate events from newest to oldest.
    fn iter_newest_first(&self) -> impl Iterator<Item = &Event> + '_ {
        let next = self.next;
        (0..self.len).map(move |i| &self.events[(next + CAP - 1 - i) % CAP])
    }

    fn newest(&self) -> Option<&Event> {
        self.iter_newest_first().next()
    }

    fn newest_mut(&mut self) -> Option<&mut Event> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.next + CAP - 1) % CAP;
        Some(&mut self.events[idx])
    }

    /// Record a press at `now_ms`. If the most recent event is still
    /// pressed (`up_ms == 0`), this is a duplicate and silently
    /// dropped.
    pub fn record_down(&mut self, now_ms: u64) {
        if let Some(newest) = self.newest() {
            if newest.up_ms == 0 {
                return;
            }
        }
        self.push(Event {
            down_ms: now_ms,
            up_ms: 0,
        });
    }

    /// Record a release at `now_ms`. If the most recent event is
    /// already released, or the ring is empty, this is an orphan
    /// release and is silently dropped.
    pub fn record_up(&mut self, now_ms: u64) {
        if let Some(newest) = self.newest_mut() {
            if newest.up_ms == 0 {
                newest.up_ms = now_ms;
            }
        }
    }

    /// Compute the derived state of this button at `now_ms`.
    pub fn calc_state(&self, now_ms: u64, click_gap_ms: u64) -> ButtonState {
        let mut events = self.iter_newest_first();
        let Some(newest) = events.next() else {
            return ButtonState::default();
        };

        if newest.up_ms == 0 {
            return ButtonState {
                is_pressed: true,
                press_duration_ms: now_ms.saturating_sub(newest.down_ms),
                release_duration_ms: 0,
                consecutive_clicks: 0,
            };
        }

        let press_duration_ms = newest.up_ms.saturating_sub(newest.down_ms);
        let release_duration_ms = now_ms.saturating_sub(newest.up_ms);

        let mut consecutive_clicks = 1u32;
        let mut current_down = newest.down_ms;
        for prior in events {
            let gap = current_down.saturating_sub(prior.up_ms);
            if gap <= click_gap_ms {
                consecutive_clicks += 1;
                current_down = prior.down_ms;
            } else {
                break;
            }
        }

        ButtonState {
            is_pressed: false,
            press_duration_ms,
            release_duration_ms,
            consecutive_clicks,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_down_is_dropped() {
        let mut ring: ButtonRing = ButtonRing::new();
        ring.record_down(100);
        ring.record_down(150);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.newest().unwrap().down_ms, 100);
    }

    #[test]
    fn orphan_up_is_dropped() {
        let mut ring: ButtonRing = ButtonRing::new();
        ring.record_up(100);
        assert_eq!(ring.len(), 0);

        ring.record_down(100);
        ring.record_up(150);
        ring.record_up(200);
        assert_eq!(ring.newest().unwrap().up_ms, 150);
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let mut ring: ButtonRing<2> = ButtonRing::new();
        ring.record_down(1);
        ring.record_up(2);
        ring.record_down(3);
        ring.record_up(4);
        ring.record_down(5);
        ring.record_up(6);
        assert_eq!(ring.len(), 2);
        let newest = ring.newest().unwrap();
        assert_eq!((newest.down_ms, newest.up_ms), (5, 6));
    }

    #[test]
    fn calc_state_empty_ring_is_default() {
        let ring: ButtonRing = ButtonRing::new();
        assert_eq!(ring.calc_state(1000, 300), ButtonState::default());
    }

    #[test]
    fn calc_state_still_pressed() {
        let mut ring: ButtonRing = ButtonRing::new();
        ring.record_down(100);
        let state = ring.calc_state(150, 300);
        assert!(state.is_pressed);
        assert_eq!(state.press_duration_ms, 50);
        assert_eq!(state.consecutive_clicks, 0);
    }

    #[test]
    fn consecutive_click_gap_property() {
        // two clicks separated by > click_gap_ms count as 1
        let mut ring: ButtonRing = ButtonRing::new();
        ring.record_down(0);
        ring.record_up(10);
        ring.record_down(400);
        ring.record_up(410);
        let state = ring.calc_state(420, 300);
        assert_eq!(state.consecutive_clicks, 1);

        // separated by <= click_gap_ms count as 2
        let mut ring: ButtonRing = ButtonRing::new();
        ring.record_down(0);
        ring.record_up(10);
        ring.record_down(200);
        ring.record_up(210);
        let state = ring.calc_state(220, 300);
        assert_eq!(state.consecutive_clicks, 2);
    }

    #[test]
    fn triple_click_counts_three() {
        let mut ring: ButtonRing = ButtonRing::new();
        for base in [0u64, 100, 200] {
            ring.record_down(base);
            ring.record_up(base + 10);
        }
        let state = ring.calc_state(210, 300);
        assert_eq!(state.consecutive_clicks, 3);
    }
}
