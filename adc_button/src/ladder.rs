//! The resistor-ladder decoder state machine: debounce, first-button
//! locking, and per-button event recording.

use crate::collab::{AdcReader, NoCallback, NoSleep, OnChange, Sleep, TimeSource};
use crate::config::LadderConfig;
use crate::error::AdcButtonError;
use crate::range::classify;
use crate::ring::ButtonRing;
use crate::state::ButtonState;

/// Extra samples taken (beyond the first) during debounce, 5ms apart.
const DEBOUNCE_EXTRA_SAMPLES: u32 = 2;
const DEBOUNCE_SAMPLE_GAP_MS: u32 = 5;

/// The ladder decoder for `N` buttons.
///
/// Generic over its collaborators -- the ADC reader, the clock, an
/// optional debounce delay, and an optional change callback -- all as
/// trait-bounded type parameters, never `dyn Trait`.
pub struct LadderDecoder<const N: usize, R, T, S = NoSleep, C = NoCallback>
where
    R: AdcReader,
    T: TimeSource,
    S: Sleep,
    C: OnChange,
{
    config: LadderConfig<N>,
    adc: R,
    clock: T,
    sleep: S,
    on_change: C,
    rings: [ButtonRing; N],
    current_button: Option<u8>,
    is_at_ref: bool,
    state_start_ms: u64,
    last_value_mv: u32,
    start_value_mv: u32,
}

impl<const N: usize, R, T, S, C> LadderDecoder<N, R, T, S, C>
where
    R: AdcReader,
    T: TimeSource,
    S: Sleep,
    C: OnChange,
{
    pub fn new(config: LadderConfig<N>, adc: R, clock: T, sleep: S, on_change: C) -> Self {
        Self {
            config,
            adc,
            clock,
            sleep,
            on_change,
            rings: [ButtonRing::new(); N],
            current_button: None,
            // the ladder is assumed idle (at the ref voltage) until the
            // first poll proves otherwise.
            is_at_ref: true,
            state_start_ms: 0,
            last_value_mv: 0,
            start_value_mv: 0,
        }
    }

    fn is_ref_window(&self, mv: u32) -> bool {
        let lo = self.config.ref_value_mv.saturating_sub(self.config.ref_tolerance_mv);
        let hi = self.config.ref_value_mv.saturating_add(self.config.ref_tolerance_mv);
        mv >= lo && mv <= hi
    }

    /// Take a debounced sample: `first` plus, if a real [Sleep] is
    /// configured, two more 5ms-apart samples, using the minimum of
    /// all taken.
    fn read_stable(&mut self, first: u32) -> u32 {
        let mut min = first;
        if S::ENABLED {
            for _ in 0..DEBOUNCE_EXTRA_SAMPLES {
                self.sleep.sleep_ms(DEBOUNCE_SAMPLE_GAP_MS);
                let v = self.adc.read_mv();
                if v < min {
                    min = v;
                }
            }
        }
        min
    }

    /// Poll the ladder once. Does nothing unless the ADC has crossed
    /// the ref-window boundary since the last poll -- this is the
    /// "first button locks" invariant: voltage fluctuation short of a
    /// full crossing never changes the decoded button.
    pub fn poll(&mut self) {
        let mv = self.adc.read_mv();
        let now_ms = self.clock.now_ms();
        let cur_is_ref = self.is_ref_window(mv);

        if cur_is_ref == self.is_at_ref {
            return;
        }

        let new_button = if cur_is_ref {
            // non-ref -> ref: release
            None
        } else {
            // ref -> non-ref: press
            let stable = self.read_stable(mv);
            classify(&self.config.ranges, stable)
        };

        if new_button != self.current_button {
            if let Some(old) = self.current_button {
                self.rings[old as usize].record_up(now_ms);
                let state = self.rings[old as usize].calc_state(now_ms, self.config.click_gap_ms);
                self.on_change.call(old as i8, state);
            }
            if let Some(new_b) = new_button {
                self.rings[new_b as usize].record_down(now_ms);
                let state = self.rings[new_b as usize].calc_state(now_ms, self.config.click_gap_ms);
                self.on_change.call(new_b as i8, state);
            }
            self.current_button = new_button;
        }

        self.is_at_ref = cur_is_ref;
        self.last_value_mv = mv;
        self.start_value_mv = mv;
        self.state_start_ms = now_ms;
    }

    /// The currently-latched button, if any.
    pub fn current_button(&self) -> Option<u8> {
        self.current_button
    }

    /// Derived state for `button`, as of `now_ms`.
    pub fn state(&self, button: u8, now_ms: u64) -> Result<ButtonState, AdcButtonError> {
        self.rings
            .get(button as usize)
            .map(|ring| ring.calc_state(now_ms, self.config.click_gap_ms))
            .ok_or(AdcButtonError::InvalidChannel)
    }

    pub fn last_value_mv(&self) -> u32 {
        self.last_value_mv
    }

    pub fn start_value_mv(&self) -> u32 {
        self.start_value_mv
    }

    pub fn state_start_ms(&self) -> u64 {
        self.state_start_ms
    }
}
