//! Derived, point-in-time state for a single button.

/// Derived state of one button, computed on demand from its event
/// ring by [crate::ring::ButtonRing::calc_state].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pub is_pressed: bool,
    pub press_duration_ms: u64,
    pub release_duration_ms: u64,
    pub consecutive_clicks: u32,
}
