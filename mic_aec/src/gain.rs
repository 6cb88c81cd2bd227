//! Channel gain, as configured on the ADC codec.

/// A codec channel gain, stored as the raw value the codec register
/// expects. Construct with [Gain::from_db].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gain(f32);

impl Gain {
    /// Build a gain from a dB value. Out-of-range values are clamped
    /// by the caller's [Adc] implementation, not here -- this type
    /// only carries the requested value.
    pub fn from_db(db: f32) -> Self {
        Self(db)
    }

    pub fn as_db(&self) -> f32 {
        self.0
    }
}

use crate::collab::Adc;

/// Clamp `gain` to `adc`'s supported range and apply it to `channel`.
pub fn set_clamped_gain_db<A: Adc>(adc: &mut A, channel: u8, db: f32) -> Result<(), A::Error> {
    let clamped = db.clamp(-A::max_gain_db(), A::max_gain_db());
    adc.set_channel_gain(channel, Gain::from_db(clamped))
}
