//! Collaborator interfaces: the I2S peripheral and the ADC codec.
//!
//! Both are trait-bounded type parameters on [crate::mic::Mic] --
//! never `dyn Trait` -- so the read pipeline monomorphizes down to
//! direct calls against the concrete driver, the same way
//! `bk4819::Bk4819<Scn, Scl, Sda, Delay>` is generic over its pins.

use crate::gain::Gain;

/// The I2S peripheral driving the raw TDM stream.
pub trait I2s {
    type Error;

    /// Fill as much of `buf` as is available, returning the number of
    /// bytes written. Blocks, with an implementation-defined internal
    /// timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    fn enable_rx(&mut self) -> Result<(), Self::Error>;
    fn disable_rx(&mut self) -> Result<(), Self::Error>;

    /// Bits per sample this peripheral is configured for (informational
    /// only -- this core always treats samples as 32-bit packed
    /// stereo words per [crate::pack]).
    fn bits_per_sample(&self) -> u8;
}

/// The ADC codec providing per-channel gain control.
pub trait Adc {
    type Error;

    fn set_channel_gain(&mut self, channel: u8, gain: Gain) -> Result<(), Self::Error>;

    /// Number of channels this codec exposes.
    fn channel_count() -> u8;

    /// Largest magnitude gain, in dB, this codec accepts.
    fn max_gain_db() -> f32;
}
