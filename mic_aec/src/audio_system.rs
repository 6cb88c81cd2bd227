//! Thin convenience wrapper pairing a [Mic] with its codec gain surface,
//! mirroring the source's `audio_system` module grouping capture and
//! gain control behind one handle.

use crate::aec::AecEngine;
use crate::collab::{Adc, I2s};
use crate::error::MicError;
use crate::gain::set_clamped_gain_db;
use crate::mic::Mic;

pub struct AudioSystem<I, A, E>
where
    I: I2s,
    A: Adc,
    E: AecEngine,
{
    mic: Mic<I, A, E>,
}

impl<I, A, E> AudioSystem<I, A, E>
where
    I: I2s,
    A: Adc,
    E: AecEngine,
{
    pub fn new(mic: Mic<I, A, E>) -> Self {
        Self { mic }
    }

    pub fn mic(&mut self) -> &mut Mic<I, A, E> {
        &mut self.mic
    }

    /// Set a channel's gain, clamped to the codec's supported range.
    pub fn set_channel_gain_db(&mut self, channel: u8, db: f32) -> Result<(), MicError<I::Error, A::Error>> {
        set_clamped_gain_db(self.mic.adc(), channel, db).map_err(MicError::Codec)
    }
}
