//! Error types for the [crate::mic::Mic] lifecycle and read pipeline.

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MicError<IE, CE> {
    NotInitialized,
    NoVoiceChannels,
    InvalidChannel,
    NoRefChannel,
    AecCreateFailed,
    AecNotInitialized,
    I2s(IE),
    Codec(CE),
}
