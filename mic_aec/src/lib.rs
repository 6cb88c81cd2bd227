//! Real-time microphone capture: de-interleaves the I2S TDM stream,
//! routes mic/echo-reference signals into an AEC engine in strict
//! order, and delivers audio (echo-cancelled or voice-only) in
//! fixed-size chunks.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod aec;
pub mod audio_system;
pub mod channel;
pub mod collab;
pub mod error;
pub mod gain;
pub mod mic;
pub mod pack;

pub use aec::{AecEngine, AecMode, AecParams, Format, PerfMode};
pub use audio_system::AudioSystem;
pub use channel::{ChannelConfig, ChannelRole};
pub use collab::{Adc, I2s};
pub use error::MicError;
pub use gain::Gain;
pub use mic::Mic;
