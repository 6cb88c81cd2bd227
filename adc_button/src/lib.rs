#![cfg_attr(not(feature = "std"), no_std)]
//! The ADC Multi-Button Decoder: a single-ADC-channel resistor-ladder
//! button decoder with a "first-button locks" state machine, debounce
//! via multi-sample minimum, release-only state crossing semantics,
//! per-button event history, and derived state (press duration,
//! consecutive-click counting, long-press).

pub mod collab;
pub mod config;
pub mod error;
pub mod ladder;
pub mod range;
pub mod ring;
pub mod state;

pub use collab::{AdcReader, NoCallback, NoSleep, OnChange, Sleep, TimeSource};
pub use config::LadderConfig;
pub use error::AdcButtonError;
pub use ladder::LadderDecoder;
pub use range::Range;
pub use ring::{ButtonRing, Event, MAX_EVENTS};
pub use state::ButtonState;
