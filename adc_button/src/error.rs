//! Error kinds for the ADC decoder.
//!
//! Polling itself never fails -- a bad ADC read just falls through,
//! keeping the previous `is_at_ref` -- so this only covers queries.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcButtonError {
    /// A query named a button index outside `0..N`.
    InvalidChannel,
}
