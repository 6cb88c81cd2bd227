//! Configuration surfaces for READ_X and WRITE_X.

use crate::error::ConfigError;
use crate::mtu::{MAX_MTU, MIN_MTU};

fn validate_mtu(mtu: u16) -> Result<(), ConfigError> {
    if (MIN_MTU..=MAX_MTU).contains(&mtu) {
        Ok(())
    } else {
        Err(ConfigError::MtuOutOfRange)
    }
}

/// Configuration for the READ_X (server sender) state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadXConfig {
    pub mtu: u16,
    pub send_redundancy: u8,
    pub start_timeout_ms: u32,
    pub ack_timeout_ms: u32,
}

impl ReadXConfig {
    pub fn new(
        mtu: u16,
        send_redundancy: u8,
        start_timeout_ms: u32,
        ack_timeout_ms: u32,
    ) -> Result<Self, ConfigError> {
        validate_mtu(mtu)?;
        if send_redundancy == 0 {
            return Err(ConfigError::ZeroRedundancy);
        }
        Ok(Self {
            mtu,
            send_redundancy,
            start_timeout_ms,
            ack_timeout_ms,
        })
    }
}

/// Configuration for the WRITE_X (server receiver) state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteXConfig {
    pub mtu: u16,
    pub timeout_ms: u32,
    pub max_retries: u32,
}

impl WriteXConfig {
    pub fn new(mtu: u16, timeout_ms: u32, max_retries: u32) -> Result<Self, ConfigError> {
        validate_mtu(mtu)?;
        Ok(Self {
            mtu,
            timeout_ms,
            max_retries,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_x_config_rejects_zero_redundancy() {
        assert_eq!(
            ReadXConfig::new(50, 0, 100, 100),
            Err(ConfigError::ZeroRedundancy)
        );
    }

    #[test]
    fn read_x_config_rejects_mtu_out_of_range() {
        assert_eq!(
            ReadXConfig::new(6, 1, 100, 100),
            Err(ConfigError::MtuOutOfRange)
        );
        assert_eq!(
            ReadXConfig::new(518, 1, 100, 100),
            Err(ConfigError::MtuOutOfRange)
        );
    }

    #[test]
    fn write_x_config_accepts_boundary_mtus() {
        assert!(WriteXConfig::new(7, 100, 3).is_ok());
        assert!(WriteXConfig::new(517, 100, 3).is_ok());
    }
}
