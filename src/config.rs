// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serial line settings.
//!
//! The drive talks 8 data bits without parity. Whatever opens the port
//! applies these settings, the crate itself never does.

use crate::error::{Error, InvalidInput};
use core::{fmt, str::FromStr, time::Duration};

/// Baud rate the drive ships with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout of a transaction.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

impl FromStr for StopBits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "1.5" => Ok(Self::OnePointFive),
            "2" => Ok(Self::Two),
            _ => Err(InvalidInput::StopBits.into()),
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::One => "1",
            Self::OnePointFive => "1.5",
            Self::Two => "2",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub stop_bits: StopBits,
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            stop_bits: StopBits::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SerialConfig {
    /// Build the settings from operator input, keeping the default timeout.
    pub fn parse(baud_rate: &str, stop_bits: &str) -> Result<Self, Error> {
        let baud_rate = baud_rate
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|rate| *rate > 0)
            .ok_or(InvalidInput::BaudRate)?;
        Ok(Self {
            baud_rate,
            stop_bits: stop_bits.parse()?,
            ..Default::default()
        })
    }
}
