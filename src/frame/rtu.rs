// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Slave ID
pub type SlaveId = u8;

/// Size of every request frame sent to the drive.
pub const REQUEST_FRAME_LEN: usize = 8;

/// An encoded RTU request: `slave, function, address, value, CRC`.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame(pub(crate) [u8; REQUEST_FRAME_LEN]);

impl RequestFrame {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; REQUEST_FRAME_LEN] {
        &self.0
    }

    #[must_use]
    pub const fn slave(&self) -> SlaveId {
        self.0[0]
    }

    #[must_use]
    pub const fn function(&self) -> FunctionCode {
        FunctionCode::new(self.0[1])
    }

    #[must_use]
    pub fn address(&self) -> Address {
        BigEndian::read_u16(&self.0[2..4])
    }

    /// Register value or quantity, depending on the function.
    #[must_use]
    pub fn value(&self) -> Word {
        BigEndian::read_u16(&self.0[4..6])
    }

    /// The trailing CRC as transmitted (low byte first).
    #[must_use]
    pub const fn crc(&self) -> u16 {
        u16::from_le_bytes([self.0[6], self.0[7]])
    }
}

impl AsRef<[u8]> for RequestFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A decoded RTU response.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame<'r> {
    pub slave: SlaveId,
    pub pdu: Response<'r>,
}

impl ResponseFrame<'_> {
    #[must_use]
    pub fn function(&self) -> FunctionCode {
        self.pdu.into()
    }
}
