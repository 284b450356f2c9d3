// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use byteorder::LittleEndian;

pub mod client;
pub use crate::frame::rtu::*;

/// Slave address, function code and byte count (or the first address byte).
pub const HEADER_LEN: usize = 3;

/// Length of the CRC trailer.
pub const CRC_LEN: usize = 2;

/// Largest reply a read can produce: header, 255 data bytes and CRC.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + u8::MAX as usize + CRC_LEN;

/// Length of a Write Single Register reply.
pub const WRITE_RESPONSE_LEN: usize = 8;

/// Length of an exception reply.
pub const EXCEPTION_RESPONSE_LEN: usize = 5;

/// An extracted RTU PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub pdu: &'a [u8],
}

/// Extract a PDU frame out of a buffer that holds exactly one ADU.
///
/// The last two bytes are the CRC (low byte first) of everything before them.
pub fn extract_frame(buf: &[u8]) -> Result<DecodedFrame<'_>> {
    if buf.len() < HEADER_LEN + CRC_LEN - 1 {
        return Err(Error::BufferSize);
    }
    let (adu_buf, crc_buf) = buf.split_at(buf.len() - CRC_LEN);
    let expected_crc = crc16(adu_buf);
    let actual_crc = LittleEndian::read_u16(crc_buf);
    if expected_crc != actual_crc {
        return Err(Error::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }
    let (slave_id, pdu_data) = adu_buf.split_at(1);
    Ok(DecodedFrame {
        slave: slave_id[0],
        pdu: pdu_data,
    })
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The result is the raw register value, which goes on the wire low byte first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Determine the full length of a reply to `function` from its header.
///
/// Returns `None` as long as the header is incomplete.
pub const fn response_len(function: FunctionCode, header: &[u8]) -> Result<Option<usize>> {
    if let FunctionCode::Unsupported(code) = function {
        return Err(Error::UnsupportedFunction(code));
    }
    if header.len() < HEADER_LEN {
        return Ok(None);
    }
    if header[1] == function.exception_value() {
        return Ok(Some(EXCEPTION_RESPONSE_LEN));
    }
    let len = match function {
        FunctionCode::WriteSingleRegister => WRITE_RESPONSE_LEN,
        FunctionCode::ReadHoldingRegisters => HEADER_LEN + header[2] as usize + CRC_LEN,
        FunctionCode::Unsupported(_) => unreachable!(),
    };
    Ok(Some(len))
}
