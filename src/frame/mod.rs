// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

mod data;
pub(crate) mod rtu;

pub use self::{data::*, rtu::*};
use crate::error::{Error, InvalidInput};
use byteorder::{BigEndian, ByteOrder};

/// Offset between a drive parameter number (Pxx) and its register address.
pub const ADDRESS_OFFSET: u16 = 40_000;

/// A Modbus function code.
///
/// It is represented by an unsigned 8 bit integer.
/// Only the two codes the drive protocol uses have a handling path.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Any other function code.
    Unsupported(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x03 => Self::ReadHoldingRegisters,
            0x06 => Self::WriteSingleRegister,
            code => Self::Unsupported(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadHoldingRegisters => 0x03,
            Self::WriteSingleRegister => 0x06,
            Self::Unsupported(code) => code,
        }
    }

    /// The function code a server uses to flag an exception reply.
    #[must_use]
    pub const fn exception_value(self) -> u8 {
        self.value() | 0x80
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// A drive parameter number as published in the manual (Pxx).
pub type ParameterNumber = u16;

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// Raw PDU data
type RawData<'r> = &'r [u8];

/// Map a parameter number to its register address.
pub const fn parameter_address(parameter: ParameterNumber) -> Result<Address, Error> {
    match parameter.checked_add(ADDRESS_OFFSET) {
        Some(address) => Ok(address),
        None => Err(Error::InvalidInput(InvalidInput::AddressOverflow(parameter))),
    }
}

/// A request represents a message from the client (master) to the drive (slave).
///
/// For [`FunctionCode::WriteSingleRegister`] `value` is the register value,
/// for [`FunctionCode::ReadHoldingRegisters`] it is the number of registers to read.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub slave: SlaveId,
    pub function: FunctionCode,
    pub parameter: ParameterNumber,
    pub value: Word,
}

impl Request {
    /// Write `value` into a single parameter.
    #[must_use]
    pub const fn write(slave: SlaveId, parameter: ParameterNumber, value: Word) -> Self {
        Self {
            slave,
            function: FunctionCode::WriteSingleRegister,
            parameter,
            value,
        }
    }

    /// Read `quantity` registers starting at `parameter`.
    #[must_use]
    pub const fn read(slave: SlaveId, parameter: ParameterNumber, quantity: Quantity) -> Self {
        Self {
            slave,
            function: FunctionCode::ReadHoldingRegisters,
            parameter,
            value: quantity,
        }
    }

    /// Register address of the request.
    pub const fn address(&self) -> Result<Address, Error> {
        parameter_address(self.parameter)
    }
}

/// A server (slave) exception response.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionResponse {
    pub function: FunctionCode,
    pub exception: Exception,
}

/// The response data of a successful request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'r> {
    /// Echo of the written register address and value.
    WriteSingleRegister(Address, Word),
    /// The requested registers.
    ReadHoldingRegisters(Data<'r>),
}

impl<'r> From<Response<'r>> for FunctionCode {
    fn from(r: Response<'r>) -> Self {
        match r {
            Response::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            Response::ReadHoldingRegisters(_) => Self::ReadHoldingRegisters,
        }
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDevice = 0x0B,
}

impl Exception {
    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Server device failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Server device busy",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetDevice => "Gateway target device failed to respond",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.get_name())
    }
}
