// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::frame::ExceptionResponse;
use core::fmt;

/// vfd-modbus Error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Malformed input detected before any I/O
    InvalidInput(InvalidInput),
    /// Function code without a handling path
    UnsupportedFunction(u8),
    /// The reply ended before its declared length
    IncompleteResponse { expected: usize, received: usize },
    /// Invalid CRC
    ChecksumMismatch { expected: u16, actual: u16 },
    /// The reply does not belong to the request
    ProtocolMismatch(Mismatch),
    /// The drive answered with a Modbus exception
    Exception(ExceptionResponse),
    /// Invalid exception code
    ExceptionCode(u8),
    /// Parameter number not in the parameter map
    UnknownParameter(u16),
    /// Fault code not in the fault table
    UnknownFaultCode(u16),
    /// Invalid buffer size
    BufferSize,
}

/// Reasons for rejecting input.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// `parameter + 40000` does not fit into 16 bits.
    AddressOverflow(u16),
    /// Slave address text is not a hex byte.
    SlaveAddress,
    /// Function code text is not a hex byte.
    FunctionCode,
    /// Parameter text is not a decimal 16 bit number.
    ParameterNumber,
    /// Data text is not a decimal 16 bit number.
    Data,
    /// The value kind does not match the parameter.
    ValueKind(u16),
    /// The value cannot be represented in the parameter's register.
    OutOfRange(u16),
    /// Raw value is not one of the run commands.
    RunCommand(u16),
    /// The parameter can only be read.
    ReadOnly(u16),
    /// The parameter can only be written.
    WriteOnly(u16),
    /// Baud rate text is not a positive decimal number.
    BaudRate,
    /// Stop bits text is not one of `1`, `1.5` or `2`.
    StopBits,
}

/// The part of a reply that did not match the request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Slave { expected: u8, actual: u8 },
    Function { expected: u8, actual: u8 },
    Address { expected: u16, actual: u16 },
    Value { expected: u16, actual: u16 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            InvalidInput(reason) => write!(f, "Invalid input: {reason}"),
            UnsupportedFunction(fn_code) => {
                write!(f, "Unsupported function code: 0x{fn_code:0>2X}")
            }
            IncompleteResponse { expected, received } => write!(
                f,
                "Incomplete response: expected {expected} byte(s), received {received}"
            ),
            ChecksumMismatch { expected, actual } => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ProtocolMismatch(mismatch) => write!(f, "Protocol mismatch: {mismatch}"),
            Exception(ex) => write!(
                f,
                "Modbus exception for function 0x{:0>2X}: {}",
                ex.function.value(),
                ex.exception
            ),
            ExceptionCode(code) => write!(f, "Invalid exception code: 0x{code:0>2X}"),
            UnknownParameter(number) => write!(f, "Unknown parameter: P{number}"),
            UnknownFaultCode(code) => write!(f, "Unknown fault code: {code}"),
            BufferSize => write!(f, "Invalid buffer size"),
        }
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InvalidInput::*;

        match self {
            AddressOverflow(number) => {
                write!(f, "register address of P{number} exceeds 65535")
            }
            SlaveAddress => write!(f, "slave address must be a hex byte"),
            FunctionCode => write!(f, "function code must be a hex byte"),
            ParameterNumber => write!(f, "parameter must be a decimal number up to 65535"),
            Data => write!(f, "data must be a decimal number up to 65535"),
            ValueKind(number) => write!(f, "value kind does not match P{number}"),
            OutOfRange(number) => write!(f, "value out of range for P{number}"),
            RunCommand(raw) => write!(f, "unknown run command: 0b{raw:0>4b}"),
            ReadOnly(number) => write!(f, "P{number} is read-only"),
            WriteOnly(number) => write!(f, "P{number} is write-only"),
            BaudRate => write!(f, "baud rate must be a positive decimal number"),
            StopBits => write!(f, "stop bits must be 1, 1.5 or 2"),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Mismatch::*;

        match self {
            Slave { expected, actual } => write!(
                f,
                "slave address: expected 0x{expected:0>2X}, actual 0x{actual:0>2X}"
            ),
            Function { expected, actual } => write!(
                f,
                "function code: expected 0x{expected:0>2X}, actual 0x{actual:0>2X}"
            ),
            Address { expected, actual } => {
                write!(f, "register address: expected {expected}, actual {actual}")
            }
            Value { expected, actual } => {
                write!(f, "register value: expected {expected}, actual {actual}")
            }
        }
    }
}

impl From<InvalidInput> for Error {
    fn from(reason: InvalidInput) -> Self {
        Self::InvalidInput(reason)
    }
}

impl From<Mismatch> for Error {
    fn from(mismatch: Mismatch) -> Self {
        Self::ProtocolMismatch(mismatch)
    }
}

impl core::error::Error for Error {}

/// Error of a single request/response round trip.
///
/// The generic parameter `E` carries the error of the underlying transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionError<E> {
    /// Encoding, framing or decoding failed.
    Frame(Error),
    /// The transport failed to write or read.
    Transport(E),
}

impl<E> From<Error> for TransactionError<E> {
    fn from(err: Error) -> Self {
        Self::Frame(err)
    }
}

impl<E> From<InvalidInput> for TransactionError<E> {
    fn from(reason: InvalidInput) -> Self {
        Self::Frame(reason.into())
    }
}

impl<E: fmt::Display> fmt::Display for TransactionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Frame(err) => err.fmt(f),
            Self::Transport(err) => write!(f, "Transport error: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for TransactionError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Exception, FunctionCode};
    use std::format;

    #[test]
    fn display_crc_error() {
        let err = Error::ChecksumMismatch {
            expected: 0x20D7,
            actual: 0x20D6,
        };
        assert_eq!(
            format!("{err}"),
            "Invalid CRC: expected = 0x20D7, actual = 0x20D6"
        );
    }

    #[test]
    fn display_exception() {
        let err = Error::Exception(ExceptionResponse {
            function: FunctionCode::ReadHoldingRegisters,
            exception: Exception::IllegalDataAddress,
        });
        assert_eq!(
            format!("{err}"),
            "Modbus exception for function 0x03: Illegal data address"
        );
    }

    #[test]
    fn display_invalid_input() {
        let err = Error::from(InvalidInput::AddressOverflow(25536));
        assert_eq!(
            format!("{err}"),
            "Invalid input: register address of P25536 exceeds 65535"
        );
        let err = Error::from(InvalidInput::RunCommand(2));
        assert_eq!(format!("{err}"), "Invalid input: unknown run command: 0b0010");
        let err = Error::from(InvalidInput::ReadOnly(181));
        assert_eq!(format!("{err}"), "Invalid input: P181 is read-only");
    }

    #[test]
    fn display_transaction_error() {
        let err: TransactionError<&str> = TransactionError::Transport("port closed");
        assert_eq!(format!("{err}"), "Transport error: port closed");
        let err: TransactionError<&str> = Error::UnknownParameter(7).into();
        assert_eq!(format!("{err}"), "Unknown parameter: P7");
    }
}
