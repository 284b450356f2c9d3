// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*};
use byteorder::{BigEndian, ByteOrder};
use core::convert::TryFrom;

pub mod rtu;

type Result<T> = core::result::Result<T, Error>;

impl TryFrom<u8> for Exception {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        use crate::frame::Exception::*;
        let ex = match code {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            _ => {
                return Err(Error::ExceptionCode(code));
            }
        };
        Ok(ex)
    }
}

impl TryFrom<&[u8]> for ExceptionResponse {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::BufferSize);
        }
        let fn_err_code = bytes[0];
        if fn_err_code < 0x80 {
            return Err(Error::UnsupportedFunction(fn_err_code));
        }
        let function = (fn_err_code - 0x80).into();
        let exception = Exception::try_from(bytes[1])?;
        Ok(ExceptionResponse {
            function,
            exception,
        })
    }
}

impl<'r> TryFrom<&'r [u8]> for Response<'r> {
    type Error = Error;

    fn try_from(bytes: &'r [u8]) -> Result<Self> {
        use crate::frame::Response::*;
        if bytes.is_empty() {
            return Err(Error::BufferSize);
        }
        let fn_code = FunctionCode::new(bytes[0]);
        if bytes.len() < min_response_pdu_len(fn_code) {
            return Err(Error::BufferSize);
        }
        let rsp = match fn_code {
            FunctionCode::WriteSingleRegister => {
                let addr = BigEndian::read_u16(&bytes[1..]);
                let value = BigEndian::read_u16(&bytes[3..]);
                WriteSingleRegister(addr, value)
            }
            FunctionCode::ReadHoldingRegisters => {
                let byte_count = bytes[1] as usize;
                let quantity = byte_count / 2;
                if byte_count + 2 > bytes.len() {
                    return Err(Error::BufferSize);
                }
                let data = &bytes[2..2 + byte_count];
                ReadHoldingRegisters(Data { quantity, data })
            }
            FunctionCode::Unsupported(code) => return Err(Error::UnsupportedFunction(code)),
        };
        Ok(rsp)
    }
}

const fn min_response_pdu_len(fn_code: FunctionCode) -> usize {
    match fn_code {
        FunctionCode::ReadHoldingRegisters => 2,
        FunctionCode::WriteSingleRegister => 5,
        FunctionCode::Unsupported(_) => 1,
    }
}

impl Request {
    /// Build a request from operator input.
    ///
    /// `slave` is a hex byte (`"8"`, `"0x08"`), `function` a hex code that may be
    /// followed by a description (`"0x06 Write Register"`), `parameter` and `data`
    /// are decimal 16 bit numbers.
    pub fn parse(slave: &str, function: &str, parameter: &str, data: &str) -> Result<Self> {
        let slave = parse_hex_u8(slave).ok_or(InvalidInput::SlaveAddress)?;
        let function = function
            .split_whitespace()
            .next()
            .and_then(parse_hex_u8)
            .ok_or(InvalidInput::FunctionCode)?;
        let parameter = parameter
            .trim()
            .parse::<ParameterNumber>()
            .map_err(|_| InvalidInput::ParameterNumber)?;
        let value = data
            .trim()
            .parse::<Word>()
            .map_err(|_| InvalidInput::Data)?;

        let function = FunctionCode::new(function);
        if let FunctionCode::Unsupported(code) = function {
            return Err(Error::UnsupportedFunction(code));
        }
        parameter_address(parameter)?;

        Ok(Request {
            slave,
            function,
            parameter,
            value,
        })
    }
}

fn parse_hex_u8(text: &str) -> Option<u8> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u8::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_response_from_bytes() {
        let data: &[u8] = &[0x79, 0x02];
        assert!(ExceptionResponse::try_from(data).is_err());

        let data: &[u8] = &[0x86, 0x03];
        assert_eq!(
            ExceptionResponse::try_from(data).unwrap(),
            ExceptionResponse {
                function: FunctionCode::WriteSingleRegister,
                exception: Exception::IllegalDataValue,
            }
        );

        let data: &[u8] = &[0x83, 0x07];
        assert_eq!(
            ExceptionResponse::try_from(data).err().unwrap(),
            Error::ExceptionCode(0x07)
        );
    }

    #[test]
    fn test_min_response_pdu_len() {
        assert_eq!(min_response_pdu_len(FunctionCode::ReadHoldingRegisters), 2);
        assert_eq!(min_response_pdu_len(FunctionCode::WriteSingleRegister), 5);
        assert_eq!(min_response_pdu_len(FunctionCode::Unsupported(0x04)), 1);
    }

    mod deserialize_responses {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let bytes: &[u8] = &[0x03, 0x04, 0x05, 0xDC, 0x00, 0x2A];
            let rsp = Response::try_from(bytes).unwrap();
            assert_eq!(
                rsp,
                Response::ReadHoldingRegisters(Data {
                    quantity: 2,
                    data: &[0x05, 0xDC, 0x00, 0x2A]
                })
            );
        }

        #[test]
        fn read_holding_registers_with_invalid_byte_count() {
            let bytes: &[u8] = &[0x03, 0x04, 0x05, 0xDC];
            assert_eq!(Response::try_from(bytes).err().unwrap(), Error::BufferSize);
        }

        #[test]
        fn write_single_register() {
            let bytes: &[u8] = &[0x06, 0x9C, 0xA7, 0x00, 0x01];
            let rsp = Response::try_from(bytes).unwrap();
            assert_eq!(rsp, Response::WriteSingleRegister(0x9CA7, 0x0001));

            let bytes: &[u8] = &[0x06, 0x9C, 0xA7, 0x00];
            assert_eq!(Response::try_from(bytes).err().unwrap(), Error::BufferSize);
        }

        #[test]
        fn read_input_registers_is_unsupported() {
            let bytes: &[u8] = &[0x04, 0x02, 0x00, 0x00];
            assert_eq!(
                Response::try_from(bytes).err().unwrap(),
                Error::UnsupportedFunction(0x04)
            );
        }
    }

    mod parse_requests {
        use super::*;

        #[test]
        fn parse_write_request() {
            let req = Request::parse("8", "0x06", "103", "1").unwrap();
            assert_eq!(req, Request::write(0x08, 103, 1));

            let req = Request::parse(" 0x1A ", "0x06 Write Register", "102", "10000").unwrap();
            assert_eq!(req, Request::write(0x1A, 102, 10_000));
        }

        #[test]
        fn parse_read_request() {
            let req = Request::parse("08", "0x03 Read Registers", "180", "1").unwrap();
            assert_eq!(req, Request::read(0x08, 180, 1));
        }

        #[test]
        fn reject_malformed_input() {
            assert_eq!(
                Request::parse("1FF", "0x06", "103", "1").err().unwrap(),
                Error::InvalidInput(InvalidInput::SlaveAddress)
            );
            assert_eq!(
                Request::parse("8", "six", "103", "1").err().unwrap(),
                Error::InvalidInput(InvalidInput::FunctionCode)
            );
            assert_eq!(
                Request::parse("8", "", "103", "1").err().unwrap(),
                Error::InvalidInput(InvalidInput::FunctionCode)
            );
            assert_eq!(
                Request::parse("8", "0x06", "-1", "1").err().unwrap(),
                Error::InvalidInput(InvalidInput::ParameterNumber)
            );
            assert_eq!(
                Request::parse("8", "0x06", "103", "65536").err().unwrap(),
                Error::InvalidInput(InvalidInput::Data)
            );
            assert_eq!(
                Request::parse("8", "0x06", "30000", "1").err().unwrap(),
                Error::InvalidInput(InvalidInput::AddressOverflow(30_000))
            );
        }

        #[test]
        fn reject_unsupported_function() {
            assert_eq!(
                Request::parse("8", "0x04 Read Input Registers", "180", "1")
                    .err()
                    .unwrap(),
                Error::UnsupportedFunction(0x04)
            );
        }
    }
}
