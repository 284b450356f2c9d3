// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
pub fn encode_request(req: Request) -> Result<RequestFrame> {
    let Request {
        slave,
        function,
        parameter,
        value,
    } = req;
    if let FunctionCode::Unsupported(code) = function {
        return Err(Error::UnsupportedFunction(code));
    }
    let address = parameter_address(parameter)?;

    let mut buf = [0; REQUEST_FRAME_LEN];
    buf[0] = slave;
    buf[1] = function.value();
    BigEndian::write_u16(&mut buf[2..4], address);
    BigEndian::write_u16(&mut buf[4..6], value);
    let crc = crc16(&buf[..6]);
    LittleEndian::write_u16(&mut buf[6..], crc);
    Ok(RequestFrame(buf))
}

/// Encode a Write Single Register request for a drive parameter.
pub fn build_write_frame(
    slave: SlaveId,
    parameter: ParameterNumber,
    value: Word,
) -> Result<RequestFrame> {
    encode_request(Request::write(slave, parameter, value))
}

/// Encode a Read Holding Registers request for `quantity` registers starting at a drive parameter.
pub fn build_read_frame(
    slave: SlaveId,
    parameter: ParameterNumber,
    quantity: Quantity,
) -> Result<RequestFrame> {
    encode_request(Request::read(slave, parameter, quantity))
}

/// Decode the complete RTU reply to `request`.
///
/// The CRC is verified first, then the echoed slave address and function code.
/// An exception reply is returned as [`Error::Exception`].
pub fn decode_response<'r>(request: &RequestFrame, buf: &'r [u8]) -> Result<ResponseFrame<'r>> {
    let function = request.function();
    let Some(expected_len) = response_len(function, buf)? else {
        return Err(Error::IncompleteResponse {
            expected: HEADER_LEN,
            received: buf.len(),
        });
    };
    if buf.len() < expected_len {
        return Err(Error::IncompleteResponse {
            expected: expected_len,
            received: buf.len(),
        });
    }
    let DecodedFrame { slave, pdu } = extract_frame(&buf[..expected_len])?;

    if slave != request.slave() {
        return Err(Mismatch::Slave {
            expected: request.slave(),
            actual: slave,
        }
        .into());
    }
    if pdu[0] == function.exception_value() {
        let ex = ExceptionResponse::try_from(pdu)?;
        #[cfg(feature = "log")]
        log::debug!("Drive 0x{slave:0>2X} answered with exception: {}", ex.exception);
        return Err(Error::Exception(ex));
    }
    if pdu[0] != function.value() {
        return Err(Mismatch::Function {
            expected: function.value(),
            actual: pdu[0],
        }
        .into());
    }

    let pdu = Response::try_from(pdu)?;
    Ok(ResponseFrame { slave, pdu })
}
