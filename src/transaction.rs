// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One request/response round trip on a [`Transport`].

use crate::{
    error::{Error, TransactionError},
    frame::{FunctionCode, RequestFrame, ResponseFrame},
    rtu::{HEADER_LEN, MAX_FRAME_LEN, client::decode_response, response_len},
    transport::Transport,
};

/// Buffer large enough for every reply.
pub type ResponseBuffer = [u8; MAX_FRAME_LEN];

/// Send `request` and receive the matching reply into `buf`.
///
/// The request is written exactly once. The reply length is resolved from its
/// header: 8 bytes for Write Single Register, `3 + byte count + 2` for Read
/// Holding Registers and 5 bytes for an exception. Bytes of a reply that
/// timed out are discarded with the error.
pub fn execute<'b, T: Transport>(
    transport: &mut T,
    request: &RequestFrame,
    buf: &'b mut ResponseBuffer,
) -> Result<ResponseFrame<'b>, TransactionError<T::Error>> {
    let function = request.function();
    if let FunctionCode::Unsupported(code) = function {
        return Err(Error::UnsupportedFunction(code).into());
    }

    #[cfg(feature = "log")]
    log::trace!("Sent    : {:02X?}", request.as_bytes());
    transport
        .write(request.as_bytes())
        .map_err(TransactionError::Transport)?;

    receive(transport, &mut buf[..HEADER_LEN], 0)?;
    let len = response_len(function, &buf[..HEADER_LEN])?.unwrap_or(HEADER_LEN);
    receive(transport, &mut buf[HEADER_LEN..len], HEADER_LEN)?;

    let buf: &'b [u8] = buf;
    #[cfg(feature = "log")]
    log::trace!("Received: {:02X?}", &buf[..len]);

    let rsp = decode_response(request, &buf[..len]);
    #[cfg(feature = "log")]
    let rsp = rsp.inspect_err(|err| {
        if !matches!(err, Error::Exception(_)) {
            log::warn!("Invalid reply to {:02X?}: {err}", request.as_bytes());
        }
    });
    rsp.map_err(TransactionError::Frame)
}

/// Fill `buf` completely or fail with [`Error::IncompleteResponse`].
fn receive<T: Transport>(
    transport: &mut T,
    buf: &mut [u8],
    offset: usize,
) -> Result<(), TransactionError<T::Error>> {
    if buf.is_empty() {
        return Ok(());
    }
    let cnt = transport
        .read(buf)
        .map_err(TransactionError::Transport)?;
    if cnt < buf.len() {
        #[cfg(feature = "log")]
        log::warn!(
            "Timeout after {} of {} byte(s): {:02X?}",
            offset + cnt,
            offset + buf.len(),
            &buf[..cnt]
        );
        return Err(Error::IncompleteResponse {
            expected: offset + buf.len(),
            received: offset + cnt,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Mismatch,
        frame::{Exception, ExceptionResponse, Response},
        rtu::{
            client::{build_read_frame, build_write_frame},
            crc16,
        },
        transport::mock::{MockTransport, PortClosed},
    };
    use std::{vec, vec::Vec};

    fn with_crc(mut adu: Vec<u8>) -> Vec<u8> {
        let crc = crc16(&adu);
        adu.extend_from_slice(&crc.to_le_bytes());
        adu
    }

    #[test]
    fn write_single_register() {
        let req = build_write_frame(0x08, 103, 1).unwrap();
        let mut transport = MockTransport::with_replies([req.as_bytes().to_vec()]);
        let mut buf = [0; MAX_FRAME_LEN];

        let rsp = execute(&mut transport, &req, &mut buf).unwrap();
        assert_eq!(rsp.slave, 0x08);
        assert_eq!(rsp.function(), FunctionCode::WriteSingleRegister);
        assert_eq!(rsp.pdu, Response::WriteSingleRegister(40_103, 1));
        assert_eq!(
            transport.written,
            vec![vec![0x08, 0x06, 0x9C, 0xA7, 0x00, 0x01, 0xD7, 0x20]]
        );
    }

    #[test]
    fn read_holding_registers() {
        let req = build_read_frame(0x08, 181, 2).unwrap();
        let reply = with_crc(vec![0x08, 0x03, 0x04, 0x05, 0xDC, 0x00, 0x2A]);
        let mut transport = MockTransport::with_replies([reply]);
        let mut buf = [0; MAX_FRAME_LEN];

        let rsp = execute(&mut transport, &req, &mut buf).unwrap();
        let Response::ReadHoldingRegisters(data) = rsp.pdu else {
            panic!("unexpected response: {rsp:?}");
        };
        assert_eq!(data.byte_count(), 4);
        assert_eq!(data.into_iter().collect::<Vec<_>>(), vec![1500, 42]);
        // header first, then the announced rest
        assert_eq!(transport.read_calls, 2);
    }

    #[test]
    fn read_maximum_byte_count() {
        let req = build_read_frame(0x08, 180, 127).unwrap();
        let mut reply = vec![0x08, 0x03, 0xFF];
        reply.extend((0..255).map(|i| i as u8));
        let reply = with_crc(reply);
        assert_eq!(reply.len(), MAX_FRAME_LEN);
        let mut transport = MockTransport::with_replies([reply]);
        let mut buf = [0; MAX_FRAME_LEN];

        let rsp = execute(&mut transport, &req, &mut buf).unwrap();
        let Response::ReadHoldingRegisters(data) = rsp.pdu else {
            panic!("unexpected response: {rsp:?}");
        };
        assert_eq!(data.byte_count(), 255);
        assert_eq!(data.len(), 127);
        assert_eq!(data.get(0), Some(0x0001));
    }

    #[test]
    fn unsupported_function_fails_before_any_io() {
        let req = build_read_frame(0x08, 180, 1).unwrap();
        let mut bytes = *req.as_bytes();
        bytes[1] = 0x04;
        let req = RequestFrame(bytes);
        let mut transport = MockTransport::default();
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::UnsupportedFunction(0x04))
        );
        assert!(transport.written.is_empty());
        assert_eq!(transport.read_calls, 0);
    }

    #[test]
    fn no_reply() {
        let req = build_write_frame(0x08, 103, 0).unwrap();
        let mut transport = MockTransport::default();
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::IncompleteResponse {
                expected: 3,
                received: 0
            })
        );
        assert_eq!(transport.written.len(), 1);
    }

    #[test]
    fn truncated_write_reply() {
        let req = build_write_frame(0x08, 103, 1).unwrap();
        let mut transport = MockTransport::with_replies([req.as_bytes()[..7].to_vec()]);
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::IncompleteResponse {
                expected: 8,
                received: 7
            })
        );
    }

    #[test]
    fn truncated_read_reply() {
        let req = build_read_frame(0x08, 181, 2).unwrap();
        let mut transport = MockTransport::with_replies([vec![0x08, 0x03, 0x04, 0x05, 0xDC]]);
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::IncompleteResponse {
                expected: 9,
                received: 5
            })
        );

        let mut transport = MockTransport::with_replies([vec![0x08, 0x03]]);
        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::IncompleteResponse {
                expected: 3,
                received: 2
            })
        );
    }

    #[test]
    fn corrupted_crc() {
        let req = build_read_frame(0x08, 181, 1).unwrap();
        for idx in [5, 6] {
            let mut reply = with_crc(vec![0x08, 0x03, 0x02, 0x05, 0xDC]);
            reply[idx] ^= 0x01;
            let mut transport = MockTransport::with_replies([reply]);
            let mut buf = [0; MAX_FRAME_LEN];

            assert!(matches!(
                execute(&mut transport, &req, &mut buf),
                Err(TransactionError::Frame(Error::ChecksumMismatch { .. }))
            ));
        }
    }

    #[test]
    fn reply_from_other_slave() {
        let req = build_write_frame(0x08, 103, 1).unwrap();
        let reply = with_crc(vec![0x01, 0x06, 0x9C, 0xA7, 0x00, 0x01]);
        let mut transport = MockTransport::with_replies([reply]);
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::ProtocolMismatch(Mismatch::Slave {
                expected: 0x08,
                actual: 0x01
            }))
        );
    }

    #[test]
    fn exception_reply() {
        let req = build_write_frame(0x08, 102, 0xFFFF).unwrap();
        let reply = with_crc(vec![0x08, 0x86, 0x03]);
        let mut transport = MockTransport::with_replies([reply]);
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Frame(Error::Exception(ExceptionResponse {
                function: FunctionCode::WriteSingleRegister,
                exception: Exception::IllegalDataValue,
            }))
        );
    }

    #[test]
    fn transport_failure() {
        let req = build_write_frame(0x08, 103, 0).unwrap();
        let mut transport = MockTransport::closed();
        let mut buf = [0; MAX_FRAME_LEN];

        assert_eq!(
            execute(&mut transport, &req, &mut buf).err().unwrap(),
            TransactionError::Transport(PortClosed)
        );
    }

    #[test]
    fn consecutive_transactions_are_independent() {
        let stop = build_write_frame(0x08, 103, 0).unwrap();
        let status = build_read_frame(0x08, 180, 1).unwrap();
        let mut transport = MockTransport::with_replies([
            stop.as_bytes()[..4].to_vec(),
            with_crc(vec![0x08, 0x03, 0x02, 0x00, 0x00]),
        ]);
        let mut buf = [0; MAX_FRAME_LEN];

        assert!(execute(&mut transport, &stop, &mut buf).is_err());
        let rsp = execute(&mut transport, &status, &mut buf).unwrap();
        let Response::ReadHoldingRegisters(data) = rsp.pdu else {
            panic!("unexpected response: {rsp:?}");
        };
        assert_eq!(data.get(0), Some(0));
        assert_eq!(transport.written.len(), 2);
    }
}
