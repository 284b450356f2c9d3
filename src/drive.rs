// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! High level commands for a single drive.

use crate::{
    error::{Error, InvalidInput, Mismatch, TransactionError},
    frame::{FunctionCode, ParameterNumber, RequestFrame, Response, SlaveId, Word},
    parameter::{self, Access, Direction, FaultBits, InputTerminals, RunCommand, RunningStatus, Value},
    rtu::client::{build_read_frame, build_write_frame},
    transaction::{ResponseBuffer, execute},
    transport::Transport,
};

/// Default slave address of the drive.
pub const DEFAULT_SLAVE: SlaveId = 0x08;

/// A drive addressed by its slave id on a [`Transport`].
///
/// Every call runs exactly one transaction.
#[derive(Debug)]
pub struct Drive<T> {
    transport: T,
    slave: SlaveId,
    buf: ResponseBuffer,
}

type Result<T, E> = core::result::Result<T, TransactionError<E>>;

impl<T: Transport> Drive<T> {
    pub const fn new(transport: T, slave: SlaveId) -> Self {
        Self {
            transport,
            slave,
            buf: [0; crate::rtu::MAX_FRAME_LEN],
        }
    }

    #[must_use]
    pub const fn slave(&self) -> SlaveId {
        self.slave
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Start the motor.
    pub fn run(&mut self, direction: Direction) -> Result<(), T::Error> {
        self.write(
            parameter::RUN_COMMAND,
            Value::RunCommand(RunCommand::Run(direction)),
        )
    }

    /// Stop the motor.
    pub fn stop(&mut self) -> Result<(), T::Error> {
        self.write(parameter::RUN_COMMAND, Value::RunCommand(RunCommand::Stop))
    }

    /// Set the output frequency in Hz.
    pub fn set_frequency(&mut self, hz: f32) -> Result<(), T::Error> {
        self.write(parameter::SETPOINT_FREQUENCY, Value::Frequency(hz))
    }

    pub fn status(&mut self) -> Result<RunningStatus, T::Error> {
        match self.read(parameter::RUNNING_STATUS)? {
            Value::Status(status) => Ok(status),
            _ => Err(unexpected_kind(parameter::RUNNING_STATUS)),
        }
    }

    pub fn input_terminals(&mut self) -> Result<InputTerminals, T::Error> {
        match self.read(parameter::INPUT_TERMINALS)? {
            Value::InputTerminals(terminals) => Ok(terminals),
            _ => Err(unexpected_kind(parameter::INPUT_TERMINALS)),
        }
    }

    /// Read the fault bit-field, see [`FaultBits::faults`] for the table entries.
    pub fn faults(&mut self) -> Result<FaultBits, T::Error> {
        match self.read(parameter::FAULTS)? {
            Value::Faults(bits) => Ok(bits),
            _ => Err(unexpected_kind(parameter::FAULTS)),
        }
    }

    /// Read and decode a parameter.
    ///
    /// Fails before anything is sent if the parameter is write-only.
    pub fn read(&mut self, number: ParameterNumber) -> Result<Value, T::Error> {
        let param = parameter::parameter(number)?;
        if param.access != Access::Read {
            return Err(InvalidInput::WriteOnly(number).into());
        }
        let raw = self.read_raw(number)?;
        Ok(param.decode(raw)?)
    }

    /// Encode and write a parameter.
    ///
    /// The value is validated before anything is sent. Read-only
    /// parameters are rejected.
    pub fn write(&mut self, number: ParameterNumber, value: Value) -> Result<(), T::Error> {
        let param = parameter::parameter(number)?;
        if param.access != Access::Write {
            return Err(InvalidInput::ReadOnly(number).into());
        }
        let raw = param.encode(value)?;
        #[cfg(feature = "log")]
        log::debug!("Drive 0x{:0>2X}: P{number} := {value}", self.slave);
        self.write_raw(number, raw)
    }

    /// Read the raw register value of a parameter.
    ///
    /// The parameter map is not consulted.
    pub fn read_raw(&mut self, number: ParameterNumber) -> Result<Word, T::Error> {
        let req = build_read_frame(self.slave, number, 1)?;
        match self.transact(&req)? {
            Response::ReadHoldingRegisters(data) => data.get(0).ok_or(TransactionError::Frame(
                Error::IncompleteResponse {
                    expected: 2,
                    received: data.byte_count(),
                },
            )),
            rsp => Err(function_mismatch(&req, rsp)),
        }
    }

    /// Write a raw register value and check the echo.
    ///
    /// The parameter map is not consulted.
    pub fn write_raw(&mut self, number: ParameterNumber, raw: Word) -> Result<(), T::Error> {
        let req = build_write_frame(self.slave, number, raw)?;
        let (address, value) = match self.transact(&req)? {
            Response::WriteSingleRegister(address, value) => (address, value),
            rsp => return Err(function_mismatch(&req, rsp)),
        };
        if address != req.address() {
            return Err(Error::from(Mismatch::Address {
                expected: req.address(),
                actual: address,
            })
            .into());
        }
        if value != req.value() {
            return Err(Error::from(Mismatch::Value {
                expected: req.value(),
                actual: value,
            })
            .into());
        }
        Ok(())
    }

    fn transact(&mut self, req: &RequestFrame) -> Result<Response<'_>, T::Error> {
        execute(&mut self.transport, req, &mut self.buf).map(|rsp| rsp.pdu)
    }
}

fn unexpected_kind<E>(number: ParameterNumber) -> TransactionError<E> {
    Error::from(InvalidInput::ValueKind(number)).into()
}

fn function_mismatch<E>(req: &RequestFrame, rsp: Response<'_>) -> TransactionError<E> {
    Error::from(Mismatch::Function {
        expected: req.function().value(),
        actual: FunctionCode::from(rsp).value(),
    })
    .into()
}
