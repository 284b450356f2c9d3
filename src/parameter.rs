// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drive parameter map.
//!
//! Every known parameter (Pxx) is described by a [`Parameter`] entry that
//! tells how its raw register value translates into a [`Value`].

use crate::{
    error::{Error, InvalidInput},
    fault::{Fault, fault},
    frame::{ParameterNumber, Word},
};
use core::fmt;

/// Setpoint frequency (write).
pub const SETPOINT_FREQUENCY: ParameterNumber = 102;
/// Run/direction command.
pub const RUN_COMMAND: ParameterNumber = 103;
/// Running status.
pub const RUNNING_STATUS: ParameterNumber = 180;
/// Setpoint frequency (read back).
pub const SETPOINT_FREQUENCY_FEEDBACK: ParameterNumber = 181;
/// Actual output frequency.
pub const ACTUAL_FREQUENCY: ParameterNumber = 182;
/// Output current.
pub const RUNNING_CURRENT: ParameterNumber = 183;
/// Output voltage.
pub const RUNNING_VOLTAGE: ParameterNumber = 184;
/// Internal drive temperature.
pub const TEMPERATURE: ParameterNumber = 185;
/// External input terminal state.
pub const INPUT_TERMINALS: ParameterNumber = 188;
/// Fault/alarm bit-field.
pub const FAULTS: ParameterNumber = 189;

/// Physical unit of a scaled parameter.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Hertz,
    Ampere,
    Volt,
    Celsius,
}

impl Unit {
    const fn value(self, value: f32) -> Value {
        match self {
            Self::Hertz => Value::Frequency(value),
            Self::Ampere => Value::Current(value),
            Self::Volt => Value::Voltage(value),
            Self::Celsius => Value::Temperature(value),
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Hertz => "Hz",
            Self::Ampere => "A",
            Self::Volt => "V",
            Self::Celsius => "°C",
        }
    }
}

/// How a parameter is accessed.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Written with Write Single Register
    Write,
    /// Read with Read Holding Registers
    Read,
}

/// Conversion between a raw register value and a [`Value`].
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `value = raw / divisor`
    Scaled { divisor: u16, unit: Unit },
    RunCommand,
    RunningStatus,
    InputTerminals,
    Faults,
}

/// A known drive parameter.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub number: ParameterNumber,
    pub name: &'static str,
    pub access: Access,
    pub rule: Rule,
}

const fn scaled(
    number: ParameterNumber,
    name: &'static str,
    access: Access,
    divisor: u16,
    unit: Unit,
) -> Parameter {
    Parameter {
        number,
        name,
        access,
        rule: Rule::Scaled { divisor, unit },
    }
}

/// The parameter map, ordered by number.
pub static PARAMETERS: [Parameter; 10] = [
    scaled(SETPOINT_FREQUENCY, "setpoint frequency", Access::Write, 100, Unit::Hertz),
    Parameter {
        number: RUN_COMMAND,
        name: "run command",
        access: Access::Write,
        rule: Rule::RunCommand,
    },
    Parameter {
        number: RUNNING_STATUS,
        name: "running status",
        access: Access::Read,
        rule: Rule::RunningStatus,
    },
    scaled(SETPOINT_FREQUENCY_FEEDBACK, "setpoint frequency", Access::Read, 100, Unit::Hertz),
    scaled(ACTUAL_FREQUENCY, "actual frequency", Access::Read, 100, Unit::Hertz),
    scaled(RUNNING_CURRENT, "running current", Access::Read, 10, Unit::Ampere),
    scaled(RUNNING_VOLTAGE, "running voltage", Access::Read, 10, Unit::Volt),
    scaled(TEMPERATURE, "temperature", Access::Read, 1, Unit::Celsius),
    Parameter {
        number: INPUT_TERMINALS,
        name: "input terminals",
        access: Access::Read,
        rule: Rule::InputTerminals,
    },
    Parameter {
        number: FAULTS,
        name: "faults",
        access: Access::Read,
        rule: Rule::Faults,
    },
];

/// Look up a parameter by its number.
pub fn parameter(number: ParameterNumber) -> Result<&'static Parameter, Error> {
    PARAMETERS
        .binary_search_by_key(&number, |p| p.number)
        .map(|idx| &PARAMETERS[idx])
        .map_err(|_| Error::UnknownParameter(number))
}

/// Convert the raw register value of a parameter.
pub fn decode(number: ParameterNumber, raw: Word) -> Result<Value, Error> {
    parameter(number)?.decode(raw)
}

/// Convert a value into the raw register value of a parameter.
pub fn encode(number: ParameterNumber, value: Value) -> Result<Word, Error> {
    parameter(number)?.encode(value)
}

impl Parameter {
    pub fn decode(&self, raw: Word) -> Result<Value, Error> {
        let value = match self.rule {
            Rule::Scaled { divisor, unit } => unit.value(f32::from(raw) / f32::from(divisor)),
            Rule::RunCommand => Value::RunCommand(
                RunCommand::from_raw(raw).ok_or(InvalidInput::RunCommand(raw))?,
            ),
            Rule::RunningStatus => Value::Status(RunningStatus::from_raw(raw)),
            Rule::InputTerminals => Value::InputTerminals(InputTerminals(raw)),
            Rule::Faults => Value::Faults(FaultBits(raw)),
        };
        Ok(value)
    }

    pub fn encode(&self, value: Value) -> Result<Word, Error> {
        let raw = match (self.rule, value) {
            (Rule::Scaled { divisor, unit }, value) => {
                let Some(value) = value.scalar(unit) else {
                    return Err(InvalidInput::ValueKind(self.number).into());
                };
                scale(value, divisor).ok_or(InvalidInput::OutOfRange(self.number))?
            }
            (Rule::RunCommand, Value::RunCommand(cmd)) => cmd.raw(),
            (Rule::RunningStatus, Value::Status(status)) => status.raw(),
            (Rule::InputTerminals, Value::InputTerminals(terminals)) => terminals.0,
            (Rule::Faults, Value::Faults(bits)) => bits.0,
            _ => return Err(InvalidInput::ValueKind(self.number).into()),
        };
        Ok(raw)
    }
}

/// `round(value * divisor)` if it fits into a register.
fn scale(value: f32, divisor: u16) -> Option<Word> {
    let scaled = value * f32::from(divisor);
    if !scaled.is_finite() || scaled < 0.0 || scaled >= f32::from(Word::MAX) + 0.5 {
        return None;
    }
    // non-negative, so truncating after adding one half rounds to nearest
    Some((scaled + 0.5) as Word)
}

/// A decoded parameter value.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Hz
    Frequency(f32),
    /// A
    Current(f32),
    /// V
    Voltage(f32),
    /// °C
    Temperature(f32),
    RunCommand(RunCommand),
    Status(RunningStatus),
    InputTerminals(InputTerminals),
    Faults(FaultBits),
}

impl Value {
    fn scalar(self, unit: Unit) -> Option<f32> {
        match (self, unit) {
            (Self::Frequency(v), Unit::Hertz)
            | (Self::Current(v), Unit::Ampere)
            | (Self::Voltage(v), Unit::Volt)
            | (Self::Temperature(v), Unit::Celsius) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Frequency(v) => write!(f, "{v} {}", Unit::Hertz.symbol()),
            Self::Current(v) => write!(f, "{v} {}", Unit::Ampere.symbol()),
            Self::Voltage(v) => write!(f, "{v} {}", Unit::Volt.symbol()),
            Self::Temperature(v) => write!(f, "{v} {}", Unit::Celsius.symbol()),
            Self::RunCommand(cmd) => cmd.fmt(f),
            Self::Status(status) => status.fmt(f),
            Self::InputTerminals(terminals) => terminals.fmt(f),
            Self::Faults(bits) => bits.fmt(f),
        }
    }
}

/// Rotation direction of the motor.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Command written to P103.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCommand {
    Stop,
    Run(Direction),
}

impl RunCommand {
    #[must_use]
    pub const fn from_raw(raw: Word) -> Option<Self> {
        match raw {
            0b0000 => Some(Self::Stop),
            0b0001 => Some(Self::Run(Direction::Forward)),
            0b0011 => Some(Self::Run(Direction::Reverse)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn raw(self) -> Word {
        match self {
            Self::Stop => 0b0000,
            Self::Run(Direction::Forward) => 0b0001,
            Self::Run(Direction::Reverse) => 0b0011,
        }
    }
}

impl fmt::Display for RunCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "Stop"),
            Self::Run(dir) => write!(f, "Run {dir}"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "Forward"),
            Self::Reverse => write!(f, "Reverse"),
        }
    }
}

/// Running status read from P180.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningStatus {
    pub running: bool,
    pub direction: Direction,
}

impl RunningStatus {
    const RUNNING: Word = 0b0_0111;
    // The manual reserves bits 4 to 7 for the direction, the drive only uses bit 4.
    const REVERSE: Word = 0b1_0000;

    #[must_use]
    pub const fn from_raw(raw: Word) -> Self {
        let direction = if raw & Self::REVERSE != 0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        Self {
            running: raw & Self::RUNNING == Self::RUNNING,
            direction,
        }
    }

    #[must_use]
    pub const fn raw(self) -> Word {
        let mut raw = 0;
        if self.running {
            raw |= Self::RUNNING;
        }
        if let Direction::Reverse = self.direction {
            raw |= Self::REVERSE;
        }
        raw
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = if self.running { "Running" } else { "Stopped" };
        write!(f, "{state}, {}", self.direction)
    }
}

/// State of the external input terminals X0 to X3 read from P188.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTerminals(pub Word);

impl InputTerminals {
    pub const COUNT: usize = 4;

    /// `true` if terminal `Xn` is connected to ground, `false` if it is open.
    #[must_use]
    pub const fn is_grounded(self, n: usize) -> bool {
        n < Self::COUNT && (self.0 >> n) & 1 == 1
    }

    /// Terminal states `[X0, X1, X2, X3]`.
    #[must_use]
    pub const fn states(self) -> [bool; Self::COUNT] {
        [
            self.is_grounded(0),
            self.is_grounded(1),
            self.is_grounded(2),
            self.is_grounded(3),
        ]
    }
}

impl fmt::Display for InputTerminals {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (n, grounded) in self.states().into_iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            write!(f, "X{n}={}", u8::from(grounded))?;
        }
        Ok(())
    }
}

/// Fault/alarm bit-field read from P189.
///
/// Every set bit `n` stands for the fault with code `n`.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultBits(pub Word);

impl FaultBits {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Codes of all set bits, lowest first.
    pub fn codes(self) -> impl Iterator<Item = u16> {
        (0..Word::BITS as u16).filter(move |bit| (self.0 >> bit) & 1 == 1)
    }

    /// Table entries of all set bits.
    ///
    /// Bits without an entry yield [`Error::UnknownFaultCode`].
    pub fn faults(self) -> impl Iterator<Item = Result<&'static Fault, Error>> {
        self.codes().map(fault)
    }
}

impl fmt::Display for FaultBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0b{:b}", self.0)
    }
}
