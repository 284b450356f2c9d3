// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

mod codec;
mod error;
mod frame;

pub mod config;
pub mod drive;
pub mod fault;
pub mod parameter;
pub mod transaction;
pub mod transport;

pub use codec::rtu;
pub use config::{SerialConfig, StopBits};
pub use drive::Drive;
pub use error::*;
pub use fault::{Fault, fault};
pub use frame::*;
pub use parameter::{Direction, FaultBits, InputTerminals, RunCommand, RunningStatus, Value};
pub use transaction::execute;
pub use transport::Transport;
