// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault codes reported by the drive.

use crate::error::Error;
use core::fmt;

/// A drive fault.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub code: u16,
    /// Short code shown on the drive's display
    pub mnemonic: &'static str,
    pub description: &'static str,
}

const fn fault_entry(code: u16, mnemonic: &'static str, description: &'static str) -> Fault {
    Fault {
        code,
        mnemonic,
        description,
    }
}

/// All known faults, ordered by code.
pub static FAULTS: [Fault; 16] = [
    fault_entry(3, "OC", "Instantaneous overcurrent"),
    fault_entry(4, "OCA", "Acceleration overcurrent"),
    fault_entry(5, "OCD", "Deceleration overcurrent"),
    fault_entry(6, "OCN", "Constant speed overcurrent"),
    fault_entry(7, "OU", "Over-voltage"),
    fault_entry(8, "LU", "Undervoltage"),
    fault_entry(9, "OH", "Inverter overheat"),
    fault_entry(10, "EF", "External fault"),
    fault_entry(11, "ERS", "Failure to restart"),
    fault_entry(12, "LP", "Input phase loss"),
    fault_entry(13, "OL1", "Motor overload"),
    fault_entry(14, "OL2", "VFD overload"),
    fault_entry(15, "OL3", "Temporary motor overload"),
    fault_entry(16, "OL4", "VFD Temporary overload"),
    fault_entry(17, "485", "Communication Failure"),
    fault_entry(18, "PID", "PID fault"),
];

/// Look up a fault by its code.
pub fn fault(code: u16) -> Result<&'static Fault, Error> {
    FAULTS
        .binary_search_by_key(&code, |f| f.code)
        .map(|idx| &FAULTS[idx])
        .map_err(|_| Error::UnknownFaultCode(code))
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.mnemonic, self.description)
    }
}
