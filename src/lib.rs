//! AD9361 RF Transceiver Control-Plane Driver
//!
//! This library brings up and operates an AD9361-class RF transceiver over
//! its SPI register interface: clock tree, enable state machine (ENSM),
//! calibrations, gain control, fast-lock profiles, FIR and gain tables,
//! and the auxiliary converters. It runs on bare metal and on the host
//! alike; the only collaborators are a [`RegisterTransport`] and an
//! `embedded-hal` delay.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SETUP ORCHESTRATOR                        │
//! │       init  │  post_setup  │  LO / rate / bandwidth API      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ENSM  │  Calibrations  │  Gain control  │  Fast lock  │ FIR │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       CLOCK GRAPH                            │
//! │        reference scalers │ BBPLL │ dividers │ RFPLLs         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    REGISTER TRANSPORT                        │
//! │           SpiTransport (embedded-hal SpiBus) │ custom        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One context per chip**: all driver state lives in [`Ad9361`]
//! - **Validate before writing**: rejected requests leave the chip untouched
//! - **Bounded waits**: every poll has a fixed retry budget
//! - **No unsafe, no heap**
//! - **Explicit error handling**: All fallible operations return `Result`

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

#[macro_use]
mod fmt;

/// Compile-time limits and defaults
pub mod config;

/// Driver error types
pub mod error;

/// Register map
pub mod regs;

/// Register transport and bus helpers
pub mod transport;

/// Initialization parameters
pub mod params;

/// Shared types used across modules
pub mod types;

/// Clock graph, BBPLL and RF synthesizers
pub mod clock;

/// Device context and setup sequence
pub mod device;

/// Enable state machine
pub mod ensm;

/// Calibrations
pub mod calib;

/// Receive gain control and RSSI
pub mod gain;

/// RX gain tables
pub mod gain_table;

/// Programmable FIR filters
pub mod fir;

/// Fast-lock profiles
pub mod fastlock;

/// Aux converters and miscellaneous I/O
pub mod auxio;

pub use calib::{DataPathMonitor, InterfaceDelay};
pub use clock::{ClockChain, ClockId, RateGovernor};
pub use device::Ad9361;
pub use error::{Error, ErrorDetail, ErrorKind, Result};
pub use fir::{FirChannels, FirConfig};
pub use params::InitParams;
pub use transport::{RegisterTransport, SpiTransport};
pub use types::{Channel, Direction, EnsmState, GainControlMode};
