//! Driver error types
//!
//! Every fallible operation returns [`Result`], generic over the error type
//! of the register transport so bus failures are passed through untouched.

use core::fmt;

/// Calibration recipes that can fail to find an operating point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Calibration {
    /// TX quadrature phase search
    TxQuadPhase,
    /// Digital interface RX timing
    DigitalRx,
    /// Digital interface TX timing
    DigitalTx,
}

/// Named steps of the bring-up sequence, reported with [`Error::SetupAborted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum SetupStep {
    ClockGraph,
    ReferenceClocks,
    ClockChain,
    PortConfig,
    AuxConverters,
    ControlOutputs,
    ExternalLna,
    SynthReference,
    ChargePumpCal,
    LoSetup,
    MixerSubTable,
    GainControl,
    FilterCal,
    DcOffsetCal,
    TxQuadCal,
    Tracking,
    TxMonitorCal,
    EnsmMode,
    TxAttenuation,
    Rssi,
    ClockOutput,
    TxMonitor,
    OperatingState,
    DigitalTune,
}

/// Fieldless classification of an [`Error`], carried inside
/// [`Error::SetupAborted`] so that variant stays `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum ErrorKind {
    Transport,
    InvalidArgument,
    DeviceNotFound,
    CalibrationTimeout,
    ConvergenceFailure,
    SetupAborted,
}

/// Diagnostic values of the failure behind an [`Error::SetupAborted`].
///
/// Mirrors the payload of the inner [`Error`] without its transport error,
/// so it stays `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorDetail {
    /// Nothing beyond the kind (transport failures)
    None,
    /// See [`Error::InvalidArgument`]
    InvalidArgument {
        /// What was being validated
        what: &'static str,
        /// Offending value
        value: i64,
    },
    /// See [`Error::DeviceNotFound`]
    DeviceNotFound {
        /// Product-ID field read back
        product_id: u8,
    },
    /// See [`Error::CalibrationTimeout`]
    CalibrationTimeout {
        /// Polled register
        reg: u16,
        /// Polled mask
        mask: u8,
    },
    /// See [`Error::ConvergenceFailure`]
    ConvergenceFailure(Calibration),
}

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The register transport failed
    Transport(E),
    /// Request rejected before any register was written
    InvalidArgument {
        /// What was being validated
        what: &'static str,
        /// Offending value
        value: i64,
    },
    /// Product-ID register did not match
    DeviceNotFound {
        /// Value read back from the product-ID field
        product_id: u8,
    },
    /// Bounded poll exhausted without the done state
    CalibrationTimeout {
        /// Polled register
        reg: u16,
        /// Polled mask
        mask: u8,
    },
    /// A search-based calibration found no valid point
    ConvergenceFailure(Calibration),
    /// A bring-up step failed and the sequence was stopped
    SetupAborted {
        /// Step that failed
        step: SetupStep,
        /// Classification of the underlying failure
        kind: ErrorKind,
        /// Diagnostic values of the underlying failure
        detail: ErrorDetail,
    },
}

/// Driver result alias
pub type Result<T, E> = core::result::Result<T, Error<E>>;

impl<E> Error<E> {
    /// Shorthand for an [`Error::InvalidArgument`].
    pub fn invalid(what: &'static str, value: impl Into<i64>) -> Self {
        Self::InvalidArgument {
            what,
            value: value.into(),
        }
    }

    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::DeviceNotFound { .. } => ErrorKind::DeviceNotFound,
            Self::CalibrationTimeout { .. } => ErrorKind::CalibrationTimeout,
            Self::ConvergenceFailure(_) => ErrorKind::ConvergenceFailure,
            Self::SetupAborted { .. } => ErrorKind::SetupAborted,
        }
    }

    /// Diagnostic values of this error. A [`Error::SetupAborted`] passes
    /// on the detail of the step that failed.
    pub const fn detail(&self) -> ErrorDetail {
        match *self {
            Self::Transport(_) => ErrorDetail::None,
            Self::InvalidArgument { what, value } => ErrorDetail::InvalidArgument { what, value },
            Self::DeviceNotFound { product_id } => ErrorDetail::DeviceNotFound { product_id },
            Self::CalibrationTimeout { reg, mask } => ErrorDetail::CalibrationTimeout { reg, mask },
            Self::ConvergenceFailure(cal) => ErrorDetail::ConvergenceFailure(cal),
            Self::SetupAborted { detail, .. } => detail,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::InvalidArgument { what, value } => write!(f, "invalid {what}: {value}"),
            Self::DeviceNotFound { product_id } => write!(f, "product id {product_id:#04x}"),
            Self::CalibrationTimeout { reg, mask } => write!(f, "reg {reg:#05x}, mask {mask:#04x}"),
            Self::ConvergenceFailure(cal) => write!(f, "{cal} did not converge"),
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TxQuadPhase => f.write_str("TX quadrature phase search"),
            Self::DigitalRx => f.write_str("digital interface RX tuning"),
            Self::DigitalTx => f.write_str("digital interface TX tuning"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "register transport error: {e:?}"),
            Self::InvalidArgument { what, value } => write!(f, "invalid {what}: {value}"),
            Self::DeviceNotFound { product_id } => {
                write!(f, "unsupported product id {product_id:#04x}")
            }
            Self::CalibrationTimeout { reg, mask } => {
                write!(f, "calibration timeout (reg {reg:#05x}, mask {mask:#04x})")
            }
            Self::ConvergenceFailure(cal) => write!(f, "{cal} did not converge"),
            Self::SetupAborted {
                step,
                kind,
                detail: ErrorDetail::None,
            } => write!(f, "setup aborted at {step:?}: {kind:?}"),
            Self::SetupAborted { step, kind, detail } => {
                write!(f, "setup aborted at {step:?}: {kind:?} ({detail})")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Transport(_) => defmt::write!(f, "register transport error"),
            Self::InvalidArgument { what, value } => defmt::write!(f, "invalid {}: {}", what, value),
            Self::DeviceNotFound { product_id } => {
                defmt::write!(f, "unsupported product id {=u8:#x}", *product_id);
            }
            Self::CalibrationTimeout { reg, mask } => {
                defmt::write!(f, "calibration timeout (reg {=u16:#x}, mask {=u8:#x})", *reg, *mask);
            }
            Self::ConvergenceFailure(cal) => defmt::write!(f, "{} did not converge", cal),
            Self::SetupAborted { step, kind, detail } => {
                defmt::write!(f, "setup aborted at {}: {} ({})", step, kind, detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let e: Error<()> = Error::CalibrationTimeout { reg: 0x16, mask: 0x80 };
        assert_eq!(e.kind(), ErrorKind::CalibrationTimeout);
        let e: Error<()> = Error::invalid("attenuation", 90_000u32);
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn display_carries_diagnostics() {
        let e: Error<()> = Error::CalibrationTimeout { reg: 0x16, mask: 0x80 };
        let s = e.to_string();
        assert!(s.contains("0x016"));
        assert!(s.contains("0x80"));
    }

    #[test]
    fn setup_abort_keeps_inner_detail() {
        let e: Error<()> = Error::SetupAborted {
            step: SetupStep::DcOffsetCal,
            kind: ErrorKind::CalibrationTimeout,
            detail: ErrorDetail::CalibrationTimeout { reg: 0x16, mask: 0x02 },
        };
        assert_eq!(e.detail(), ErrorDetail::CalibrationTimeout { reg: 0x16, mask: 0x02 });
        let s = e.to_string();
        assert!(s.contains("DcOffsetCal"));
        assert!(s.contains("0x016"));
        let e: Error<()> = Error::Transport(());
        assert_eq!(e.detail(), ErrorDetail::None);
    }
}
