use super::{BatchPreconditionError, CustomError, LedgerError};
use crate::utils::ConversionError;
use std::fmt::Display;
use rustc_hex::FromHexError;
use std::num::ParseIntError;
use web3::ethabi::ethereum_types::FromDecStrErr;

/// Enum containing all possible errors used in the library
#[derive(Debug)]
pub enum ErrorBag {
    ParseError(ParseIntError),
    IoError(std::io::Error),
    CustomError(CustomError),
    BatchPrecondition(BatchPreconditionError),
    LedgerError(LedgerError),
    EthAbiError(web3::ethabi::Error),
    Web3Error(web3::Error),
    ConversionError(ConversionError),
    FromHexError(FromHexError),
    FromDecStrErr(FromDecStrErr),
}

impl Display for ErrorBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorBag::ParseError(parse_int_error) => write!(f, "{parse_int_error}"),
            ErrorBag::IoError(io_error) => write!(f, "{io_error}"),
            ErrorBag::CustomError(custom_error) => write!(f, "{custom_error}"),
            ErrorBag::BatchPrecondition(precondition_error) => {
                write!(f, "{precondition_error}")
            }
            ErrorBag::LedgerError(ledger_error) => write!(f, "{ledger_error}"),
            ErrorBag::EthAbiError(eth_abi_error) => write!(f, "{eth_abi_error:?}"),
            ErrorBag::Web3Error(web3_error) => write!(f, "{web3_error:?}"),
            ErrorBag::ConversionError(conversion_error) => write!(f, "{conversion_error:?}"),
            ErrorBag::FromHexError(from_hex_error) => write!(f, "{from_hex_error:?}"),
            ErrorBag::FromDecStrErr(from_dec_str_err) => write!(f, "{from_dec_str_err:?}"),
        }
    }
}

impl std::error::Error for ErrorBag {}

impl From<ParseIntError> for ErrorBag {
    fn from(err: ParseIntError) -> Self {
        ErrorBag::ParseError(err)
    }
}

impl From<std::io::Error> for ErrorBag {
    fn from(err: std::io::Error) -> Self {
        ErrorBag::IoError(err)
    }
}

impl From<CustomError> for ErrorBag {
    fn from(err: CustomError) -> Self {
        ErrorBag::CustomError(err)
    }
}

impl From<BatchPreconditionError> for ErrorBag {
    fn from(err: BatchPreconditionError) -> Self {
        ErrorBag::BatchPrecondition(err)
    }
}

impl From<LedgerError> for ErrorBag {
    fn from(err: LedgerError) -> Self {
        ErrorBag::LedgerError(err)
    }
}

impl From<web3::ethabi::Error> for ErrorBag {
    fn from(err: web3::ethabi::Error) -> Self {
        ErrorBag::EthAbiError(err)
    }
}

impl From<web3::Error> for ErrorBag {
    fn from(err: web3::Error) -> Self {
        ErrorBag::Web3Error(err)
    }
}

impl From<ConversionError> for ErrorBag {
    fn from(err: ConversionError) -> Self {
        ErrorBag::ConversionError(err)
    }
}

impl From<FromHexError> for ErrorBag {
    fn from(err: FromHexError) -> Self {
        ErrorBag::FromHexError(err)
    }
}

impl From<FromDecStrErr> for ErrorBag {
    fn from(err: FromDecStrErr) -> Self {
        ErrorBag::FromDecStrErr(err)
    }
}

impl ErrorBag {
    /// Returns the named precondition error when this failure was a
    /// batch shape/size rejection.
    pub fn as_batch_precondition(&self) -> Option<&BatchPreconditionError> {
        match self {
            ErrorBag::BatchPrecondition(err) => Some(err),
            _ => None,
        }
    }
}
