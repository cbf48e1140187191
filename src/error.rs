use std::num::ParseIntError;
use std::{io, net};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("turn: RelayAddress must be valid IP to use RelayAddressGeneratorRange")]
    ErrRelayAddressInvalid,
    #[error("turn: RelayAddressGenerator has invalid ListeningAddress")]
    ErrListeningAddressInvalid,
    #[error("turn: MinPort must be not 0")]
    ErrMinPortNotZero,
    #[error("turn: MaxPort must be not 0")]
    ErrMaxPortNotZero,
    #[error("turn: MaxPort less than MinPort")]
    ErrMaxPortLessThanMinPort,
    #[error("turn: no free port available in relay port range")]
    ErrNoFreePort,
    #[error("turn: RelayAddressGenerator has no Net, validate must be called first")]
    ErrNetUnset,
    #[error("turn: connection-oriented relay allocation is not implemented")]
    ErrNotImplemented,
    #[error("{0}")]
    Bind(#[source] util::Error),
    #[error("parse int: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("parse addr: {0}")]
    ParseIp(#[from] net::AddrParseError),
    #[error("{0}")]
    Io(#[source] IoError),
    #[error("{0}")]
    Util(#[from] util::Error),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

impl Error {
    /// Reports whether the error comes from `validate` rejecting the generator
    /// configuration. These are fatal to server startup.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::ErrRelayAddressInvalid
                | Error::ErrListeningAddressInvalid
                | Error::ErrMinPortNotZero
                | Error::ErrMaxPortNotZero
                | Error::ErrMaxPortLessThanMinPort
        )
    }

    /// Reports whether the requested capability is unsupported, as opposed to
    /// a transient failure that a caller may retry.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::ErrNotImplemented)
    }
}
