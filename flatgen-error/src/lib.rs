#![deny(missing_docs)]

//! This crate defines error & result types for flatgen.
//! It also contains a variety of useful macros for error handling.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

/// A string that can be used as an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for flatgen.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum FlatgenError {
    /// An argument violated a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(ErrString),
    /// A row or a file did not match the expected column schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(ErrString),
    /// Records read back from a file differ from the ones written.
    #[error("verification failed: {0}")]
    Verification(ErrString),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<FlatgenError>),
    /// A wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A wrapper for errors from the Arrow library.
    #[error(transparent)]
    Arrow(#[from] arrow_schema::ArrowError),
    /// A wrapper for errors from the Parquet library.
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    /// A wrapper for failures to build a decode thread pool.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FlatgenError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        FlatgenError::Context(msg.into(), Box::new(self))
    }

    /// Strips any [`FlatgenError::Context`] layers and returns the innermost error.
    pub fn root(&self) -> &FlatgenError {
        match self {
            FlatgenError::Context(_, inner) => inner.root(),
            other => other,
        }
    }
}

impl Debug for FlatgenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`FlatgenError`]s as their error type.
pub type FlatgenResult<T> = Result<T, FlatgenError>;

/// A convenient macro for creating a [`FlatgenError`].
#[macro_export]
macro_rules! flatgen_err {
    (SchemaMismatch: $($tts:tt)*) => {{
        $crate::FlatgenError::SchemaMismatch(format!($($tts)*).into())
    }};
    (Verification: $($tts:tt)*) => {{
        $crate::FlatgenError::Verification(format!($($tts)*).into())
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::FlatgenError::Context($msg.into(), Box::new($err))
    }};
    (InvalidArgument: $($tts:tt)*) => {{
        $crate::FlatgenError::InvalidArgument(format!($($tts)*).into())
    }};
    ($($tts:tt)*) => {
        $crate::flatgen_err!(InvalidArgument: $($tts)*)
    };
}

/// A convenient macro for returning a [`FlatgenError`].
#[macro_export]
macro_rules! flatgen_bail {
    ($($tt:tt)+) => {
        return Err($crate::flatgen_err!($($tt)+))
    };
}
