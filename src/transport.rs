// SPDX-FileCopyrightText: Copyright (c) 2018-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte stream the transactions run on.
//!
//! The serial line itself (port name, baud rate, stop bits and read
//! timeout) is opened and owned by the caller, see [`crate::config`].

/// A half-duplex byte stream with a bounded read timeout.
pub trait Transport {
    /// Error reported by the underlying port.
    type Error;

    /// Write all bytes of `buf`.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes.
    ///
    /// Blocks until `buf` is full or the read timeout elapsed and returns the
    /// number of bytes received. A short count means the timeout elapsed.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

#[cfg(feature = "std")]
pub use self::io::IoTransport;

#[cfg(feature = "std")]
mod io {
    use super::Transport;
    use std::io::{self, ErrorKind, Read, Write};

    /// Adapter for blocking [`std::io`] streams, e.g. an opened serial port
    /// configured with a read timeout.
    #[derive(Debug)]
    pub struct IoTransport<T> {
        inner: T,
    }

    impl<T> IoTransport<T> {
        pub const fn new(inner: T) -> Self {
            Self { inner }
        }

        pub fn into_inner(self) -> T {
            self.inner
        }
    }

    impl<T: Read + Write> Transport for IoTransport<T> {
        type Error = io::Error;

        fn write(&mut self, buf: &[u8]) -> io::Result<()> {
            self.inner.write_all(buf)?;
            self.inner.flush()
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut filled = 0;
            while filled < buf.len() {
                match self.inner.read(&mut buf[filled..]) {
                    Ok(0) => break,
                    Ok(cnt) => filled += cnt,
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(filled)
        }
    }

}
