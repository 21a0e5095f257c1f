//! We use this mocking module in unit tests to emulate a serial port.

/// Our mock type used to emulate a serial port carrying 26-byte frames.
pub struct MockSerial {
    /// Everything the driver has written, in order.
    write_buffer: heapless::Vec<u8, 128>,
    /// Pre-loaded bytes handed back by `read`.
    read_buffer: heapless::Vec<u8, 128>,
    /// Current position in the read buffer.
    read_position: usize,
    /// Flag to simulate write errors.
    should_error_on_write: bool,
    /// Flag to simulate read errors.
    should_error_on_read: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// No more pre-loaded data; models a serial read timeout.
    TimedOut,
    /// A buffer capacity was exceeded.
    BufferOverflow,
    /// Generic simulated error for testing.
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::TimedOut => write!(f, "read timed out"),
            MockSerialError::BufferOverflow => write!(f, "buffer capacity exceeded"),
            MockSerialError::SimulatedError => write!(f, "simulated error"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::TimedOut => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::TimedOut);
        }

        let available = self.read_buffer.len() - self.read_position;
        let count = core::cmp::min(buf.len(), available);
        buf[..count]
            .copy_from_slice(&self.read_buffer[self.read_position..self.read_position + count]);
        self.read_position += count;
        Ok(count)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers.
    pub fn new() -> Self {
        MockSerial {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Set the data that will be returned when `read` is called.
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Everything written to this mock port so far.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Configure whether write operations should fail.
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn writes_are_captured_in_order() {
        let mut mock = MockSerial::new();
        mock.write(b"abc").unwrap();
        mock.write(b"def").unwrap();
        assert_eq!(mock.written_data(), b"abcdef");
    }

    #[test]
    fn reads_drain_the_preloaded_data() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"response").unwrap();

        let mut first = [0u8; 4];
        let mut second = [0u8; 8];
        assert_eq!(mock.read(&mut first).unwrap(), 4);
        assert_eq!(&first, b"resp");
        assert_eq!(mock.read(&mut second).unwrap(), 4);
        assert_eq!(&second[..4], b"onse");
    }

    #[test]
    fn exhausted_read_buffer_times_out() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"x").unwrap();

        let mut buf = [0u8; 4];
        mock.read(&mut buf).unwrap();
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::TimedOut)
        ));
    }

    #[test]
    fn error_injection() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"data").unwrap();
        mock.set_write_error(true);
        mock.set_read_error(true);

        let mut buf = [0u8; 4];
        assert!(matches!(
            mock.write(b"x"),
            Err(MockSerialError::SimulatedError)
        ));
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::SimulatedError)
        ));
        assert!(mock.written_data().is_empty());

        mock.set_write_error(false);
        mock.set_read_error(false);
        assert!(mock.write(b"x").is_ok());
        assert!(mock.read(&mut buf).is_ok());
    }
}
