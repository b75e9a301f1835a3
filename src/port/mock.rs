//! Mock device implementation for testing.
//!
//! Provides a `MockDevice` that stores terminal attributes in memory and
//! simulates reads, writes and system call failures without hardware.

use super::traits::TermiosDevice;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

/// A system call the mock can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    GetAttributes,
    SetAttributes,
    Flush,
    Read,
    Write,
}

/// Inner state of the mock, shared between clones.
struct MockState {
    attrs: libc::termios,
    read_queue: VecDeque<u8>,
    write_log: Vec<Vec<u8>>,
    /// errno to return from the next call of each kind.
    failures: Vec<(MockCall, i32)>,
    /// Largest number of bytes a single write accepts.
    write_limit: Option<usize>,
    set_count: usize,
    flush_count: usize,
}

impl MockState {
    fn take_failure(&mut self, call: MockCall) -> io::Result<()> {
        match self.failures.iter().position(|(c, _)| *c == call) {
            Some(idx) => {
                let (_, errno) = self.failures.remove(idx);
                Err(io::Error::from_raw_os_error(errno))
            }
            None => Ok(()),
        }
    }
}

/// Mock device for testing.
///
/// Clones share state, so a test can keep one clone for inspection after
/// moving the other into a [`Uart`](crate::Uart).
///
/// # Example
/// ```
/// use uartkit::port::{MockDevice, TermiosDevice};
///
/// let mut device = MockDevice::new("MOCK0");
/// device.enqueue_read(b"Hello");
///
/// let mut buffer = [0u8; 8];
/// let n = device.read(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello");
///
/// device.write(b"World").unwrap();
/// assert_eq!(device.write_log(), vec![b"World".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockDevice {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// Create a mock device configured as 8N1 with the receiver enabled.
    pub fn new(name: impl Into<String>) -> Self {
        // SAFETY: termios is a plain C struct for which all-zero is valid.
        let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
        attrs.c_cflag = libc::CS8 | libc::CREAD | libc::CLOCAL;

        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState {
                attrs,
                read_queue: VecDeque::new(),
                write_log: Vec::new(),
                failures: Vec::new(),
                write_limit: None,
                set_count: 0,
                flush_count: 0,
            })),
        }
    }

    /// Enqueue bytes to be returned by subsequent reads.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Make the next call of the given kind fail with `errno`.
    pub fn fail_next(&mut self, call: MockCall, errno: i32) {
        self.state.lock().failures.push((call, errno));
    }

    /// Cap how many bytes a single write accepts, to simulate short writes.
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.state.lock().write_limit = limit;
    }

    /// A copy of the attributes as last applied.
    pub fn stored_attributes(&self) -> libc::termios {
        self.state.lock().attrs
    }

    /// Get a copy of all data written to the device.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Number of successful `set_attributes` calls.
    pub fn set_count(&self) -> usize {
        self.state.lock().set_count
    }

    /// Number of successful `flush_queues` calls.
    pub fn flush_count(&self) -> usize {
        self.state.lock().flush_count
    }

    /// Get the number of bytes still queued for reading.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }
}

impl TermiosDevice for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_attributes(&self) -> io::Result<libc::termios> {
        let mut state = self.state.lock();
        state.take_failure(MockCall::GetAttributes)?;
        Ok(state.attrs)
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        let mut state = self.state.lock();
        state.take_failure(MockCall::SetAttributes)?;
        state.attrs = *attrs;
        state.set_count += 1;
        Ok(())
    }

    fn flush_queues(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        state.take_failure(MockCall::Flush)?;
        state.read_queue.clear();
        state.flush_count += 1;
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.take_failure(MockCall::Read)?;

        let n = buffer.len().min(state.read_queue.len());
        for (slot, byte) in buffer.iter_mut().zip(state.read_queue.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.take_failure(MockCall::Write)?;

        let n = state.write_limit.map_or(buffer.len(), |limit| limit.min(buffer.len()));
        state.write_log.push(buffer[..n].to_vec());
        Ok(n)
    }
}

impl std::fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDevice")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_partial_read() {
        let mut device = MockDevice::new("MOCK0");
        device.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = device.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(device.available_bytes(), 8);
    }

    #[test]
    fn test_empty_read_returns_zero() {
        let mut device = MockDevice::new("MOCK0");
        let mut buffer = [0u8; 4];
        assert_eq!(device.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let mut device = MockDevice::new("MOCK0");
        device.fail_next(MockCall::GetAttributes, libc::EIO);

        let err = device.get_attributes().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EIO));
        assert!(device.get_attributes().is_ok());
    }

    #[test]
    fn test_short_write() {
        let mut device = MockDevice::new("MOCK0");
        device.set_write_limit(Some(2));
        assert_eq!(device.write(b"abcdef").unwrap(), 2);
        assert_eq!(device.write_log(), vec![b"ab".to_vec()]);
    }

    #[test]
    fn test_clones_share_state() {
        let mut device = MockDevice::new("MOCK0");
        let observer = device.clone();

        let mut attrs = device.get_attributes().unwrap();
        attrs.c_cflag |= libc::CSTOPB;
        device.set_attributes(&attrs).unwrap();

        assert_eq!(observer.set_count(), 1);
        assert_ne!(observer.stored_attributes().c_cflag & libc::CSTOPB, 0);
    }

    #[test]
    fn test_flush_clears_read_queue() {
        let mut device = MockDevice::new("MOCK0");
        device.enqueue_read(b"stale");
        device.flush_queues().unwrap();
        assert_eq!(device.available_bytes(), 0);
        assert_eq!(device.flush_count(), 1);
    }
}
