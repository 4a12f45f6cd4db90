//! Authenticated host server connections
//!
//! A [`Connection`] owns one socket and the datastream reader/writer pair
//! layered on it. It is created by a completed handshake and shared as
//! `Arc<Connection>`, which lets the pool hand the same connection out and
//! take it back.
//!
//! The protocol is strictly request then reply. Callers take the transport
//! with [`Connection::lock`] for the whole exchange; concurrent requests on
//! one connection are not supported.
//!
//! Closing sends the service's end job request when it has one, then tears
//! the socket down. Closing twice is a no-op and dropping the last handle
//! closes the connection.

use crate::error::{HostServerError, HostServerResult};
use crate::service::Service;
use hostserver_core::SystemInfo;
use hostserver_protocol::send_end_job;
use hostserver_transport::{DataStreamReader, DataStreamWriter, TraceConfig};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub type BoxedReader = DataStreamReader<Box<dyn Read + Send>>;
pub type BoxedWriter = DataStreamWriter<Box<dyn Write + Send>>;

/// The part of a socket that outlives the reader and writer
#[cfg_attr(test, mockall::automock)]
pub trait HostSocket: Send {
    /// Shut down both directions
    fn shutdown(&mut self) -> io::Result<()>;
}

impl HostSocket for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Reader, writer and socket of one connection
pub struct Transport {
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
    socket: Box<dyn HostSocket>,
}

impl Transport {
    pub fn new<R, W, S>(reader: R, writer: W, socket: S, trace: TraceConfig) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
        S: HostSocket + 'static,
    {
        Self {
            reader: DataStreamReader::with_trace_config(Box::new(reader), trace),
            writer: DataStreamWriter::with_trace_config(Box::new(writer), trace),
            socket: Box::new(socket),
        }
    }

    /// Reader and writer over clones of one TCP stream
    pub fn from_tcp(stream: TcpStream, trace: TraceConfig) -> HostServerResult<Self> {
        let reader = stream.try_clone()?;
        let writer = stream.try_clone()?;
        Ok(Self::new(reader, writer, stream, trace))
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.reader.set_trace_enabled(enabled);
        self.writer.set_trace_enabled(enabled);
    }

    /// Close reader and writer, then shut the socket down and release it
    ///
    /// A socket that is already disconnected is not an error. Otherwise the
    /// first failing step decides the result; later steps still run.
    fn close(self) -> HostServerResult<()> {
        let Transport {
            reader,
            writer,
            mut socket,
        } = self;
        reader.close();
        let flushed = ignore_not_connected(writer.close());
        let shut = ignore_not_connected(socket.shutdown().map_err(HostServerError::from));
        flushed.and(shut)
    }

    /// Placeholder left behind once the live streams have been closed
    fn released() -> Self {
        Self::new(io::empty(), io::sink(), Released, TraceConfig::default())
    }
}

struct Released;

impl HostSocket for Released {
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn ignore_not_connected(result: HostServerResult<()>) -> HostServerResult<()> {
    match result {
        Err(HostServerError::Connection(e)) if e.kind() == ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

/// One authenticated connection to a host server
pub struct Connection {
    id: u64,
    service: Service,
    info: SystemInfo,
    user: String,
    job_name: String,
    closed: AtomicBool,
    transport: Mutex<Transport>,
}

impl Connection {
    pub fn new(
        service: Service,
        info: SystemInfo,
        user: impl Into<String>,
        job_name: impl Into<String>,
        transport: Transport,
    ) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            service,
            info,
            user: user.into(),
            job_name: job_name.into(),
            closed: AtomicBool::new(false),
            transport: Mutex::new(transport),
        }
    }

    /// Process-unique connection number
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn info(&self) -> &SystemInfo {
        &self.info
    }

    /// Signed-on user, uppercase
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Host job serving this connection
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Exclusive access to the reader and writer
    ///
    /// # Errors
    /// `ConnectionClosed` once the connection has been closed.
    pub fn lock(&self) -> HostServerResult<MutexGuard<'_, Transport>> {
        let transport = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            return Err(HostServerError::ConnectionClosed);
        }
        Ok(transport)
    }

    pub fn set_trace_enabled(&self, enabled: bool) {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_trace_enabled(enabled);
    }

    /// End the host job (if the service has one to end) and tear down
    /// the socket
    ///
    /// The reader, writer and socket are released here, not when the last
    /// handle is dropped. A failed end job request is logged and does not
    /// stop the teardown.
    pub fn close(&self) -> HostServerResult<()> {
        let mut transport = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        log::debug!("Closing {} connection {} ({})", self.service, self.id, self.job_name);
        if self.service.sends_end_job() {
            if let Err(e) = send_end_job(&mut transport.writer, self.service.server_id()) {
                log::warn!(
                    "End job request failed on {} connection {}: {}",
                    self.service,
                    self.id,
                    e
                );
            }
        }
        std::mem::replace(&mut *transport, Transport::released()).close()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.is_closed() {
            if let Err(e) = self.close() {
                log::warn!("Closing dropped connection {} failed: {}", self.id, e);
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("host", &self.info.host)
            .field("user", &self.user)
            .field("job_name", &self.job_name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    /// Writer whose bytes stay visible after the connection takes it
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn bytes(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter(ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(self.0))
        }
    }

    pub(crate) struct QuietSocket;

    impl HostSocket for QuietSocket {
        fn shutdown(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn system_info() -> SystemInfo {
        SystemInfo::new("myhost", 0x0007_0500, 10, 37, 0, "123456/QUSER/QZSOSIGN")
    }

    pub(crate) fn in_memory(service: Service, user: &str) -> Connection {
        let transport = Transport::new(
            Cursor::new(Vec::new()),
            io::sink(),
            QuietSocket,
            TraceConfig::default(),
        );
        Connection::new(service, system_info(), user, "000001/QUSER/QZRCSRVS", transport)
    }

    fn connection<W, S>(service: Service, writer: W, socket: S) -> Connection
    where
        W: Write + Send + 'static,
        S: HostSocket + 'static,
    {
        let transport = Transport::new(
            Cursor::new(Vec::new()),
            writer,
            socket,
            TraceConfig::default(),
        );
        Connection::new(service, system_info(), "QSECOFR", "000001/QUSER/QZRCSRVS", transport)
    }

    /// Stream or socket that records when it is dropped
    struct Tracked<T> {
        inner: T,
        dropped: Arc<AtomicBool>,
    }

    impl<T> Tracked<T> {
        fn new(inner: T) -> Self {
            Self {
                inner,
                dropped: Arc::new(AtomicBool::new(false)),
            }
        }

        fn flag(&self) -> Arc<AtomicBool> {
            Arc::clone(&self.dropped)
        }
    }

    impl<T> Drop for Tracked<T> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    impl<T: Read> Read for Tracked<T> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl<T: Write> Write for Tracked<T> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl<T: HostSocket> HostSocket for Tracked<T> {
        fn shutdown(&mut self) -> io::Result<()> {
            self.inner.shutdown()
        }
    }

    fn shutdown_returning(result: fn() -> io::Result<()>) -> MockHostSocket {
        let mut socket = MockHostSocket::new();
        socket.expect_shutdown().times(1).returning(result);
        socket
    }

    #[test]
    fn test_close_sends_end_job_once() {
        let buffer = SharedBuffer::default();
        let conn = connection(Service::RemoteCommand, buffer.clone(), shutdown_returning(|| Ok(())));

        conn.close().unwrap();
        conn.close().unwrap();
        assert!(conn.is_closed());

        let sent = buffer.bytes();
        assert_eq!(sent.len(), 20);
        assert_eq!(&sent[6..8], &[0xE0, 0x08]);
        assert_eq!(&sent[18..20], &[0x10, 0x04]);
    }

    #[test]
    fn test_ddm_close_sends_nothing() {
        let buffer = SharedBuffer::default();
        let conn = connection(Service::Ddm, buffer.clone(), shutdown_returning(|| Ok(())));
        conn.close().unwrap();
        assert!(buffer.bytes().is_empty());
    }

    #[test]
    fn test_not_connected_is_ignored() {
        let conn = connection(
            Service::RemoteCommand,
            SharedBuffer::default(),
            shutdown_returning(|| Err(io::Error::from(ErrorKind::NotConnected))),
        );
        assert!(conn.close().is_ok());
        assert!(conn.is_closed());
    }

    #[test]
    fn test_first_teardown_error_wins() {
        let conn = connection(
            Service::RemoteCommand,
            FailingWriter(ErrorKind::BrokenPipe),
            shutdown_returning(|| Err(io::Error::from(ErrorKind::Other))),
        );
        match conn.close() {
            Err(HostServerError::Connection(e)) => assert_eq!(e.kind(), ErrorKind::BrokenPipe),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.is_closed());
    }

    #[test]
    fn test_socket_error_after_clean_flush() {
        let conn = connection(
            Service::File,
            SharedBuffer::default(),
            shutdown_returning(|| Err(io::Error::from(ErrorKind::ConnectionReset))),
        );
        match conn.close() {
            Err(HostServerError::Connection(e)) => {
                assert_eq!(e.kind(), ErrorKind::ConnectionReset)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_close_releases_streams_while_shared() {
        let reader = Tracked::new(Cursor::new(Vec::new()));
        let writer = Tracked::new(SharedBuffer::default());
        let socket = Tracked::new(QuietSocket);
        let flags = [reader.flag(), writer.flag(), socket.flag()];
        let transport = Transport::new(reader, writer, socket, TraceConfig::default());
        let conn = Arc::new(Connection::new(
            Service::Ddm,
            system_info(),
            "QSECOFR",
            "000001/QUSER/QRWTSRVR",
            transport,
        ));
        let handle = Arc::clone(&conn);

        assert!(flags.iter().all(|flag| !flag.load(Ordering::SeqCst)));
        handle.close().unwrap();
        assert!(flags.iter().all(|flag| flag.load(Ordering::SeqCst)));
        assert!(conn.is_closed());
        assert!(matches!(conn.lock(), Err(HostServerError::ConnectionClosed)));
    }

    #[test]
    fn test_lock_after_close() {
        let conn = in_memory(Service::RemoteCommand, "QSECOFR");
        assert!(conn.lock().is_ok());
        conn.close().unwrap();
        assert!(matches!(conn.lock(), Err(HostServerError::ConnectionClosed)));
    }

    #[test]
    fn test_drop_closes() {
        let buffer = SharedBuffer::default();
        let conn = connection(Service::Database, buffer.clone(), shutdown_returning(|| Ok(())));
        drop(conn);
        assert_eq!(buffer.bytes().len(), 20);
    }

    #[test]
    fn test_accessors() {
        let conn = in_memory(Service::File, "QSECOFR");
        assert_eq!(conn.service(), Service::File);
        assert_eq!(conn.user(), "QSECOFR");
        assert_eq!(conn.job_name(), "000001/QUSER/QZRCSRVS");
        assert_eq!(conn.info(), &system_info());
        assert_ne!(conn.id(), in_memory(Service::File, "QSECOFR").id());

        conn.set_trace_enabled(true);
        assert!(conn.lock().unwrap().reader.is_trace_enabled());
        assert!(conn.lock().unwrap().writer.is_trace_enabled());
    }
}
