//! Blocking big-endian datastream writer

use crate::error::HostServerResult;
use crate::trace::{TraceConfig, Tracer};
use std::io::{BufWriter, Write};

/// Buffered writer of big-endian datastream primitives
///
/// Bytes are held in the buffer until [`DataStreamWriter::flush`], so one
/// request normally reaches the socket as a single write.
#[derive(Debug)]
pub struct DataStreamWriter<W: Write> {
    inner: BufWriter<W>,
    tracer: Tracer,
}

impl<W: Write> DataStreamWriter<W> {
    /// Writer with tracing disabled
    pub fn new(inner: W) -> Self {
        Self::with_trace_config(inner, TraceConfig::default())
    }

    /// Writer tracing through the `log` facade
    pub fn with_trace_config(inner: W, config: TraceConfig) -> Self {
        Self::with_tracer(inner, Tracer::to_log(config, "Data stream sent"))
    }

    pub fn with_tracer(inner: W, tracer: Tracer) -> Self {
        Self {
            inner: BufWriter::new(inner),
            tracer,
        }
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.tracer.set_enabled(enabled);
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.tracer.is_enabled()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> HostServerResult<()> {
        self.inner.write_all(bytes)?;
        self.tracer.record(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> HostServerResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> HostServerResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> HostServerResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> HostServerResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Push buffered bytes to the stream and finish the current trace line
    pub fn flush(&mut self) -> HostServerResult<()> {
        self.inner.flush()?;
        self.tracer.finish_line();
        Ok(())
    }

    /// Mark the end of one logical request in the trace
    pub fn end(&mut self) {
        self.tracer.end();
    }

    /// Write one complete request, flush it and close its trace block
    pub fn send(&mut self, request: &[u8]) -> HostServerResult<()> {
        self.write_bytes(request)?;
        self.flush()?;
        self.end();
        Ok(())
    }

    /// Flush and release the underlying stream
    pub fn close(self) -> HostServerResult<()> {
        self.into_inner().map(drop)
    }

    pub fn into_inner(mut self) -> HostServerResult<W> {
        self.tracer.end();
        self.inner
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MemoryTraceSink;
    use std::io;
    use std::sync::Arc;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_primitives_big_endian() {
        let mut writer = DataStreamWriter::new(Vec::new());
        writer.write_u8(0xE0).unwrap();
        writer.write_u16(0xE009).unwrap();
        writer.write_u32(0x0000_001C).unwrap();
        writer.write_u64(1).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(
            bytes,
            vec![0xE0, 0xE0, 0x09, 0, 0, 0, 0x1C, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_trace_does_not_alter_output() {
        let sink = MemoryTraceSink::new();
        let tracer = Tracer::new(TraceConfig::enabled(), Arc::new(sink.clone()), "Sent");
        let mut writer = DataStreamWriter::with_tracer(Vec::new(), tracer);
        writer.send(&[0x00, 0x00, 0x00, 0x06, 0xC1, 0xC2]).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "00 00 00 06 C1 C2");
        assert_eq!(lines[2], "");
        assert_eq!(writer.into_inner().unwrap(), vec![0x00, 0x00, 0x00, 0x06, 0xC1, 0xC2]);
    }

    #[test]
    fn test_flush_error_propagates() {
        let mut writer = DataStreamWriter::new(FailingWriter);
        writer.write_u32(7).unwrap();
        assert!(matches!(
            writer.flush(),
            Err(crate::error::HostServerError::Connection(_))
        ));
    }
}
