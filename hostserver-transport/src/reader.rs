//! Blocking big-endian datastream reader

use crate::error::{HostServerError, HostServerResult};
use crate::trace::{TraceConfig, Tracer};
use std::io::{BufRead, BufReader, ErrorKind, Read};

/// Buffered reader of big-endian datastream primitives
///
/// Every read either fills the requested width or fails: short reads from
/// the underlying stream are retried until the bytes arrive or the stream
/// reports end of input, which surfaces as
/// [`HostServerError::UnexpectedEndOfStream`].
#[derive(Debug)]
pub struct DataStreamReader<R: Read> {
    inner: BufReader<R>,
    tracer: Tracer,
}

impl<R: Read> DataStreamReader<R> {
    /// Reader with tracing disabled
    pub fn new(inner: R) -> Self {
        Self::with_trace_config(inner, TraceConfig::default())
    }

    /// Reader tracing through the `log` facade
    pub fn with_trace_config(inner: R, config: TraceConfig) -> Self {
        Self::with_tracer(inner, Tracer::to_log(config, "Data stream received"))
    }

    pub fn with_tracer(inner: R, tracer: Tracer) -> Self {
        Self {
            inner: BufReader::new(inner),
            tracer,
        }
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.tracer.set_enabled(enabled);
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.tracer.is_enabled()
    }

    /// Fill `buf` completely
    pub fn read_fully(&mut self, buf: &mut [u8]) -> HostServerResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(HostServerError::UnexpectedEndOfStream {
                        requested: buf.len(),
                        missing: buf.len() - filled,
                    });
                }
                Ok(n) => {
                    self.tracer.record(&buf[filled..filled + n]);
                    filled += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> HostServerResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_fully(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> HostServerResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> HostServerResult<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> HostServerResult<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> HostServerResult<u64> {
        self.read_array().map(u64::from_be_bytes)
    }

    /// Read exactly `len` bytes into a new buffer
    pub fn read_bytes(&mut self, len: usize) -> HostServerResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_fully(&mut buf)?;
        Ok(buf)
    }

    /// Discard exactly `count` bytes
    ///
    /// With tracing on the bytes are read one at a time so they show up in
    /// the trace.
    pub fn skip_bytes(&mut self, count: usize) -> HostServerResult<()> {
        if self.tracer.is_enabled() {
            let mut byte = [0u8; 1];
            for skipped in 0..count {
                self.read_fully(&mut byte)
                    .map_err(|e| end_of_stream(e, count, count - skipped))?;
            }
            return Ok(());
        }

        let mut remaining = count;
        while remaining > 0 {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf.len(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available == 0 {
                return Err(HostServerError::UnexpectedEndOfStream {
                    requested: count,
                    missing: remaining,
                });
            }
            let step = available.min(remaining);
            self.inner.consume(step);
            remaining -= step;
        }
        Ok(())
    }

    /// Mark the end of one logical reply in the trace
    pub fn end(&mut self) {
        self.tracer.end();
    }

    /// Release the underlying stream
    pub fn close(mut self) {
        self.tracer.end();
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

/// Rescale an end-of-stream error from a one-byte read to the whole skip
fn end_of_stream(error: HostServerError, requested: usize, missing: usize) -> HostServerError {
    match error {
        HostServerError::UnexpectedEndOfStream { .. } => {
            HostServerError::UnexpectedEndOfStream { requested, missing }
        }
        other => other,
    }
}
