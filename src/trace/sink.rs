//! Streaming packet output.
//!
//! A Perfetto trace file is the serialization of a `Trace` message whose only
//! field is `repeated TracePacket packet = 1`. Because repeated fields
//! concatenate on the wire, packets can be appended one at a time: each is
//! written as the key byte `0x0A` (field 1, length-delimited), a varint
//! length, then the packet bytes. Nothing is buffered beyond one packet.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use prost::Message;
use prost::encoding::{WireType, encode_key};

use super::proto::{TRACE_PACKET_FIELD, TracePacket};
use crate::error::ConvertError;

pub struct PacketSink<W: Write> {
    out: W,
    path: PathBuf,
    scratch: Vec<u8>,
    packets: usize,
}

impl PacketSink<BufWriter<File>> {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|error| ConvertError::Create {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> PacketSink<W> {
    /// Wrap an arbitrary writer; `path` is only used in errors.
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            path: path.into(),
            scratch: Vec::with_capacity(256),
            packets: 0,
        }
    }

    /// Append one framed packet.
    pub fn write(&mut self, packet: &TracePacket) -> Result<()> {
        self.scratch.clear();
        encode_key(
            TRACE_PACKET_FIELD,
            WireType::LengthDelimited,
            &mut self.scratch,
        );
        // Vec<u8> grows on demand, so encoding cannot run out of space
        packet
            .encode_length_delimited(&mut self.scratch)
            .map_err(|e| ConvertError::Write {
                path: self.path.clone(),
                error: std::io::Error::other(e),
            })?;
        self.out
            .write_all(&self.scratch)
            .map_err(|error| ConvertError::Write {
                path: self.path.clone(),
                error,
            })?;
        self.packets += 1;
        Ok(())
    }

    /// Packets written so far.
    pub fn packet_count(&self) -> usize {
        self.packets
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(|error| ConvertError::Write {
            path: self.path.clone(),
            error,
        })?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.out)
    }
}
