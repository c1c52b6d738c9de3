//! Message framing
//!
//! Outbound: `u32` byte length, then a JSON array of commands.
//! Inbound: `u32` block count, then per block a 4 byte tag, a `u32` payload
//! length and the payload. All integers are little-endian.

use std::io::{self, Read, Write};

use serde_json::Value;
use trialgen_core::{Command, LinkError, RawBlock};

/// Largest message either side accepts
pub const MAX_MESSAGE_BYTES: usize = 256 * 1024 * 1024;

/// Upper bound on blocks in one response
pub const MAX_BLOCKS: usize = 65_536;

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, LinkError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(eof_as_disconnect)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_len<R: Read>(reader: &mut R, limit: usize, what: &str) -> Result<usize, LinkError> {
    let len = read_u32(reader)? as usize;
    if len > limit {
        return Err(LinkError::Protocol(format!("{what} of {len} exceeds limit {limit}")));
    }
    Ok(len)
}

fn eof_as_disconnect(e: io::Error) -> LinkError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        LinkError::Disconnected
    } else {
        LinkError::Io(e)
    }
}

/// Send one command batch
pub fn write_commands<W: Write>(writer: &mut W, commands: &[Command]) -> Result<(), LinkError> {
    let body = serde_json::to_vec(commands)?;
    if body.len() > MAX_MESSAGE_BYTES {
        return Err(LinkError::Protocol(format!(
            "command batch of {} bytes exceeds limit",
            body.len()
        )));
    }
    writer.write_all(&(body.len() as u32).to_le_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Receive one command batch as raw JSON (engine side)
pub fn read_commands<R: Read>(reader: &mut R) -> Result<Vec<Value>, LinkError> {
    let len = read_len(reader, MAX_MESSAGE_BYTES, "command batch")?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(eof_as_disconnect)?;
    match serde_json::from_slice(&body)? {
        Value::Array(commands) => Ok(commands),
        other => Err(LinkError::Protocol(format!("expected a command array, got {other}"))),
    }
}

/// Send one response (engine side)
pub fn write_blocks<W: Write>(writer: &mut W, blocks: &[RawBlock]) -> Result<(), LinkError> {
    writer.write_all(&(blocks.len() as u32).to_le_bytes())?;
    for block in blocks {
        writer.write_all(&block.tag)?;
        writer.write_all(&(block.payload.len() as u32).to_le_bytes())?;
        writer.write_all(&block.payload)?;
    }
    writer.flush()?;
    Ok(())
}

/// Receive one response
pub fn read_blocks<R: Read>(reader: &mut R) -> Result<Vec<RawBlock>, LinkError> {
    let count = read_len(reader, MAX_BLOCKS, "block count")?;
    let mut blocks = Vec::with_capacity(count);
    let mut total = 0usize;
    for _ in 0..count {
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag).map_err(eof_as_disconnect)?;
        let len = read_len(reader, MAX_MESSAGE_BYTES, "block payload")?;
        total += len;
        if total > MAX_MESSAGE_BYTES {
            return Err(LinkError::Protocol("response exceeds size limit".to_string()));
        }
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).map_err(eof_as_disconnect)?;
        blocks.push(RawBlock::new(tag, payload));
    }
    Ok(blocks)
}
