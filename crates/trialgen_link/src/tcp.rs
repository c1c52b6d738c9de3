//! TCP engine connection

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use trialgen_core::{Command, EngineLink, LinkError, RawBlock};

use crate::wire;

/// Blocking request/response connection to the engine
pub struct TcpEngineLink {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer: SocketAddr,
    round_trips: u64,
}

impl TcpEngineLink {
    /// Connect to the engine, trying each resolved address in turn
    pub fn connect<A: ToSocketAddrs>(address: A, timeout: Duration) -> Result<Self, LinkError> {
        let mut last_error = None;
        for addr in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Self::from_stream(stream),
                Err(e) => {
                    log::debug!("Connecting to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.map(LinkError::Io).unwrap_or(LinkError::Disconnected))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self, LinkError> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let writer = BufWriter::new(stream.try_clone()?);
        log::info!("Connected to engine at {}", peer);
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            peer,
            round_trips: 0,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Completed request/response exchanges
    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }
}

impl EngineLink for TcpEngineLink {
    fn communicate(&mut self, commands: &[Command]) -> Result<Vec<RawBlock>, LinkError> {
        wire::write_commands(&mut self.writer, commands)?;
        let blocks = wire::read_blocks(&mut self.reader)?;
        self.round_trips += 1;
        Ok(blocks)
    }
}
