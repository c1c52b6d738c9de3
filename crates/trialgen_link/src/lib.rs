//! Engine transport for trialgen
//!
//! [`TcpEngineLink`] implements [`trialgen_core::EngineLink`] over a TCP
//! connection. The framing lives in [`wire`] so it can be reused by test
//! engines on the other end of the socket.

mod tcp;
pub mod wire;

pub use tcp::TcpEngineLink;
