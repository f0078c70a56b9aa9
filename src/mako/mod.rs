//! # Mako Protocol Module
//!
//! The RC car's UDP command protocol, named after its `MAKO_CONNECT`
//! handshake token.
//!
//! This module handles:
//! - Wire constants (headers, command class, connect token)
//! - Mapping shaped stick positions to command bytes
//! - Assembling 11-byte drive packets

pub mod protocol;
pub mod encoder;
