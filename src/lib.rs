//! # Mako Bridge Library
//!
//! Drive a Wi-Fi RC car from a USB joystick.
//!
//! This library provides the core functionality for turning joystick axes
//! into the car's UDP command protocol: dead-zone shaping, command byte
//! mapping, the datagram link, and the handshake/streaming session.

pub mod config;
pub mod error;
pub mod mako;
pub mod controller;
pub mod transport;
pub mod session;
