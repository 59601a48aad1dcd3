//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (scripts, test drivers, a compositor bridge) can connect
//! to the socket and send newline-delimited JSON commands.

pub mod listener;
