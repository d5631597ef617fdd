use crate::socket_manager::SocketError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnifferError {
    #[error("Capture socket operation failed: {0}")]
    Socket(#[from] SocketError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
