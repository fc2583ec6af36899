//! # Tr1d1um Core
//!
//! Core types shared by every tr1d1um crate.
//!
//! - [`wdmp`] - The closed set of WDMP device-management commands
//! - [`wrp`] - The WRP envelope that carries a WDMP payload to a device
//! - [`ConversionError`] - Terminal errors raised while turning a request into a command
//! - [`ErrorCategory`] - Coarse classification used for status codes and logging

#![doc(html_root_url = "https://docs.rs/tr1d1um-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod wdmp;
pub mod wrp;

pub use error::{ConversionError, ConversionResult, ErrorCategory};
pub use wdmp::{
    AddRowCommand, Command, DeleteRowCommand, Parameter, ReadCommand, ReplaceRowsCommand, Row,
    WdmpCommand, WriteCommand,
};
pub use wrp::{Message, MessageType};
