//! # Tr1d1um Convert
//!
//! Turns inbound HTTP requests into WDMP commands and wraps them in WRP
//! envelopes.
//!
//! | Request | Constructor | Command |
//! |---------|-------------|---------|
//! | `GET` | [`ConversionWdmp::read_command`] | `GET` / `GET_ATTRIBUTES` |
//! | `PATCH` | [`ConversionWdmp::write_command`] | `SET` / `SET_ATTRIBUTES` / `TEST_AND_SET` |
//! | `DELETE` | [`ConversionWdmp::delete_row_command`] | `DELETE_ROW` |
//! | `POST` | [`ConversionWdmp::add_row_command`] | `ADD_ROW` |
//! | `PUT` | [`ConversionWdmp::replace_rows_command`] | `REPLACE_ROWS` |
//!
//! Write commands go through [`validate_and_deduce_set`] before they are
//! returned. [`ConversionWdmp::configured_wrp`] then addresses the payload
//! to the device named by the path.

#![doc(html_root_url = "https://docs.rs/tr1d1um-convert/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod conversion;
mod deduce;
mod device;
mod envelope;

pub use conversion::{
    ConversionWdmp, DEFAULT_ATTRIBUTES_KEY, DEFAULT_NAMES_KEY, DEFAULT_NAMES_SEPARATOR,
};
pub use deduce::{
    validate_and_deduce_set, HEADER_SYNC_CMC, HEADER_SYNC_NEW_CID, HEADER_SYNC_OLD_CID,
};
pub use device::{DeviceId, DeviceIdError};
pub use envelope::{get_or_gen_tid, HEADER_TRANSACTION_ID};
