//! Write-command deduction and validation.
//!
//! A write request never names its own command. The variant is deduced from
//! the three synchronization headers and, when none is supplied, from the
//! shape of the first parameter. The deduced command is then validated
//! against every parameter.

use http::HeaderMap;
use tr1d1um_core::{Command, ConversionError, ConversionResult, Parameter, WriteCommand};

/// Header carrying the new correlation id of a `TEST_AND_SET`.
pub const HEADER_SYNC_NEW_CID: &str = "X-Webpa-Sync-New-Cid";

/// Header carrying the expected prior correlation id of a `TEST_AND_SET`.
pub const HEADER_SYNC_OLD_CID: &str = "X-Webpa-Sync-Old-Cid";

/// Header carrying the synchronization marker of a `TEST_AND_SET`.
pub const HEADER_SYNC_CMC: &str = "X-Webpa-Sync-Cmc";

/// Deduces the write variant of `wdmp` from `headers` and validates it.
///
/// The command and the three synchronization hints are overwritten on
/// every call, so repeating the call with the same inputs gives the same
/// outcome.
///
/// # Example
///
/// ```
/// use http::HeaderMap;
/// use tr1d1um_convert::validate_and_deduce_set;
/// use tr1d1um_core::{Command, Parameter, WriteCommand};
///
/// let mut wdmp = WriteCommand::with_parameters(vec![Parameter {
///     name: Some("Device.Hostname".into()),
///     ..Parameter::default()
/// }]);
///
/// validate_and_deduce_set(&HeaderMap::new(), &mut wdmp).unwrap();
/// assert_eq!(wdmp.command(), Command::Set);
/// ```
pub fn validate_and_deduce_set(
    headers: &HeaderMap,
    wdmp: &mut WriteCommand,
) -> ConversionResult<()> {
    let new_cid = sync_header(headers, HEADER_SYNC_NEW_CID);
    let old_cid = sync_header(headers, HEADER_SYNC_OLD_CID);
    let sync_cmc = sync_header(headers, HEADER_SYNC_CMC);

    match (new_cid, old_cid, sync_cmc) {
        (None, Some(_), _) => return Err(ConversionError::NewCorrelationIdRequired),
        (None, None, None) => {
            wdmp.set_command(command_for_params(&wdmp.parameters));
            wdmp.new_cid.clear();
            wdmp.old_cid.clear();
            wdmp.sync_cmc.clear();
        }
        (new_cid, old_cid, sync_cmc) => {
            wdmp.set_command(Command::TestAndSet);
            wdmp.new_cid = new_cid.unwrap_or_default().to_owned();
            wdmp.old_cid = old_cid.unwrap_or_default().to_owned();
            wdmp.sync_cmc = sync_cmc.unwrap_or_default().to_owned();
        }
    }

    if is_valid_write(wdmp) {
        Ok(())
    } else {
        Err(ConversionError::InvalidWriteCommand)
    }
}

fn sync_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Only the first parameter decides between `SET` and `SET_ATTRIBUTES`.
fn command_for_params(params: &[Parameter]) -> Command {
    match params.first() {
        Some(first) if first.name.is_some() && first.is_attribute_style() => {
            Command::SetAttributes
        }
        _ => Command::Set,
    }
}

fn is_valid_write(wdmp: &WriteCommand) -> bool {
    if wdmp.parameters.is_empty() {
        return wdmp.command() == Command::TestAndSet;
    }

    let mut attribute_style = false;
    let mut value_style = false;

    for param in &wdmp.parameters {
        if !param.has_name() {
            return false;
        }

        if param.value.is_some() && !param.data_type.is_some_and(|t| t >= 0) {
            return false;
        }

        if wdmp.command() == Command::SetAttributes && param.attributes.is_none() {
            return false;
        }

        if param.is_attribute_style() {
            attribute_style = true;
        } else {
            value_style = true;
        }

        if attribute_style && value_style {
            return false;
        }
    }

    true
}
