//! Command constructors.
//!
//! [`ConversionWdmp`] turns one inbound request into one WDMP command. Each
//! constructor either returns a fully populated command or fails with a
//! terminal [`ConversionError`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tr1d1um_core::{
    AddRowCommand, ConversionError, ConversionResult, DeleteRowCommand, ReadCommand,
    ReplaceRowsCommand, Row, WriteCommand,
};
use tr1d1um_extract::{form_value, ExtractionContext, PathVars, PARAMETER_VAR};

use crate::validate_and_deduce_set;

/// Default form key holding the parameter names of a read.
pub const DEFAULT_NAMES_KEY: &str = "names";

/// Default form key holding the attribute selector of a read.
pub const DEFAULT_ATTRIBUTES_KEY: &str = "attributes";

/// Default separator between parameter names.
pub const DEFAULT_NAMES_SEPARATOR: &str = ",";

/// Builds WDMP commands and WRP envelopes from inbound requests.
///
/// # Example
///
/// ```
/// use http::Method;
/// use tr1d1um_convert::ConversionWdmp;
/// use tr1d1um_core::Command;
/// use tr1d1um_extract::ExtractionContext;
///
/// let conversion = ConversionWdmp::new("dns:tr1d1um.example.com");
/// let ctx = ExtractionContext::builder()
///     .method(Method::GET)
///     .uri("/api/v2/device/mac:112233445566/config?names=a,b&attributes=notify")
///     .build();
///
/// let read = conversion.read_command(&ctx).unwrap();
/// assert_eq!(read.command(), Command::GetAttributes);
/// assert_eq!(read.names, ["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWdmp {
    wrp_source: String,
    names_key: String,
    attributes_key: String,
    separator: String,
}

impl ConversionWdmp {
    /// Creates a converter with the given WRP source root and the default
    /// read keys.
    pub fn new(wrp_source: impl Into<String>) -> Self {
        Self {
            wrp_source: wrp_source.into(),
            names_key: DEFAULT_NAMES_KEY.to_owned(),
            attributes_key: DEFAULT_ATTRIBUTES_KEY.to_owned(),
            separator: DEFAULT_NAMES_SEPARATOR.to_owned(),
        }
    }

    /// Overrides the form keys and the names separator used by reads.
    pub fn with_read_keys(
        mut self,
        names_key: impl Into<String>,
        attributes_key: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        self.names_key = names_key.into();
        self.attributes_key = attributes_key.into();
        self.separator = separator.into();
        self
    }

    /// Returns the WRP source root.
    pub fn wrp_source(&self) -> &str {
        &self.wrp_source
    }

    /// Builds a `GET` or `GET_ATTRIBUTES` command from form values.
    pub fn read_command(&self, ctx: &ExtractionContext) -> ConversionResult<ReadCommand> {
        let names = form_value(ctx, &self.names_key)
            .filter(|n| !n.is_empty())
            .ok_or(ConversionError::MissingNames)?;

        let names = names.split(self.separator.as_str()).map(str::to_owned).collect();
        let attribute = form_value(ctx, &self.attributes_key);

        Ok(ReadCommand::new(names, attribute))
    }

    /// Builds a deduced and validated write command from the body and the
    /// synchronization headers.
    pub fn write_command(&self, ctx: &ExtractionContext) -> ConversionResult<WriteCommand> {
        let mut wdmp = if ctx.is_body_empty() {
            WriteCommand::default()
        } else {
            decode_write_body(ctx.body())?
        };

        validate_and_deduce_set(ctx.headers(), &mut wdmp)?;
        Ok(wdmp)
    }

    /// Builds a `DELETE_ROW` command from the `parameter` path variable.
    pub fn delete_row_command(&self, vars: &PathVars) -> ConversionResult<DeleteRowCommand> {
        let row = vars
            .get(PARAMETER_VAR)
            .filter(|r| !r.is_empty())
            .ok_or(ConversionError::MissingRow)?;

        Ok(DeleteRowCommand::new(row))
    }

    /// Builds an `ADD_ROW` command. An empty body leaves the row unset.
    pub fn add_row_command(&self, vars: &PathVars, body: &[u8]) -> ConversionResult<AddRowCommand> {
        let mut wdmp = AddRowCommand::new(table(vars)?);

        if let Some(row) = decode_body::<Row>(body)? {
            wdmp.row = Some(row.ok_or(ConversionError::NullRow)?);
        }
        Ok(wdmp)
    }

    /// Builds a `REPLACE_ROWS` command. An empty body leaves the rows unset.
    pub fn replace_rows_command(
        &self,
        vars: &PathVars,
        body: &[u8],
    ) -> ConversionResult<ReplaceRowsCommand> {
        let mut wdmp = ReplaceRowsCommand::new(table(vars)?);

        if let Some(rows) = decode_body::<Vec<Row>>(body)? {
            wdmp.rows = Some(rows.ok_or(ConversionError::NullRows)?);
        }
        Ok(wdmp)
    }
}

fn table(vars: &PathVars) -> ConversionResult<&str> {
    vars.get(PARAMETER_VAR).ok_or(ConversionError::MissingTable)
}

/// `None` for an empty body, `Some(None)` for an explicit JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ConversionResult<Option<Option<T>>> {
    if body.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// Decodes a write body, which must be a JSON object or `null`.
///
/// Derived struct decoding also takes arrays by position, so the shape of
/// the body and of each `parameters` entry is checked first.
fn decode_write_body(body: &[u8]) -> ConversionResult<WriteCommand> {
    let value: Value = serde_json::from_slice(body)?;

    match &value {
        Value::Null => return Ok(WriteCommand::default()),
        Value::Object(fields) => match fields.get("parameters") {
            None | Some(Value::Null) => {}
            Some(Value::Array(entries)) if entries.iter().all(Value::is_object) => {}
            Some(_) => return Err(malformed("parameters must be an array of objects")),
        },
        _ => return Err(malformed("expected a JSON object")),
    }

    Ok(serde_json::from_value(value)?)
}

fn malformed(reason: &str) -> ConversionError {
    ConversionError::MalformedBody(<serde_json::Error as serde::de::Error>::custom(reason))
}
