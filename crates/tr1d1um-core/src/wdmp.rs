//! WDMP command model.
//!
//! WDMP is the device-management vocabulary exchanged with devices. Every
//! command carries a [`Command`] discriminator that is chosen by the
//! conversion logic. The discriminator is private on every command type and
//! can only be read back, never assigned by a caller.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single table row: column name to value.
pub type Row = Map<String, Value>;

/// The closed set of WDMP commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Read parameter values.
    Get,
    /// Read parameter attributes.
    GetAttributes,
    /// Write parameter values.
    Set,
    /// Write parameter attributes.
    SetAttributes,
    /// Conditional write guarded by correlation ids.
    TestAndSet,
    /// Delete a table row.
    DeleteRow,
    /// Add a table row.
    AddRow,
    /// Replace every row of a table.
    ReplaceRows,
}

impl Command {
    /// Returns the wire name of the command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::GetAttributes => "GET_ATTRIBUTES",
            Self::Set => "SET",
            Self::SetAttributes => "SET_ATTRIBUTES",
            Self::TestAndSet => "TEST_AND_SET",
            Self::DeleteRow => "DELETE_ROW",
            Self::AddRow => "ADD_ROW",
            Self::ReplaceRows => "REPLACE_ROWS",
        }
    }

    /// Returns `true` for the three write variants.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Set | Self::SetAttributes | Self::TestAndSet)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read (`GET` / `GET_ATTRIBUTES`) command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadCommand {
    command: Command,
    /// Parameter names to read, in request order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Attribute selector, carried verbatim.
    #[serde(rename = "attributes", skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ReadCommand {
    /// Creates a read command. A non-empty attribute selector turns it into
    /// `GET_ATTRIBUTES`.
    #[must_use]
    pub fn new(names: Vec<String>, attribute: Option<String>) -> Self {
        let attribute = attribute.filter(|a| !a.is_empty());
        let command = if attribute.is_some() {
            Command::GetAttributes
        } else {
            Command::Get
        };
        Self {
            command,
            names,
            attribute,
        }
    }

    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }
}

/// A write target inside a [`WriteCommand`].
///
/// Every field is optional on the wire; validity is decided by the write
/// deducer, not by decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    #[serde(default)]
    pub name: Option<String>,
    /// Value to write, any JSON shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Declared device data type of `value`.
    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<i8>,
    /// Attribute updates for the named parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

impl Parameter {
    /// Returns `true` when this entry only updates attributes: attributes
    /// are set and neither a value nor a data type is present.
    #[must_use]
    pub fn is_attribute_style(&self) -> bool {
        self.attributes.is_some() && self.data_type.is_none() && self.value.is_none()
    }

    /// Returns `true` when the name is present and non-empty.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Write (`SET` / `SET_ATTRIBUTES` / `TEST_AND_SET`) command.
///
/// Only `parameters` is read from a request body. The discriminator and the
/// three synchronization hints come from deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteCommand {
    #[serde(skip_deserializing, default = "default_write_command")]
    command: Command,
    /// Expected prior correlation id (`TEST_AND_SET` only).
    #[serde(
        rename = "old-cid",
        skip_deserializing,
        skip_serializing_if = "String::is_empty"
    )]
    pub old_cid: String,
    /// New correlation id (`TEST_AND_SET` only).
    #[serde(
        rename = "new-cid",
        skip_deserializing,
        skip_serializing_if = "String::is_empty"
    )]
    pub new_cid: String,
    /// Synchronization marker (`TEST_AND_SET` only).
    #[serde(
        rename = "sync-cmc",
        skip_deserializing,
        skip_serializing_if = "String::is_empty"
    )]
    pub sync_cmc: String,
    /// Parameters to write, in request order.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parameters: Vec<Parameter>,
}

impl Default for WriteCommand {
    fn default() -> Self {
        Self::with_parameters(Vec::new())
    }
}

impl WriteCommand {
    /// Creates an undeduced `SET` shell around `parameters`.
    #[must_use]
    pub fn with_parameters(parameters: Vec<Parameter>) -> Self {
        Self {
            command: default_write_command(),
            old_cid: String::new(),
            new_cid: String::new(),
            sync_cmc: String::new(),
            parameters,
        }
    }

    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Assigns the deduced write variant.
    ///
    /// Only write variants are accepted; anything else leaves the
    /// discriminator unchanged and returns `false`.
    pub fn set_command(&mut self, command: Command) -> bool {
        if command.is_write() {
            self.command = command;
        }
        command.is_write()
    }
}

fn default_write_command() -> Command {
    Command::Set
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `DELETE_ROW` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRowCommand {
    command: Command,
    /// Row identifier.
    pub row: String,
}

impl DeleteRowCommand {
    /// Creates a delete-row command.
    #[must_use]
    pub fn new(row: impl Into<String>) -> Self {
        Self {
            command: Command::DeleteRow,
            row: row.into(),
        }
    }

    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }
}

/// `ADD_ROW` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddRowCommand {
    command: Command,
    /// Table identifier.
    pub table: String,
    /// Row to add; `None` when the request carried no body.
    pub row: Option<Row>,
}

impl AddRowCommand {
    /// Creates an add-row command with no row yet.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            command: Command::AddRow,
            table: table.into(),
            row: None,
        }
    }

    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }
}

/// `REPLACE_ROWS` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceRowsCommand {
    command: Command,
    /// Table identifier.
    pub table: String,
    /// Replacement rows; `None` when the request carried no body.
    pub rows: Option<Vec<Row>>,
}

impl ReplaceRowsCommand {
    /// Creates a replace-rows command with no rows yet.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            command: Command::ReplaceRows,
            table: table.into(),
            rows: None,
        }
    }

    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }
}

/// Any fully built WDMP command, ready to be serialized as a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WdmpCommand {
    /// `GET` / `GET_ATTRIBUTES`.
    Read(ReadCommand),
    /// `SET` / `SET_ATTRIBUTES` / `TEST_AND_SET`.
    Write(WriteCommand),
    /// `DELETE_ROW`.
    DeleteRow(DeleteRowCommand),
    /// `ADD_ROW`.
    AddRow(AddRowCommand),
    /// `REPLACE_ROWS`.
    ReplaceRows(ReplaceRowsCommand),
}

impl WdmpCommand {
    /// Returns the command discriminator.
    #[must_use]
    pub const fn command(&self) -> Command {
        match self {
            Self::Read(c) => c.command(),
            Self::Write(c) => c.command(),
            Self::DeleteRow(c) => c.command(),
            Self::AddRow(c) => c.command(),
            Self::ReplaceRows(c) => c.command(),
        }
    }

    /// Serializes the command as a JSON payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
