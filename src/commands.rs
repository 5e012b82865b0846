//! Parsing of `storage` operations given on the command line.
//!
//! Each operation is `<action>:<key>[=<json>]`, e.g. `set:greeting="hi"`.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use waypost::storage::StorageCommand;

#[derive(Debug, Clone)]
pub struct StorageOp {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub takes_value: bool,
}

/// All accepted operations
pub const STORAGE_OPS: &[StorageOp] = &[
  StorageOp {
    name: "get",
    aliases: &["g"],
    takes_value: false,
  },
  StorageOp {
    name: "set",
    aliases: &["s"],
    takes_value: true,
  },
  StorageOp {
    name: "set-unique",
    aliases: &["set_unique", "su"],
    takes_value: true,
  },
  StorageOp {
    name: "set-unique-num",
    aliases: &["set_unique_num", "sun", "seq"],
    takes_value: false,
  },
  StorageOp {
    name: "unset",
    aliases: &["u", "del", "delete"],
    takes_value: false,
  },
];

fn find_op(action: &str) -> Option<&'static StorageOp> {
  let action = action.to_lowercase();
  STORAGE_OPS
    .iter()
    .find(|op| op.name == action || op.aliases.contains(&action.as_str()))
}

/// Values that are not valid JSON are taken as plain strings.
fn parse_value(raw: &str) -> Value {
  serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn parse_storage_op(input: &str) -> Result<StorageCommand> {
  let (action, rest) = input
    .split_once(':')
    .ok_or_else(|| eyre!("Expected <action>:<key>, got '{}'", input))?;
  let op = find_op(action).ok_or_else(|| eyre!("Unknown storage action '{}'", action))?;

  let (key, value) = match rest.split_once('=') {
    Some((key, value)) => (key, Some(parse_value(value))),
    None => (rest, None),
  };
  if key.is_empty() {
    return Err(eyre!("Missing key in '{}'", input));
  }
  if value.is_some() && !op.takes_value {
    return Err(eyre!("'{}' does not take a value", op.name));
  }

  build_command(op.name, key.to_string(), value)
}

fn build_command(name: &str, key: String, value: Option<Value>) -> Result<StorageCommand> {
  let command = match name {
    "get" => StorageCommand::Get { key },
    "set" => StorageCommand::Set {
      key,
      value: value.ok_or_else(|| eyre!("'set' needs a value: set:<key>=<json>"))?,
    },
    "set-unique" => StorageCommand::SetUnique {
      key,
      value,
      if_not_exists: None,
    },
    "set-unique-num" => StorageCommand::SetUniqueNum {
      key,
      start: None,
      increment: None,
    },
    "unset" => StorageCommand::Unset { key },
    other => return Err(eyre!("No command for storage action '{}'", other)),
  };

  Ok(command)
}
