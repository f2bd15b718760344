use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryCommandError {
    #[error("Entry command has no room address")]
    MissingAddress,

    #[error("Entry flag -{flag} has no value")]
    MissingValue { flag: String },
}

/// A parsed `"<address> [-<flag> <value>]..."` room entry command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCommand {
    address: String,
    flags: BTreeMap<String, String>,
}

impl EntryCommand {
    /// Flag carrying the room password
    pub const PASSWORD_FLAG: &'static str = "p";

    /// Splits off the address at the first space, then reads each `-`
    /// separated segment as a flag name followed by its value. A repeated
    /// flag keeps its last value.
    pub fn parse(input: &str) -> Result<Self, EntryCommandError> {
        let input = input.trim();
        let (address, rest) = input.split_once(' ').unwrap_or((input, ""));
        if address.is_empty() || address.starts_with('-') {
            return Err(EntryCommandError::MissingAddress);
        }

        let mut flags = BTreeMap::new();
        for segment in rest.split('-') {
            let mut tokens = segment.split_whitespace();
            let Some(flag) = tokens.next() else {
                continue;
            };
            let Some(value) = tokens.next() else {
                return Err(EntryCommandError::MissingValue {
                    flag: flag.to_owned(),
                });
            };
            flags.insert(flag.to_owned(), value.to_owned());
        }

        Ok(Self {
            address: address.to_owned(),
            flags,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn password(&self) -> Option<&str> {
        self.flag(Self::PASSWORD_FLAG)
    }

    pub fn flags(&self) -> &BTreeMap<String, String> {
        &self.flags
    }
}
