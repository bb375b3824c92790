use super::ProtocolError;
use bytes::Bytes;
use std::str;

pub const KEY_MAX_LENGTH: usize = 250;
pub const FLAGS_MAX_LENGTH: usize = 5;
pub const TTL_MAX_LENGTH: usize = 5;
pub const DATA_LENGTH_MAX_LENGTH: usize = 2;
pub const CAS_MAX_LENGTH: usize = 5;

const NOREPLY: &[u8] = b"noreply";

/// Commands understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Get,
    Gets,
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
}

impl Command {
    pub fn from_token(token: &[u8]) -> Option<Command> {
        match token {
            b"get" => Some(Command::Get),
            b"gets" => Some(Command::Gets),
            b"set" => Some(Command::Set),
            b"add" => Some(Command::Add),
            b"replace" => Some(Command::Replace),
            b"append" => Some(Command::Append),
            b"prepend" => Some(Command::Prepend),
            b"cas" => Some(Command::Cas),
            _ => None,
        }
    }

    pub fn is_retrieval(&self) -> bool {
        matches!(self, Command::Get | Command::Gets)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalCommand {
    pub keys: Vec<Bytes>,
    pub with_cas: bool,
}

/// Validated first line of a storage command, the data block follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCommand {
    pub operation: StorageOperation,
    pub key: Bytes,
    pub flags: Bytes,
    pub time_to_live: i64,
    pub length: usize,
    pub noreply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Retrieval(RetrievalCommand),
    Storage(StorageCommand),
}

/// Classifies and validates a single command line, without its terminator.
///
/// Recognition comes first: a line that does not start with a supported
/// command is an [`ProtocolError::UnknownCommand`] no matter what follows.
pub fn parse_command_line(line: &Bytes) -> Result<CommandLine, ProtocolError> {
    let parts: Vec<&[u8]> = line
        .split(|byte| byte.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .collect();

    let command = match parts.first().and_then(|token| Command::from_token(token)) {
        Some(command) => command,
        None => return Err(ProtocolError::UnknownCommand),
    };

    if command.is_retrieval() {
        if parts.len() < 2 {
            return Err(ProtocolError::UnknownCommand);
        }
        return Ok(CommandLine::Retrieval(RetrievalCommand {
            keys: parts[1..].iter().map(|key| line.slice_ref(key)).collect(),
            with_cas: command == Command::Gets,
        }));
    }

    let is_cas = command == Command::Cas;
    if !validate_number_of_arguments(&parts, is_cas)
        || !validate_command_arguments(&parts, is_cas)
    {
        return Err(ProtocolError::BadCommandLineFormat);
    }

    let operation = match command {
        Command::Set => StorageOperation::Set,
        Command::Add => StorageOperation::Add,
        Command::Replace => StorageOperation::Replace,
        Command::Append => StorageOperation::Append,
        Command::Prepend => StorageOperation::Prepend,
        Command::Cas => StorageOperation::Cas(parse_number(parts[5])?),
        Command::Get | Command::Gets => return Err(ProtocolError::UnknownCommand),
    };

    let noreply_position = if is_cas { 6 } else { 5 };
    Ok(CommandLine::Storage(StorageCommand {
        operation,
        key: line.slice_ref(parts[1]),
        flags: line.slice_ref(parts[2]),
        time_to_live: parse_number(parts[3])?,
        length: parse_number(parts[4])?,
        noreply: parts.get(noreply_position) == Some(&NOREPLY),
    }))
}

/// `cas` takes 6 or 7 fields, other storage commands 5 or 6.
pub fn validate_number_of_arguments(parts: &[&[u8]], is_cas: bool) -> bool {
    if is_cas {
        parts.len() == 6 || parts.len() == 7
    } else {
        parts.len() == 5 || parts.len() == 6
    }
}

/// Checks token lengths first, then the numeric shape of each field.
pub fn validate_command_arguments(parts: &[&[u8]], is_cas: bool) -> bool {
    if parts[1].len() > KEY_MAX_LENGTH
        || parts[2].len() > FLAGS_MAX_LENGTH
        || parts[3].len() > TTL_MAX_LENGTH
        || parts[4].len() > DATA_LENGTH_MAX_LENGTH
        || (is_cas && parts[5].len() > CAS_MAX_LENGTH)
    {
        return false;
    }

    is_unsigned(parts[2])
        && is_signed(parts[3])
        && is_unsigned_with_plus(parts[4])
        && (!is_cas || is_unsigned_with_plus(parts[5]))
}

/// Digits only, no sign
fn is_unsigned(token: &[u8]) -> bool {
    !token.is_empty() && token.iter().all(u8::is_ascii_digit)
}

/// Digits with an optional leading `+` or `-`
fn is_signed(token: &[u8]) -> bool {
    match token {
        [b'+' | b'-', rest @ ..] if !rest.is_empty() => is_unsigned(rest),
        _ => is_unsigned(token),
    }
}

/// Digits with an optional leading `+`
fn is_unsigned_with_plus(token: &[u8]) -> bool {
    match token {
        [b'+', rest @ ..] if !rest.is_empty() => is_unsigned(rest),
        _ => is_unsigned(token),
    }
}

fn parse_number<T: str::FromStr>(token: &[u8]) -> Result<T, ProtocolError> {
    str::from_utf8(token)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .ok_or(ProtocolError::BadCommandLineFormat)
}
