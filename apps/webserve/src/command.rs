//! Console input parsing.
//!
//! Every line maps to exactly one [`Command`] or a [`CommandError`]; keywords are
//! matched case-insensitively, argument values keep their case.

use crate::error::CommandError;

use common::ErrorLocation;

use std::panic::Location;
use std::str::FromStr;

const WEBSERVER_FLAG: &str = "--webserver";

pub const CHANGE_IP_USAGE: &str = "--webserver change ip \"new_ip_address\"";
pub const PORT_USAGE: &str = "--webserver port new_port";

pub const HELP_TEXT: &str = "Available commands:
- help: Show available commands
- exit: Close the terminal
- --webserver start: Start the web server
- --webserver stop: Stop the web server
- --webserver status: Show whether the web server is running
- --webserver ip address: Show the IP address and port of the web server
- --webserver change ip \"ip address\": Change the IP address of the web server
- --webserver port new_port: Change the port of the web server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Start,
    Stop,
    Status,
    ShowAddress,
    /// Raw ip token, possibly still quoted
    ChangeIp(String),
    /// Raw port token, not yet validated
    ChangePort(String),
}

impl Command {
    #[track_caller]
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let keywords: Vec<&str> = lowered.iter().map(String::as_str).collect();

        match keywords.as_slice() {
            ["help"] => Ok(Command::Help),
            ["exit"] => Ok(Command::Exit),
            [WEBSERVER_FLAG, "start"] => Ok(Command::Start),
            [WEBSERVER_FLAG, "stop"] => Ok(Command::Stop),
            [WEBSERVER_FLAG, "status"] => Ok(Command::Status),
            [WEBSERVER_FLAG, "ip", "address"] => Ok(Command::ShowAddress),
            [WEBSERVER_FLAG, "change", "ip", _] => Ok(Command::ChangeIp(tokens[3].to_string())),
            [WEBSERVER_FLAG, "change", "ip", ..] => Err(CommandError::Format {
                usage: CHANGE_IP_USAGE,
                location: ErrorLocation::from(Location::caller()),
            }),
            [WEBSERVER_FLAG, "port", _] => Ok(Command::ChangePort(tokens[2].to_string())),
            [WEBSERVER_FLAG, "port", ..] => Err(CommandError::Format {
                usage: PORT_USAGE,
                location: ErrorLocation::from(Location::caller()),
            }),
            _ => Err(CommandError::Unrecognized {
                text: line.trim().to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Command::parse(line)
    }
}
