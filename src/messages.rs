use std::path::PathBuf;

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// A scanned or typed barcode (Enter / Start)
    Barcode(String),
    SelectFolder(PathBuf),
    /// Stop button: stop without starting a new recording
    Stop,
    Status,
    ShowLog,
    ShowUsed,
    Devices,
    Quit,
    Unknown(String),
}

impl InputCommand {
    /// Lines starting with `:` are commands, everything else is a barcode.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return InputCommand::Barcode(line.to_string());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "folder" if !arg.is_empty() => InputCommand::SelectFolder(PathBuf::from(arg)),
            "stop" => InputCommand::Stop,
            "status" => InputCommand::Status,
            "log" => InputCommand::ShowLog,
            "used" => InputCommand::ShowUsed,
            "devices" => InputCommand::Devices,
            "quit" | "q" => InputCommand::Quit,
            _ => InputCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Recording controller state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording { barcode: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_barcode_keeps_raw_line() {
        assert_eq!(
            InputCommand::parse("  PKG-1 "),
            InputCommand::Barcode("  PKG-1 ".to_string())
        );
        assert_eq!(InputCommand::parse(""), InputCommand::Barcode(String::new()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            InputCommand::parse(":folder /srv/shipments today"),
            InputCommand::SelectFolder(PathBuf::from("/srv/shipments today"))
        );
        assert_eq!(InputCommand::parse(":stop"), InputCommand::Stop);
        assert_eq!(InputCommand::parse(" :q "), InputCommand::Quit);
        assert_eq!(
            InputCommand::parse(":folder"),
            InputCommand::Unknown(":folder".to_string())
        );
        assert_eq!(
            InputCommand::parse(":dance"),
            InputCommand::Unknown(":dance".to_string())
        );
    }
}
