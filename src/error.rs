use crate::config::ConfigError;
use crate::io::TableError;

/// Exit code for bad input: unreadable files, missing columns, invalid config.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for terminal/viewer failures.
pub const EXIT_TERMINAL: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid configuration: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_maps_to_input_exit_code() {
        let err = AppError::from(TableError::MissingColumn {
            file_index: 2,
            column: "encoder_pos_rad".to_string(),
        });
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert_eq!(err.message(), "File 2 is missing required column: encoder_pos_rad");
    }
}
