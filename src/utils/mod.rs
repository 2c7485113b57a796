//! The `utils` module provides the pieces shared across `chatcore`:
//! error types and logging initialisation.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::error::{BrokerError, ChatError, HistoryError, UserError};
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(logging::parse_level("TRACE"), tracing::Level::TRACE);
        assert_eq!(logging::parse_level(" warning "), tracing::Level::WARN);
        assert_eq!(logging::parse_level("loud"), tracing::Level::INFO);
    }

    #[test]
    fn error_messages_match_collaborator_contract() {
        assert_eq!(BrokerError::ShuttingDown.to_string(), "broker is shutting down");
        assert_eq!(BrokerError::Closed.to_string(), "broker has been closed");
        assert_eq!(UserError::MissingId.to_string(), "missing id");
        assert_eq!(UserError::MissingName.to_string(), "missing name");
        assert_eq!(UserError::InvalidEmail.to_string(), "invalid email");
        assert_eq!(HistoryError::MissingSender.to_string(), "missing sender");
        assert_eq!(HistoryError::MissingContent.to_string(), "missing content");
    }

    #[test]
    fn chat_error_wraps_transparently() {
        let err: ChatError = BrokerError::Closed.into();
        assert_eq!(err.to_string(), "broker has been closed");
        assert_eq!(err, ChatError::Broker(BrokerError::Closed));
    }
}
