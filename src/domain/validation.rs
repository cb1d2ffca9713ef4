use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    NonPositiveAmount { field: &'static str },
    InvalidConfirmationCode { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::NonPositiveAmount { field } => write!(f, "{field} must be greater than zero"),
            Self::InvalidConfirmationCode { input } => {
                write!(f, "invalid M-Pesa confirmation code: {input}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty {
            field: "phoneNumber",
        };
        assert_eq!(err.to_string(), "phoneNumber must not be empty");

        let err = ValidationError::InvalidPhoneNumber {
            input: "bad".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid phone number: bad");

        let err = ValidationError::NonPositiveAmount { field: "amount" };
        assert_eq!(err.to_string(), "amount must be greater than zero");

        let err = ValidationError::InvalidConfirmationCode {
            input: "XK7ABC1234".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid M-Pesa confirmation code: XK7ABC1234"
        );
    }
}
