use email_address::EmailAddress;
use url::Url;
use uuid::Uuid;

use crate::types::ValueFormat;

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` if the provided string parses as a UUID.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

pub fn matches_format(format: ValueFormat, value: &str) -> bool {
    match format {
        ValueFormat::Email => is_valid_email(value),
        ValueFormat::Url => is_valid_url(value),
        ValueFormat::Uuid => is_valid_uuid(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("support@lender.example"));
        assert!(!is_valid_email("support"));
    }

    #[test]
    fn url_validation() {
        assert!(is_valid_url("https://lender.example/apply"));
        assert!(!is_valid_url("lender.example/apply"));
    }

    #[test]
    fn uuid_validation() {
        assert!(is_valid_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_valid_uuid("550e8400"));
    }

    #[test]
    fn format_dispatch() {
        assert!(matches_format(ValueFormat::Email, "a@b.co"));
        assert!(!matches_format(ValueFormat::Uuid, "a@b.co"));
    }
}
