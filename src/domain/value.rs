use crate::domain::validation::ValidationError;

use phonenumber::country;

/// Kenyan country calling code, as expected by the gateway (no leading `+`).
pub const COUNTRY_CALLING_CODE: &str = "254";

/// Local trunk prefix replaced by [`COUNTRY_CALLING_CODE`] during normalization.
pub const TRUNK_PREFIX: char = '0';

/// Rewrite a leading trunk prefix into the country calling code.
///
/// `0712345678` becomes `254712345678`. Any other leading form is passed through
/// unchanged; this is not phone-number validation.
pub fn normalize_phone_number(input: &str) -> String {
    match input.strip_prefix(TRUNK_PREFIX) {
        Some(rest) => format!("{COUNTRY_CALLING_CODE}{rest}"),
        None => input.to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Daraja consumer key used for the OAuth token call.
///
/// Invariant: non-empty after trimming.
pub struct ConsumerKey(String);

impl ConsumerKey {
    pub const FIELD: &'static str = "consumer_key";

    /// Create a validated [`ConsumerKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Daraja consumer secret used for the OAuth token call.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct ConsumerSecret(String);

impl ConsumerSecret {
    pub const FIELD: &'static str = "consumer_secret";

    /// Create a validated [`ConsumerSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ConsumerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConsumerSecret(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Phone number as entered by the payer (`phoneNumber`).
///
/// Invariant: non-empty after trimming. Normalization is narrow and happens at
/// the wire boundary via [`RawPhoneNumber::normalized`]; if you want full
/// validation, parse into [`PhoneNumber`] and convert it into [`RawPhoneNumber`].
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// JSON field name used by the gateway (`phoneNumber`).
    pub const FIELD: &'static str = "phoneNumber";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as entered.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Value as sent to the gateway, with the trunk prefix rewritten.
    pub fn normalized(&self) -> String {
        normalize_phone_number(&self.0)
    }

    /// Masked form for logs: everything but the last three characters is hidden.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(3);
        match self.0.get(visible..) {
            Some(tail) => format!("{}{tail}", "*".repeat(visible)),
            None => "*".repeat(self.0.len()),
        }
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert a parsed phone number to the gateway form (E.164 without `+`).
    fn from(value: PhoneNumber) -> Self {
        let digits = value.e164.trim_start_matches('+').to_owned();
        Self(digits)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// JSON field name used by the gateway (`phoneNumber`).
    pub const FIELD: &'static str = "phoneNumber";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix,
    /// typically `Some(country::Id::KE)`.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;
        if !phonenumber::is_valid(&parsed) {
            return Err(ValidationError::InvalidPhoneNumber { input: raw });
        }

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Parse a number as dialled in Kenya: `07...`, `254...`, or `+254...`.
    ///
    /// Rejects numbers that `phonenumber` does not consider valid for their region.
    pub fn parse_kenyan(input: impl Into<String>) -> Result<Self, ValidationError> {
        Self::parse(Some(country::Id::KE), input)
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Payment amount in whole currency units (`amount`).
///
/// Invariant: greater than zero. The currency is whatever the gateway is configured for.
pub struct Amount(u64);

impl Amount {
    /// JSON field name used by the gateway (`amount`).
    pub const FIELD: &'static str = "amount";

    /// Create a validated (positive) amount.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::NonPositiveAmount { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Checkout request id (`checkoutRequestId`) returned by the initiate call.
///
/// Invariant: non-empty after trimming.
pub struct CheckoutRequestId(String);

impl CheckoutRequestId {
    /// JSON field name used by the gateway (`checkoutRequestId`).
    pub const FIELD: &'static str = "checkoutRequestId";

    /// Create a validated [`CheckoutRequestId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Merchant request id (`merchantRequestId`) returned alongside the checkout id.
///
/// Invariant: non-empty after trimming.
pub struct MerchantRequestId(String);

impl MerchantRequestId {
    pub const FIELD: &'static str = "merchantRequestId";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway `responseCode`.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct ResponseCode(String);

impl ResponseCode {
    /// The only code the gateway uses for an accepted request.
    pub const SUCCESS: &'static str = "0";

    /// Construct a response code from its wire representation (trimmed).
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(code.trim().to_owned())
    }

    /// Borrow the code as provided by the gateway.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the gateway accepted the request.
    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// M-Pesa confirmation code, as printed in the payer's confirmation SMS.
///
/// Invariant: exactly [`ConfirmationCode::LEN`] ASCII characters, uppercase; the first
/// is one of `P`, `N`, `K`, the second is a letter, the rest are letters or digits.
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub const FIELD: &'static str = "mpesaCode";

    pub const LEN: usize = 10;

    /// Uppercase `input` and check it against the confirmation code format.
    ///
    /// No trimming is performed: surrounding whitespace makes the code invalid.
    pub fn parse(input: impl Into<String>) -> Result<Self, ValidationError> {
        let input = input.into();
        let code = input.to_uppercase();
        if !is_confirmation_code(code.as_bytes()) {
            return Err(ValidationError::InvalidConfirmationCode { input });
        }
        Ok(Self(code))
    }

    /// Borrow the normalized (uppercase) code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_confirmation_code(bytes: &[u8]) -> bool {
    match bytes {
        [b'P' | b'N' | b'K', second, rest @ ..] if rest.len() == ConfirmationCode::LEN - 2 => {
            second.is_ascii_uppercase()
                && rest
                    .iter()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        _ => false,
    }
}

/// Check a manually entered confirmation code; input case does not matter.
pub fn validate_confirmation_code(code: &str) -> bool {
    ConfirmationCode::parse(code).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let id = CheckoutRequestId::new(" ws_CO_123 ").unwrap();
        assert_eq!(id.as_str(), "ws_CO_123");
        assert!(CheckoutRequestId::new("  ").is_err());

        let merchant = MerchantRequestId::new(" 29115-34620561-1 ").unwrap();
        assert_eq!(merchant.as_str(), "29115-34620561-1");
        assert!(MerchantRequestId::new("").is_err());

        let key = ConsumerKey::new(" key ").unwrap();
        assert_eq!(key.as_str(), "key");
        assert!(ConsumerKey::new("  ").is_err());

        let secret = ConsumerSecret::new(" secret ").unwrap();
        assert_eq!(secret.as_str(), " secret ");
        assert_eq!(format!("{secret:?}"), "ConsumerSecret(<redacted>)");
        assert!(ConsumerSecret::new("").is_err());
    }

    #[test]
    fn raw_phone_number_normalizes_trunk_prefix() {
        let raw = RawPhoneNumber::new(" 0712345678 ").unwrap();
        assert_eq!(raw.raw(), "0712345678");
        assert_eq!(raw.normalized(), "254712345678");

        let intl = RawPhoneNumber::new("254712345678").unwrap();
        assert_eq!(intl.normalized(), "254712345678");

        let plus = RawPhoneNumber::new("+254712345678").unwrap();
        assert_eq!(plus.normalized(), "+254712345678");

        assert!(RawPhoneNumber::new("").is_err());
    }

    #[test]
    fn normalize_only_touches_first_character() {
        assert_eq!(normalize_phone_number("0"), "254");
        assert_eq!(normalize_phone_number("00712"), "2540712");
        assert_eq!(normalize_phone_number("712345678"), "712345678");
        assert_eq!(normalize_phone_number(""), "");
    }

    #[test]
    fn masked_phone_keeps_last_three_digits() {
        let raw = RawPhoneNumber::new("0712345678").unwrap();
        assert_eq!(raw.masked(), "*******678");

        let short = RawPhoneNumber::new("07").unwrap();
        assert_eq!(short.masked(), "07");
    }

    #[test]
    fn phone_number_parsing_uses_e164() {
        let p1 = PhoneNumber::parse(Some(country::Id::KE), "0712345678").unwrap();
        let p2 = PhoneNumber::parse(None, "+254 712 345 678").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.e164(), "+254712345678");

        let raw: RawPhoneNumber = p1.into();
        assert_eq!(raw.raw(), "254712345678");
        assert!(PhoneNumber::parse(None, "not-a-number").is_err());
    }

    #[test]
    fn kenyan_parse_accepts_local_and_international_forms() {
        let local = PhoneNumber::parse_kenyan("0712345678").unwrap();
        let intl = PhoneNumber::parse_kenyan("254712345678").unwrap();
        assert_eq!(local, intl);
        assert_eq!(RawPhoneNumber::from(intl).normalized(), "254712345678");

        assert!(matches!(
            PhoneNumber::parse_kenyan("0712"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse_kenyan("  "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(0).is_err());
        assert_eq!(Amount::new(500).unwrap().value(), 500);
    }

    #[test]
    fn response_code_success_is_zero() {
        assert!(ResponseCode::new("0").is_success());
        assert!(ResponseCode::new(" 0 ").is_success());
        assert!(!ResponseCode::new("1").is_success());
        assert!(!ResponseCode::new("").is_success());
        assert_eq!(ResponseCode::new("1032").as_str(), "1032");
    }

    #[test]
    fn confirmation_code_format() {
        assert!(validate_confirmation_code("PK7ABC1234"));
        assert!(validate_confirmation_code("NA00000000"));
        assert!(validate_confirmation_code("KZZZZZZZZZ"));

        assert!(!validate_confirmation_code("XK7ABC1234"));
        assert!(!validate_confirmation_code("P77ABC1234"));
        assert!(!validate_confirmation_code("PK7ABC123"));
        assert!(!validate_confirmation_code("PK7ABC12345"));
        assert!(!validate_confirmation_code("PK7ABC-234"));
        assert!(!validate_confirmation_code(" PK7ABC1234"));
        assert!(!validate_confirmation_code(""));
    }

    #[test]
    fn confirmation_code_is_case_insensitive() {
        assert!(validate_confirmation_code("pk7abc1234"));
        let code = ConfirmationCode::parse("pk7abc1234").unwrap();
        assert_eq!(code.as_str(), "PK7ABC1234");
    }

    #[test]
    fn confirmation_code_error_keeps_original_input() {
        let err = ConfirmationCode::parse("xk7abc1234").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidConfirmationCode {
                input: "xk7abc1234".to_owned()
            }
        );
    }
}
