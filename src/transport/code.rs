use serde::Deserialize;
use serde::de::Error as DeError;
use serde_json::Value;

/// Integer-valued field that Daraja sends as `"0"` and some proxies re-encode as `0`.
///
/// Used for `ResponseCode` and `expires_in`. Fractional or exponent numbers are
/// rejected: `0.0` is not a success code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCode(String);

impl WireCode {
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl<'de> Deserialize<'de> for WireCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Self(text.trim().to_owned())),
            Value::Number(number) if number.is_u64() || number.is_i64() => {
                Ok(Self(number.to_string()))
            }
            Value::Number(number) => Err(D::Error::custom(format!(
                "expected an integer code, got {number}"
            ))),
            other => Err(D::Error::custom(format!(
                "expected an integer code as string or number, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WireCode;

    #[derive(Debug, serde::Deserialize)]
    struct Wrapper {
        value: WireCode,
    }

    fn parse(json: &str) -> Result<WireCode, serde_json::Error> {
        serde_json::from_str::<Wrapper>(json).map(|wrapper| wrapper.value)
    }

    #[test]
    fn string_and_integer_forms_agree() {
        assert_eq!(parse(r#"{"value":"0"}"#).unwrap(), parse(r#"{"value":0}"#).unwrap());
        assert_eq!(parse(r#"{"value":" 3599 "}"#).unwrap().as_u64(), Some(3599));
        assert_eq!(parse(r#"{"value":-1}"#).unwrap().into_string(), "-1");
    }

    #[test]
    fn non_integer_numbers_are_rejected() {
        assert!(parse(r#"{"value":0.0}"#).is_err());
        assert!(parse(r#"{"value":1e3}"#).is_err());
    }

    #[test]
    fn other_json_types_are_rejected() {
        assert!(parse(r#"{"value":true}"#).is_err());
        assert!(parse(r#"{"value":null}"#).is_err());
        assert!(parse(r#"{"value":["0"]}"#).is_err());
    }
}
