//! `otpauth://` provisioning URIs, the payload of the QR code users scan.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::error::{Error, Result};
use crate::hotp::{Algorithm, DEFAULT_DIGITS};
use crate::secret::Secret;
use crate::totp::{DEFAULT_STEP, Totp};

// Everything except the RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Everything an authenticator app needs to start producing codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioning {
    pub secret: Secret,
    pub account: String,
    pub issuer: String,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
}

impl Provisioning {
    pub fn new(secret: Secret, account: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret,
            account: account.into(),
            issuer: issuer.into(),
            algorithm: Algorithm::Sha1,
            digits: DEFAULT_DIGITS,
            period: DEFAULT_STEP,
        }
    }

    pub fn to_uri(&self) -> String {
        let issuer = encode_component(&self.issuer);
        let mut uri = format!(
            "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&digits={digits}&period={period}",
            account = encode_component(&self.account),
            secret = self.secret.to_base32(),
            digits = self.digits,
            period = self.period,
        );

        if self.algorithm != Algorithm::Sha1 {
            uri.push_str("&algorithm=");
            uri.push_str(self.algorithm.as_str());
        }

        uri
    }

    /// Parses a URI such as one read back from a QR code.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|e| Error::InvalidUri(e.to_string()))?;

        if url.scheme() != "otpauth" {
            return Err(Error::InvalidUri(format!("unexpected scheme `{}`", url.scheme())));
        }
        if url.host_str() != Some("totp") {
            return Err(Error::InvalidUri("only totp uris are supported".to_string()));
        }

        // A colon inside the issuer or account is percent-encoded, so the first
        // literal colon is the separator. Fall back to an encoded one.
        let label = url.path().trim_start_matches('/');
        let (label_issuer, account) = match label.split_once(':') {
            Some((issuer, account)) => (Some(decode_component(issuer)?), decode_component(account)?),
            None => {
                let label = decode_component(label)?;
                match label.split_once(':') {
                    Some((issuer, account)) => {
                        (Some(issuer.trim().to_string()), account.trim().to_string())
                    }
                    None => (None, label),
                }
            }
        };
        if account.is_empty() {
            return Err(Error::InvalidUri("missing account label".to_string()));
        }

        let mut secret = None;
        let mut issuer = None;
        let mut algorithm = Algorithm::Sha1;
        let mut digits = DEFAULT_DIGITS;
        let mut period = DEFAULT_STEP;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "secret" => secret = Some(Secret::from_base32(&value)?),
                "issuer" => issuer = Some(value.to_string()),
                "algorithm" => algorithm = value.parse()?,
                "digits" => digits = parse_number(&key, &value)?,
                "period" => period = parse_number(&key, &value)?,
                _ => {}
            }
        }

        let secret = secret.ok_or_else(|| Error::InvalidUri("missing secret".to_string()))?;
        if secret.is_empty() {
            return Err(Error::InvalidUri("empty secret".to_string()));
        }
        Totp::new(algorithm, digits, period, 0)?;

        Ok(Self {
            secret,
            account,
            issuer: issuer.or(label_issuer).unwrap_or_default(),
            algorithm,
            digits,
            period,
        })
    }
}

/// Builds the SHA-1 provisioning URI for a secret.
pub fn build_uri(secret: &Secret, account: &str, issuer: &str, digits: u32, period: u64) -> String {
    Provisioning {
        secret: secret.clone(),
        account: account.to_string(),
        issuer: issuer.to_string(),
        algorithm: Algorithm::Sha1,
        digits,
        period,
    }
    .to_uri()
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn decode_component(value: &str) -> Result<String> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.trim().to_string())
        .map_err(|e| Error::InvalidUri(e.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidUri(format!("`{key}` is not a number: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc_secret() -> Secret {
        Secret::from_bytes(b"12345678901234567890".to_vec())
    }

    #[test]
    fn test_build_uri_layout() {
        let uri = build_uri(&rfc_secret(), "alice", "Acme", 6, 30);
        assert_eq!(
            uri,
            "otpauth://totp/Acme:alice?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&issuer=Acme&digits=6&period=30"
        );
    }

    #[test]
    fn test_build_uri_percent_encodes_labels() {
        let uri = build_uri(&rfc_secret(), "alice@example.com", "Acme Corp", 8, 60);
        assert!(uri.starts_with("otpauth://totp/Acme%20Corp:alice%40example.com?"));
        assert!(uri.contains("&issuer=Acme%20Corp&"));
        assert!(uri.ends_with("&digits=8&period=60"));
    }

    #[test]
    fn test_non_default_algorithm_is_advertised() {
        let mut provisioning = Provisioning::new(rfc_secret(), "alice", "Acme");
        provisioning.algorithm = Algorithm::Sha256;
        assert!(provisioning.to_uri().ends_with("&period=30&algorithm=SHA256"));
    }

    #[test]
    fn test_parse_reads_back_built_uri() {
        let mut provisioning = Provisioning::new(rfc_secret(), "alice@example.com", "Acme Corp");
        provisioning.algorithm = Algorithm::Sha512;
        provisioning.digits = 8;
        provisioning.period = 60;

        let parsed = Provisioning::parse(&provisioning.to_uri()).unwrap();
        assert_eq!(parsed, provisioning);
    }

    #[test]
    fn test_parse_keeps_colon_inside_issuer() {
        let uri = build_uri(&rfc_secret(), "alice", "Acme:EU", 6, 30);
        assert!(uri.starts_with("otpauth://totp/Acme%3AEU:alice?"));

        let parsed = Provisioning::parse(&uri).unwrap();
        assert_eq!(parsed.account, "alice");
        assert_eq!(parsed.issuer, "Acme:EU");

        let uri = build_uri(&rfc_secret(), "ops:alice", "Acme", 6, 30);
        let parsed = Provisioning::parse(&uri).unwrap();
        assert_eq!(parsed.account, "ops:alice");
        assert_eq!(parsed.issuer, "Acme");
    }

    #[test]
    fn test_parse_accepts_encoded_separator() {
        let parsed =
            Provisioning::parse("otpauth://totp/Example%3Abob?secret=GEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(parsed.issuer, "Example");
        assert_eq!(parsed.account, "bob");
    }

    #[test]
    fn test_parse_rejects_unusable_parameters() {
        assert_eq!(
            Provisioning::parse("otpauth://totp/a:b?secret=GEZDGNBV&digits=12").unwrap_err(),
            Error::InvalidDigits(12)
        );
        assert_eq!(
            Provisioning::parse("otpauth://totp/a:b?secret=GEZDGNBV&period=0").unwrap_err(),
            Error::InvalidStep
        );
        assert_eq!(
            Provisioning::parse("otpauth://totp/a:b?secret=GEZDGNBV&algorithm=MD5").unwrap_err(),
            Error::UnknownAlgorithm("MD5".to_string())
        );
    }

    #[test]
    fn test_parse_applies_defaults() {
        let parsed =
            Provisioning::parse("otpauth://totp/Example:bob?secret=GEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(parsed.account, "bob");
        assert_eq!(parsed.issuer, "Example");
        assert_eq!(parsed.algorithm, Algorithm::Sha1);
        assert_eq!(parsed.digits, 6);
        assert_eq!(parsed.period, 30);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(Provisioning::parse("not a uri"), Err(Error::InvalidUri(_))));
        assert!(matches!(
            Provisioning::parse("https://totp/a:b?secret=GEZDGNBV"),
            Err(Error::InvalidUri(_))
        ));
        assert!(matches!(
            Provisioning::parse("otpauth://hotp/a:b?secret=GEZDGNBV&counter=1"),
            Err(Error::InvalidUri(_))
        ));
        assert!(matches!(
            Provisioning::parse("otpauth://totp/a:b?issuer=a"),
            Err(Error::InvalidUri(_))
        ));
        assert!(matches!(
            Provisioning::parse("otpauth://totp/a:b?secret=GEZ1"),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            Provisioning::parse("otpauth://totp/a:b?secret=GEZDGNBV&digits=six"),
            Err(Error::InvalidUri(_))
        ));
    }
}
