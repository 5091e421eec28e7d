//! Storage options forwarded to the S3 client builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Alias toggling unsigned requests.
pub const ANON: &str = "anon";

/// Keys the S3 builder understands for unsigned requests.
const SKIP_SIGNATURE_KEYS: [&str; 2] = ["skip_signature", "aws_skip_signature"];

/// Keys that supply explicit credentials.
const CREDENTIAL_KEYS: [&str; 4] = [
    "access_key_id",
    "aws_access_key_id",
    "token",
    "aws_session_token",
];

/// String options for the object-store client.
///
/// Keys are `object_store` AmazonS3 configuration keys (`region`,
/// `endpoint`, `aws_access_key_id`, ...). `anon` is accepted as an alias
/// for `skip_signature`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageOptions(BTreeMap<String, String>);

impl StorageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options other than the anonymity switches.
    pub(crate) fn client_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !is_anonymity_key(k))
    }

    /// Whether requests should go out unsigned.
    ///
    /// An explicit `anon`/`skip_signature` wins; otherwise requests are
    /// unsigned unless credentials were passed as options. Returns the
    /// offending value when a switch is not a boolean.
    pub fn anonymous(&self) -> Result<bool, String> {
        let explicit = self
            .iter()
            .filter(|(k, _)| is_anonymity_key(k))
            .map(|(_, v)| parse_bool(v).ok_or_else(|| v.to_string()))
            .last();

        match explicit {
            Some(value) => value,
            None => Ok(!CREDENTIAL_KEYS.iter().any(|k| self.0.contains_key(*k))),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StorageOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for StorageOptions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

fn is_anonymity_key(key: &str) -> bool {
    key == ANON || SKIP_SIGNATURE_KEYS.contains(&key)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_anonymous() {
        assert_eq!(StorageOptions::new().anonymous(), Ok(true));
        let opts = StorageOptions::new().with("region", "eu-central-1");
        assert_eq!(opts.anonymous(), Ok(true));
    }

    #[test]
    fn test_credentials_disable_anonymous() {
        let opts = StorageOptions::new()
            .with("aws_access_key_id", "AKIA")
            .with("aws_secret_access_key", "secret");
        assert_eq!(opts.anonymous(), Ok(false));
    }

    #[test]
    fn test_explicit_anon_wins() {
        let opts = StorageOptions::new().with("anon", "false");
        assert_eq!(opts.anonymous(), Ok(false));

        let opts = StorageOptions::new()
            .with("aws_access_key_id", "AKIA")
            .with("anon", "True");
        assert_eq!(opts.anonymous(), Ok(true));

        let opts = StorageOptions::new().with("skip_signature", "0");
        assert_eq!(opts.anonymous(), Ok(false));
    }

    #[test]
    fn test_invalid_anon_value() {
        let opts = StorageOptions::new().with("anon", "maybe");
        assert_eq!(opts.anonymous(), Err("maybe".to_string()));
    }

    #[test]
    fn test_client_options_exclude_aliases() {
        let opts = StorageOptions::new()
            .with("anon", "true")
            .with("region", "us-west-2");
        let forwarded: Vec<_> = opts.client_options().collect();
        assert_eq!(forwarded, vec![("region", "us-west-2")]);
    }

    #[test]
    fn test_serde_is_a_plain_map() {
        let opts: StorageOptions =
            serde_json::from_str(r#"{"anon": "true", "region": "eu-central-1"}"#).unwrap();
        assert_eq!(opts.get("region"), Some("eu-central-1"));
        assert_eq!(serde_json::to_value(&opts).unwrap()["anon"], "true");
    }
}
