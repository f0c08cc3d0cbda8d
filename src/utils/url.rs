//! URL utilities for stream and source addresses

use url::{Host, Url};

/// Address family of a URL's host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    /// Host is a DNS name
    Domain,
}

pub struct UrlUtils;

impl UrlUtils {
    /// Clean a raw stream URL taken from a playlist line.
    ///
    /// Everything from the first `$` on is dropped (players use it for
    /// per-line options), surrounding whitespace is trimmed, and the given
    /// query parameters are removed. A URL that does not parse is returned
    /// trimmed but otherwise untouched.
    pub fn clean_stream_url(raw: &str, remove_params: &[String]) -> String {
        let url = raw.split('$').next().unwrap_or_default().trim();
        if remove_params.is_empty() {
            return url.to_string();
        }

        match Self::strip_query_params(url, remove_params) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                tracing::warn!(
                    "Failed to strip query parameters from {}: {}",
                    Self::obfuscate_credentials(url),
                    e
                );
                url.to_string()
            }
        }
    }

    /// Remove the named query parameters, leaving the URL byte-identical when
    /// none of them are present.
    pub fn strip_query_params(url: &str, params: &[String]) -> Result<String, url::ParseError> {
        let mut parsed = Url::parse(url)?;
        if parsed.query().is_none() {
            return Ok(url.to_string());
        }

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let kept: Vec<&(String, String)> = pairs
            .iter()
            .filter(|(k, _)| !params.iter().any(|p| p == k))
            .collect();

        if kept.len() == pairs.len() {
            return Ok(url.to_string());
        }

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(parsed.to_string())
    }

    /// Address family of the URL host, `None` when the URL does not parse or has no host
    pub fn host_family(url: &str) -> Option<AddressFamily> {
        let parsed = Url::parse(url).ok()?;
        match parsed.host()? {
            Host::Ipv4(_) => Some(AddressFamily::Ipv4),
            Host::Ipv6(_) => Some(AddressFamily::Ipv6),
            Host::Domain(_) => Some(AddressFamily::Domain),
        }
    }

    /// Obfuscate credentials in URLs before they reach the logs
    pub fn obfuscate_credentials(url: &str) -> String {
        use regex::Regex;

        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        let sensitive_params = ["username", "password", "user", "pass", "pwd", "passwd", "token"];

        for param in &sensitive_params {
            let pattern = format!(r"(?i)([?&]{}=)[^&]*", regex::escape(param));
            if let Ok(re) = Regex::new(&pattern) {
                obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
            }
        }

        obfuscated
    }
}
