use crate::UrlError;
use url::Url;

/// Canonicalizes a URL for frontier and visited-set identity
///
/// # Canonical Form
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https` schemes
/// 3. Require a host; lowercase it
/// 4. Resolve dot segments; an empty path becomes `/`
/// 5. Drop the default port for the scheme
/// 6. Remove the fragment (everything after `#`)
/// 7. Keep the query string exactly as given
///
/// Steps 4 and 5 are performed by the WHATWG parser itself.
///
/// # Examples
///
/// ```
/// use skein::url::canonicalize_url;
///
/// let url = canonicalize_url("HTTPS://Example.COM:443/a/../b?x=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/b?x=1");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };
    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host))
            .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
    }

    url.set_fragment(None);

    Ok(url)
}
