use std::time::Duration;

/// Builder for [`HttpConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfigBuilder {
    base_url: String,
    request_timeout: Option<Duration>,
}

impl HttpConfigBuilder {
    /// Creates a builder with the given base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }

    /// Sets a per-request timeout.
    ///
    /// Timeout semantics belong entirely to the transport; this is a
    /// passthrough to reqwest and nothing in the store layer depends
    /// on it.
    #[inline]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpConfig {
        HttpConfig {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Configuration shared by the HTTP backends.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfig {
    pub(crate) base_url: String,
    pub(crate) request_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let config =
            HttpConfigBuilder::with_base_url("http://localhost:8000/").build();
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
