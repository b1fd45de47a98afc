//! Backend address configuration.

/// Where the ordering backend lives.
///
/// Resolution order: explicit [`ApiConfig::new`] > `TIFFIN_API_URL` env var
/// > `http://localhost:3000`. Binaries load `.env.local` before calling
/// [`from_env`][`ApiConfig::from_env`]; the library never touches dotenv.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:3000";

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn from_env() -> Self {
        match std::env::var("TIFFIN_API_URL") {
            Ok(v) if !v.trim().is_empty() => Self::new(v),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let cfg = ApiConfig::new("http://localhost:3000/");
        assert_eq!(cfg.url("/users/orders"), "http://localhost:3000/users/orders");
        assert_eq!(cfg.url("orders/4"), "http://localhost:3000/orders/4");
    }
}
