use serde::{Deserialize, Serialize};

/// Listings site the scrapers talk to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSite {
    /// Scheme and host, without trailing slash
    pub domain: String,
}

impl SearchSite {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    /// Rental houses in `city`, newest first
    pub fn results_url(&self, city: &str, page: u32) -> String {
        format!(
            "{}/casas-aluguel-{}-ordem-publicado-maior-pagina-{}.html",
            self.domain, city, page
        )
    }

    /// Absolute URL of a listing from the path found on a results page
    pub fn detail_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.domain, path)
        } else {
            format!("{}/{}", self.domain, path)
        }
    }
}

impl Default for SearchSite {
    fn default() -> Self {
        Self::new("https://www.imovelweb.com.br")
    }
}
