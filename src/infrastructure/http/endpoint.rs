//! Service endpoint and URL construction

use reqwest::Url;

use crate::application::ports::ApiError;
use crate::domain::config::ServiceCredentials;
use crate::domain::generation::PageQuery;

/// Path segment shared by all podcast resources
const PATH_ROOT: &str = "podcast";

/// Region-scoped service root plus API version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    root: Url,
    api_version: String,
}

impl ServiceEndpoint {
    /// Resolve the endpoint for a region.
    ///
    /// A region that already looks like a URL (`http://...`, `https://...`)
    /// is used as the root verbatim, which is how local and test endpoints
    /// are reached.
    pub fn new(region: &str, api_version: &str) -> Result<Self, ApiError> {
        let region = region.trim();
        let root = if region.to_ascii_lowercase().starts_with("http") {
            region.trim_end_matches('/').to_string()
        } else {
            format!("https://{}.api.cognitive.microsoft.com", region)
        };

        let root = Url::parse(&root).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", root, e)))?;
        if root.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(root.to_string()));
        }

        Ok(Self {
            root,
            api_version: api_version.to_string(),
        })
    }

    pub fn from_credentials(credentials: &ServiceCredentials) -> Result<Self, ApiError> {
        Self::new(credentials.region(), credentials.api_version())
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// `{root}/podcast/{segment}[/{id}]?api-version=..[&top=..][&skip=..][&maxpagesize=..]`
    ///
    /// Query arguments keep insertion order so URLs are deterministic.
    pub fn resource_url(&self, segment: &str, id: Option<&str>, query: &PageQuery) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(PATH_ROOT).push(segment);
            if let Some(id) = id {
                path.push(id);
            }
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", &self.api_version);
            let paging = [
                ("top", query.top),
                ("skip", query.skip),
                ("maxpagesize", query.max_page_size),
            ];
            for (key, value) in paging {
                if let Some(value) = value {
                    pairs.append_pair(key, &value.to_string());
                }
            }
        }
        url
    }
}
