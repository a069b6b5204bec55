use url::Url;

use crate::ApiError;

/// Every URL the client talks to, derived from one configured API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    pub fn parse(base: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base.trim()).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base} cannot be a base url")));
        }
        Ok(Self { base })
    }

    pub fn upload(&self) -> Result<Url, ApiError> {
        self.under_base("upload")
    }

    pub fn start(&self) -> Result<Url, ApiError> {
        self.under_base("start")
    }

    pub fn stream(&self, task_id: &str) -> Result<Url, ApiError> {
        let mut url = self.under_base("stream")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .push(task_id);
        Ok(url)
    }

    /// Resolves a server-supplied download location. Absolute paths keep the
    /// base's scheme, host and port; full URLs are used as given.
    pub fn resolve(&self, location: &str) -> Result<Url, ApiError> {
        self.base
            .join(location)
            .map_err(|err| ApiError::InvalidUrl(format!("{location}: {err}")))
    }

    fn under_base(&self, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }
}
