use super::{GraphService, ServiceError};
use crate::model::{ArcDetail, ClasspathEntry, GraphSnapshot, NodeDetail, Report, RescopedGraph};
use crate::request::{Reply, Request};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Talks to the analysis backend's REST interface.
#[derive(Debug, Clone)]
pub struct HttpGraphService {
    client: Client,
    base: Url,
}

impl HttpGraphService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base = Url::parse(base_url).map_err(|_| ServiceError::InvalidUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ServiceError::Transport {
                path: base_url.to_string(),
                source,
            })?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds the URL for a request; ids and labels are percent-encoded as path segments.
    pub fn url_for(&self, request: &Request) -> Result<Url, ServiceError> {
        let segments = path_segments(request);
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().map(String::as_str));
        Ok(url)
    }

    async fn get_text(&self, request: &Request) -> Result<String, ServiceError> {
        let url = self.url_for(request)?;
        let path = url.path().to_string();
        debug!(%path, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                path,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| ServiceError::Transport { path, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: &Request) -> Result<T, ServiceError> {
        let body = self.get_text(request).await?;
        serde_json::from_str(&body).map_err(|source| ServiceError::Decode {
            path: self
                .url_for(request)
                .map(|url| url.path().to_string())
                .unwrap_or_default(),
            source,
        })
    }
}

fn path_segments(request: &Request) -> Vec<String> {
    let mut segments = vec!["view".to_string()];
    let rest: Vec<String> = match request {
        Request::ProjectName => vec!["name".into()],
        Request::FullGraph => vec![],
        Request::Classpath => vec!["classpath".into()],
        Request::UnreferencedReport => vec!["unrefReport".into()],
        Request::MissingReport => vec!["missingReport".into()],
        Request::Metrics => vec!["metrics".into()],
        Request::NodeDetail { id } => vec!["node".into(), id.clone()],
        Request::ArcDetail { id } => vec!["arc".into(), id.clone()],
        Request::ListMode { id, mode } => vec![
            "node".into(),
            id.clone(),
            "listmode".into(),
            mode.wire_name().into(),
        ],
        Request::ActiveFilters => vec!["filters".into()],
        Request::ToggleFilter { label } => vec!["filters".into(), label.clone()],
        Request::ImpliedBy { id, enabled } => vec![
            "filters".into(),
            "impliedBy".into(),
            id.clone(),
            enabled.to_string(),
        ],
        Request::Search { text } => vec!["search".into(), text.clone()],
    };
    segments.extend(rest);
    segments
}

impl GraphService for HttpGraphService {
    async fn fetch(&self, request: &Request) -> Result<Reply, ServiceError> {
        let reply = match request {
            Request::ProjectName => Reply::ProjectName(self.get_text(request).await?),
            Request::FullGraph | Request::ToggleFilter { .. } | Request::ImpliedBy { .. } => {
                Reply::Graph(self.get_json::<GraphSnapshot>(request).await?)
            }
            Request::Classpath => {
                Reply::Classpath(self.get_json::<Vec<ClasspathEntry>>(request).await?)
            }
            Request::UnreferencedReport | Request::MissingReport | Request::Metrics => {
                Reply::Report(self.get_json::<Report>(request).await?)
            }
            Request::NodeDetail { id } => {
                let mut detail: NodeDetail = self.get_json(request).await?;
                if detail.id.is_empty() {
                    detail.id = id.clone();
                }
                Reply::NodeDetail(detail)
            }
            Request::ArcDetail { .. } => Reply::ArcDetail(self.get_json::<ArcDetail>(request).await?),
            Request::ListMode { .. } => {
                Reply::Rescoped(self.get_json::<RescopedGraph>(request).await?)
            }
            Request::ActiveFilters => Reply::Filters(self.get_json::<Vec<String>>(request).await?),
            Request::Search { .. } => Reply::Matches(self.get_json::<Vec<String>>(request).await?),
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListMode;

    fn service() -> HttpGraphService {
        HttpGraphService::new("http://localhost:4567", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_full_graph_path() {
        let url = service().url_for(&Request::FullGraph).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4567/view");
    }

    #[test]
    fn test_list_mode_path() {
        let url = service()
            .url_for(&Request::ListMode {
                id: "12".into(),
                mode: ListMode::LeafsCollapsed,
            })
            .unwrap();
        assert_eq!(url.path(), "/view/node/12/listmode/LEAFS_COLLAPSED");
    }

    #[test]
    fn test_labels_are_percent_encoded() {
        let url = service()
            .url_for(&Request::ToggleFilter {
                label: "required by a/b".into(),
            })
            .unwrap();
        assert_eq!(url.path(), "/view/filters/required%20by%20a%2Fb");
    }

    #[test]
    fn test_implied_by_path() {
        let url = service()
            .url_for(&Request::ImpliedBy {
                id: "4".into(),
                enabled: false,
            })
            .unwrap();
        assert_eq!(url.path(), "/view/filters/impliedBy/4/false");
    }

    #[test]
    fn test_base_url_with_prefix() {
        let service =
            HttpGraphService::new("http://example.org/deps/", Duration::from_secs(5)).unwrap();
        let url = service.url_for(&Request::ProjectName).unwrap();
        assert_eq!(url.as_str(), "http://example.org/deps/view/name");
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = HttpGraphService::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ServiceError::InvalidUrl(_))));
    }
}
