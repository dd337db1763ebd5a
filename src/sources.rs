use crate::client::BraviaClient;
use crate::error::Result;
use crate::protocol::{str_field, Request, Service};
use crate::report::Reporting;
use crate::types::SourceEntry;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;

/// Source title to content URI, in catalog order
pub type SourceCatalog = IndexMap<String, String>;

/// Tuner sources whose channel lists are paginated
///
/// Cable, terrestrial and satellite DVB, the ISDB variants (including the
/// Brazilian ISDB-Tb), ATSC and analog.
pub const BROADCAST_SOURCES: &[&str] = &[
    "tv:dvbc",
    "tv:dvbt",
    "tv:dvbs",
    "tv:isdbt",
    "tv:isdbbs",
    "tv:isdbcs",
    "tv:isdbgt",
    "tv:atsct",
    "tv:analog",
];

/// Physical inputs, each listed with a single content query
pub const PHYSICAL_INPUTS: &[&str] = &[
    "extInput:hdmi",
    "extInput:composite",
    "extInput:component",
    "extInput:cec",
];

fn source_id(entry: &Value) -> Option<&str> {
    entry.get("source").and_then(Value::as_str)
}

/// Fold content items into a catalog; later titles overwrite earlier ones
pub(crate) fn fold_catalog<'a>(items: impl IntoIterator<Item = &'a Value>) -> SourceCatalog {
    let mut catalog = SourceCatalog::new();
    for item in items {
        if let (Some(title), Some(uri)) = (str_field(item, "title"), str_field(item, "uri")) {
            catalog.insert(title, uri);
        }
    }
    catalog
}

impl BraviaClient {
    async fn source_list(&self, scheme: &str) -> Vec<Value> {
        let request = Request::new("getSourceList").with_params(json!({ "scheme": scheme }));
        self.first_result(Service::AvContent, &request, Reporting::Report)
            .await
            .ok()
            .and_then(|payload| payload.as_array().cloned())
            .unwrap_or_default()
    }

    async fn content_page(&self, params: Value) -> Result<Vec<Value>> {
        let request = Request::new("getContentList").with_params(params);
        let payload = self
            .first_result(Service::AvContent, &request, Reporting::Report)
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    /// Page through the content list of one tuner source
    ///
    /// Stops at the first empty page or error. Items gathered before an
    /// error are kept.
    pub async fn source_contents(&self, source: &str) -> Vec<Value> {
        let mut contents = Vec::new();
        let mut start_index: i64 = 0;

        loop {
            let params = json!({ "source": source, "stIdx": start_index });
            let page = match self.content_page(params).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::debug!(source, start_index, %error, "Content listing stopped early");
                    break;
                }
            };
            let Some(last) = page.last() else {
                break;
            };

            let next_index = last.get("index").and_then(Value::as_i64);
            contents.extend(page);

            match next_index {
                Some(index) if index >= start_index => start_index = index + 1,
                _ => {
                    tracing::warn!(source, "Content page without a usable index, stopping");
                    break;
                }
            }
        }

        contents
    }

    /// Query the TV for every tuner channel and physical input
    ///
    /// Always goes to the network; see `source_catalog` for the cached view.
    pub async fn build_catalog(&self) -> SourceCatalog {
        let mut items = Vec::new();

        for source in self.source_list("tv").await {
            if let Some(id) = source_id(&source).filter(|id| BROADCAST_SOURCES.contains(id)) {
                items.extend(self.source_contents(id).await);
            }
        }

        for source in self.source_list("extInput").await {
            if source_id(&source).is_some_and(|id| PHYSICAL_INPUTS.contains(&id)) {
                // The source entry is passed back to the TV as returned
                match self.content_page(source).await {
                    Ok(page) => items.extend(page),
                    Err(error) => tracing::debug!(%error, "Skipping external input"),
                }
            }
        }

        let catalog = fold_catalog(&items);
        tracing::debug!(count = catalog.len(), "Built source catalog");
        catalog
    }

    /// Cached source catalog, built on first use
    ///
    /// An empty catalog is never cached, so a TV that was unreachable on the
    /// first attempt is queried again next time.
    pub async fn source_catalog(&self) -> Arc<SourceCatalog> {
        self.sources
            .get_or_refresh(|| async {
                let catalog = self.build_catalog().await;
                (!catalog.is_empty()).then_some(catalog)
            })
            .await
            .unwrap_or_default()
    }

    /// Rebuild the source catalog and replace the cached one
    pub async fn load_source_list(&self) -> Arc<SourceCatalog> {
        self.sources
            .refresh_with(|| async {
                let catalog = self.build_catalog().await;
                (!catalog.is_empty()).then_some(catalog)
            })
            .await
            .unwrap_or_default()
    }

    /// Catalog entries as a list
    pub async fn sources(&self) -> Vec<SourceEntry> {
        self.source_catalog()
            .await
            .iter()
            .map(|(title, uri)| SourceEntry {
                title: title.clone(),
                uri: uri.clone(),
            })
            .collect()
    }

    /// Forget the cached source catalog
    pub async fn invalidate_sources(&self) {
        self.sources.invalidate().await;
    }

    /// Switch to the source with the given title
    ///
    /// Returns `Ok(false)` when no source has that title.
    pub async fn select_source(&self, title: &str) -> Result<bool> {
        let catalog = self.source_catalog().await;
        let Some(uri) = catalog.get(title) else {
            tracing::debug!(source = title, "Unknown source");
            return Ok(false);
        };
        self.play_content(uri).await?;
        Ok(true)
    }
}
