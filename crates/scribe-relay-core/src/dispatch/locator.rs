use crate::{CoreResult, DispatchError, NewPage, PageHost, PeerHandle};

use std::sync::Arc;

use tracing::{debug, info, instrument};

/// Finds or creates the single application page.
///
/// Resolution runs on every call and is never cached, so a page that was
/// closed and reopened is picked up transparently. Preference order is
/// pinned match, then first match, then a newly created pinned page.
///
/// Locators over the same host serialize on its discovery lock, so
/// overlapping resolutions agree on a single page.
#[derive(Clone)]
pub struct PeerLocator {
    host: Arc<dyn PageHost>,
    url: String,
}

impl PeerLocator {
    /// Locator for pages opened at the canonical `url`.
    pub fn new(host: Arc<dyn PageHost>, url: impl Into<String>) -> Self {
        Self {
            host,
            url: url.into(),
        }
    }

    /// Resolve the application page, creating it when none is open.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn locate(&self) -> CoreResult<PeerHandle> {
        let _discovery = self.host.discovery_lock().lock().await;

        let pages = self
            .host
            .query_pages(&self.url)
            .await
            .map_err(|e| DispatchError::peer_locator(format!("page query failed: {}", e)))?;

        if !pages.is_empty() {
            let pinned = pages.iter().filter(|p| p.pinned).find_map(|p| p.id);
            let chosen = pinned.or_else(|| pages.iter().find_map(|p| p.id));

            return match chosen {
                Some(tab) => {
                    debug!(%tab, pinned = pinned.is_some(), matches = pages.len(), "Application page found");
                    Ok(PeerHandle::new(tab))
                }
                None => Err(DispatchError::peer_locator(
                    "matching pages have no usable identifier",
                )),
            };
        }

        let created = self
            .host
            .create_page(NewPage {
                url: self.url.clone(),
                pinned: true,
                active: false,
            })
            .await
            .map_err(|e| DispatchError::peer_locator(format!("page creation failed: {}", e)))?;

        let tab = created
            .id
            .ok_or_else(|| DispatchError::peer_locator("created page has no usable identifier"))?;

        info!(%tab, "Application page created");

        Ok(PeerHandle::new(tab))
    }
}
