use gloo_net::http::Request;
use wasm_bindgen_futures::spawn_local;

use super::platform::Poster;
use crate::effects::address::{AddressFetcher, AddressProvider};
use crate::error::EffectError;
use crate::events::Event;

/// Fetches provider bodies with `fetch` and posts them back as events.
pub struct HttpFetcher {
    poster: Poster,
}

impl HttpFetcher {
    pub fn new(poster: Poster) -> Self {
        Self { poster }
    }
}

impl AddressFetcher for HttpFetcher {
    fn fetch(&mut self, provider: AddressProvider) {
        let poster = self.poster.clone();
        spawn_local(async move {
            let body = fetch_text(provider.url()).await;
            poster.post(Event::AddressFetched { provider, body });
        });
    }
}

async fn fetch_text(url: &str) -> Result<String, EffectError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| EffectError::LookupFailed(format!("{url}: {e}")))?;
    if !resp.ok() {
        return Err(EffectError::LookupFailed(format!("{url}: status {}", resp.status())));
    }
    resp.text()
        .await
        .map_err(|e| EffectError::LookupFailed(format!("{url}: {e}")))
}
