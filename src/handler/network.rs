//! Network Log Store (spec §4.K): a passive, append-only record of traffic
//! events kept per target while `Network.enable` is active. Bodies are
//! never memoized (spec §9 Open Questions — "likely correct... bodies can
//! be large and expire server-side"); `get_response_body` always
//! round-trips to `Network.getResponseBody`.

use std::collections::VecDeque;

use corvid_cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
};

/// One recorded lifecycle event for a single network request.
#[derive(Debug, Clone)]
pub enum NetworkLogEntry {
    RequestWillBeSent(EventRequestWillBeSent),
    ResponseReceived(EventResponseReceived),
    LoadingFinished(EventLoadingFinished),
    LoadingFailed(EventLoadingFailed),
}

impl NetworkLogEntry {
    pub fn request_id(&self) -> &str {
        match self {
            NetworkLogEntry::RequestWillBeSent(e) => &e.request_id.0,
            NetworkLogEntry::ResponseReceived(e) => &e.request_id.0,
            NetworkLogEntry::LoadingFinished(e) => &e.request_id.0,
            NetworkLogEntry::LoadingFailed(e) => &e.request_id.0,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            NetworkLogEntry::RequestWillBeSent(e) => Some(&e.request.url),
            NetworkLogEntry::ResponseReceived(e) => Some(&e.response.url),
            _ => None,
        }
    }
}

/// Caps how much history one target's ring keeps, so a long-lived page with
/// heavy traffic doesn't grow this without bound.
const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug)]
pub(crate) struct NetworkLogStore {
    enabled: bool,
    entries: VecDeque<NetworkLogEntry>,
    capacity: usize,
}

impl NetworkLogStore {
    pub fn new() -> Self {
        Self {
            enabled: false,
            entries: VecDeque::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn push(&mut self, entry: NetworkLogEntry) {
        if !self.enabled {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Returns every entry whose URL contains `filter`, or every entry if
    /// `filter` is `None`.
    pub fn filter(&self, filter: Option<&str>) -> Vec<&NetworkLogEntry> {
        self.entries
            .iter()
            .filter(|e| match (filter, e.url()) {
                (Some(f), Some(url)) => url.contains(f),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_cdp::browser_protocol::network::{NetResponse, RequestId};
    use std::collections::HashMap;

    fn response_entry(url: &str) -> NetworkLogEntry {
        NetworkLogEntry::ResponseReceived(EventResponseReceived {
            request_id: RequestId("1".into()),
            loader_id: corvid_cdp::browser_protocol::network::LoaderId("L1".into()),
            timestamp: 0.0,
            r#type: None,
            response: NetResponse {
                url: url.to_string(),
                status: 200,
                status_text: "OK".into(),
                headers: HashMap::new(),
                mime_type: "text/html".into(),
                request_headers: None,
            },
            frame_id: None,
        })
    }

    #[test]
    fn disabled_store_drops_entries() {
        let mut store = NetworkLogStore::new();
        store.push(response_entry("https://example.com/a"));
        assert!(store.filter(None).is_empty());
    }

    #[test]
    fn filters_by_url_substring() {
        let mut store = NetworkLogStore::new();
        store.set_enabled(true);
        store.push(response_entry("https://example.com/a"));
        store.push(response_entry("https://example.com/b"));
        assert_eq!(store.filter(Some("/a")).len(), 1);
        assert_eq!(store.filter(None).len(), 2);
    }
}
