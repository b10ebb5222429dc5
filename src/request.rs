//! Browser-context HTTP client (SPEC_FULL §3, supplementing spec §4.F): runs
//! requests through the page's own `window.fetch`, so they carry the page's
//! cookies, TLS session and any fingerprinting the site can't tell apart
//! from a real navigation.

use std::collections::HashMap;
use std::time::Duration;

use corvid_cdp::browser_protocol::network::EnableParams as NetEnableParams;
use corvid_cdp::js_protocol::runtime::EvaluateParams;

use crate::error::{CdpError, Result};
use crate::handler::network::NetworkLogEntry;
use crate::routing::Routing;

/// One `fetch()` call's inputs. `json` takes precedence over `data` and
/// sets `Content-Type: application/json` unless the caller already set one.
#[derive(Debug, Default, Clone)]
pub struct RequestParams {
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub data: Option<String>,
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

/// What came back, already materialized — by the time `fetch()` returns,
/// the response body has already been read into `text`.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub ok: bool,
    pub url: String,
    pub headers: HashMap<String, String>,
    /// The headers the browser actually put on the wire, read back off the
    /// matching `Network.requestWillBeSent` log entry rather than `fetch`'s
    /// own `Headers` object (which omits cookies and a handful of others the
    /// page isn't allowed to see).
    pub request_headers: HashMap<String, String>,
    /// Cookies the response set, taken from the matching
    /// `Network.responseReceived` entry's `set-cookie` header.
    pub cookies: Vec<String>,
    pub text: String,
}

impl Response {
    pub fn content(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.text).map_err(CdpError::from)
    }

    pub fn raise_for_status(&self) -> Result<()> {
        if self.status_code >= 400 {
            Err(CdpError::NetworkError(format!(
                "request to {} failed with status {}",
                self.url, self.status_code
            )))
        } else {
            Ok(())
        }
    }
}

/// A tab's `request` sub-object: every method runs inside the page, bound to
/// its own `Routing` the way [`crate::element::Element`] is bound to its.
#[derive(Clone)]
pub struct RequestClient {
    routing: Routing,
}

impl RequestClient {
    pub(crate) fn new(routing: Routing) -> Self {
        Self { routing }
    }

    pub async fn get(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("GET", url, params).await
    }

    pub async fn post(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("POST", url, params).await
    }

    pub async fn put(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("PUT", url, params).await
    }

    pub async fn patch(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("PATCH", url, params).await
    }

    pub async fn delete(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("DELETE", url, params).await
    }

    pub async fn head(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("HEAD", url, params).await
    }

    pub async fn options(&self, url: &str, params: RequestParams) -> Result<Response> {
        self.send("OPTIONS", url, params).await
    }

    async fn send(&self, method: &str, url: &str, params: RequestParams) -> Result<Response> {
        let full_url = append_query(url, &params.query);

        let mut headers = params.headers.clone();
        let body = if let Some(json) = &params.json {
            headers
                .entry("Content-Type".to_string())
                .or_insert_with(|| "application/json".to_string());
            Some(serde_json::to_string(json)?)
        } else {
            params.data.clone()
        };

        self.routing.execute(NetEnableParams::default()).await?;
        let target_id = self.routing.target_id().clone();
        crate::handler::set_network_logging(&mut self.routing.handler_tx(), target_id.clone(), true)
            .await;

        let expr = build_fetch_expression(method, &full_url, &headers, body.as_deref());
        let resp = self.routing.execute(EvaluateParams::new(expr)).await?;

        if let Some(details) = resp.result.exception_details {
            return Err(CdpError::NetworkError(format!(
                "fetch({full_url}) threw: {}",
                details.text
            )));
        }

        let value = resp.result.result.value.ok_or_else(|| {
            CdpError::NetworkError(format!("fetch({full_url}) returned no value"))
        })?;
        let mut response = parse_fetch_result(value)?;

        let logs = crate::handler::get_network_logs(
            &mut self.routing.handler_tx(),
            target_id,
            Some(full_url.clone()),
        )
        .await?;
        let (request_headers, cookies) = correlate_network_data(&logs, &full_url);
        response.request_headers = request_headers;
        response.cookies = cookies;

        Ok(response)
    }
}

/// Matches the just-issued fetch's URL against the network log's
/// `requestWillBeSent`/`responseReceived` entries to recover what the page's
/// own `fetch()` result can't see: the wire-level request headers and any
/// `Set-Cookie` the response carried.
fn correlate_network_data(
    logs: &[NetworkLogEntry],
    full_url: &str,
) -> (HashMap<String, String>, Vec<String>) {
    let request_headers = logs
        .iter()
        .rev()
        .find_map(|entry| match entry {
            NetworkLogEntry::RequestWillBeSent(ev) if ev.request.url == full_url => {
                Some(ev.request.headers.clone())
            }
            _ => None,
        })
        .unwrap_or_default();

    let cookies = logs
        .iter()
        .rev()
        .find_map(|entry| match entry {
            NetworkLogEntry::ResponseReceived(ev) if ev.response.url == full_url => ev
                .response
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
                .map(|(_, v)| v.split('\n').map(str::to_string).collect()),
            _ => None,
        })
        .unwrap_or_default();

    (request_headers, cookies)
}

fn append_query(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let mut out = String::from(url);
    out.push(if url.contains('?') { '&' } else { '?' });
    for (i, (k, v)) in query.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&urlencode(k));
        out.push('=');
        out.push_str(&urlencode(v));
    }
    out
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Builds the `fetch(...).then(...)` expression evaluated in the page. All
/// dynamic parts are embedded as JSON literals so the page never sees
/// anything that isn't a well-formed JS value, whatever the caller's input.
fn build_fetch_expression(
    method: &str,
    url: &str,
    headers: &HashMap<String, String>,
    body: Option<&str>,
) -> String {
    let method_lit = serde_json::to_string(method).unwrap();
    let url_lit = serde_json::to_string(url).unwrap();
    let headers_lit = serde_json::to_string(headers).unwrap();
    let body_lit = match body {
        Some(b) => serde_json::to_string(b).unwrap(),
        None => "undefined".to_string(),
    };

    format!(
        "fetch({url_lit}, {{method: {method_lit}, headers: {headers_lit}, body: {body_lit}, \
         credentials: 'include'}}).then(r => r.text().then(text => ({{status: r.status, \
         ok: r.ok, url: r.url, headers: Array.from(r.headers.entries()), text: text}})))"
    )
}

fn parse_fetch_result(value: serde_json::Value) -> Result<Response> {
    let status_code = value
        .get("status")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| CdpError::NetworkError("malformed fetch() result: missing status".into()))?
        as u16;
    let ok = value.get("ok").and_then(|v| v.as_bool()).unwrap_or(status_code < 400);
    let url = value
        .get("url")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let text = value
        .get("text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let mut headers = HashMap::new();
    if let Some(pairs) = value.get("headers").and_then(|v| v.as_array()) {
        for pair in pairs {
            if let Some([k, v]) = pair.as_array().map(|a| [a.first(), a.get(1)]) {
                if let (Some(k), Some(v)) = (k.and_then(|v| v.as_str()), v.and_then(|v| v.as_str())) {
                    headers.insert(k.to_string(), v.to_string());
                }
            }
        }
    }

    Ok(Response {
        status_code,
        ok,
        url,
        headers,
        request_headers: HashMap::new(),
        cookies: Vec::new(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_appended_and_encoded() {
        let url = append_query("https://x.test/a", &[("q".into(), "a b".into())]);
        assert_eq!(url, "https://x.test/a?q=a%20b");
    }

    #[test]
    fn fetch_expression_embeds_json_literals_not_raw_strings() {
        let expr = build_fetch_expression("GET", "https://x.test", &HashMap::new(), None);
        assert!(expr.contains("\"https://x.test\""));
        assert!(expr.contains("body: undefined"));
    }

    #[test]
    fn correlates_request_headers_and_set_cookie_from_network_log() {
        use corvid_cdp::browser_protocol::network::{EventRequestWillBeSent, EventResponseReceived};

        let sent: EventRequestWillBeSent = serde_json::from_value(serde_json::json!({
            "requestId": "1",
            "loaderId": "1",
            "documentUrl": "https://x.test/",
            "request": {"url": "https://x.test/a", "method": "GET", "headers": {"cookie": "s=1"}},
            "timestamp": 0.0,
            "wallTime": 0.0,
            "initiator": {"type": "other"},
        }))
        .unwrap();
        let received: EventResponseReceived = serde_json::from_value(serde_json::json!({
            "requestId": "1",
            "loaderId": "1",
            "timestamp": 0.0,
            "response": {
                "url": "https://x.test/a",
                "status": 200,
                "statusText": "OK",
                "headers": {"set-cookie": "a=b\nc=d"},
                "mimeType": "text/plain",
            },
        }))
        .unwrap();
        let logs = vec![
            NetworkLogEntry::RequestWillBeSent(sent),
            NetworkLogEntry::ResponseReceived(received),
        ];

        let (headers, cookies) = correlate_network_data(&logs, "https://x.test/a");
        assert_eq!(headers.get("cookie").unwrap(), "s=1");
        assert_eq!(cookies, vec!["a=b".to_string(), "c=d".to_string()]);
    }

    #[test]
    fn parses_well_formed_fetch_result() {
        let value = serde_json::json!({
            "status": 200,
            "ok": true,
            "url": "https://x.test/",
            "headers": [["content-type", "text/plain"]],
            "text": "hello",
        });
        let resp = parse_fetch_result(value).unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.headers.get("content-type").unwrap(), "text/plain");
        assert_eq!(resp.text, "hello");
    }
}
