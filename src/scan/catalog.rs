//! Channel catalog enumeration and name normalization
//!
//! Endpoints answer `/iptv/live/1000.json` with
//! `{"data": [{"name": "CCTV1 高清", "url": "/tsfile/live/0001_1.m3u8"}, …]}`.
//! Both fields may be absent; they default to the empty string.

use std::borrow::Cow;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{LiveEndpoint, ProbeError, StreamEntry};
use crate::http_client::ScanClient;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static QUALITY: Lazy<Regex> = Lazy::new(|| Regex::new("高清|标清|超清|HD").expect("valid regex"));
static CCTV_STATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"CCTV(\d+)台").expect("valid regex"));

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    data: Vec<Descriptor>,
}

#[derive(Debug, Default, Deserialize)]
struct Descriptor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

/// Fetch and parse the catalog of a live endpoint.
///
/// The stage runner drops the error, so a broken endpoint simply
/// contributes no streams.
pub async fn enumerate(
    client: &ScanClient,
    endpoint: &LiveEndpoint,
    timeout: Duration,
) -> Result<Vec<StreamEntry>, ProbeError> {
    let response = client.get(&endpoint.catalog_url(), timeout).await?;
    let body = response.bytes().await?;
    parse_catalog(&body, &endpoint.origin())
}

/// Parse a catalog body, normalizing names and resolving URLs against `origin`.
pub fn parse_catalog(body: &[u8], origin: &str) -> Result<Vec<StreamEntry>, ProbeError> {
    let catalog: Catalog = serde_json::from_slice(body)?;
    Ok(catalog
        .data
        .into_iter()
        .map(|d| StreamEntry::new(normalize_name(&d.name), resolve_stream_url(origin, &d.url)))
        .collect())
}

/// Canonical channel name: no whitespace, no quality markers, and
/// `CCTV<N>台` collapsed to `CCTV<N>`.
///
/// Applied until nothing changes, so the result is a fixed point.
pub fn normalize_name(raw: &str) -> String {
    let mut name = raw.to_string();
    loop {
        let next = normalize_once(&name);
        if next == name {
            return name;
        }
        name = next;
    }
}

fn normalize_once(name: &str) -> String {
    let name = WHITESPACE.replace_all(name, "");
    let name = QUALITY.replace_all(&name, "");
    CCTV_STATION.replace_all(&name, "CCTV$1").into_owned()
}

/// Absolute URLs of any scheme pass through; anything else hangs off the
/// endpoint origin.
pub fn resolve_stream_url<'a>(origin: &str, raw: &'a str) -> Cow<'a, str> {
    if Url::parse(raw).is_ok() {
        Cow::Borrowed(raw)
    } else if raw.starts_with('/') {
        Cow::Owned(format!("{origin}{raw}"))
    } else {
        Cow::Owned(format!("{origin}/{raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://10.0.0.1:9901";

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize_name("CCTV5高清台"), "CCTV5");
        assert_eq!(normalize_name("湖南卫视HD"), "湖南卫视");
        assert_eq!(normalize_name("CCTV13台"), "CCTV13");
        assert_eq!(normalize_name(" CCTV 1 超清 "), "CCTV1");
        assert_eq!(normalize_name("北京卫视 标清"), "北京卫视");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["CCTV5高清台", "湖南卫视HD", "高高清清", "CCTV5台台", "CCTV-4 中文国际", ""] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "not a fixed point for {raw:?}");
        }
    }

    #[test]
    fn test_resolve_relative_url() {
        assert_eq!(
            resolve_stream_url(ORIGIN, "/iptv/live/5.m3u8"),
            "http://10.0.0.1:9901/iptv/live/5.m3u8"
        );
        assert_eq!(
            resolve_stream_url(ORIGIN, "tsfile/live/0001_1.m3u8"),
            "http://10.0.0.1:9901/tsfile/live/0001_1.m3u8"
        );
    }

    #[test]
    fn test_resolve_absolute_url_unchanged() {
        let raw = "https://cdn.example.com/live/5.m3u8";
        assert!(matches!(resolve_stream_url(ORIGIN, raw), Cow::Borrowed(s) if s == raw));
    }

    #[test]
    fn test_resolve_keeps_non_http_schemes() {
        for raw in ["rtp://239.1.1.1:5000", "udp://@239.3.1.1:8000", "rtsp://10.0.0.9/ch1"] {
            assert_eq!(resolve_stream_url(ORIGIN, raw), raw);
        }
    }

    #[test]
    fn test_parse_catalog() {
        let body = r#"{"code":0,"data":[
            {"name":"CCTV1 高清","url":"/tsfile/live/0001_1.m3u8","typeid":1},
            {"name":"湖南卫视HD","url":"http://1.2.3.4:80/hn.m3u8"}
        ]}"#;
        let entries = parse_catalog(body.as_bytes(), ORIGIN).unwrap();
        assert_eq!(
            entries,
            vec![
                StreamEntry::new("CCTV1", "http://10.0.0.1:9901/tsfile/live/0001_1.m3u8"),
                StreamEntry::new("湖南卫视", "http://1.2.3.4:80/hn.m3u8"),
            ]
        );
    }

    #[test]
    fn test_parse_catalog_missing_fields_default_empty() {
        let body = r#"{"data":[{"url":"/a.m3u8"},{"name":"CCTV2"}]}"#;
        let entries = parse_catalog(body.as_bytes(), ORIGIN).unwrap();
        assert_eq!(entries[0], StreamEntry::new("", "http://10.0.0.1:9901/a.m3u8"));
        assert_eq!(entries[1], StreamEntry::new("CCTV2", "http://10.0.0.1:9901/"));
    }

    #[test]
    fn test_parse_catalog_without_data() {
        assert!(parse_catalog(b"{}", ORIGIN).unwrap().is_empty());
    }

    #[test]
    fn test_parse_catalog_malformed() {
        let err = parse_catalog(b"<html>404</html>", ORIGIN).unwrap_err();
        assert_eq!(err.kind(), "catalog");
        assert!(parse_catalog(br#"{"data":"nope"}"#, ORIGIN).is_err());
    }
}
