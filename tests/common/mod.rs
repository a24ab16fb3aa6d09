//! Loopback IPTV box for end-to-end tests.
//!
//! Serves the catalog at `/iptv/live/1000.json` and HLS media under
//! `/hls/{id}/{file}`:
//! - `1`, `2`: valid manifests whose segments are `SEGMENT_BYTES` long
//! - `404`: every request fails with 404
//! - `empty`: manifest without segments
//! - `rooted`: manifest whose segment lines are `/`-rooted paths
//! - `slow`: manifest that answers after `SLOW_DELAY`
//!
//! A second catalog at `/iptv/slow/1000.json` lists `rooted` and `slow`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const SEGMENT_BYTES: usize = 256 * 1024;
pub const SLOW_CATALOG_PATH: &str = "/iptv/slow/1000.json";
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone)]
struct Stub {
    origin: String,
}

/// Bind on 127.0.0.1 only, so the other 254 neighbours refuse connections.
pub async fn spawn_stub() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let app = Router::new()
        .route("/iptv/live/1000.json", get(catalog))
        .route("/iptv/slow/1000.json", get(slow_catalog))
        .route("/hls/:id/:file", get(media))
        .with_state(Stub {
            origin: format!("http://{addr}"),
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    addr
}

async fn catalog(State(stub): State<Stub>) -> Json<Value> {
    Json(json!({
        "code": 0,
        "data": [
            { "name": "CCTV1 高清", "url": "/hls/1/index.m3u8" },
            { "name": "湖南卫视HD", "url": format!("{}/hls/2/index.m3u8", stub.origin) },
            { "name": "凤凰中文", "url": "/hls/404/index.m3u8" },
            { "name": "CCTV5台", "url": "/hls/empty/index.m3u8" }
        ]
    }))
}

async fn slow_catalog() -> Json<Value> {
    Json(json!({
        "code": 0,
        "data": [
            { "name": "北京卫视", "url": "/hls/rooted/index.m3u8" },
            { "name": "广东体育", "url": "/hls/slow/index.m3u8" }
        ]
    }))
}

async fn media(Path((id, file)): Path<(String, String)>) -> Response {
    match (id.as_str(), file.as_str()) {
        ("404", _) => StatusCode::NOT_FOUND.into_response(),
        ("empty", "index.m3u8") => "#EXTM3U\n#EXT-X-ENDLIST\n".into_response(),
        ("rooted", "index.m3u8") => {
            "#EXTM3U\n#EXTINF:10.0,\n/hls/rooted/seg-rooted-0.ts\n".into_response()
        }
        ("rooted", "seg-rooted-0.ts") => vec![0x47u8; SEGMENT_BYTES].into_response(),
        ("rooted", _) => StatusCode::NOT_FOUND.into_response(),
        ("slow", "index.m3u8") => {
            tokio::time::sleep(SLOW_DELAY).await;
            "#EXTM3U\n#EXTINF:10.0,\nseg-slow-0.ts\n".into_response()
        }
        (_, "index.m3u8") => format!(
            "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.0,\nseg-{id}-0.ts\n#EXTINF:10.0,\nseg-{id}-1.ts\n"
        )
        .into_response(),
        _ => vec![0x47u8; SEGMENT_BYTES].into_response(),
    }
}
