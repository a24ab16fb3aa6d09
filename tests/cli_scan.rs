//! Integration test for `tvscan scan` against a loopback IPTV stub.

#![allow(deprecated)] // cargo_bin deprecation — replacement not yet stable

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_writes_ranked_listing() {
    let addr = common::spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let output = dir.path().join("itvlist.txt");
    std::fs::write(&config, "[timeouts]\nprobe_secs = 1.0\n").unwrap();

    let args = vec![
        "scan".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--seed".to_string(),
        format!("http://{addr}"),
        "--output".to_string(),
        output.display().to_string(),
        "--floor".to_string(),
        "0".to_string(),
    ];

    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("tvscan")
            .expect("binary 'tvscan' should be built")
            .args(&args)
            .timeout(std::time::Duration::from_secs(60))
            .assert()
            .success()
            .stdout(predicate::str::contains("Summary:"))
            .stdout(predicate::str::contains("Discovery:     1/255 ok"))
            .stdout(predicate::str::contains("Saved 2 entries"));
    })
    .await
    .unwrap();

    let listing = std::fs::read_to_string(&output).unwrap();
    let origin = format!("http://{addr}");
    assert_eq!(
        listing,
        format!(
            "CCTV频道,#genre#\nCCTV1,{origin}/hls/1/index.m3u8\n\n\
             卫视频道,#genre#\n湖南卫视,{origin}/hls/2/index.m3u8\n\n\
             其他频道,#genre#\n\n"
        )
    );
}
