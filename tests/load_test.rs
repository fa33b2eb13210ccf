//! Load testing for the precompressor.

use std::collections::HashSet;
use std::time::{Duration, Instant};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_single_items_all_relayed() {
    // 1. Setup mock storage and precompressor
    let downstream = common::start_mock_downstream(200).await;
    let precompressor = common::start_precompressor(&downstream.endpoint()).await;

    // 2. Run load
    let concurrency = 20;
    let requests_per_task = 10;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut handles = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        let base = precompressor.url("");
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for i in 0..requests_per_task {
                let body = serde_json::json!({
                    "body": format!("<html><body><p>post {task}-{i}</p></body></html>"),
                    "blog": format!("blog-{task}"),
                    "timestamp": i,
                });
                let res = client
                    .post(format!("{}/item-{}-{}", base, task, i))
                    .json(&body)
                    .send()
                    .await;
                if matches!(res, Ok(ref r) if r.status() == 200) {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut acknowledged = 0;
    for handle in handles {
        acknowledged += handle.await.unwrap();
    }
    let ack_elapsed = start.elapsed();

    // 3. Every acknowledged item eventually reaches storage exactly once
    assert_eq!(acknowledged, total_requests);
    assert!(
        downstream.wait_for(total_requests, Duration::from_secs(10)).await,
        "only {} of {} items relayed",
        downstream.count(),
        total_requests
    );

    let paths: HashSet<String> = downstream.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths.len(), total_requests);
    assert!(paths.contains("/item-0-0"));
    assert!(paths.contains(&format!("/item-{}-{}", concurrency - 1, requests_per_task - 1)));

    println!(
        "Acknowledged {} requests in {:?} ({:.0} req/s)",
        total_requests,
        ack_elapsed,
        total_requests as f64 / ack_elapsed.as_secs_f64()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_and_singles_interleave() {
    let downstream = common::start_mock_downstream(200).await;
    let precompressor = common::start_precompressor(&downstream.endpoint()).await;
    let client = common::client();

    let mut handles = Vec::new();
    for n in 0..10 {
        let client = client.clone();
        let batch_url = precompressor.url("/batch");
        let item_url = precompressor.url(&format!("/solo-{}", n));
        handles.push(tokio::spawn(async move {
            let batch = serde_json::json!({
                format!("batch-{n}-a"): {"body": "<p>a</p>", "blog": "b", "timestamp": n},
                format!("batch-{n}-b"): {"body": "<p>b</p>", "blog": "b", "timestamp": n},
            });
            let single = serde_json::json!({"body": "<p>solo</p>", "blog": "s", "timestamp": n});

            let (batch_res, single_res) = tokio::join!(
                client.post(&batch_url).json(&batch).send(),
                client.post(&item_url).json(&single).send(),
            );
            (batch_res.unwrap().status(), single_res.unwrap().status())
        }));
    }

    for handle in handles {
        let (batch_status, single_status) = handle.await.unwrap();
        assert_eq!(batch_status, 200);
        assert_eq!(single_status, 200);
    }

    // 10 batch requests + 10 single-item requests
    assert!(downstream.wait_for(20, Duration::from_secs(10)).await);
    let batches = downstream
        .requests()
        .into_iter()
        .filter(|r| r.path == "/batch")
        .count();
    assert_eq!(batches, 10);
}
