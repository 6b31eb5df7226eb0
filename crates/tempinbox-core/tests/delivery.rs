//! Delivery through decoding and storage.

#![allow(clippy::unwrap_used)]

use tempinbox_core::{DeliveryService, Envelope, InboxConfig, InboxRepository};

const MULTIPART: &str = concat!(
    "From: Alerts <alerts@example.com>\r\n",
    "To: box@example.com\r\n",
    "Subject: =?UTF-8?Q?Build_r=C3=A9sult?=\r\n",
    "Date: Tue, 14 Nov 2023 22:13:20 +0000\r\n",
    "Message-ID: <build-42@example.com>\r\n",
    "Content-Type: multipart/mixed; boundary=\"mix\"\r\n",
    "\r\n",
    "--mix\r\n",
    "Content-Type: text/html; charset=utf-8\r\n",
    "\r\n",
    "<p>All <b>green</b></p>\r\n",
    "--mix\r\n",
    "Content-Type: text/plain; name=\"log.txt\"\r\n",
    "Content-Disposition: attachment; filename=\"log.txt\"\r\n",
    "Content-Transfer-Encoding: base64\r\n",
    "\r\n",
    "b2sK\r\n",
    "--mix--\r\n"
);

async fn service() -> DeliveryService {
    let config = InboxConfig::default();
    let repo = InboxRepository::in_memory(config.retention).await.unwrap();
    DeliveryService::new(&config, repo)
}

#[tokio::test]
async fn test_multipart_delivery_is_listed() {
    let service = service().await;
    let envelope = Envelope::new("alerts@example.com", "box@example.com");

    let email = service.deliver(&envelope, MULTIPART).await.unwrap().email;
    assert_eq!(email.subject, "Build résult");
    assert_eq!(email.body, "All green");
    assert_eq!(email.html_body, "<p>All <b>green</b></p>");
    assert_eq!(email.attachments.len(), 1);
    assert_eq!(email.attachments[0].filename, "log.txt");
    assert_eq!(email.attachments[0].size_bytes, 3);
    assert_eq!(
        email.headers.date.as_deref(),
        Some("Tue, 14 Nov 2023 22:13:20 +0000")
    );

    let summaries = service
        .repository()
        .list_summaries("box@example.com")
        .await
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].has_html);

    let json = serde_json::to_value(&summaries[0]).unwrap();
    assert_eq!(json["attachments"][0]["contentType"], "text/plain");
    assert_eq!(json["attachments"][0]["size"], 3);
    assert_eq!(json["attachments"][0]["data"], "b2sK");
}

#[tokio::test]
async fn test_inboxes_are_separate() {
    let service = service().await;
    let raw = "Subject: hi\r\n\r\nhello";

    service
        .deliver(&Envelope::new("a@example.com", "one@example.com"), raw)
        .await
        .unwrap();
    service
        .deliver(&Envelope::new("a@example.com", "two@example.com"), raw)
        .await
        .unwrap();
    service
        .deliver(&Envelope::new("b@example.com", "two@example.com"), raw)
        .await
        .unwrap();

    let repo = service.repository();
    assert_eq!(repo.count("one@example.com").await.unwrap(), 1);
    assert_eq!(repo.list("two@example.com").await.unwrap().len(), 2);
    assert!(repo.list("three@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_burst_delivery_keeps_every_message() {
    let service = service().await;
    let envelope = Envelope::new("a@example.com", "box@example.com");
    let total = 50;

    let mut keys = Vec::new();
    for n in 0..total {
        let raw = format!("Subject: burst {n}\r\n\r\nbody {n}");
        keys.push(service.deliver(&envelope, &raw).await.unwrap().key);
    }

    let repo = service.repository();
    assert_eq!(repo.count("box@example.com").await.unwrap(), total);

    let listed = repo.list("box@example.com").await.unwrap();
    assert_eq!(listed.len(), total);
    assert_eq!(listed[0].subject, "burst 49");
    assert_eq!(listed[total - 1].subject, "burst 0");

    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
    for key in &keys {
        assert!(repo.get(key).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_garbage_is_still_delivered() {
    let service = service().await;
    let email = service
        .deliver(&Envelope::new("a@example.com", "box@example.com"), "::::\r\n--")
        .await
        .unwrap()
        .email;

    assert_eq!(email.subject, "(No Subject)");
    assert!(email.attachments.is_empty());
}

#[tokio::test]
async fn test_file_backed_repository_persists() {
    let path = std::env::temp_dir().join(format!("tempinbox-test-{}.db", std::process::id()));
    let path_str = path.to_str().unwrap().to_string();
    let config = InboxConfig::default();

    {
        let repo = InboxRepository::new(&path_str, config.retention).await.unwrap();
        let service = DeliveryService::new(&config, repo);
        service
            .deliver(
                &Envelope::new("a@example.com", "box@example.com"),
                "Subject: kept\r\n\r\nbody",
            )
            .await
            .unwrap();
    }

    let reopened = InboxRepository::new(&path_str, config.retention).await.unwrap();
    let listed = reopened.list("box@example.com").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].subject, "kept");

    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
