//! Consumer integration tests over line-delimited input

use crate::support::{create_test_config, product_page, RecordingPublisher};
use price_harvest::fetch::RetryingFetcher;
use price_harvest::pipeline::{
    ConsumerStats, JsonLinesPublisher, Publisher, RequestConsumer, RequestProcessor,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_pages(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(r#"<meta itemprop="price" content="100">"#)),
        )
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><span class=\"price\">2 500 ₽</span></body></html>",
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/none"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nothing</html>"))
        .mount(mock_server)
        .await;
}

fn consumer_for(publisher: Arc<dyn Publisher>) -> RequestConsumer {
    let fetcher = Arc::new(RetryingFetcher::new(create_test_config()).unwrap());
    RequestConsumer::new(Arc::new(RequestProcessor::new(fetcher, publisher)))
}

#[tokio::test]
async fn test_consumer_counts_every_outcome() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server).await;

    let input = format!(
        "{{\"url\":\"{uri}/one\",\"product_id\":\"p-1\"}}\n\
         \n\
         not json at all\n\
         {{\"url\":\"{uri}/two\"}}\n\
         {{\"url\":\"{uri}/none\"}}\n\
         {{\"url\":\"   \"}}\n",
        uri = mock_server.uri()
    );

    let publisher = Arc::new(RecordingPublisher::default());
    let consumer = consumer_for(publisher.clone());

    let stats = consumer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        stats,
        ConsumerStats {
            received: 4,
            published: 2,
            failed: 2,
            cancelled: 0,
            malformed: 1,
        }
    );

    let mut prices: Vec<(i64, String)> = publisher
        .messages()
        .into_iter()
        .map(|(_, fact)| (fact.price, fact.currency))
        .collect();
    prices.sort();
    assert_eq!(
        prices,
        vec![(100, "RUB".to_string()), (2500, "RUB".to_string())]
    );
}

#[tokio::test]
async fn test_consumer_writes_keyed_lines() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server).await;

    let input = format!(
        "{{\"url\":\"{}/one\",\"product_id\":\"p-1\",\"correlation_id\":\"c-1\"}}\n",
        mock_server.uri()
    );

    let sink = Arc::new(JsonLinesPublisher::new(Vec::new()));
    let consumer = consumer_for(sink.clone());

    let stats = consumer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.published, 1);

    drop(consumer);
    let sink = Arc::try_unwrap(sink).ok().expect("consumer released the sink");
    let output = String::from_utf8(sink.into_inner()).unwrap();

    let (key, payload) = output.trim_end().split_once('\t').unwrap();
    assert_eq!(key, "p-1");
    let fact: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(fact["price"], 100);
    assert_eq!(fact["currency"], "RUB");
    assert_eq!(fact["correlation_id"], "c-1");
}

#[tokio::test]
async fn test_consumer_stops_on_cancellation() {
    let publisher = Arc::new(RecordingPublisher::default());
    let consumer = consumer_for(publisher.clone());

    // The writer half stays open so the reader never reaches EOF
    let (_writer, reader) = tokio::io::duplex(64);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let stats = tokio::time::timeout(
        Duration::from_secs(5),
        consumer.run(BufReader::new(reader), cancel),
    )
    .await
    .expect("consumer returned after cancellation")
    .unwrap();

    assert_eq!(stats, ConsumerStats::default());
    assert!(publisher.messages().is_empty());
}
