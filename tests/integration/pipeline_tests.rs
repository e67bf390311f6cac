//! End-to-end processor tests: mock page in, published fact out

use crate::support::{create_test_config, product_page, RecordingPublisher};
use price_harvest::fetch::RetryingFetcher;
use price_harvest::pipeline::{
    meta_hash, price_measured_event_id, sha256_hex, ParseRequest, RequestProcessor,
};
use price_harvest::ProcessError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn processor_for(publisher: Arc<RecordingPublisher>) -> RequestProcessor {
    let fetcher = Arc::new(RetryingFetcher::new(create_test_config()).unwrap());
    RequestProcessor::new(fetcher, publisher)
}

#[tokio::test]
async fn test_meta_price_is_published_with_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(r#"<meta itemprop="price" content="999">"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let publisher = Arc::new(RecordingPublisher::default());
    let processor = processor_for(Arc::clone(&publisher));
    let item_url = format!("{}/item", mock_server.uri());
    let request = ParseRequest::for_url(format!(" {} ", item_url));

    let fact = processor
        .handle(request, &CancellationToken::new())
        .await
        .unwrap();

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    let (key, published) = &messages[0];

    assert_eq!(published, &fact);
    assert_eq!(published.price, 999);
    assert_eq!(published.currency, "RUB");
    assert_eq!(published.source_url, item_url);
    assert!(!published.correlation_id.is_empty());
    assert_eq!(
        published.event_id,
        price_measured_event_id(&published.correlation_id)
    );
    assert_eq!(published.meta_hash, meta_hash(&item_url, 999, "RUB"));
    assert_eq!(key, &sha256_hex(&item_url));
}

#[tokio::test]
async fn test_json_ld_offer_is_published_under_product_key() {
    let mock_server = MockServer::start().await;
    let json_ld = r#"<script type="application/ld+json">
        {"@context":"https://schema.org","@type":"Product","name":"Kettle",
         "offers":{"@type":"Offer","price":"12.30","priceCurrency":"usd"}}
    </script>"#;

    Mock::given(method("GET"))
        .and(path("/kettle"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page(json_ld)))
        .mount(&mock_server)
        .await;

    let publisher = Arc::new(RecordingPublisher::default());
    let processor = processor_for(Arc::clone(&publisher));
    let request = ParseRequest {
        event_id: "evt-1".to_string(),
        correlation_id: "corr-1".to_string(),
        product_id: "kettle-42".to_string(),
        url: format!("{}/kettle", mock_server.uri()),
    };

    let fact = processor
        .handle(request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(fact.price, 12);
    assert_eq!(fact.currency, "USD");
    assert_eq!(fact.product_id, "kettle-42");
    assert_eq!(fact.correlation_id, "corr-1");
    assert_eq!(fact.event_id, price_measured_event_id("evt-1"));

    let messages = publisher.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "kettle-42");
}

#[tokio::test]
async fn test_page_without_price_publishes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("<meta name=\"x\">")),
        )
        .mount(&mock_server)
        .await;

    let publisher = Arc::new(RecordingPublisher::default());
    let processor = processor_for(Arc::clone(&publisher));
    let request = ParseRequest::for_url(format!("{}/about", mock_server.uri()));

    let result = processor.handle(request, &CancellationToken::new()).await;

    assert!(matches!(result, Err(ProcessError::PriceNotFound)));
    assert!(publisher.messages().is_empty());
}

#[tokio::test]
async fn test_unreachable_page_is_a_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let publisher = Arc::new(RecordingPublisher::default());
    let processor = processor_for(Arc::clone(&publisher));
    let request = ParseRequest::for_url(format!("{}/gone", mock_server.uri()));

    let result = processor.handle(request, &CancellationToken::new()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ProcessError::Fetch(_)));
    assert!(err.to_string().starts_with("fetch: "));
    assert!(publisher.messages().is_empty());
}

#[tokio::test]
async fn test_redirected_page_uses_final_url_as_source() {
    let mock_server = MockServer::start().await;
    let final_url = format!("{}/product/7", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/p/7"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", final_url.as_str()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page(
            r#"<meta property="product:price:amount" content="1 490,50">
               <meta property="product:price:currency" content="руб">"#,
        )))
        .mount(&mock_server)
        .await;

    let publisher = Arc::new(RecordingPublisher::default());
    let processor = processor_for(Arc::clone(&publisher));
    let request = ParseRequest::for_url(format!("{}/p/7", mock_server.uri()));

    let fact = processor
        .handle(request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(fact.price, 1491);
    assert_eq!(fact.currency, "RUB");
    assert_eq!(fact.source_url, final_url);
}

#[tokio::test]
async fn test_cancelled_fetch_publishes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(r#"<meta itemprop="price" content="10">"#))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.request_timeout_ms = 30_000;
    let fetcher = Arc::new(RetryingFetcher::new(config).unwrap());
    let publisher = Arc::new(RecordingPublisher::default());
    let processor = RequestProcessor::new(fetcher, publisher.clone());
    let request = ParseRequest::for_url(format!("{}/slow", mock_server.uri()));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = processor.handle(request, &cancel).await;

    assert!(matches!(result, Err(ProcessError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(publisher.messages().is_empty());
}
