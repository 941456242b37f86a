use image::{DynamicImage, ImageFormat, RgbImage};
use intellibot_common::IntellibotError;
use intellibot_web::ImageFetcher;
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn decodes_and_caches_by_url() {
    let server = MockServer::start().await;
    let png = tiny_png(4, 2);
    Mock::given(method("GET"))
        .and(path("/thumb.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/thumb.png", server.uri());
    let mut fetcher = ImageFetcher::new(Duration::from_secs(5), true).unwrap();

    let first = fetcher.fetch(&url).await.unwrap();
    assert_eq!((first.width, first.height), (4, 2));
    assert_eq!(first.format.as_deref(), Some("png"));
    assert_eq!(first.byte_len, png.len());

    let second = fetcher.fetch(&url).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fetcher.cached(), 1);
}

#[tokio::test]
async fn without_cache_every_render_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thumb.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tiny_png(1, 1)))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/thumb.png", server.uri());
    let mut fetcher = ImageFetcher::new(Duration::from_secs(5), false).unwrap();
    fetcher.fetch(&url).await.unwrap();
    fetcher.fetch(&url).await.unwrap();
    assert_eq!(fetcher.cached(), 0);
}

#[tokio::test]
async fn non_image_content_is_a_warning_not_a_panic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/decoy.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>decoy</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/decoy.jpg", server.uri());
    let mut fetcher = ImageFetcher::new(Duration::from_secs(5), true).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, IntellibotError::Image(_)));

    // failures are not cached
    assert!(fetcher.fetch(&url).await.is_err());
    assert_eq!(fetcher.cached(), 0);
}

#[tokio::test]
async fn slow_images_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(tiny_png(1, 1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/slow.png", server.uri());
    let mut fetcher = ImageFetcher::new(Duration::from_millis(50), true).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, IntellibotError::Image(_)));
}
