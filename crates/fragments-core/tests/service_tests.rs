//! End-to-end fragment lifecycle over the durable backend.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use fragments_core::{FragmentError, FragmentService, Listing};
use fragments_store::{Backend, StorageConfig};
use fragments_types::OwnerId;

async fn filesystem_service() -> (FragmentService, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::init(&StorageConfig::filesystem(dir.path()))
        .await
        .unwrap();
    (FragmentService::new(Arc::new(backend)), dir)
}

fn png() -> Bytes {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

#[tokio::test]
async fn lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let owner = OwnerId::derive("user1@email.com");
    let config = StorageConfig::filesystem(dir.path());

    let id = {
        let svc = FragmentService::new(Arc::new(Backend::init(&config).await.unwrap()));
        let f = svc
            .create(&owner, "text/markdown", Bytes::from_static(b"# Title"))
            .await
            .unwrap();
        svc.backend().shutdown().await.unwrap();
        f.id().clone()
    };

    let svc = FragmentService::new(Arc::new(Backend::init(&config).await.unwrap()));
    let listing = svc.list(&owner, false).await.unwrap();
    assert_eq!(listing, Listing::Ids(vec![id.clone()]));

    let html = svc.get_data(&owner, id.as_str(), Some(".html")).await.unwrap();
    assert_eq!(&html.data[..], b"<h1>Title</h1>\n");

    svc.delete(&owner, id.as_str()).await.unwrap();
    assert!(!dir.path().join("data").join(owner.as_str()).join(id.as_str()).exists());
}

#[tokio::test]
async fn image_fragment_converts_to_every_image_type() {
    let (svc, _dir) = filesystem_service().await;
    let owner = OwnerId::derive("images@email.com");
    let f = svc.create(&owner, "image/png", png()).await.unwrap();

    for (ext, expected) in [
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("webp", "image/webp"),
        ("gif", "image/gif"),
    ] {
        let out = svc.get_data(&owner, f.id().as_str(), Some(ext)).await.unwrap();
        assert!(!out.data.is_empty(), "{ext}");
        assert_eq!(out.content_type, expected);
    }

    let err = svc
        .get_data(&owner, f.id().as_str(), Some("txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentError::UnsupportedMediaType(_)));
}

#[tokio::test]
async fn corrupt_image_is_internal() {
    let (svc, _dir) = filesystem_service().await;
    let owner = OwnerId::derive("images@email.com");
    let f = svc
        .create(&owner, "image/jpeg", Bytes::from_static(b"definitely not a jpeg"))
        .await
        .unwrap();
    let err = svc
        .get_data(&owner, f.id().as_str(), Some("png"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);
}
