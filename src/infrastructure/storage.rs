use crate::services::blob_store::S3BlobStore;
use aws_sdk_s3::config::Region;
use std::env;
use std::sync::Arc;
use tracing::info;

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} must be set", name))
}

pub async fn setup_storage() -> anyhow::Result<Arc<S3BlobStore>> {
    let bucket = required("S3_BUCKET")?;
    let region = env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
    let endpoint_url = env::var("S3_ENDPOINT").ok();

    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        endpoint_url.as_deref().unwrap_or("aws"),
        bucket,
        region
    );

    let mut loader = aws_config::from_env().region(Region::new(region));
    if let Some(endpoint) = &endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Ok(access_key), Ok(secret_key)) =
        (env::var("S3_ACCESS_KEY"), env::var("S3_SECRET_KEY"))
    {
        loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ));
    }
    let aws_config = loader.load().await;

    // Path-style addressing keeps MinIO and other S3-compatible endpoints working
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(endpoint_url.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    Ok(Arc::new(S3BlobStore::new(s3_client, bucket)))
}
