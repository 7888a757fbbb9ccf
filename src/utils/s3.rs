use aws_config::BehaviorVersion;
use aws_config::ConfigLoader;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;

/// Client for `region`; credentials come from the usual AWS provider chain.
pub async fn create_s3_client(region: &str) -> S3Client {
    let aws_config = ConfigLoader::default()
        .region(Region::new(region.to_string()))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await;

    S3Client::new(&aws_config)
}
