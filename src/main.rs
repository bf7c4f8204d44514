#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ad_growth::server::run().await
}
