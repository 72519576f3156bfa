#[tokio::main]
async fn main() -> anyhow::Result<()> {
    post_factory_lib::run().await
}
