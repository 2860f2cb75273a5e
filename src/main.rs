use anyhow::Result;
use charla::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
