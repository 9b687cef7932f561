use anyhow::Result;
use calinspect::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
