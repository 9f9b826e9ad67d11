#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = mockband::run().await {
        eprintln!("mockband fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
