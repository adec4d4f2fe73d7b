#[tokio::main]
async fn main() {
    if let Err(err) = hr_api::run().await {
        tracing::error!(error = %err, "hr-api failed");
        eprintln!("hr-api failed: {err}");
        std::process::exit(1);
    }
}
