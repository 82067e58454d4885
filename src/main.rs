#[tokio::main]
async fn main() {
    if let Err(e) = bug_classifier_lib::run().await {
        tracing::error!(error = %e, "bug-classifier stopped");
        std::process::exit(1);
    }
}
