#[tokio::main]
async fn main() {
    if let Err(e) = sitesearch_server::run().await {
        log::error!(target: "sitesearch", "Server failed: {}", e);
        eprintln!("sitesearch: {}", e);
        std::process::exit(1);
    }
}
