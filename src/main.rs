#[tokio::main]
async fn main() {
    if let Err(err) = triara::run().await {
        eprintln!("triara failed to start: {err}");
        std::process::exit(1);
    }
}
