#[tokio::main]
async fn main() {
    if let Err(e) = sitegen_lib::run().await {
        eprintln!("sitegen: {e}");
        std::process::exit(1);
    }
}
