#[tokio::main]
async fn main() {
    if let Err(err) = rightnow_lib::run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
