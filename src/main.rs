#[tokio::main]
async fn main() {
    let code = queuegate::app::startup::startup().await;
    std::process::exit(code);
}
