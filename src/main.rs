#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chat_proxy::start_server().await
}
