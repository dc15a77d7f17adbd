#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    console_bootstrap::run("config", admin_service::build_app).await
}
