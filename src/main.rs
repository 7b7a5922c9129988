#[actix_web::main]
async fn main() {
    if let Err(err) = analyst_copilot_lib::run().await {
        eprintln!("analyst-copilot: {err}");
        std::process::exit(1);
    }
}
