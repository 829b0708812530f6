#[tokio::main]
async fn main() -> std::io::Result<()> {
    quizbank_lib::run().await
}
