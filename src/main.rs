use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    research_assistant::infra::logging::init();
    research_assistant::cli::run().await
}
