fn main() {
    if let Err(e) = chat_companion::run() {
        tracing::error!(error = %e, "chat-companion failed");
        eprintln!("chat-companion: {e:#}");
        std::process::exit(1);
    }
}
