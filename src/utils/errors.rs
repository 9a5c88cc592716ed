/// Turn a command error into the message shown to the user
///
/// Strips the `Request Error: Request failed:` style prefixes produced by the
/// API client and replaces transport / rate limit failures with a short hint.
pub fn user_facing_error(error_msg: &str) -> String {
    let lowered = error_msg.to_lowercase();

    if lowered.contains("429") || lowered.contains("rate limit") {
        return "⚠️ **Rate Limited**: the market data API is busy. Please try again in a moment."
            .to_string();
    }
    if lowered.starts_with("request error") || lowered.contains("http request") {
        return "⚠️ **Network Error**: having trouble reaching the market data API. Please try again."
            .to_string();
    }

    let clean = error_msg.trim();
    if clean.is_empty() {
        "❌ An error occurred while executing the command.".to_string()
    } else if clean.starts_with('❌') || clean.starts_with('⚠') {
        clean.to_string()
    } else {
        format!("❌ {}", clean)
    }
}
