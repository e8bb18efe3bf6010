use clap::Parser;

// CLI argument structure; every knob can also come from the environment,
// which is how deployments actually set them (.env via dotenvy).
#[derive(Parser, Debug, Clone)]
#[command(name = "scribe-gateway")]
#[command(about = "Rate-limited streaming gateway for an AI writing assistant")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5002)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value_t = 100)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value_t = 3600)]
    pub rate_window: u64,

    // Upstream API key (required)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    // OpenAI-compatible upstream base URL
    #[arg(
        long,
        env = "UPSTREAM_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta/openai"
    )]
    pub upstream_url: String,

    // Model name sent upstream
    #[arg(long, env = "UPSTREAM_MODEL", default_value = "gemini-2.0-flash-exp")]
    pub model: String,
}
