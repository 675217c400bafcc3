use clap::Parser;

use crate::constraints::{ContentStyle, ContentType, Platform};
use crate::provider::ProviderKind;

#[derive(Parser, Debug)]
#[command(name = "postforge", version)]
pub struct Args {
    /// What the post should be about.
    #[arg(long)]
    pub topic: String,

    #[arg(long, value_enum, default_value = "twitter")]
    pub platform: Platform,

    #[arg(long, value_enum, default_value = "text-only")]
    pub content_type: ContentType,

    #[arg(long, default_value = "general audience")]
    pub audience: String,

    #[arg(long)]
    pub keywords: Option<String>,

    #[arg(long, value_enum, default_value = "openai")]
    pub provider: ProviderKind,

    #[arg(long, value_enum, default_value = "balanced")]
    pub style: ContentStyle,

    #[arg(long, default_value_t = 0.7)]
    pub creativity: f32,

    #[arg(long, default_value_t = 2000)]
    pub max_length: usize,

    #[arg(long, default_value_t = false)]
    pub no_emojis: bool,

    #[arg(long, default_value_t = false)]
    pub no_cta: bool,

    #[arg(long, default_value_t = false)]
    pub no_hashtags: bool,

    /// Required hashtag, repeatable.
    #[arg(long = "hashtag")]
    pub hashtags: Vec<String>,

    /// Forbidden word, repeatable.
    #[arg(long = "avoid")]
    pub avoid: Vec<String>,

    /// Run as this authenticated user id instead of a guest session.
    #[arg(long)]
    pub user: Option<String>,

    /// Treat the caller as an active subscriber (premium models, no quota).
    #[arg(long, default_value_t = false)]
    pub premium: bool,

    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Save prompts and raw completions under .postforge/.
    #[arg(long, default_value_t = false)]
    pub save_artifacts: bool,
}
