use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use postforge::cli::Args;
use postforge::config::Config;
use postforge::constraints::AdvancedOptions;
use postforge::media::{ConceptOnlyVideoGenerator, OpenAiImageGenerator};
use postforge::orchestrator::Orchestrator;
use postforge::provider::{make_provider, ProviderKind};
use postforge::store::InMemoryContentStore;
use postforge::usage::InMemoryUsageStore;
use postforge::wire::{Caller, GenerationRequest, SubscriptionStatus};
use postforge::ux;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut cfg = Config {
        provider_timeout_secs: args.timeout_secs,
        ..Config::default()
    };
    if args.save_artifacts {
        cfg.artifacts_root = Some(".postforge".into());
    }

    let usage_store = Arc::new(InMemoryUsageStore::new(cfg.reset_period_days));
    let content_store = Arc::new(InMemoryContentStore::new());

    let mut orchestrator =
        Orchestrator::new(cfg.clone(), usage_store, content_store);

    // Wire up whichever adapters have credentials; the selected one must be
    // present, the other is optional.
    for kind in [ProviderKind::OpenAi, ProviderKind::Anthropic] {
        match make_provider(kind, &cfg) {
            Ok(provider) => {
                if kind == ProviderKind::OpenAi {
                    orchestrator = orchestrator.with_video_generator(Arc::new(
                        ConceptOnlyVideoGenerator::new(
                            provider.clone(),
                            cfg.video_placeholder_url.clone(),
                        ),
                    ));
                }
                orchestrator = orchestrator.with_provider(provider);
            }
            Err(e) if kind == args.provider => return Err(e.into()),
            Err(_) => {}
        }
    }
    if let Ok(images) = OpenAiImageGenerator::from_env(&cfg) {
        orchestrator = orchestrator.with_image_generator(Arc::new(images));
    }

    let caller = match &args.user {
        Some(id) => Caller::User {
            id: id.clone(),
            status: if args.premium {
                SubscriptionStatus::Active
            } else {
                SubscriptionStatus::Free
            },
        },
        None => Caller::Guest { session_id: Uuid::new_v4().to_string() },
    };

    let request = GenerationRequest {
        topic: args.topic,
        platform: args.platform,
        content_type: args.content_type,
        audience: args.audience,
        keywords: args.keywords,
        options: AdvancedOptions {
            creativity: args.creativity,
            max_length: args.max_length,
            include_emojis: !args.no_emojis,
            include_cta: !args.no_cta,
            include_hashtags: !args.no_hashtags,
            custom_hashtags: args.hashtags,
            avoid_words: args.avoid,
            style: args.style,
            provider: args.provider,
        },
        caller,
    };

    let outcome = orchestrator.generate(request).await?;
    ux::print_outcome(&outcome);

    Ok(())
}
