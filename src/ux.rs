use colored::Colorize;

use crate::errors::DenyReason;
use crate::orchestrator::Outcome;
use crate::wire::ContentVariation;

pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Denied { reason, used, limit } => {
            println!("\n{}", "=== DENIED ===".red().bold());
            println!("reason: {}", reason.to_string().red());
            println!("usage:  {used}/{limit}");
            match reason {
                DenyReason::GuestLimitReached => {
                    println!("{}", "Sign up to keep generating.".yellow())
                }
                DenyReason::FreeLimitReached => {
                    println!("{}", "Upgrade your plan for unlimited generations.".yellow())
                }
            }
        }
        Outcome::Generated { result, content_id } => {
            println!("\n{}", "=== GENERATED ===".green().bold());
            println!("{}", result.main_content.title.bold());
            println!("\n{}\n", result.main_content.content);

            if let Some(url) = &result.main_content.image_url {
                println!("{} {}", "[IMAGE]".cyan().bold(), url);
            }
            if let Some(url) = &result.main_content.video_url {
                let tag = if result.main_content.video_concept_only {
                    "[VIDEO concept-only]"
                } else {
                    "[VIDEO]"
                };
                println!("{} {}", tag.magenta().bold(), url);
            }

            print_variations(&result.variations);

            match content_id {
                Some(id) => println!("\nsaved as {id}"),
                None => println!("\n{}", "(not persisted)".yellow()),
            }
        }
    }
}

pub fn print_variations(variations: &[ContentVariation]) {
    if variations.is_empty() {
        return;
    }
    println!("{}", "--- variations ---".bold());
    for (i, v) in variations.iter().enumerate() {
        match &v.title {
            Some(t) => println!("{}. {} — {}", i + 1, t.bold(), v.content),
            None => println!("{}. {}", i + 1, v.content),
        }
    }
}
