//! Categorization command implementations

use anyhow::Result;
use expenseguard_core::{Categorizer, MatchMode, PipelineConfig, CATEGORY_KEYWORDS};

pub fn cmd_categorize(
    config: &PipelineConfig,
    mode: Option<MatchMode>,
    descriptions: &[String],
) -> Result<()> {
    let categorizer = Categorizer::new(mode.unwrap_or(config.match_mode));

    for description in descriptions {
        println!(
            "{}  →  {}",
            description,
            categorizer.categorize(description)
        );
    }

    Ok(())
}

pub fn cmd_keywords(config: &PipelineConfig, mode: Option<MatchMode>) -> Result<()> {
    let categorizer = Categorizer::new(mode.unwrap_or(config.match_mode));
    let unreachable = categorizer.unreachable_keywords();

    println!("🏷️  Category keywords ({} mode, first match wins)", categorizer.mode());
    println!();
    for (category, keywords) in CATEGORY_KEYWORDS {
        let listed: Vec<String> = keywords
            .iter()
            .map(|k| {
                if unreachable.contains(&(*category, *k)) {
                    format!("{} (never matches)", k)
                } else {
                    k.to_string()
                }
            })
            .collect();
        println!("   {:<30} {}", category.as_str(), listed.join(", "));
    }

    if !unreachable.is_empty() {
        println!();
        println!(
            "   ⚠️  {} keyword(s) can never match in {} mode",
            unreachable.len(),
            categorizer.mode()
        );
        if categorizer.mode() == MatchMode::Token {
            println!("      Use --mode phrase to match multi-word and punctuated keywords");
        }
    }

    Ok(())
}
