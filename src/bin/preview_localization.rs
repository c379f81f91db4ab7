//! Prints the localized wire body of a sample view-model for each locale in a
//! resource file. Handy for eyeballing translations before a release:
//!
//! ```text
//! cargo run --bin preview -- resources/strings.json
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use viewmodel_wire::{
    InstancePath, LocalizableInt, LocalizableText, LocalizationError, Localized, LocalizedPart,
    LocalizingEncoder, LocalizationStore, ResolveContext, SubstitutionMap,
};

#[derive(Serialize)]
struct PreviewViewModel {
    greeting: LocalizableText,
    item_count: LocalizableInt,
    #[serde(skip)]
    substitutions: SubstitutionMap,
}

impl PreviewViewModel {
    fn sample() -> Self {
        let mut substitutions = SubstitutionMap::new();
        substitutions.insert("count".to_string(), LocalizedPart::number(3));
        Self {
            greeting: LocalizableText::pending("greeting"),
            item_count: LocalizableInt::pending(3),
            substitutions,
        }
    }
}

impl Localized for PreviewViewModel {
    fn type_name(&self) -> &'static str {
        "PreviewViewModel"
    }

    fn localizable_paths(&self) -> Vec<String> {
        vec!["greeting".to_string()]
    }

    fn substitutions(&self) -> Option<&SubstitutionMap> {
        Some(&self.substitutions)
    }

    fn resolve(
        &mut self,
        cx: &ResolveContext<'_>,
        path: &InstancePath,
    ) -> Result<(), LocalizationError> {
        let type_name = self.type_name();
        self.greeting.resolve(cx, type_name, path)?;
        self.item_count.resolve()
    }
}

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viewmodel_wire=info".parse()?),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: preview <resource-file.json>")?;

    info!("Loading localization resources from {}", path);
    let store = LocalizationStore::from_file(&path)?;

    for locale in store.locales() {
        let encoder = LocalizingEncoder::new(&store, locale.clone());
        match encoder.encode(PreviewViewModel::sample()) {
            Ok(body) => {
                println!("--- {} ---", locale);
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Err(e) => {
                println!("--- {} ---", locale);
                println!("encode failed: {}", e);
            }
        }
    }

    Ok(())
}
