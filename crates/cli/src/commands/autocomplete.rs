use clap::ValueEnum;
use serde::Serialize;

use skillrank_core::config::LoadOptions;
use skillrank_core::errors::ApplicationError;
use skillrank_core::proximity::{rank_by_proximity, Named};

use crate::commands::{load_catalog, load_config, runtime, to_data, CommandResult};

const COMMAND: &str = "autocomplete";

/// Which part of the catalog to search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    #[default]
    Resources,
    Tags,
    Categories,
}

#[derive(Debug, Serialize)]
struct Suggestion {
    id: u32,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

pub fn run(options: LoadOptions, query: &str, kind: CatalogKind) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    runtime.block_on(async {
        let catalog = match load_catalog(COMMAND, &config).await {
            Ok(catalog) => catalog,
            Err(failure) => return failure,
        };

        let candidates: Vec<Suggestion> = match kind {
            CatalogKind::Resources => catalog
                .available_resources()
                .await
                .iter()
                .map(|resource| suggestion(resource.id().get(), resource))
                .collect(),
            CatalogKind::Tags => catalog
                .tags()
                .await
                .iter()
                .map(|tag| suggestion(tag.id().get(), tag))
                .collect(),
            CatalogKind::Categories => catalog
                .categories()
                .await
                .iter()
                .map(|category| suggestion(category.id().get(), category))
                .collect(),
        };

        let ranked = match rank_by_proximity(candidates, query) {
            Ok(ranked) => ranked,
            Err(error) => {
                return CommandResult::from_application_error(COMMAND, ApplicationError::from(error))
            }
        };
        let shown: Vec<Suggestion> =
            ranked.into_iter().take(config.ranking.autocomplete_limit).collect();

        let data = match to_data(COMMAND, &shown) {
            Ok(data) => data,
            Err(failure) => return failure,
        };
        CommandResult::success_with_data(
            COMMAND,
            format!("{} suggestions for `{}`", shown.len(), query.trim()),
            Some(data),
        )
    })
}

fn suggestion<T: Named + ?Sized>(id: u32, item: &T) -> Suggestion {
    Suggestion {
        id,
        name: item.name().to_string(),
        description: item.secondary_text().map(str::to_string),
    }
}

impl Named for Suggestion {
    fn name(&self) -> &str {
        &self.name
    }

    fn secondary_text(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
