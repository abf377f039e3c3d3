use super::{Cli, Command, SettingsSource};
use anyhow::{Context, Result};
use log::info;
use shardroute::{
    BulkDocument, ClusterConfig, HttpSettingsProvider, RouterConfig, SettingsProvider,
    ShardRouter, StaticSettingsProvider, routing_hash,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_URL: &str = "http://localhost:9200";

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Shard {
            source,
            index,
            id,
            routing,
        } => {
            let router = build_router(&source)?;
            let shard = match routing {
                Some(routing) => router.shard_number(&index, &id, &routing).await,
                None => router.shard_number_for_id(&index, &id).await,
            }
            .with_context(|| format!("Cannot route document '{}' of index '{}'", id, index))?;
            println!("{}", shard);
        }
        Command::Hash { texts } => {
            for text in texts {
                let hash = routing_hash(&text)?;
                println!("{}\t{}\t0x{:08x}", text, hash, hash as u32);
            }
        }
        Command::Group { source, index } => {
            let router = build_router(&source)?;
            let docs = read_documents().await?;
            info!("Grouping {} documents of index '{}'", docs.len(), index);

            let groups = router
                .group_by_shard(&index, docs)
                .await
                .with_context(|| format!("Cannot group documents of index '{}'", index))?;

            let ids: BTreeMap<u32, Vec<String>> = groups
                .into_iter()
                .map(|(shard, docs)| (shard, docs.into_iter().map(|doc| doc.id).collect()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
    }
    Ok(())
}

fn build_router(source: &SettingsSource) -> Result<ShardRouter> {
    let timeout = source.timeout_ms.map(Duration::from_millis);

    let provider: Arc<dyn SettingsProvider> = match &source.settings_file {
        Some(path) => Arc::new(
            StaticSettingsProvider::from_json_file(path)
                .with_context(|| format!("Cannot load settings from {}", path.display()))?,
        ),
        None => {
            let url = source.url.as_deref().unwrap_or(DEFAULT_URL);
            let mut config = ClusterConfig::from_url(url)?;
            if let Some(timeout) = timeout {
                config = config.request_timeout(timeout);
            }
            info!("Reading index settings from {}", config.to_url());
            Arc::new(HttpSettingsProvider::new(config)?)
        }
    };

    let mut config = RouterConfig::new();
    if let Some(timeout) = timeout {
        config = config.fetch_timeout(timeout);
    }
    Ok(ShardRouter::with_config(provider, config))
}

async fn read_documents() -> Result<Vec<BulkDocument>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut docs = Vec::new();
    while let Some(line) = lines.next_line().await.context("Cannot read stdin")? {
        if let Some(doc) = parse_document_line(&line) {
            docs.push(doc);
        }
    }
    Ok(docs)
}

/// `id` or `id<TAB>routing`; blank lines are skipped.
fn parse_document_line(line: &str) -> Option<BulkDocument> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    match line.split_once('\t') {
        Some((id, routing)) if !routing.is_empty() => {
            Some(BulkDocument::new(id).with_routing(routing))
        }
        Some((id, _)) => Some(BulkDocument::new(id)),
        None => Some(BulkDocument::new(line)),
    }
}
