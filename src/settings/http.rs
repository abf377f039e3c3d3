use super::{
    ClusterConfig, DEFAULT_NUMBER_OF_SHARDS, DEFAULT_ROUTING_PARTITION_SIZE, IndexSettings,
    SettingsProvider,
};
use crate::core::{Result, RoutingError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{StatusCode, Url};
use serde_json::Value;

/// Settings the router needs, requested as a filter so the cluster sends
/// nothing else.
const SETTINGS_FILTER: &str =
    "index.number_of_shards,index.routing_partition_size,index.number_of_routing_shards";

/// Reads index settings over the cluster's REST API
/// (`GET /{index}/_settings/...`).
///
/// The provider owns its HTTP client; the router never sees the transport.
pub struct HttpSettingsProvider {
    client: reqwest::Client,
    config: ClusterConfig,
    base_url: Url,
}

impl HttpSettingsProvider {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.parsed_url()?;

        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RoutingError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn settings_url(&self, index_name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RoutingError::Config(format!("Base URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .push(index_name)
            .push("_settings")
            .push(SETTINGS_FILTER);
        Ok(url)
    }
}

#[async_trait]
impl SettingsProvider for HttpSettingsProvider {
    async fn fetch_settings(&self, index_name: &str) -> Result<IndexSettings> {
        let url = self.settings_url(index_name)?;
        debug!("Fetching settings for index '{}' from {}", index_name, url);

        let mut request = self.client.get(url);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| RoutingError::unavailable(index_name, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RoutingError::missing(index_name));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Cluster rejected credentials for index '{}': HTTP {}", index_name, status);
            return Err(RoutingError::Config(format!(
                "cluster rejected credentials reading settings of '{}': HTTP {}",
                index_name, status
            )));
        }
        if !status.is_success() {
            return Err(RoutingError::unavailable(
                index_name,
                format!("cluster answered HTTP {}", status),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RoutingError::unavailable(index_name, e))?;

        parse_settings_response(index_name, &body)
    }
}

/// Decodes a `GET /{index}/_settings` body into [`IndexSettings`].
///
/// Accepts both nested (`settings.index.number_of_shards`) and flat
/// (`settings["index.number_of_shards"]`) layouts, and values encoded as JSON
/// strings or numbers. Omitted fields take the documented defaults.
pub fn parse_settings_response(index_name: &str, body: &Value) -> Result<IndexSettings> {
    let entries = body.as_object().ok_or_else(|| {
        RoutingError::unavailable(index_name, "settings response is not a JSON object")
    })?;

    // An alias answers under the concrete index name.
    let entry = match entries.get(index_name) {
        Some(entry) => entry,
        None => match entries.len() {
            0 => return Err(RoutingError::missing(index_name)),
            1 => {
                let (concrete, entry) = entries
                    .iter()
                    .next()
                    .ok_or_else(|| RoutingError::missing(index_name))?;
                debug!("Index name '{}' resolved to '{}'", index_name, concrete);
                entry
            }
            n => {
                return Err(RoutingError::invalid(
                    index_name,
                    format!("name resolves to {} indices, routing is ambiguous", n),
                ));
            }
        },
    };

    let settings = entry
        .get("settings")
        .filter(|settings| settings.is_object())
        .ok_or_else(|| RoutingError::missing(index_name))?;

    let mut result = IndexSettings::default();

    match setting_value(settings, "number_of_shards") {
        Some(value) => result.number_of_shards = parse_int(index_name, "number_of_shards", value)?,
        None => warn!(
            "Index '{}' reported no number_of_shards, assuming {}",
            index_name, DEFAULT_NUMBER_OF_SHARDS
        ),
    }

    match setting_value(settings, "routing_partition_size") {
        Some(value) => {
            result.routing_partition_size = parse_int(index_name, "routing_partition_size", value)?
        }
        None => debug!(
            "Index '{}' has no routing_partition_size, using {}",
            index_name, DEFAULT_ROUTING_PARTITION_SIZE
        ),
    }

    if let Some(value) = setting_value(settings, "number_of_routing_shards") {
        result.routing_num_shards = Some(parse_int(index_name, "number_of_routing_shards", value)?);
    }

    Ok(result)
}

fn setting_value<'a>(settings: &'a Value, name: &str) -> Option<&'a Value> {
    settings
        .get("index")
        .and_then(|index| index.get(name))
        .or_else(|| settings.get(format!("index.{}", name).as_str()))
        .filter(|value| !value.is_null())
}

fn parse_int(index_name: &str, field: &str, value: &Value) -> Result<i32> {
    let parsed = match value {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        RoutingError::invalid(index_name, format!("{} is not an integer: {}", field, value))
    })
}
