/// Hue bridge REST client: the `Transport` the binary uses.
///
/// Endpoints:
///   POST /api                         → register, returns a username
///   GET  /api/<user>/lights           → all lights by id
///   GET  /api/<user>/lights/<id>      → name + state of one light
///   PUT  /api/<user>/lights/<id>/state → apply a command
///
/// The bridge answers 200 even on failure; errors come back as
/// `[{"error": {"type": N, "address": ..., "description": ...}}]`.

use crate::command::Command;
use crate::state::LightInfo;
use crate::transport::{Transport, TransportError};
use serde::Deserialize;
use std::time::Duration;
use ureq::Agent;

/// "Parameter not modifiable": what the bridge says when a lamp is off.
const ERROR_DEVICE_OFF: u16 = 201;
/// Registration attempted without pressing the link button.
const ERROR_LINK_BUTTON: u16 = 101;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: u16,
    #[serde(default)]
    address: String,
    description: String,
}

#[derive(Clone)]
pub struct Bridge {
    agent: Agent,
    address: String,
    username: String,
}

impl Bridge {
    pub fn new(address: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            agent: new_agent(),
            address: address.into(),
            username: username.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Register a new API user. The bridge's link button must have been
    /// pressed within the last 30 seconds.
    pub fn create_username(address: &str, device_type: &str) -> Result<String, TransportError> {
        log::info!("Registering with bridge at {address} as \"{device_type}\"");
        let body = serde_json::json!({ "devicetype": device_type }).to_string();
        let response = new_agent()
            .post(&format!("http://{address}/api"))
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(http)?
            .body_mut()
            .read_to_string()
            .map_err(http)?;
        parse_username(&response)
    }

    /// Ids of every light the bridge knows, in numeric order.
    pub fn light_ids(&self) -> Result<Vec<String>, TransportError> {
        let body = self.get(&format!("{}/lights", self.base_url()))?;
        parse_light_ids(&body)
    }

    fn base_url(&self) -> String {
        format!("http://{}/api/{}", self.address, self.username)
    }

    fn get(&self, url: &str) -> Result<String, TransportError> {
        self.agent
            .get(url)
            .call()
            .map_err(http)?
            .body_mut()
            .read_to_string()
            .map_err(http)
    }
}

impl Transport for Bridge {
    fn query(&self, fixture: &str) -> Result<LightInfo, TransportError> {
        let body = self.get(&format!("{}/lights/{fixture}", self.base_url()))?;
        parse_light(fixture, &body)
    }

    fn send(&self, fixture: &str, command: &Command) -> Result<(), TransportError> {
        let url = format!("{}/lights/{fixture}/state", self.base_url());
        let payload =
            serde_json::to_string(command).map_err(|e| TransportError::Decode(e.to_string()))?;
        let body = self
            .agent
            .put(&url)
            .header("Content-Type", "application/json")
            .send(payload)
            .map_err(http)?
            .body_mut()
            .read_to_string()
            .map_err(http)?;
        check_response(fixture, &body)
    }
}

fn new_agent() -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build();
    Agent::new_with_config(config)
}

fn http(e: ureq::Error) -> TransportError {
    TransportError::Http(e.to_string())
}

fn decode(e: serde_json::Error) -> TransportError {
    TransportError::Decode(e.to_string())
}

/// Pull every `{"error": ...}` entry out of a response array. Non-array
/// bodies carry no errors.
fn errors_in(value: &serde_json::Value) -> Result<Vec<ApiError>, TransportError> {
    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .filter_map(|item| item.get("error"))
        .map(|e| serde_json::from_value(e.clone()).map_err(decode))
        .collect()
}

/// Turn the first bridge error into a `TransportError`. A device-off error
/// anywhere in the list wins, since it is the one callers can recover from.
fn first_error(fixture: &str, errors: Vec<ApiError>) -> Option<TransportError> {
    if errors.iter().any(|e| e.kind == ERROR_DEVICE_OFF) {
        return Some(TransportError::PoweredOff {
            fixture: fixture.to_string(),
        });
    }
    errors.into_iter().next().map(|e| TransportError::Bridge {
        kind: e.kind,
        address: e.address,
        description: e.description,
    })
}

fn check_response(fixture: &str, body: &str) -> Result<(), TransportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(decode)?;
    match first_error(fixture, errors_in(&value)?) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn parse_light(fixture: &str, body: &str) -> Result<LightInfo, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(decode)?;
    if let Some(e) = first_error(fixture, errors_in(&value)?) {
        return Err(e);
    }
    serde_json::from_value(value).map_err(decode)
}

fn parse_light_ids(body: &str) -> Result<Vec<String>, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(decode)?;
    if let Some(e) = first_error("*", errors_in(&value)?) {
        return Err(e);
    }
    let map = value
        .as_object()
        .ok_or_else(|| TransportError::Decode("expected an object of lights".into()))?;
    let mut ids: Vec<String> = map.keys().cloned().collect();
    ids.sort_by(|a, b| (a.len(), a).cmp(&(b.len(), b)));
    Ok(ids)
}

fn parse_username(body: &str) -> Result<String, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(decode)?;
    let errors = errors_in(&value)?;
    if let Some(e) = errors.into_iter().next() {
        let description = if e.kind == ERROR_LINK_BUTTON {
            "link button not pressed; press it and try again within 30 seconds".to_string()
        } else {
            e.description
        };
        return Err(TransportError::Bridge {
            kind: e.kind,
            address: e.address,
            description,
        });
    }
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .find_map(|item| item.pointer("/success/username")?.as_str())
        })
        .map(String::from)
        .ok_or_else(|| TransportError::Decode("missing username in response".into()))
}
