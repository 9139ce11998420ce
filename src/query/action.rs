//! The backend operations a request can name, and how each maps onto an HTTP call.

use super::QueryError;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use strum::{Display, IntoStaticStr};
use url::Url;

/// A backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// `POST /{index}/_search`
    Search,

    /// `POST /{index}/_count`
    Count,

    /// `GET /{index}/_doc/{id}`, with the document id taken from the `id` argument
    Get,

    /// `GET /`, cluster name and version
    Info,

    /// `POST /{index}/_field_caps`
    FieldCaps,

    /// `GET /_cat/indices/{index}?format=json`
    CatIndices,
}

/// A fully built HTTP call for one action against one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: Url,
    pub sends_body: bool,
}

impl Action {
    /// Build the HTTP call for this action.
    ///
    /// `args` become query-string parameters, except `id` for [`Action::Get`], which becomes part
    /// of the path. The index is encoded as a single path segment, so date-math names containing
    /// `/` survive intact.
    pub fn plan(self, server: &Url, index: Option<&str>, args: &Map<String, Value>) -> Result<RequestPlan, QueryError> {
        let mut url = server.clone();

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| QueryError::InvalidArguments(format!("'{server}' cannot be used as a base URL")))?;
            let _ = segments.pop_if_empty();

            match self {
                Self::Search | Self::Count | Self::FieldCaps => {
                    if let Some(index) = index {
                        let _ = segments.push(index);
                    }
                    let _ = segments.push(match self {
                        Self::Search => "_search",
                        Self::Count => "_count",
                        _ => "_field_caps",
                    });
                }
                Self::Get => {
                    let index = index.ok_or_else(|| QueryError::InvalidArguments("action 'get' needs an index".to_string()))?;
                    let id = args
                        .get("id")
                        .map(arg_text)
                        .ok_or_else(|| QueryError::InvalidArguments("action 'get' needs an 'id' argument".to_string()))?;
                    let _ = segments.push(index).push("_doc").push(&id);
                }
                Self::Info => {}
                Self::CatIndices => {
                    let _ = segments.push("_cat").push("indices");
                    if let Some(index) = index {
                        let _ = segments.push(index);
                    }
                }
            }
        }

        let forwarded: Vec<(&String, &Value)> = args.iter().filter(|(name, _)| !(self == Self::Get && *name == "id")).collect();
        let wants_json = self == Self::CatIndices && !args.contains_key("format");

        if !forwarded.is_empty() || wants_json {
            let mut query = url.query_pairs_mut();
            for (name, value) in forwarded {
                let _ = query.append_pair(name, &arg_text(value));
            }
            if wants_json {
                let _ = query.append_pair("format", "json");
            }
        }

        Ok(RequestPlan {
            method: self.method(),
            url,
            sends_body: matches!(self, Self::Search | Self::Count | Self::FieldCaps),
        })
    }

    const fn method(self) -> Method {
        match self {
            Self::Search | Self::Count | Self::FieldCaps => Method::POST,
            Self::Get | Self::Info | Self::CatIndices => Method::GET,
        }
    }
}

/// Query-string form of an argument value; sequences are comma-joined.
fn arg_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(arg_text).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
