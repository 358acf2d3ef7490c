//! Value set expansion through a terminology server.
//!
//! Sends `ValueSet/$expand` requests as a `Parameters` resource and reads the
//! `expansion` element of the returned value set. Large expansions are
//! fetched a second time without hierarchy and with a `count` limit; there is
//! no other retry.

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use crate::definitions::{Designation, ValueSetDefn};
use crate::error::TerminologyError;
use crate::terminology::{Expansion, ExpansionItem, Terminology};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on the number of codes rendered in full.
pub const DEFAULT_MAX_EXPANSION_SIZE: usize = 1000;

const FHIR_JSON: &str = "application/fhir+json";

fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Terminology server client.
pub struct HttpTerminology {
    agent: Agent,
    server: String,
    max_expansion_size: usize,
}

impl std::fmt::Debug for HttpTerminology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTerminology")
            .field("server", &self.server)
            .field("max_expansion_size", &self.max_expansion_size)
            .finish_non_exhaustive()
    }
}

impl HttpTerminology {
    /// Create a client for the server base URL (e.g., `https://tx.example.org/r5`).
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
            server: server.into().trim_end_matches('/').to_owned(),
            max_expansion_size: DEFAULT_MAX_EXPANSION_SIZE,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Set the expansion size ceiling.
    #[must_use]
    pub fn with_max_expansion_size(mut self, max: usize) -> Self {
        self.max_expansion_size = max;
        self
    }

    /// `$expand` endpoint URL.
    #[must_use]
    pub fn expand_url(&self) -> String {
        format!("{}/ValueSet/$expand", self.server)
    }

    fn request(
        &self,
        value_set: &ValueSetDefn,
        include_hierarchy: bool,
        include_designations: bool,
        count: Option<usize>,
    ) -> Result<Expansion, TerminologyError> {
        let url = self.expand_url();
        let payload = expand_parameters(value_set, include_hierarchy, include_designations, count);
        let bytes = serde_json::to_vec(&payload).map_err(|e| TerminologyError::Parse {
            url: value_set.url.clone(),
            message: e.to_string(),
        })?;

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", FHIR_JSON)
            .header("Accept", FHIR_JSON)
            .send(&bytes[..])
            .map_err(|e| TerminologyError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(TerminologyError::Status {
                status,
                body: error_body,
            });
        }

        let text = body.read_to_string().map_err(|e| TerminologyError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;
        parse_expansion(&value_set.url, &text)
    }
}

impl Terminology for HttpTerminology {
    fn expand(
        &self,
        value_set: &ValueSetDefn,
        include_hierarchy: bool,
        include_designations: bool,
    ) -> Result<Expansion, TerminologyError> {
        let expansion = self.request(value_set, include_hierarchy, include_designations, None)?;
        if expansion.total <= self.max_expansion_size {
            return Ok(expansion);
        }

        tracing::warn!(
            value_set = %value_set.url,
            total = expansion.total,
            limit = self.max_expansion_size,
            "Expansion too large, fetching a truncated flat expansion"
        );
        let mut limited = self.request(
            value_set,
            false,
            include_designations,
            Some(self.max_expansion_size),
        )?;
        limited.total = limited.total.max(expansion.total);
        limited.truncated = true;
        Ok(limited)
    }
}

/// Build the `Parameters` body of an `$expand` request.
fn expand_parameters(
    value_set: &ValueSetDefn,
    include_hierarchy: bool,
    include_designations: bool,
    count: Option<usize>,
) -> serde_json::Value {
    let mut parameters = vec![
        serde_json::json!({ "name": "url", "valueUri": value_set.url }),
        serde_json::json!({ "name": "excludeNested", "valueBoolean": !include_hierarchy }),
        serde_json::json!({ "name": "includeDesignations", "valueBoolean": include_designations }),
    ];
    if let Some(count) = count {
        parameters.push(serde_json::json!({ "name": "count", "valueInteger": count }));
    }
    serde_json::json!({ "resourceType": "Parameters", "parameter": parameters })
}

#[derive(Debug, Deserialize)]
struct ExpandedValueSet {
    expansion: Option<WireExpansion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireExpansion {
    total: Option<usize>,
    contains: Vec<WireContains>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireContains {
    system: String,
    code: String,
    display: String,
    designation: Vec<Designation>,
    contains: Vec<WireContains>,
}

impl From<WireContains> for ExpansionItem {
    fn from(wire: WireContains) -> Self {
        Self {
            system: wire.system,
            code: wire.code,
            display: wire.display,
            designations: wire.designation,
            contains: wire.contains.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parse an expanded value set returned by the server.
fn parse_expansion(url: &str, body: &str) -> Result<Expansion, TerminologyError> {
    let parsed: ExpandedValueSet =
        serde_json::from_str(body).map_err(|e| TerminologyError::Parse {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
    let Some(wire) = parsed.expansion else {
        return Err(TerminologyError::Parse {
            url: url.to_owned(),
            message: "response has no expansion".to_owned(),
        });
    };
    let mut expansion = Expansion {
        total: 0,
        contains: wire.contains.into_iter().map(Into::into).collect(),
        truncated: false,
    };
    expansion.total = wire.total.unwrap_or_else(|| expansion.len());
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_url_trims_slash() {
        let tx = HttpTerminology::new("https://tx.example.org/r5/");
        assert_eq!(tx.expand_url(), "https://tx.example.org/r5/ValueSet/$expand");
    }

    #[test]
    fn test_expand_parameters() {
        let vs = ValueSetDefn::new("gender", "http://example.org/vs/gender");
        let body = expand_parameters(&vs, false, true, Some(50));
        assert_eq!(body["resourceType"], "Parameters");
        assert_eq!(body["parameter"][0]["valueUri"], "http://example.org/vs/gender");
        assert_eq!(body["parameter"][1]["valueBoolean"], true);
        assert_eq!(body["parameter"][2]["valueBoolean"], true);
        assert_eq!(body["parameter"][3]["valueInteger"], 50);
    }

    #[test]
    fn test_parameters_without_count() {
        let vs = ValueSetDefn::new("gender", "http://example.org/vs/gender");
        let body = expand_parameters(&vs, true, false, None);
        assert_eq!(body["parameter"].as_array().unwrap().len(), 3);
        assert_eq!(body["parameter"][1]["valueBoolean"], false);
    }

    #[test]
    fn test_parse_expansion() {
        let body = r#"{
            "resourceType": "ValueSet",
            "expansion": {
                "total": 2,
                "contains": [
                    {"system": "http://s", "code": "a", "display": "A",
                     "contains": [{"system": "http://s", "code": "b", "display": "B"}]}
                ]
            }
        }"#;
        let expansion = parse_expansion("http://vs", body).unwrap();
        assert_eq!(expansion.total, 2);
        assert_eq!(expansion.contains[0].contains[0].code, "b");
        assert!(!expansion.truncated);
    }

    #[test]
    fn test_parse_expansion_counts_when_total_missing() {
        let body = r#"{"expansion": {"contains": [{"code": "a"}, {"code": "b"}]}}"#;
        assert_eq!(parse_expansion("http://vs", body).unwrap().total, 2);
    }

    #[test]
    fn test_parse_expansion_errors() {
        assert!(matches!(
            parse_expansion("http://vs", r#"{"resourceType": "ValueSet"}"#),
            Err(TerminologyError::Parse { .. })
        ));
        assert!(matches!(
            parse_expansion("http://vs", "<html>"),
            Err(TerminologyError::Parse { .. })
        ));
    }

    #[test]
    fn test_unreachable_server_is_request_error() {
        let tx = HttpTerminology::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(200));
        let vs = ValueSetDefn::new("gender", "http://example.org/vs/gender");
        let err = tx.expand(&vs, true, false).unwrap_err();
        assert!(matches!(err, TerminologyError::Request { .. }));
    }
}
