//! Connectivity test request

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Reasons an inbound test request is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'destinations' is required")]
    MissingDestinations,

    #[error("'destinations' must be a list of strings")]
    NotAList,

    #[error("destination at index {0} is not a string")]
    NotAString(usize),

    #[error("destination '{0}' must not contain a comma")]
    ContainsComma(String),

    #[error("at least one destination is required")]
    Empty,
}

/// A validated, immutable list of destinations to probe
///
/// Each destination is a `host:port` pair or a URL; order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    destinations: Vec<String>,
}

impl TestRequest {
    /// Validates a list of destinations
    ///
    /// Entries are trimmed and blank entries dropped. Entries containing a
    /// comma are rejected since the agent receives the list comma-joined.
    pub fn new<I, S>(destinations: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = Vec::new();
        for destination in destinations {
            let destination = destination.as_ref().trim();
            if destination.is_empty() {
                continue;
            }
            if destination.contains(',') {
                return Err(ValidationError::ContainsComma(destination.to_string()));
            }
            accepted.push(destination.to_string());
        }

        if accepted.is_empty() {
            return Err(ValidationError::Empty);
        }

        Ok(Self {
            destinations: accepted,
        })
    }

    /// Validates a raw JSON request body of the form `{"destinations": [...]}`
    pub fn from_json(body: &JsonValue) -> Result<Self, ValidationError> {
        let field = match body.get("destinations") {
            None | Some(JsonValue::Null) => return Err(ValidationError::MissingDestinations),
            Some(field) => field,
        };

        let items = field.as_array().ok_or(ValidationError::NotAList)?;

        let mut destinations = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let destination = item.as_str().ok_or(ValidationError::NotAString(index))?;
            destinations.push(destination);
        }

        Self::new(destinations)
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Always false for a validated request
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// The comma-joined form handed to the probe agent
    pub fn joined(&self) -> String {
        self.destinations.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_and_preserves_order() {
        let request = TestRequest::new(["svc-b:80", "svc-a:443"]).unwrap();
        assert_eq!(request.destinations(), &["svc-b:80", "svc-a:443"]);
        assert_eq!(request.joined(), "svc-b:80,svc-a:443");
    }

    #[test]
    fn test_trims_and_drops_blank_entries() {
        let request = TestRequest::new([" a.com:443 ", "", "   ", "b.com:80"]).unwrap();
        assert_eq!(request.destinations(), &["a.com:443", "b.com:80"]);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            TestRequest::new(Vec::<String>::new()),
            Err(ValidationError::Empty)
        );
        assert_eq!(TestRequest::new(["", " "]), Err(ValidationError::Empty));
    }

    #[test]
    fn test_rejects_comma() {
        assert_eq!(
            TestRequest::new(["a.com:443,b.com:80"]),
            Err(ValidationError::ContainsComma("a.com:443,b.com:80".to_string()))
        );
    }

    #[test]
    fn test_from_json() {
        let request =
            TestRequest::from_json(&json!({"destinations": ["google.com:443", "http://example.com"]}))
                .unwrap();
        assert_eq!(request.len(), 2);

        assert_eq!(
            TestRequest::from_json(&json!({})),
            Err(ValidationError::MissingDestinations)
        );
        assert_eq!(
            TestRequest::from_json(&json!({"destinations": null})),
            Err(ValidationError::MissingDestinations)
        );
        assert_eq!(
            TestRequest::from_json(&json!({"destinations": "google.com:443"})),
            Err(ValidationError::NotAList)
        );
        assert_eq!(
            TestRequest::from_json(&json!({"destinations": []})),
            Err(ValidationError::Empty)
        );
        assert_eq!(
            TestRequest::from_json(&json!({"destinations": ["a.com:1", 42]})),
            Err(ValidationError::NotAString(1))
        );
    }
}
