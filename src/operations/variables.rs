// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed access to an operation's `variables` object.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct Variables(Map<String, Value>);

impl Variables {
    /// Accepts an object, `null` or nothing.
    pub fn from_value(value: Option<Value>) -> Result<Self, ApiError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Ok(Self(map)),
            Some(_) => Err(ApiError::bad_request("variables must be an object")),
        }
    }

    /// A present, non-null variable deserialized as `T`.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        self.optional(name)?
            .ok_or_else(|| ApiError::validation(format!("Variable \"{name}\" is required")))
    }

    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ApiError::validation(format!("Variable \"{name}\" is invalid: {e}"))),
        }
    }

    /// A required, non-blank identifier.
    pub fn id(&self, name: &str) -> Result<String, ApiError> {
        let value: String = self.required(name)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ApiError::validation(format!(
                "Variable \"{name}\" must not be empty"
            )));
        }
        Ok(value.to_string())
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn vars(value: Value) -> Variables {
        Variables::from_value(Some(value)).unwrap()
    }

    #[test]
    fn absent_and_null_are_empty() {
        assert!(Variables::from_value(None).unwrap().0.is_empty());
        assert!(Variables::from_value(Some(Value::Null)).unwrap().0.is_empty());
        let err = Variables::from_value(Some(json!([1, 2]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[test]
    fn required_reports_missing_and_invalid() {
        let v = vars(json!({ "index": "seven", "name": null }));

        let err = v.required::<String>("name").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Variable \"name\" is required");

        let err = v.required::<i32>("index").unwrap_err();
        assert!(err.message.starts_with("Variable \"index\" is invalid"));
    }

    #[test]
    fn id_rejects_blank_values() {
        let v = vars(json!({ "appId": "  ", "clusterId": " solana-devnet " }));
        assert!(v.id("appId").is_err());
        assert_eq!(v.id("clusterId").unwrap(), "solana-devnet");
    }
}
