// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute-equality searches parsed from the command line.

use crate::Error;
use quicksight_client::types::Record;
use regrant_common::CapabilityRegistry;
use std::collections::BTreeMap;
use std::fmt;

/// One `--search` occurrence: a service, a resource type, and at least one
/// attribute that a matching record must carry verbatim.
///
/// The tokens of an occurrence are all `KEY=VALUE`.  The `service` and
/// `type` keys select which collection to search; every other key names an
/// attribute of the records in that collection.  Matching is exact string
/// equality, case included.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchCriteria {
    service: String,
    resource_type: String,
    attributes: BTreeMap<String, String>,
}

impl SearchCriteria {
    /// Parses the `KEY=VALUE` tokens of one `--search` occurrence.
    pub fn from_tokens(tokens: &[String]) -> Result<SearchCriteria, Error> {
        let mut pairs = BTreeMap::new();
        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| invalid(token, "expected KEY=VALUE"))?;
            if key.is_empty() {
                return Err(invalid(token, "the key may not be empty"));
            }
            if pairs.insert(key.to_string(), value.to_string()).is_some() {
                return Err(invalid(token, "the key appears more than once"));
            }
        }

        let service =
            pairs.remove("service").ok_or_else(|| missing("service"))?;
        let resource_type =
            pairs.remove("type").ok_or_else(|| missing("type"))?;
        if pairs.is_empty() {
            return Err(Error::InvalidCriteria(String::from(
                "need at least one attribute besides \"service\" and \
                 \"type\"",
            )));
        }

        Ok(SearchCriteria { service, resource_type, attributes: pairs })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Reports whether a match for these criteria names a grantee rather
    /// than a resource to grant on.
    pub fn is_grantee_search(&self, registry: &CapabilityRegistry) -> bool {
        registry.is_grantee_kind(&self.service, &self.resource_type)
    }

    /// Reports whether `record` carries every requested attribute with
    /// exactly the requested value.
    pub fn matches(&self, record: &Record) -> bool {
        self.attributes
            .iter()
            .all(|(key, want)| record.attr_str(key) == Some(want.as_str()))
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.resource_type)?;
        for (i, (key, value)) in self.attributes.iter().enumerate() {
            let sep = if i == 0 { '/' } else { ',' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

fn invalid(token: &str, problem: &str) -> Error {
    Error::InvalidCriteria(format!("token {:?}: {}", token, problem))
}

fn missing(key: &str) -> Error {
    Error::InvalidCriteria(format!("missing required \"{}=\" token", key))
}

#[cfg(test)]
mod test {
    use super::SearchCriteria;
    use crate::testutil::record;
    use crate::Error;
    use serde_json::json;

    fn tokens(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_search_parse() {
        let criteria = SearchCriteria::from_tokens(&tokens(&[
            "service=quicksight",
            "type=user",
            "Email=ann@example.com",
        ]))
        .unwrap();
        assert_eq!(criteria.service(), "quicksight");
        assert_eq!(criteria.resource_type(), "user");
        assert_eq!(
            criteria.to_string(),
            "quicksight:user/Email=ann@example.com"
        );

        // Attribute order on the command line is immaterial.
        let criteria = SearchCriteria::from_tokens(&tokens(&[
            "type=dataset",
            "Name=sales",
            "service=quicksight",
            "CreatedBy=ann",
        ]))
        .unwrap();
        assert_eq!(
            criteria.to_string(),
            "quicksight:dataset/CreatedBy=ann,Name=sales"
        );
    }

    #[test]
    fn test_search_parse_error_cases() {
        let error_cases = vec![
            (
                vec!["type=user", "Email=a@b.test"],
                "missing required \"service=\" token",
            ),
            (
                vec!["service=quicksight", "Email=a@b.test"],
                "missing required \"type=\" token",
            ),
            (
                vec!["service=quicksight", "type=user"],
                "need at least one attribute besides \"service\" and \
                 \"type\"",
            ),
            (
                vec!["service=quicksight", "type=user", "Email"],
                "token \"Email\": expected KEY=VALUE",
            ),
            (
                vec!["service=quicksight", "type=user", "=x"],
                "token \"=x\": the key may not be empty",
            ),
            (
                vec![
                    "service=quicksight",
                    "type=user",
                    "Email=a@b.test",
                    "Email=c@d.test",
                ],
                "token \"Email=c@d.test\": the key appears more than once",
            ),
        ];

        for (raw, message) in error_cases {
            eprintln!("testing tokens {:?}", raw);
            let error = SearchCriteria::from_tokens(&tokens(&raw))
                .expect_err("expected parse failure");
            match error {
                Error::InvalidCriteria(problem) => {
                    assert_eq!(problem, message)
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_grantee_classification() {
        let registry = regrant_common::CapabilityRegistry::builtin();
        let user = SearchCriteria::from_tokens(&tokens(&[
            "service=quicksight",
            "type=user",
            "Email=a@b.test",
        ]))
        .unwrap();
        assert!(user.is_grantee_search(registry));

        let dataset = SearchCriteria::from_tokens(&tokens(&[
            "service=quicksight",
            "type=dataset",
            "Name=sales",
        ]))
        .unwrap();
        assert!(!dataset.is_grantee_search(registry));
    }

    #[test]
    fn test_search_matches() {
        let criteria = SearchCriteria::from_tokens(&tokens(&[
            "service=quicksight",
            "type=user",
            "Email=ann@example.com",
            "Role=ADMIN",
        ]))
        .unwrap();

        assert!(criteria.matches(&record(json!({
            "Arn": "arn:aws:quicksight:us-east-1:123:user/default/ann",
            "Email": "ann@example.com",
            "Role": "ADMIN",
        }))));

        // One attribute differing, missing, or differing only in case is
        // enough to exclude a record.
        assert!(!criteria.matches(&record(json!({
            "Email": "ann@example.com",
            "Role": "READER",
        }))));
        assert!(!criteria.matches(&record(json!({
            "Email": "ann@example.com",
        }))));
        assert!(!criteria.matches(&record(json!({
            "Email": "ANN@EXAMPLE.COM",
            "Role": "ADMIN",
        }))));

        // Non-string attribute values never match.
        assert!(!criteria.matches(&record(json!({
            "Email": "ann@example.com",
            "Role": 7,
        }))));
    }
}
