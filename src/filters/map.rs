// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::HashMap;

use super::{filter_common, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

/// Dictionary lookup of the selected text
#[derive(Debug)]
pub struct Map {
    selector: Selector,
    entries: HashMap<String, Value>,
    default: Option<Value>,
}

impl Map {
    pub fn new<K, V, I>(selector: impl Into<Selector>, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            selector: selector.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default: None,
        }
    }
}

impl Filter for Map {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let key = value.text();
        self.entries
            .get(key.trim())
            .cloned()
            .ok_or(Error::Unmapped(key))
    }
}

filter_common!(Map);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;
    use crate::filters::{CleanText, FilterExt};

    fn kinds() -> Map {
        Map::new(
            CleanText::new("."),
            [("CB", "card"), ("VIR", "transfer"), ("PRLV", "order")],
        )
    }

    #[test]
    fn test_lookup() {
        let node = Node::Text(" VIR ".into());
        let kind: String = kinds().extract_from(&node).unwrap();
        assert_eq!(kind, "transfer");
    }

    #[test]
    fn test_unmapped() {
        let node = Node::Text("CHQ".into());
        let err = kinds().apply(&Context::new(&node)).unwrap_err();
        assert!(matches!(err, Error::Unmapped(ref k) if k == "CHQ"));

        let kind: String = kinds().default("unknown").extract_from(&node).unwrap();
        assert_eq!(kind, "unknown");
    }
}
