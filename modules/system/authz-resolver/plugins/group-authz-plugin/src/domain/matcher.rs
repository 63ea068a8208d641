//! Policy matching: record attributes to authorized groups.

use serde_json::{Map, Value};

use super::policy::{GroupDescriptor, PolicyNode};

/// Groups the policy authorizes for a record with `attributes`.
///
/// Facets are tried in document order and, within a facet, policy values in
/// document order; the first subtree yielding groups wins. A scalar attribute
/// counts as a one-element list. No match yields an empty slice.
#[must_use]
pub fn match_groups<'p>(attributes: &Map<String, Value>, node: &'p PolicyNode) -> &'p [GroupDescriptor] {
    let facets = match node {
        PolicyNode::Terminal(groups) => return groups,
        PolicyNode::Branch(facets) => facets,
    };

    for facet in facets {
        let Some(attribute) = attributes.get(&facet.name) else {
            continue;
        };
        for (value, subtree) in &facet.values {
            if !attribute_has(attribute, value) {
                continue;
            }
            let groups = match_groups(attributes, subtree);
            if !groups.is_empty() {
                return groups;
            }
        }
    }

    &[]
}

fn attribute_has(attribute: &Value, wanted: &str) -> bool {
    match attribute {
        Value::String(s) => s == wanted,
        Value::Array(values) => values.iter().any(|v| v.as_str() == Some(wanted)),
        _ => false,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    fn policy(value: &Value) -> PolicyNode {
        PolicyNode::from_value(value).unwrap()
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn ids(groups: &[GroupDescriptor]) -> Vec<&str> {
        groups.iter().map(|g| g.group_id.as_str()).collect()
    }

    #[test]
    fn terminal_returns_its_list_regardless_of_attributes() {
        let node = policy(&json!([{"group_id": "g-1"}, {"group_id": "g-2"}]));

        assert_eq!(ids(match_groups(&Map::new(), &node)), vec!["g-1", "g-2"]);
        assert_eq!(
            ids(match_groups(&attrs(json!({"project": "anything"})), &node)),
            vec!["g-1", "g-2"]
        );
    }

    #[test]
    fn unmatched_record_is_denied_by_default() {
        let node = policy(&json!({
            "project": {"CMIP6": {"institution_id": {"NCAR": [{"group_id": "g-ncar"}]}}}
        }));

        assert!(match_groups(&attrs(json!({"project": "CMIP7"})), &node).is_empty());
        assert!(match_groups(&attrs(json!({"project": "CMIP6"})), &node).is_empty());
        assert!(
            match_groups(&attrs(json!({"project": "CMIP6", "institution_id": "IPSL"})), &node)
                .is_empty()
        );
        assert!(match_groups(&Map::new(), &node).is_empty());
    }

    #[test]
    fn nested_match_reaches_leaf() {
        let node = policy(&json!({
            "project": {"CMIP6": {"institution_id": {"NCAR": [{"group_id": "g-ncar"}]}}}
        }));

        let groups = match_groups(
            &attrs(json!({"project": "CMIP6", "institution_id": "NCAR"})),
            &node,
        );

        assert_eq!(ids(groups), vec!["g-ncar"]);
    }

    #[test]
    fn list_attribute_matches_any_element() {
        let node = policy(&json!({"activity_id": {"ScenarioMIP": [{"group_id": "g-scen"}]}}));

        let groups = match_groups(
            &attrs(json!({"activity_id": ["CMIP", "ScenarioMIP"]})),
            &node,
        );

        assert_eq!(ids(groups), vec!["g-scen"]);
    }

    #[test]
    fn first_facet_in_document_order_wins() {
        let node = policy(&json!({
            "institution_id": {"NCAR": [{"group_id": "g-inst"}]},
            "source_id": {"CESM2": [{"group_id": "g-source"}]}
        }));

        let groups = match_groups(
            &attrs(json!({"source_id": "CESM2", "institution_id": "NCAR"})),
            &node,
        );

        assert_eq!(ids(groups), vec!["g-inst"]);
    }

    #[test]
    fn first_value_in_document_order_wins() {
        let node = policy(&json!({
            "activity_id": {
                "ScenarioMIP": [{"group_id": "g-scen"}],
                "CMIP": [{"group_id": "g-cmip"}]
            }
        }));

        let groups = match_groups(&attrs(json!({"activity_id": ["CMIP", "ScenarioMIP"]})), &node);

        assert_eq!(ids(groups), vec!["g-scen"]);
    }

    #[test]
    fn empty_subtree_falls_through_to_next_candidate() {
        let node = policy(&json!({
            "project": {"CMIP6": {"institution_id": {"IPSL": [{"group_id": "g-ipsl"}]}}},
            "source_id": {"CESM2": [{"group_id": "g-source"}]}
        }));

        let groups = match_groups(
            &attrs(json!({"project": "CMIP6", "institution_id": "NCAR", "source_id": "CESM2"})),
            &node,
        );

        assert_eq!(ids(groups), vec!["g-source"]);
    }

    #[test]
    fn non_string_attributes_never_match() {
        let node = policy(&json!({"version": {"1": [{"group_id": "g"}]}}));

        assert!(match_groups(&attrs(json!({"version": 1})), &node).is_empty());
    }
}
