use famtree_layout::config::parse_config;
use famtree_layout::layout_dump::layout_to_json;
use famtree_layout::{CollapseState, Config, Member, layout_family};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Per-call state that is not part of the config document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewOptions {
    #[serde(default)]
    collapsed: Vec<String>,
}

fn build_options(options_json: Option<&str>) -> Result<(Config, CollapseState), String> {
    let Some(raw) = options_json else {
        return Ok((Config::default(), CollapseState::new()));
    };
    let config = parse_config(raw).map_err(|error| format!("{error:#}"))?;
    let view: ViewOptions = json5::from_str(raw).map_err(|error| error.to_string())?;
    Ok((config, view.collapsed.into_iter().collect()))
}

fn layout_json(members_json: &str, options_json: Option<&str>) -> Result<String, String> {
    let members: Vec<Member> =
        serde_json::from_str(members_json).map_err(|error| error.to_string())?;
    let (config, collapsed) = build_options(options_json)?;
    let layout = layout_family(&members, &collapsed, &config);
    layout_to_json(&layout).map_err(|error| error.to_string())
}

/// Lay out a JSON member list and return the positioned units and edges as JSON.
///
/// `options_json` takes the same keys as a config file plus `collapsed`, a list
/// of unit ids whose descendants are hidden.
#[wasm_bindgen]
pub fn layout_family_tree(
    members_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    layout_json(members_json, options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::layout_json;

    const MEMBERS: &str = r#"[
        {"id": "1", "name": "An", "gender": "MALE", "spouses": ["2"], "children": ["3"]},
        {"id": "2", "name": "Binh", "gender": "FEMALE", "spouses": ["1"], "children": ["3"]},
        {"id": "3", "name": "Chi", "gender": "FEMALE", "parents": ["1", "2"], "children": ["4"]},
        {"id": "4", "name": "Dung", "gender": "MALE", "parents": ["3"]}
    ]"#;

    #[test]
    fn lays_out_members_with_default_options() {
        let json = layout_json(MEMBERS, None).expect("layout should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["units"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn collapsed_units_hide_their_descendants() {
        let json = layout_json(MEMBERS, Some(r#"{"direction": "LR", "collapsed": ["3"]}"#))
            .expect("layout should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["direction"], "LR");
        let ids: Vec<&str> = value["units"]
            .as_array()
            .unwrap()
            .iter()
            .map(|unit| unit["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn accepts_json5_options() {
        let options = r#"{
            // unquoted keys and trailing commas, as in config files
            direction: 'LR',
            collapsed: ['3'],
        }"#;
        let json = layout_json(MEMBERS, Some(options)).expect("json5 options should parse");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["direction"], "LR");
        assert_eq!(value["units"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn reports_invalid_member_json() {
        assert!(layout_json("{not json", None).is_err());
    }
}
