use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct GraphQLResponse {
    pub data: Option<Data>,
}

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Data {
    #[serde(rename = "xdt_api__v1__feed__user_timeline_graphql_connection")]
    pub timeline: Option<Timeline>,
}

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Timeline {
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Deserialize, PartialEq, Debug)]
pub struct Edge {
    /// The post itself, kept as returned.
    #[serde(default = "empty_node")]
    pub node: Value,
}

#[derive(Deserialize, PartialEq, Eq, Debug, Default)]
pub struct PageInfo {
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

fn empty_node() -> Value {
    Value::Object(Map::new())
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl GraphQLResponse {
    /// The timeline connection, or an empty page when the response has none.
    pub fn into_timeline(self) -> Timeline {
        self.data
            .and_then(|data| data.timeline)
            .unwrap_or_default()
    }
}

#[test]
fn test() {
    let json = serde_json::from_str::<GraphQLResponse>(
        r#"
{
  "data": {
    "xdt_api__v1__feed__user_timeline_graphql_connection": {
      "edges": [
        {
          "node": {
            "code": "C1a2B3c4D5e",
            "caption": { "text": "Sunrise over the Serengeti" }
          },
          "cursor": ""
        },
        {
          "node": {
            "code": "C0z9Y8x7W6v",
            "caption": null
          },
          "cursor": ""
        }
      ],
      "page_info": {
        "end_cursor": "MzQ1Njc4OTAxMjM0NTY3ODkw",
        "has_next_page": true,
        "has_previous_page": false,
        "start_cursor": null
      }
    }
  },
  "extensions": { "is_final": true },
  "status": "ok"
}
"#,
    )
    .unwrap();
    assert_eq!(
        json,
        GraphQLResponse {
            data: Some(Data {
                timeline: Some(Timeline {
                    edges: vec![
                        Edge {
                            node: serde_json::json!({
                                "code": "C1a2B3c4D5e",
                                "caption": { "text": "Sunrise over the Serengeti" }
                            })
                        },
                        Edge {
                            node: serde_json::json!({
                                "code": "C0z9Y8x7W6v",
                                "caption": null
                            })
                        }
                    ],
                    page_info: PageInfo {
                        end_cursor: Some("MzQ1Njc4OTAxMjM0NTY3ODkw".to_string()),
                        has_next_page: true
                    }
                })
            })
        }
    )
}

#[test]
fn missing_connection_is_an_empty_page() {
    let json = serde_json::from_str::<GraphQLResponse>(r#"{"data": {}, "status": "ok"}"#).unwrap();
    assert_eq!(json.into_timeline(), Timeline::default());

    let json = serde_json::from_str::<GraphQLResponse>(r#"{"data": null}"#).unwrap();
    assert_eq!(json.into_timeline(), Timeline::default());
}

#[test]
fn edge_without_node_is_an_empty_object() {
    let json = serde_json::from_str::<GraphQLResponse>(
        r#"{"data": {"xdt_api__v1__feed__user_timeline_graphql_connection": {"edges": [{}]}}}"#,
    )
    .unwrap();
    let timeline = json.into_timeline();
    assert_eq!(timeline.edges, vec![Edge { node: serde_json::json!({}) }]);
    assert_eq!(timeline.page_info, PageInfo::default());
}

#[test]
fn null_page_info_fields_end_pagination() {
    let json = serde_json::from_str::<GraphQLResponse>(
        r#"{"data": {"xdt_api__v1__feed__user_timeline_graphql_connection": {
            "edges": [{"node": {"code": "a"}}],
            "page_info": {"has_next_page": null, "end_cursor": null}
        }}}"#,
    )
    .unwrap();
    let timeline = json.into_timeline();
    assert_eq!(timeline.edges.len(), 1);
    assert_eq!(timeline.page_info, PageInfo::default());
}
