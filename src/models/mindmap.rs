use serde::{Deserialize, Serialize};

/// 概念思维导图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<MindMapEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

/// LLM 返回的原始结构，边可能没有 id
#[derive(Debug, Deserialize)]
pub(crate) struct RawMindMap {
    #[serde(default)]
    nodes: Vec<MindMapNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<String>,
    #[serde(deserialize_with = "deserialize_id")]
    source: String,
    #[serde(deserialize_with = "deserialize_id")]
    target: String,
    #[serde(default)]
    label: String,
}

impl From<RawMindMap> for MindMap {
    fn from(raw: RawMindMap) -> Self {
        let edges = raw
            .edges
            .into_iter()
            .enumerate()
            .map(|(i, edge)| MindMapEdge {
                id: edge
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("e{}-{}-{}", edge.source, edge.target, i)),
                source: edge.source,
                target: edge.target,
                label: edge.label,
            })
            .collect();

        Self {
            nodes: raw.nodes,
            edges,
        }
    }
}

// id 可能是字符串也可能是整数
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| id.0))
}
