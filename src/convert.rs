use crate::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use ahash::AHashMap;
use std::path::{Path, PathBuf};

const ROOT_PREFIX: &str = "## root: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub op: String,
    pub cost: f64,
    pub eclass: String,
    pub children: Vec<String>,
}

/// An e-graph in the json format extractors read: nodes keyed by `<eclass>__<k>`, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedEGraph {
    pub nodes: Vec<(String, SerializedNode)>,
    pub root_eclasses: Vec<String>,
    pub comment: Option<String>,
}

impl SerializedEGraph {
    pub fn json(&self) -> Value {
        let nodes: Map<String, Value> = self
            .nodes
            .iter()
            .map(|(id, node)| (id.clone(), json!(node)))
            .collect();
        let mut out = json!({
            "nodes": nodes,
            "root_eclasses": self.root_eclasses,
        });
        if let Some(comment) = &self.comment {
            out["comment"] = json!(comment);
        }
        out
    }

    pub fn from_json(value: &Value) -> std::result::Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Raw {
            nodes: Map<String, Value>,
            root_eclasses: Vec<String>,
            comment: Option<String>,
        }
        let raw: Raw = serde_json::from_value(value.clone())?;
        let nodes = raw
            .nodes
            .into_iter()
            .map(|(id, node)| Ok((id, serde_json::from_value(node)?)))
            .collect::<std::result::Result<Vec<_>, serde_json::Error>>()?;
        Ok(SerializedEGraph { nodes, root_eclasses: raw.root_eclasses, comment: raw.comment })
    }
}

/// Parse the old csv-like format. Lines are either `## root: <eclass>`, a `#` comment (the last one
/// is kept), or `<eclass>,<cost>,<op>,<child eclass>...` where every child means node 0 of that eclass.
/// `path` is only used in error messages.
pub fn convert_legacy(contents: &str, path: &Path) -> Result<SerializedEGraph> {
    let mut count: AHashMap<String, usize> = AHashMap::new();
    let mut nodes = vec![];
    let mut roots = vec![];
    let mut comment = None;

    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if let Some(root) = line.strip_prefix(ROOT_PREFIX) {
            roots.push(root.to_string());
        } else if line.starts_with('#') {
            comment = Some(line.to_string());
        } else if line.is_empty() {
            continue;
        } else {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 3 {
                return Err(AnalysisError::malformed(path, i + 1, format!("expected `eclass,cost,op,children...`, got {:?}", line)));
            }
            let eclass = fields[0].to_string();
            let cost: f64 = fields[1]
                .parse()
                .map_err(|_| AnalysisError::malformed(path, i + 1, format!("cost is not a number: {:?}", fields[1])))?;
            let k = count.entry(eclass.clone()).or_insert(0);
            let node_id = format!("{}__{}", eclass, k);
            *k += 1;
            let node = SerializedNode {
                op: fields[2].to_string(),
                cost,
                eclass,
                children: fields[3..].iter().map(|child| format!("{}__0", child)).collect(),
            };
            nodes.push((node_id, node));
        }
    }

    Ok(SerializedEGraph {
        nodes,
        root_eclasses: roots.into_iter().unique().collect(),
        comment,
    })
}

/// `foo.csv` -> `foo.json`, without ever producing `foo.json.json`
pub fn output_path(input: &Path) -> PathBuf {
    let stripped = input.to_string_lossy().replace(".csv", "");
    PathBuf::from(format!("{}.json", stripped).replace(".json.json", ".json"))
}

/// Convert one legacy file, writing the json next to it. Returns where it was written.
pub fn convert_file(input: &Path) -> Result<PathBuf> {
    let contents = std::fs::read_to_string(input).map_err(|e| AnalysisError::io(input, e))?;
    let egraph = convert_legacy(&contents, input)?;
    let out = output_path(input);
    let text = serde_json::to_string_pretty(&egraph.json()).map_err(|e| AnalysisError::json(&out, e))?;
    std::fs::write(&out, text).map_err(|e| AnalysisError::io(&out, e))?;
    log::info!("{:?}: {} nodes, {} roots", out, egraph.nodes.len(), egraph.root_eclasses.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "\
# made by hand
## root: 2
0, 1, x
1, 1, y
2, 5, +, 0, 1
2, 3, *, 0, 0
## root: 2
# second comment
";

    #[test]
    fn converts_nodes() {
        let g = convert_legacy(LEGACY, Path::new("test.csv")).unwrap();
        let ids: Vec<&str> = g.nodes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["0__0", "1__0", "2__0", "2__1"]);
        let (_, times) = &g.nodes[3];
        assert_eq!(times.op, "*");
        assert_eq!(times.cost, 3.0);
        assert_eq!(times.eclass, "2");
        assert_eq!(times.children, vec!["0__0".to_string(), "0__0".to_string()]);
        assert_eq!(g.root_eclasses, vec!["2".to_string()]);
        assert_eq!(g.comment.as_deref(), Some("# second comment"));
    }

    #[test]
    fn node_ids_unique() {
        let g = convert_legacy(LEGACY, Path::new("test.csv")).unwrap();
        assert!(g.nodes.iter().map(|(id, _)| id).all_unique());
    }

    #[test]
    fn json_shape() {
        let g = convert_legacy(LEGACY, Path::new("test.csv")).unwrap();
        let j = g.json();
        assert_eq!(j["nodes"]["2__0"]["children"], json!(["0__0", "1__0"]));
        assert_eq!(j["nodes"]["1__0"]["cost"], json!(1.0));
        assert_eq!(j["root_eclasses"], json!(["2"]));
        let keys: Vec<&String> = j["nodes"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["0__0", "1__0", "2__0", "2__1"]);
    }

    #[test]
    fn no_comment_no_key() {
        let g = convert_legacy("0, 1, x\n", Path::new("test.csv")).unwrap();
        assert!(g.json().get("comment").is_none());
    }

    #[test]
    fn round_trip() {
        let g = convert_legacy(LEGACY, Path::new("test.csv")).unwrap();
        let text = serde_json::to_string_pretty(&g.json()).unwrap();
        let back = SerializedEGraph::from_json(&serde_json::from_str(&text).unwrap()).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn malformed_lines() {
        match convert_legacy("0, 1, x\n0, 1\n", Path::new("bad.csv")) {
            Err(AnalysisError::MalformedLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed line, got {:?}", other),
        }
        assert!(matches!(convert_legacy("0, one, x\n", Path::new("bad.csv")), Err(AnalysisError::MalformedLine { .. })));
    }

    #[test]
    fn output_names() {
        assert_eq!(output_path(Path::new("data/foo.csv")), PathBuf::from("data/foo.json"));
        assert_eq!(output_path(Path::new("data/foo.json.csv")), PathBuf::from("data/foo.json"));
        assert_eq!(output_path(Path::new("data/foo")), PathBuf::from("data/foo.json"));
    }
}
