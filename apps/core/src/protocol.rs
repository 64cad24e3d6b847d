use serde::{Deserialize, Serialize};

use crate::model::{CandidateKind, RankedResult};

pub const METHOD_SET_LIST: &str = "Ranker.SetList";
pub const METHOD_SET_COMMAND_LIST: &str = "Ranker.SetCommandList";
pub const METHOD_FILTER: &str = "Ranker.Filter";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetListArgs {
    #[serde(rename = "List")]
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetListReply {
    #[serde(rename = "Result")]
    pub result: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterArgs {
    #[serde(rename = "Pattern")]
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterReply {
    #[serde(rename = "Results", default)]
    pub results: Vec<WireResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireResult {
    #[serde(rename = "Type")]
    pub kind: CandidateKind,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "Pos", default)]
    pub pos: Vec<i64>,
}

impl From<WireResult> for RankedResult {
    fn from(value: WireResult) -> Self {
        // A lone -1 is the legacy "no highlight" sentinel; empty means the
        // same thing on this side.
        let positions = value
            .pos
            .into_iter()
            .filter(|offset| *offset >= 0)
            .map(|offset| offset as usize)
            .collect();
        Self {
            kind: value.kind,
            text: value.text,
            score: value.score,
            positions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: P,
}

impl<P> RpcRequest<P> {
    pub fn new(id: u64, method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct RpcResponse<R> {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}
