//! 引擎配置
//!
//! 所有字段都有默认值，设置文件里缺省的字段保持默认。

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Comment text of host container markers.
    pub marker_label: String,
    /// Emit a trace event for every splice.
    pub trace_splices: bool,
    /// Upper bound on outward steps while resolving an anchor.
    pub max_nesting_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            marker_label: "container".to_string(),
            trace_splices: false,
            max_nesting_depth: 256,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}
