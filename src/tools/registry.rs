use std::collections::HashMap;
use std::sync::Arc;

use crate::core::tool::Tool;
use crate::tools::search_tracks::SearchTracksTool;

/// Closed set of tools keyed by name.
#[derive(Clone)]
pub struct ToolRegistry {
    by_name: Arc<HashMap<&'static str, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn with_tools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let map: HashMap<&'static str, Arc<dyn Tool>> =
            iter.into_iter().map(|t| (t.name(), t)).collect();
        Self { by_name: Arc::new(map) }
    }

    pub fn list(&self) -> Vec<ToolMeta> {
        let mut metas: Vec<ToolMeta> = self
            .by_name
            .values()
            .map(|t| ToolMeta {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect();
        metas.sort_by_key(|m| m.name);
        metas
    }

    pub async fn call(&self, name: &str, args: &serde_json::Value) -> Result<serde_json::Value, String> {
        let t = self
            .by_name
            .get(name)
            .ok_or_else(|| format!("unknown tool: {name}"))?;
        Ok(t.call(args).await)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

/// Registry holding the SoundCloud tools.
pub fn build_registry(search: SearchTracksTool) -> ToolRegistry {
    ToolRegistry::with_tools([Arc::new(search) as Arc<dyn Tool>])
}
