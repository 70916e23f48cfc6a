//! zview - 视图容器插入引擎
//!
//! 模块结构：
//! - models: 渲染树（物理节点）
//! - engine: 视图模板、视图实例、视图容器、锚点解析、投影槽
//! - services: 配置与设置文件

pub mod engine;
pub mod models;
pub mod services;

pub use engine::{
    Anchor, Condition, ContainerId, EngineError, SlotId, Template, TemplateNode, ViewEngine,
    ViewId, ViewNode, ViewOwner,
};
pub use models::{NodeId, RenderTree};
pub use services::EngineConfig;
