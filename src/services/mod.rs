//! 服务层：配置与设置文件

pub mod config;
pub mod settings;

pub use config::EngineConfig;
