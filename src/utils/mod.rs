/// 工具模块 - 日志等横切设施
pub mod logging;

pub use logging::LoggingConfig;
