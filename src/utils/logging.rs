use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志配置
///
/// `RUST_LOG` 优先生效；未设置时按 `LLMWIRE_DEBUG` 在精简与详细两档
/// 输出之间选择。
pub struct LoggingConfig;

impl LoggingConfig {
    /// 初始化全局日志订阅器，进程内只应调用一次
    pub fn init() {
        let verbose = Self::is_debug();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose {
                "llmwire=debug,info"
            } else {
                "llmwire=info,warn"
            })
        });

        let fmt_layer = fmt::layer()
            .with_target(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .with_thread_ids(verbose);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();

        if verbose {
            tracing::debug!("详细日志已开启");
        }
    }

    /// 是否处于调试输出模式
    pub fn is_debug() -> bool {
        env::var("LLMWIRE_DEBUG").is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_toggle_follows_env() {
        env::remove_var("LLMWIRE_DEBUG");
        assert!(!LoggingConfig::is_debug());

        env::set_var("LLMWIRE_DEBUG", "1");
        assert!(LoggingConfig::is_debug());

        env::remove_var("LLMWIRE_DEBUG");
    }
}
