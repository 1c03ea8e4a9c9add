// hydra-core: 类似 Commons Configuration 的配置构建框架核心
//
// 提供并发安全的懒加载配置构建能力，支持：
// - 结果实例的单例缓存（并发首次访问只构建一次）
// - 基于 Bean 声明的实例化（工厂注册表代替运行时反射）
// - 构建器与结果实例之间的事件监听器生命周期耦合
// - 外部重载控制器触发的结果失效与重建

pub mod base;
pub mod bean;
pub mod builder;
pub mod constants;
pub mod convert;
pub mod declaration;
pub mod error;
pub mod event;
pub mod fluent;
pub mod logging;
pub mod parameters;
pub mod reloading;

// 重新导出常用类型
pub use base::BaseConfiguration;
pub use bean::{BeanFactory, BeanHelper, ConfigurationBean, DefaultBeanFactory};
pub use builder::{
    BasicConfigurationBuilder, ConfigurationBuilder, DeclarationFactory, InitHook,
};
pub use constants::{
    is_reserved_parameter, BEAN_HELPER_PARAMETER, PROP_LIST_DELIMITER_HANDLER,
    PROP_THROW_EXCEPTION_ON_MISSING, RESERVED_PARAMETER_PREFIX,
};
pub use convert::{
    DefaultListDelimiterHandler, DisabledListDelimiterHandler, ListDelimiterHandler,
};
pub use declaration::BeanDeclaration;
pub use error::{ConfigurationError, ConfigurationResult};
pub use event::{
    ConfigurationEvent, EventListener, EventListenerRegistration, EventListenerRegistry,
    EventSource, EventType,
};
pub use fluent::{BasicBuilderParameters, BuilderParameters, EventListenerParameters};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use parameters::{ParameterValue, Parameters};
pub use reloading::{ReloadingController, ReloadingDetector, ReloadingListener};

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::base::BaseConfiguration;
    pub use crate::bean::{BeanFactory, BeanHelper, ConfigurationBean, DefaultBeanFactory};
    pub use crate::builder::{BasicConfigurationBuilder, ConfigurationBuilder};
    pub use crate::convert::{
        DefaultListDelimiterHandler, DisabledListDelimiterHandler, ListDelimiterHandler,
    };
    pub use crate::declaration::BeanDeclaration;
    pub use crate::error::{ConfigurationError, ConfigurationResult};
    pub use crate::event::{
        ConfigurationEvent, EventListener, EventListenerRegistry, EventSource, EventType,
    };
    pub use crate::fluent::{BasicBuilderParameters, BuilderParameters, EventListenerParameters};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::parameters::{ParameterValue, Parameters};
    pub use crate::reloading::{ReloadingController, ReloadingDetector};
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
