use thiserror::Error;

/// 配置框架统一错误类型
///
/// 类似 Commons Configuration 的异常体系，按出错阶段划分：
/// 参数校验、声明类型检查、实例化、初始化
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// 非法参数（违反调用约定）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 声明的目标类型与构建器的结果类型不兼容
    #[error("Type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// 实例创建或属性赋值失败
    #[error("Failed to instantiate result: {0}")]
    Instantiation(String),

    /// 初始化回调失败
    #[error("Failed to initialize result: {0}")]
    Initialization(String),

    /// 访问了不存在的属性（throwExceptionOnMissing 开启时）
    #[error("Property not found: '{0}'")]
    MissingProperty(String),

    /// 日志系统初始化失败
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 统一的 Result 别名
pub type ConfigurationResult<T> = std::result::Result<T, ConfigurationError>;
