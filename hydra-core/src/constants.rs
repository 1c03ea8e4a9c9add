/// 框架常量定义
///
/// 这个模块定义了保留参数前缀和常用属性名常量，
/// 确保构建器和参数装配器使用相同的标识符，避免硬编码和不一致的问题

/// 保留参数前缀
///
/// 以该前缀开头的参数是构建器内部指令，
/// 不会作为属性应用到构建出的配置对象上
pub const RESERVED_PARAMETER_PREFIX: &str = "config-";

/// 保留参数：自定义 BeanHelper（工厂注册表）
pub const BEAN_HELPER_PARAMETER: &str = "config-beanHelper";

/// 属性名：访问缺失属性时是否抛出错误
pub const PROP_THROW_EXCEPTION_ON_MISSING: &str = "throwExceptionOnMissing";

/// 属性名：列表分隔符处理器
pub const PROP_LIST_DELIMITER_HANDLER: &str = "listDelimiterHandler";

/// 检查给定的参数名是否为保留参数
pub fn is_reserved_parameter(key: &str) -> bool {
    key.starts_with(RESERVED_PARAMETER_PREFIX)
}
