use std::any::{Any, TypeId};

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::parameters::Parameters;

/// Bean 声明 —— 描述如何构建目标对象的临时视图
///
/// 每次构建结果前都从当前参数重新派生，不跨构建缓存（参数可能已经变化）。
/// 声明只包含真正属于目标对象的属性，保留前缀参数在派生时被剔除
#[derive(Clone, Debug)]
pub struct BeanDeclaration {
    bean_type: TypeId,
    bean_type_name: &'static str,
    properties: Parameters,
}

impl BeanDeclaration {
    /// 从参数映射派生声明
    pub fn from_parameters<T: Any>(parameters: &Parameters) -> Self {
        Self {
            bean_type: TypeId::of::<T>(),
            bean_type_name: std::any::type_name::<T>(),
            properties: parameters.filtered(),
        }
    }

    /// 不带任何属性的空声明（初始化失败容忍策略的回退路径）
    pub fn empty<T: Any>() -> Self {
        Self {
            bean_type: TypeId::of::<T>(),
            bean_type_name: std::any::type_name::<T>(),
            properties: Parameters::new(),
        }
    }

    pub fn bean_type(&self) -> TypeId {
        self.bean_type
    }

    pub fn bean_type_name(&self) -> &'static str {
        self.bean_type_name
    }

    pub fn properties(&self) -> &Parameters {
        &self.properties
    }

    /// 复杂属性的嵌套声明
    pub fn nested(&self, key: &str) -> Option<&Parameters> {
        self.properties.get(key).and_then(|value| value.as_nested())
    }

    /// 校验声明的目标类型与期望的结果类型兼容
    ///
    /// 覆盖默认声明的构建器同样要通过这一检查
    pub fn check_bean_type<T: Any>(&self) -> ConfigurationResult<()> {
        if self.bean_type != TypeId::of::<T>() {
            return Err(ConfigurationError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                found: self.bean_type_name.to_string(),
            });
        }
        Ok(())
    }
}
