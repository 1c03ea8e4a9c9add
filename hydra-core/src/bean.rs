use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::declaration::BeanDeclaration;
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::event::EventSource;
use crate::parameters::ParameterValue;

/// 可由构建器管理的配置 Bean trait
///
/// 目标类型只需要支持按名称赋属性值，以及可选的"完成初始化"能力。
/// 所有结果类型同时是事件源，构建器靠这一点完成监听器的附着与摘除
pub trait ConfigurationBean: EventSource + Any + Send + Sync {
    /// 按名称给 Bean 赋属性值
    fn apply_property(&mut self, name: &str, value: &ParameterValue) -> ConfigurationResult<()>;

    /// 完成初始化回调
    ///
    /// 在所有属性赋值完成后调用一次。默认实现为空；
    /// 需要基于完整属性做派生状态计算的类型可以覆盖此方法
    fn initialize(&mut self) -> ConfigurationResult<()> {
        Ok(())
    }

    /// 获取 Bean 的名称（用于日志）
    fn bean_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Bean 工厂 trait —— 根据声明创建并初始化实例
///
/// 创建和初始化是两个独立阶段：
/// 初始化失败的容忍策略需要一个不带属性的裸实例作为回退
pub trait BeanFactory<T>: Send + Sync {
    /// 创建裸实例（不做属性赋值）
    fn create_instance(&self, declaration: &BeanDeclaration) -> ConfigurationResult<T>;

    /// 初始化实例：逐个赋属性，最后调用完成初始化回调
    fn init_instance(&self, instance: &mut T, declaration: &BeanDeclaration)
        -> ConfigurationResult<()>;
}

/// 默认 Bean 工厂
///
/// 通过 Default 构造实例，再按声明逐个赋属性
pub struct DefaultBeanFactory;

impl<T: ConfigurationBean + Default> BeanFactory<T> for DefaultBeanFactory {
    fn create_instance(&self, _declaration: &BeanDeclaration) -> ConfigurationResult<T> {
        Ok(T::default())
    }

    fn init_instance(
        &self,
        instance: &mut T,
        declaration: &BeanDeclaration,
    ) -> ConfigurationResult<()> {
        for (name, value) in declaration.properties().iter() {
            instance.apply_property(name, value).map_err(|e| {
                ConfigurationError::Instantiation(format!(
                    "failed to set property '{}': {}",
                    name, e
                ))
            })?;
        }
        if let Err(e) = instance.initialize() {
            return Err(ConfigurationError::Initialization(e.to_string()));
        }
        Ok(())
    }
}

/// Bean 工厂注册表
///
/// 以目标类型为键登记工厂，代替运行时反射。
/// 注册表本身可以作为保留参数传入构建器，覆盖其默认工厂
pub struct BeanHelper {
    factories: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl BeanHelper {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// 注册指定类型的工厂（同类型重复注册时覆盖）
    pub fn register_factory<T: Any + Send + Sync>(&self, factory: Arc<dyn BeanFactory<T>>) {
        tracing::debug!(
            "Registered bean factory for type '{}'",
            std::any::type_name::<T>()
        );
        self.factories.write().insert(TypeId::of::<T>(), Arc::new(factory));
    }

    /// 查找指定类型的工厂
    pub fn factory_for<T: Any + Send + Sync>(&self) -> Option<Arc<dyn BeanFactory<T>>> {
        self.factories
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn BeanFactory<T>>>())
            .map(Arc::clone)
    }
}

impl Default for BeanHelper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventListener, EventType};
    use crate::parameters::Parameters;
    use parking_lot::Mutex;

    /// 记录属性赋值和初始化顺序的测试 Bean
    #[derive(Default)]
    struct OrderedBean {
        calls: Mutex<Vec<String>>,
    }

    impl EventSource for OrderedBean {
        fn add_event_listener(&self, _event_type: EventType, _listener: Arc<dyn EventListener>) {}

        fn remove_event_listener(
            &self,
            _event_type: EventType,
            _listener: &Arc<dyn EventListener>,
        ) -> bool {
            false
        }
    }

    impl ConfigurationBean for OrderedBean {
        fn apply_property(
            &mut self,
            name: &str,
            _value: &ParameterValue,
        ) -> ConfigurationResult<()> {
            if name == "bad" {
                return Err(ConfigurationError::Instantiation("no such property".into()));
            }
            self.calls.lock().push(format!("set:{}", name));
            Ok(())
        }

        fn initialize(&mut self) -> ConfigurationResult<()> {
            self.calls.lock().push("initialize".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_initialize_runs_after_all_properties() {
        let mut params = Parameters::new();
        params.put("first", 1i64);
        let declaration = BeanDeclaration::from_parameters::<OrderedBean>(&params);
        let mut bean: OrderedBean = DefaultBeanFactory
            .create_instance(&declaration)
            .expect("create failed");
        DefaultBeanFactory
            .init_instance(&mut bean, &declaration)
            .expect("init failed");
        let calls = bean.calls.lock();
        assert_eq!(calls.last().map(String::as_str), Some("initialize"));
        assert!(calls.contains(&"set:first".to_string()));
    }

    #[test]
    fn test_unknown_property_is_instantiation_error() {
        let mut params = Parameters::new();
        params.put("bad", 1i64);
        let declaration = BeanDeclaration::from_parameters::<OrderedBean>(&params);
        let mut bean = OrderedBean::default();
        let err = DefaultBeanFactory
            .init_instance(&mut bean, &declaration)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Instantiation(_)));
    }

    #[test]
    fn test_bean_helper_register_and_lookup() {
        let helper = BeanHelper::new();
        assert!(helper.factory_for::<OrderedBean>().is_none());
        helper.register_factory::<OrderedBean>(Arc::new(DefaultBeanFactory));
        assert!(helper.factory_for::<OrderedBean>().is_some());
        // 未注册类型查不到
        assert!(helper.factory_for::<String>().is_none());
    }
}
