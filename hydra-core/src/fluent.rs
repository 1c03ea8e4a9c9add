use std::sync::Arc;

use crate::bean::BeanHelper;
use crate::constants::{
    BEAN_HELPER_PARAMETER, PROP_LIST_DELIMITER_HANDLER, PROP_THROW_EXCEPTION_ON_MISSING,
};
use crate::convert::ListDelimiterHandler;
use crate::event::{EventListener, EventListenerRegistry, EventType};
use crate::parameters::{ParameterValue, Parameters};

/// 构建器参数对象 trait
///
/// 流式装配器最终都产出一个普通参数映射，构建器只消费映射本身。
/// 携带监听器注册数据的参数对象通过 `event_listeners` 暴露注册表，
/// 由构建器直接登记而不是写进映射
pub trait BuilderParameters: Send + Sync {
    /// 返回装配好的参数映射
    fn get_parameters(&self) -> Parameters;

    /// 若该参数对象携带事件监听器注册数据，返回其注册表
    fn event_listeners(&self) -> Option<&EventListenerRegistry> {
        None
    }
}

/// 基础参数装配器
///
/// 链式 setter 对应配置对象的基础属性
#[derive(Default)]
pub struct BasicBuilderParameters {
    parameters: Parameters,
}

impl BasicBuilderParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置访问缺失属性时是否返回错误
    pub fn set_throw_exception_on_missing(mut self, flag: bool) -> Self {
        self.parameters.put(PROP_THROW_EXCEPTION_ON_MISSING, flag);
        self
    }

    /// 设置列表分隔符处理器
    pub fn set_list_delimiter_handler(mut self, handler: Arc<dyn ListDelimiterHandler>) -> Self {
        self.parameters
            .put(PROP_LIST_DELIMITER_HANDLER, ParameterValue::Handler(handler));
        self
    }

    /// 设置自定义 BeanHelper（保留参数，不会出现在结果对象的属性里）
    pub fn set_bean_helper(mut self, helper: Arc<BeanHelper>) -> Self {
        self.parameters
            .put(BEAN_HELPER_PARAMETER, ParameterValue::Object(helper));
        self
    }

    /// 写入任意属性
    pub fn set_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.parameters.put(key, value);
        self
    }
}

impl BuilderParameters for BasicBuilderParameters {
    fn get_parameters(&self) -> Parameters {
        self.parameters.clone()
    }
}

/// 事件监听器参数对象
///
/// 只携带监听器注册数据，不贡献任何映射条目
#[derive(Default)]
pub struct EventListenerParameters {
    listeners: EventListenerRegistry,
}

impl EventListenerParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条监听器注册
    pub fn add_event_listener(self, event_type: EventType, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.add(event_type, listener);
        self
    }
}

impl BuilderParameters for EventListenerParameters {
    fn get_parameters(&self) -> Parameters {
        Parameters::new()
    }

    fn event_listeners(&self) -> Option<&EventListenerRegistry> {
        Some(&self.listeners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DefaultListDelimiterHandler;
    use crate::event::ConfigurationEvent;

    struct NoopListener;

    impl EventListener for NoopListener {
        fn on_event(&self, _event: &ConfigurationEvent) {}
    }

    #[test]
    fn test_basic_parameters_assemble_map() {
        let handler: Arc<dyn ListDelimiterHandler> =
            Arc::new(DefaultListDelimiterHandler::new(';'));
        let params = BasicBuilderParameters::new()
            .set_throw_exception_on_missing(true)
            .set_list_delimiter_handler(Arc::clone(&handler))
            .get_parameters();
        assert_eq!(
            params.get(PROP_THROW_EXCEPTION_ON_MISSING),
            Some(&ParameterValue::Bool(true))
        );
        assert_eq!(
            params.get(PROP_LIST_DELIMITER_HANDLER),
            Some(&ParameterValue::Handler(handler))
        );
    }

    #[test]
    fn test_bean_helper_stored_under_reserved_key() {
        let helper = Arc::new(BeanHelper::new());
        let params = BasicBuilderParameters::new()
            .set_bean_helper(Arc::clone(&helper))
            .get_parameters();
        let stored = params
            .get(BEAN_HELPER_PARAMETER)
            .and_then(|v| v.downcast_object::<BeanHelper>());
        assert!(stored.is_some());
        assert!(Arc::ptr_eq(&stored.unwrap(), &helper));
    }

    #[test]
    fn test_event_listener_parameters_carry_registrations_only() {
        let params = EventListenerParameters::new()
            .add_event_listener(EventType::Any, Arc::new(NoopListener));
        assert!(params.get_parameters().is_empty());
        let listeners = params.event_listeners().expect("no registry");
        assert_eq!(listeners.len(), 1);
    }
}
