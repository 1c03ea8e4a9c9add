use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bean::ConfigurationBean;
use crate::constants::{PROP_LIST_DELIMITER_HANDLER, PROP_THROW_EXCEPTION_ON_MISSING};
use crate::convert::{DisabledListDelimiterHandler, ListDelimiterHandler};
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::event::{
    ConfigurationEvent, EventListener, EventListenerRegistry, EventSource, EventType,
};
use crate::parameters::ParameterValue;

/// 基础配置实现
///
/// 线程安全的内存键值配置，是构建器的默认结果类型。
/// 属性变更会向注册的监听器发出变更前后两个事件；
/// 监听器的调用始终发生在数据锁之外
pub struct BaseConfiguration {
    /// 配置数据
    properties: RwLock<HashMap<String, ParameterValue>>,

    /// 访问缺失属性时是否返回错误
    throw_exception_on_missing: RwLock<bool>,

    /// 列表分隔符处理策略
    list_delimiter_handler: RwLock<Arc<dyn ListDelimiterHandler>>,

    /// 附着在本实例上的监听器
    listeners: EventListenerRegistry,
}

impl std::fmt::Debug for BaseConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseConfiguration")
            .field("properties", &*self.properties.read())
            .field(
                "throw_exception_on_missing",
                &*self.throw_exception_on_missing.read(),
            )
            .finish_non_exhaustive()
    }
}

impl BaseConfiguration {
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(HashMap::new()),
            throw_exception_on_missing: RwLock::new(false),
            list_delimiter_handler: RwLock::new(Arc::new(DisabledListDelimiterHandler)),
            listeners: EventListenerRegistry::new(),
        }
    }

    /// 新增属性
    pub fn add_property(
        &self,
        key: &str,
        value: impl Into<ParameterValue>,
    ) -> ConfigurationResult<()> {
        if key.is_empty() {
            return Err(ConfigurationError::InvalidArgument(
                "property key must not be empty".to_string(),
            ));
        }
        let value = value.into();
        self.fire_update(key, Some(&value), true);
        {
            let mut properties = self.properties.write();
            properties.insert(key.to_string(), value.clone());
        }
        tracing::trace!("Added property '{}'", key);
        self.fire_update(key, Some(&value), false);
        Ok(())
    }

    /// 替换属性值（不存在时等同于新增）
    pub fn set_property(
        &self,
        key: &str,
        value: impl Into<ParameterValue>,
    ) -> ConfigurationResult<()> {
        self.add_property(key, value)
    }

    /// 删除属性，返回是否存在
    pub fn clear_property(&self, key: &str) -> bool {
        self.fire_update(key, None, true);
        let removed = self.properties.write().remove(key).is_some();
        self.fire_update(key, None, false);
        removed
    }

    /// 清空所有属性
    pub fn clear(&self) {
        self.fire_update("", None, true);
        self.properties.write().clear();
        self.fire_update("", None, false);
    }

    /// 读取属性值（拷贝）
    pub fn get_property(&self, key: &str) -> Option<ParameterValue> {
        self.properties.read().get(key).cloned()
    }

    /// 读取字符串属性
    pub fn get_string(&self, key: &str) -> ConfigurationResult<Option<String>> {
        match self.get_property(key) {
            Some(value) => Ok(value.as_str().map(String::from)),
            None => self.handle_missing(key),
        }
    }

    /// 读取布尔属性
    pub fn get_bool(&self, key: &str) -> ConfigurationResult<Option<bool>> {
        match self.get_property(key) {
            Some(value) => Ok(value.as_bool()),
            None => self.handle_missing(key),
        }
    }

    /// 读取整数属性
    pub fn get_i64(&self, key: &str) -> ConfigurationResult<Option<i64>> {
        match self.get_property(key) {
            Some(value) => Ok(value.as_i64()),
            None => self.handle_missing(key),
        }
    }

    /// 读取列表属性（字符串值经分隔符处理器拆分）
    pub fn get_list(&self, key: &str) -> ConfigurationResult<Vec<String>> {
        match self.get_property(key) {
            Some(value) => Ok(value
                .as_str()
                .map(|s| self.get_list_delimiter_handler().split(s, true))
                .unwrap_or_default()),
            None => self.handle_missing(key).map(|_: Option<()>| Vec::new()),
        }
    }

    fn handle_missing<T>(&self, key: &str) -> ConfigurationResult<Option<T>> {
        if self.is_throw_exception_on_missing() {
            Err(ConfigurationError::MissingProperty(key.to_string()))
        } else {
            Ok(None)
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.read().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_throw_exception_on_missing(&self) -> bool {
        *self.throw_exception_on_missing.read()
    }

    pub fn set_throw_exception_on_missing(&self, flag: bool) {
        *self.throw_exception_on_missing.write() = flag;
    }

    pub fn get_list_delimiter_handler(&self) -> Arc<dyn ListDelimiterHandler> {
        Arc::clone(&self.list_delimiter_handler.read())
    }

    pub fn set_list_delimiter_handler(&self, handler: Arc<dyn ListDelimiterHandler>) {
        *self.list_delimiter_handler.write() = handler;
    }

    fn fire_update(&self, key: &str, value: Option<&ParameterValue>, before_update: bool) {
        if self.listeners.is_empty() {
            return;
        }
        let event = ConfigurationEvent::new(
            EventType::Update,
            if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            },
            value.cloned(),
            before_update,
        );
        self.listeners.fire(&event);
    }
}

impl Default for BaseConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for BaseConfiguration {
    fn add_event_listener(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        self.listeners.add(event_type, listener);
    }

    fn remove_event_listener(
        &self,
        event_type: EventType,
        listener: &Arc<dyn EventListener>,
    ) -> bool {
        self.listeners.remove(event_type, listener)
    }
}

impl ConfigurationBean for BaseConfiguration {
    fn apply_property(&mut self, name: &str, value: &ParameterValue) -> ConfigurationResult<()> {
        match name {
            PROP_THROW_EXCEPTION_ON_MISSING => {
                let flag = value.as_bool().ok_or_else(|| {
                    ConfigurationError::Instantiation(format!(
                        "property '{}' expects a boolean value",
                        name
                    ))
                })?;
                *self.throw_exception_on_missing.write() = flag;
                Ok(())
            }
            PROP_LIST_DELIMITER_HANDLER => {
                let handler = value.as_handler().ok_or_else(|| {
                    ConfigurationError::Instantiation(format!(
                        "property '{}' expects a list delimiter handler",
                        name
                    ))
                })?;
                *self.list_delimiter_handler.write() = handler;
                Ok(())
            }
            _ => Err(ConfigurationError::Instantiation(format!(
                "no writable property '{}' on {}",
                name,
                std::any::type_name::<Self>()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DefaultListDelimiterHandler;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<ConfigurationEvent>>,
    }

    impl RecordingListener {
        fn event_count(&self) -> usize {
            self.events.lock().len()
        }
    }

    impl EventListener for RecordingListener {
        fn on_event(&self, event: &ConfigurationEvent) {
            self.events.lock().push(event.clone());
        }
    }

    #[test]
    fn test_add_and_get_property() {
        let config = BaseConfiguration::new();
        config.add_property("foo", "bar").unwrap();
        assert_eq!(config.get_string("foo").unwrap(), Some("bar".to_string()));
        assert!(config.contains_key("foo"));
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = BaseConfiguration::new();
        let err = config.add_property("", "value").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidArgument(_)));
    }

    #[test]
    fn test_missing_property_with_flag() {
        let config = BaseConfiguration::new();
        assert_eq!(config.get_string("missing").unwrap(), None);
        config.set_throw_exception_on_missing(true);
        let err = config.get_string("missing").unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingProperty(_)));
    }

    #[test]
    fn test_get_list_uses_delimiter_handler() {
        let config = BaseConfiguration::new();
        config.add_property("colors", "red;green;blue").unwrap();
        // 默认策略不拆分
        assert_eq!(config.get_list("colors").unwrap().len(), 1);
        config.set_list_delimiter_handler(Arc::new(DefaultListDelimiterHandler::new(';')));
        assert_eq!(
            config.get_list("colors").unwrap(),
            vec!["red".to_string(), "green".to_string(), "blue".to_string()]
        );
    }

    #[test]
    fn test_update_events_fired_around_mutation() {
        let config = BaseConfiguration::new();
        let listener = Arc::new(RecordingListener::default());
        config.add_event_listener(EventType::Update, listener.clone());
        config.add_property("foo", "bar").unwrap();
        // 变更前后各一个事件
        assert_eq!(listener.event_count(), 2);
        let events = listener.events.lock();
        assert!(events[0].is_before_update());
        assert!(!events[1].is_before_update());
        assert_eq!(events[0].property_name(), Some("foo"));
    }

    #[test]
    fn test_removed_listener_not_notified() {
        let config = BaseConfiguration::new();
        let recording = Arc::new(RecordingListener::default());
        let listener: Arc<dyn EventListener> = recording.clone();
        config.add_event_listener(EventType::Any, Arc::clone(&listener));
        assert!(config.remove_event_listener(EventType::Any, &listener));
        config.add_property("foo", "bar").unwrap();
        // 摘除后的监听器不再收到通知
        assert_eq!(recording.event_count(), 0);
    }

    #[test]
    fn test_apply_property_routes_builder_properties() {
        let mut config = BaseConfiguration::new();
        config
            .apply_property(PROP_THROW_EXCEPTION_ON_MISSING, &ParameterValue::Bool(true))
            .unwrap();
        assert!(config.is_throw_exception_on_missing());

        let handler: Arc<dyn ListDelimiterHandler> =
            Arc::new(DefaultListDelimiterHandler::new(','));
        config
            .apply_property(
                PROP_LIST_DELIMITER_HANDLER,
                &ParameterValue::Handler(Arc::clone(&handler)),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&config.get_list_delimiter_handler(), &handler));

        let err = config
            .apply_property("unknown", &ParameterValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Instantiation(_)));
    }
}
