use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::parameters::ParameterValue;

/// 事件类型
///
/// 配置对象在变更时触发对应类型的事件；
/// `Any` 覆盖所有事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// 所有事件
    Any,
    /// 属性变更（新增、替换、删除、清空）
    Update,
    /// 错误事件
    Error,
}

impl EventType {
    /// 判断按本类型注册的监听器是否应收到触发的事件
    pub fn covers(self, fired: EventType) -> bool {
        self == EventType::Any || self == fired
    }
}

/// 配置事件
///
/// 变更前后各触发一次，`before_update` 区分两个阶段
#[derive(Debug, Clone)]
pub struct ConfigurationEvent {
    event_type: EventType,
    property_name: Option<String>,
    property_value: Option<ParameterValue>,
    before_update: bool,
    timestamp: SystemTime,
}

impl ConfigurationEvent {
    pub fn new(
        event_type: EventType,
        property_name: Option<String>,
        property_value: Option<ParameterValue>,
        before_update: bool,
    ) -> Self {
        Self {
            event_type,
            property_name,
            property_value,
            before_update,
            timestamp: SystemTime::now(),
        }
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    pub fn property_value(&self) -> Option<&ParameterValue> {
        self.property_value.as_ref()
    }

    pub fn is_before_update(&self) -> bool {
        self.before_update
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }
}

/// 事件监听器 trait
pub trait EventListener: Send + Sync {
    /// 处理事件（同步）
    fn on_event(&self, event: &ConfigurationEvent);

    /// 获取监听器名称（用于日志）
    fn listener_name(&self) -> &str {
        "AnonymousListener"
    }
}

/// 事件源 trait —— 所有可被监听的配置对象都实现此 trait
///
/// 构建器通过该接口把注册表中的监听器附着到结果实例上，
/// 也在丢弃实例时反向摘除
pub trait EventSource: Send + Sync {
    /// 注册监听器
    fn add_event_listener(&self, event_type: EventType, listener: Arc<dyn EventListener>);

    /// 移除监听器，不存在时返回 false
    fn remove_event_listener(
        &self,
        event_type: EventType,
        listener: &Arc<dyn EventListener>,
    ) -> bool;
}

/// 一条监听器注册数据
#[derive(Clone)]
pub struct EventListenerRegistration {
    pub event_type: EventType,
    pub listener: Arc<dyn EventListener>,
}

/// 事件监听器注册表
///
/// 注册数据独立于任何具体结果实例存在：
/// 每次构建出新实例后整体附着，实例被丢弃时整体摘除。
/// 同一注册表也被配置对象内部用作事件分发列表
pub struct EventListenerRegistry {
    registrations: RwLock<Vec<EventListenerRegistration>>,
}

impl EventListenerRegistry {
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// 添加一条注册（保持注册顺序）
    pub fn add(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        let mut registrations = self.registrations.write();
        tracing::debug!(
            "Added event listener '{}' for {:?}",
            listener.listener_name(),
            event_type
        );
        registrations.push(EventListenerRegistration {
            event_type,
            listener,
        });
    }

    /// 移除第一条类型和监听器都匹配的注册
    pub fn remove(&self, event_type: EventType, listener: &Arc<dyn EventListener>) -> bool {
        let mut registrations = self.registrations.write();
        let position = registrations
            .iter()
            .position(|r| r.event_type == event_type && Arc::ptr_eq(&r.listener, listener));
        match position {
            Some(index) => {
                let removed = registrations.remove(index);
                tracing::debug!(
                    "Removed event listener '{}' for {:?}",
                    removed.listener.listener_name(),
                    event_type
                );
                true
            }
            None => false,
        }
    }

    /// 当前所有注册的快照
    pub fn registrations(&self) -> Vec<EventListenerRegistration> {
        self.registrations.read().clone()
    }

    /// 把所有注册复制到另一个注册表（不转移所有权，源注册表不变）
    pub fn copy_to(&self, target: &EventListenerRegistry) {
        for registration in self.registrations() {
            target.add(registration.event_type, registration.listener);
        }
    }

    /// 把所有注册附着到给定的事件源上
    pub fn attach_all(&self, source: &dyn EventSource) {
        for registration in self.registrations() {
            source.add_event_listener(registration.event_type, registration.listener);
        }
    }

    /// 从给定的事件源上摘除所有注册
    pub fn detach_all(&self, source: &dyn EventSource) {
        for registration in self.registrations() {
            source.remove_event_listener(registration.event_type, &registration.listener);
        }
    }

    /// 把事件分发给所有覆盖该类型的监听器
    ///
    /// 先克隆监听器列表再逐个调用，分发过程不持锁
    pub fn fire(&self, event: &ConfigurationEvent) {
        let listeners: Vec<_> = self
            .registrations
            .read()
            .iter()
            .filter(|r| r.event_type.covers(event.event_type()))
            .map(|r| Arc::clone(&r.listener))
            .collect();
        for listener in listeners {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}

impl Default for EventListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn update_event(key: &str) -> ConfigurationEvent {
        ConfigurationEvent::new(
            EventType::Update,
            Some(key.to_string()),
            Some(ParameterValue::from("value")),
            false,
        )
    }

    #[test]
    fn test_event_type_covers() {
        assert!(EventType::Any.covers(EventType::Update));
        assert!(EventType::Any.covers(EventType::Error));
        assert!(EventType::Update.covers(EventType::Update));
        assert!(!EventType::Update.covers(EventType::Error));
        assert!(!EventType::Error.covers(EventType::Update));
    }

    #[test]
    fn test_fire_dispatches_by_type() {
        let registry = EventListenerRegistry::new();
        let any_listener = Arc::new(RecordingListener::default());
        let update_listener = Arc::new(RecordingListener::default());
        let error_listener = Arc::new(RecordingListener::default());
        registry.add(EventType::Any, any_listener.clone());
        registry.add(EventType::Update, update_listener.clone());
        registry.add(EventType::Error, error_listener.clone());

        registry.fire(&update_event("key"));

        assert_eq!(any_listener.event_count(), 1);
        assert_eq!(update_listener.event_count(), 1);
        assert_eq!(error_listener.event_count(), 0);
    }

    #[test]
    fn test_remove_returns_false_when_absent() {
        let registry = EventListenerRegistry::new();
        let listener: Arc<dyn EventListener> = Arc::new(RecordingListener::default());
        assert!(!registry.remove(EventType::Any, &listener));
        registry.add(EventType::Any, Arc::clone(&listener));
        // 类型不匹配时同样返回 false
        assert!(!registry.remove(EventType::Update, &listener));
        assert!(registry.remove(EventType::Any, &listener));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_copy_to_preserves_event_types() {
        let source = EventListenerRegistry::new();
        let l1: Arc<dyn EventListener> = Arc::new(RecordingListener::default());
        let l2: Arc<dyn EventListener> = Arc::new(RecordingListener::default());
        source.add(EventType::Any, Arc::clone(&l1));
        source.add(EventType::Error, Arc::clone(&l2));

        let target = EventListenerRegistry::new();
        source.copy_to(&target);

        assert_eq!(target.len(), 2);
        assert!(target.remove(EventType::Any, &l1));
        assert!(target.remove(EventType::Error, &l2));
        // 源注册表不受影响
        assert_eq!(source.len(), 2);
    }
}
