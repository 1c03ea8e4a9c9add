use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::bean::{BeanFactory, BeanHelper, ConfigurationBean, DefaultBeanFactory};
use crate::constants::BEAN_HELPER_PARAMETER;
use crate::declaration::BeanDeclaration;
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::event::{EventListener, EventListenerRegistry, EventType};
use crate::fluent::BuilderParameters;
use crate::parameters::Parameters;
use crate::reloading::ReloadingController;

/// 配置构建器 trait —— 定义获取结果实例的核心接口
pub trait ConfigurationBuilder<T>: Send + Sync {
    /// 获取当前结果实例，不存在时构建一个
    fn get_configuration(&self) -> ConfigurationResult<Arc<T>>;
}

/// 结果声明工厂类型（覆盖默认的参数派生逻辑）
pub type DeclarationFactory =
    Box<dyn Fn(&Parameters) -> ConfigurationResult<BeanDeclaration> + Send + Sync>;

/// 初始化钩子类型（覆盖默认的属性赋值与完成初始化逻辑）
pub type InitHook<T> =
    Box<dyn Fn(&mut T, &BeanDeclaration) -> ConfigurationResult<()> + Send + Sync>;

/// 基础配置构建器
///
/// 持有一份参数映射，按需懒构建结果实例并缓存。
/// 多线程并发访问同一个构建器时保证只构建一个实例：
/// 读路径无需构建锁即可返回已缓存的实例，
/// 未命中时由单一互斥锁守护"重检查-构建-缓存"序列（双重检查）。
/// 监听器注册表独立于结果实例，实例重建时整体重新附着
pub struct BasicConfigurationBuilder<T: ConfigurationBean> {
    /// 初始化参数
    parameters: RwLock<Parameters>,

    /// 事件监听器注册表
    listeners: EventListenerRegistry,

    /// 当前结果实例
    result: RwLock<Option<Arc<T>>>,

    /// 守护"检查-构建-缓存"与失效序列的互斥锁
    build_lock: Mutex<()>,

    /// 默认 Bean 工厂
    bean_factory: Arc<dyn BeanFactory<T>>,

    /// 结果声明工厂（可覆盖）
    declaration_factory: Option<DeclarationFactory>,

    /// 初始化钩子（可覆盖）
    init_hook: Option<InitHook<T>>,

    /// 初始化失败时是否容忍（回退到空实例）；构建器创建后不可变更
    allow_fail_on_init: bool,

    /// 已连接的重载控制器（弱引用，构建器不管理控制器的生命周期）
    controllers: RwLock<Vec<Weak<ReloadingController>>>,
}

impl<T: ConfigurationBean> BasicConfigurationBuilder<T> {
    /// 使用显式 Bean 工厂创建构建器
    pub fn with_factory(factory: Arc<dyn BeanFactory<T>>) -> Self {
        Self {
            parameters: RwLock::new(Parameters::new()),
            listeners: EventListenerRegistry::new(),
            result: RwLock::new(None),
            build_lock: Mutex::new(()),
            bean_factory: factory,
            declaration_factory: None,
            init_hook: None,
            allow_fail_on_init: false,
            controllers: RwLock::new(Vec::new()),
        }
    }

    /// 设置初始化失败容忍策略（仅在构建器创建阶段可用）
    pub fn allow_fail_on_init(mut self, allow: bool) -> Self {
        self.allow_fail_on_init = allow;
        self
    }

    /// 覆盖结果声明工厂
    ///
    /// 即使声明被覆盖，构建时的类型兼容性检查依然生效
    pub fn with_result_declaration<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Parameters) -> ConfigurationResult<BeanDeclaration> + Send + Sync + 'static,
    {
        self.declaration_factory = Some(Box::new(factory));
        self
    }

    /// 覆盖初始化逻辑
    pub fn with_init_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T, &BeanDeclaration) -> ConfigurationResult<()> + Send + Sync + 'static,
    {
        self.init_hook = Some(Box::new(hook));
        self
    }

    /// 当前参数的快照（防御性拷贝，修改不影响构建器）
    pub fn get_parameters(&self) -> Parameters {
        self.parameters.read().clone()
    }

    /// 整体替换参数
    pub fn set_parameters(&self, parameters: &Parameters) -> &Self {
        self.parameters.write().replace(parameters.clone());
        self
    }

    /// 合并追加参数（同名覆盖）
    pub fn add_parameters(&self, parameters: &Parameters) -> &Self {
        self.parameters.write().merge(parameters);
        self
    }

    /// 应用一组参数对象
    ///
    /// 普通参数对象的映射被合并进当前参数；
    /// 携带监听器注册数据的参数对象直接向构建器登记监听器
    pub fn configure(&self, params: &[&dyn BuilderParameters]) -> &Self {
        for param in params {
            match param.event_listeners() {
                Some(registrations) => {
                    for registration in registrations.registrations() {
                        self.add_event_listener(registration.event_type, registration.listener);
                    }
                }
                None => {
                    self.parameters.write().merge(&param.get_parameters());
                }
            }
        }
        self
    }

    /// 清空所有参数（不影响已构建的结果实例）
    pub fn reset_parameters(&self) {
        self.parameters.write().clear();
    }

    /// 丢弃当前结果实例
    ///
    /// 注册表中的监听器先从实例上摘除，之后该实例的变更不再通知它们。
    /// 下一次 `get_configuration` 会重新构建
    pub fn reset_result(&self) {
        let _build = self.build_lock.lock();
        self.clear_result();
    }

    /// 完全重置：清空参数并丢弃结果实例
    ///
    /// 两步在同一把构建锁内完成，并发的 `get_configuration`
    /// 不会构建出"半重置"状态的实例
    pub fn reset(&self) {
        let _build = self.build_lock.lock();
        self.parameters.write().clear();
        self.clear_result();
    }

    /// 注册事件监听器
    ///
    /// 注册立即生效：已有结果实例时同时附着到当前实例，
    /// 之后每次重建也都会重新附着。
    /// 在构建锁内进行，注册不会落进"已快照注册表、尚未发布实例"的窗口
    pub fn add_event_listener(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        let _build = self.build_lock.lock();
        self.listeners.add(event_type, Arc::clone(&listener));
        if let Some(instance) = self.result.read().as_ref() {
            instance.add_event_listener(event_type, listener);
        }
    }

    /// 移除事件监听器，同时从当前实例上摘除；不存在时返回 false
    pub fn remove_event_listener(
        &self,
        event_type: EventType,
        listener: &Arc<dyn EventListener>,
    ) -> bool {
        let _build = self.build_lock.lock();
        let removed = self.listeners.remove(event_type, listener);
        if let Some(instance) = self.result.read().as_ref() {
            instance.remove_event_listener(event_type, listener);
        }
        removed
    }

    /// 把本构建器的所有监听器注册复制到另一个构建器
    ///
    /// 只复制注册数据，本构建器自身的注册和结果不受影响
    pub fn copy_event_listeners<U: ConfigurationBean>(
        &self,
        target: &BasicConfigurationBuilder<U>,
    ) {
        self.listeners.copy_to(&target.listeners);
    }

    /// 连接构建器与重载控制器
    ///
    /// 控制器检测到需要重载时，构建器丢弃当前结果实例；
    /// 构建出新实例后，构建器把控制器的 reloading 状态复位。
    /// 两侧互相只持有弱引用，构建器不管理控制器的生命周期
    pub fn connect_to_reloading_controller(
        builder: &Arc<Self>,
        controller: &Arc<ReloadingController>,
    ) {
        let weak_builder = Arc::downgrade(builder);
        controller.add_reloading_listener(Box::new(move || {
            if let Some(builder) = weak_builder.upgrade() {
                tracing::debug!("Reloading signal received, resetting result");
                builder.reset_result();
            }
        }));
        builder.controllers.write().push(Arc::downgrade(controller));
    }

    fn clear_result(&self) {
        if let Some(instance) = self.result.write().take() {
            self.listeners.detach_all(instance.as_ref());
            tracing::debug!("Result instance discarded");
        }
    }

    /// 构建一个新的结果实例（在构建锁内调用）
    fn create_result(&self) -> ConfigurationResult<T> {
        let parameters = self.parameters.read().clone();
        let declaration = self.create_result_declaration(&parameters)?;
        declaration.check_bean_type::<T>()?;
        let factory = self.fetch_bean_factory(&parameters);

        let mut instance = match factory.create_instance(&declaration) {
            Ok(instance) => instance,
            Err(err) => return self.handle_init_failure(factory.as_ref(), err),
        };
        let init_result = match &self.init_hook {
            Some(hook) => hook(&mut instance, &declaration),
            None => factory.init_instance(&mut instance, &declaration),
        };
        if let Err(err) = init_result {
            return self.handle_init_failure(factory.as_ref(), err);
        }
        Ok(instance)
    }

    fn create_result_declaration(
        &self,
        parameters: &Parameters,
    ) -> ConfigurationResult<BeanDeclaration> {
        match &self.declaration_factory {
            Some(factory) => factory(parameters),
            None => Ok(BeanDeclaration::from_parameters::<T>(parameters)),
        }
    }

    /// 从参数中取 BeanHelper 里登记的工厂，没有则用构建器自己的
    fn fetch_bean_factory(&self, parameters: &Parameters) -> Arc<dyn BeanFactory<T>> {
        if let Some(helper) = parameters
            .get(BEAN_HELPER_PARAMETER)
            .and_then(|value| value.downcast_object::<BeanHelper>())
        {
            if let Some(factory) = helper.factory_for::<T>() {
                tracing::debug!("Using bean factory from configured BeanHelper");
                return factory;
            }
        }
        Arc::clone(&self.bean_factory)
    }

    /// 按容忍策略处理创建/初始化失败
    ///
    /// 严格策略直接上抛；容忍策略记录告警并回退到不带属性的空实例
    fn handle_init_failure(
        &self,
        factory: &dyn BeanFactory<T>,
        err: ConfigurationError,
    ) -> ConfigurationResult<T> {
        if !self.allow_fail_on_init {
            return Err(err);
        }
        tracing::warn!(
            "Failed to initialize result instance, falling back to an empty instance: {}",
            err
        );
        factory.create_instance(&BeanDeclaration::empty::<T>())
    }

    /// 通知所有仍然存活的控制器：新结果已经就绪
    ///
    /// 先收集存活的控制器再通知，通知过程不持锁
    fn notify_result_created(&self) {
        let controllers: Vec<Arc<ReloadingController>> = {
            let mut list = self.controllers.write();
            list.retain(|weak| weak.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for controller in controllers {
            controller.reset_reloading_state();
        }
    }
}

impl<T: ConfigurationBean + Default> BasicConfigurationBuilder<T> {
    /// 创建空参数的构建器，使用默认工厂
    pub fn new() -> Self {
        Self::with_factory(Arc::new(DefaultBeanFactory))
    }

    /// 使用初始参数创建构建器（防御性拷贝）
    pub fn with_parameters(parameters: &Parameters) -> Self {
        let builder = Self::new();
        builder.parameters.write().replace(parameters.clone());
        builder
    }
}

impl<T: ConfigurationBean + Default> Default for BasicConfigurationBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ConfigurationBean> ConfigurationBuilder<T> for BasicConfigurationBuilder<T> {
    fn get_configuration(&self) -> ConfigurationResult<Arc<T>> {
        // 快路径：已有实例直接返回
        if let Some(existing) = self.result.read().as_ref().map(Arc::clone) {
            tracing::trace!("Returning cached result instance");
            return Ok(existing);
        }

        let _build = self.build_lock.lock();
        // 双重检查：等锁期间其他线程可能已经完成构建
        if let Some(existing) = self.result.read().as_ref().map(Arc::clone) {
            return Ok(existing);
        }

        tracing::info!(
            "Creating new result instance of '{}'",
            std::any::type_name::<T>()
        );
        let instance = Arc::new(self.create_result()?);
        self.listeners.attach_all(instance.as_ref());
        *self.result.write() = Some(Arc::clone(&instance));
        drop(_build);

        self.notify_result_created();
        Ok(instance)
    }
}
