use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// 重载检测器 trait
///
/// 由外部组件实现，回答"底层配置源是否已经变化"。
/// 检测本身的启发式不在框架范围内
pub trait ReloadingDetector: Send + Sync {
    /// 检查是否需要重载
    fn is_reloading_required(&self) -> bool;

    /// 通知检测器重载已经完成
    fn reloading_performed(&self);
}

/// 重载监听器回调
pub type ReloadingListener = Box<dyn Fn() + Send + Sync>;

/// 重载控制器
///
/// 封装重载检测与状态机：检测到需要重载后进入 reloading 状态
/// 并通知所有监听器；直到 `reset_reloading_state` 被调用为止，
/// 后续检查不会重复触发
pub struct ReloadingController {
    detector: Arc<dyn ReloadingDetector>,
    reloading_state: Mutex<bool>,
    listeners: RwLock<Vec<ReloadingListener>>,
}

impl ReloadingController {
    pub fn new(detector: Arc<dyn ReloadingDetector>) -> Self {
        Self {
            detector,
            reloading_state: Mutex::new(false),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 注册重载监听器
    pub fn add_reloading_listener(&self, listener: ReloadingListener) {
        self.listeners.write().push(listener);
    }

    /// 执行一次重载检查，返回当前是否处于 reloading 状态
    pub fn check_for_reloading(&self) -> bool {
        {
            let mut state = self.reloading_state.lock();
            if *state {
                return true;
            }
            if !self.detector.is_reloading_required() {
                return false;
            }
            *state = true;
        }
        tracing::info!("Reloading required, notifying listeners");
        // 通知过程不持状态锁，监听器可以安全地回调控制器
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener();
        }
        true
    }

    pub fn is_in_reloading_state(&self) -> bool {
        *self.reloading_state.lock()
    }

    /// 结束 reloading 状态，并告知检测器重载已执行
    pub fn reset_reloading_state(&self) {
        let was_reloading = {
            let mut state = self.reloading_state.lock();
            std::mem::replace(&mut *state, false)
        };
        if was_reloading {
            tracing::debug!("Reloading state reset");
            self.detector.reloading_performed();
        }
    }
}
