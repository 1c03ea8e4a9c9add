use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::is_reserved_parameter;
use crate::convert::ListDelimiterHandler;

/// 参数值类型
///
/// 类似初始化参数映射中的值：既可以是简单标量，
/// 也可以是不透明的策略对象或嵌套的参数映射
#[derive(Clone)]
pub enum ParameterValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// 列表分隔符处理策略（按引用比较）
    Handler(Arc<dyn ListDelimiterHandler>),
    /// 不透明对象（按引用比较）
    Object(Arc<dyn Any + Send + Sync>),
    /// 嵌套参数（复杂属性的声明）
    Nested(Parameters),
}

impl ParameterValue {
    /// 转换为字符串
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 转换为整数
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            ParameterValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 转换为浮点数
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(f) => Some(*f),
            ParameterValue::Int(i) => Some(*i as f64),
            ParameterValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 转换为布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            ParameterValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// 转换为列表分隔符处理器
    pub fn as_handler(&self) -> Option<Arc<dyn ListDelimiterHandler>> {
        match self {
            ParameterValue::Handler(h) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    /// 转换为嵌套参数
    pub fn as_nested(&self) -> Option<&Parameters> {
        match self {
            ParameterValue::Nested(p) => Some(p),
            _ => None,
        }
    }

    /// 将不透明对象向下转型为具体类型
    pub fn downcast_object<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            ParameterValue::Object(obj) => Arc::clone(obj).downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterValue::String(a), ParameterValue::String(b)) => a == b,
            (ParameterValue::Int(a), ParameterValue::Int(b)) => a == b,
            (ParameterValue::Float(a), ParameterValue::Float(b)) => a == b,
            (ParameterValue::Bool(a), ParameterValue::Bool(b)) => a == b,
            // 策略对象没有值语义，按引用身份比较
            (ParameterValue::Handler(a), ParameterValue::Handler(b)) => Arc::ptr_eq(a, b),
            (ParameterValue::Object(a), ParameterValue::Object(b)) => Arc::ptr_eq(a, b),
            (ParameterValue::Nested(a), ParameterValue::Nested(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::String(s) => write!(f, "String({:?})", s),
            ParameterValue::Int(i) => write!(f, "Int({})", i),
            ParameterValue::Float(v) => write!(f, "Float({})", v),
            ParameterValue::Bool(b) => write!(f, "Bool({})", b),
            ParameterValue::Handler(_) => write!(f, "Handler(..)"),
            ParameterValue::Object(_) => write!(f, "Object(..)"),
            ParameterValue::Nested(p) => write!(f, "Nested({:?})", p),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<Arc<dyn ListDelimiterHandler>> for ParameterValue {
    fn from(value: Arc<dyn ListDelimiterHandler>) -> Self {
        ParameterValue::Handler(value)
    }
}

/// 初始化参数映射
///
/// key 为参数名，value 为任意类型的参数值。
/// 对外返回的视图都是防御性拷贝，
/// 构建器内部的映射只能通过 merge/replace/clear 变更
#[derive(Clone, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, ParameterValue>,
}

impl Parameters {
    /// 创建空的参数映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有映射创建（防御性拷贝，调用方之后的修改不影响本映射）
    pub fn from_map(values: &HashMap<String, ParameterValue>) -> Self {
        Self {
            values: values.clone(),
        }
    }

    /// 写入一个参数
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 读取一个参数
    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    /// 移除一个参数
    pub fn remove(&mut self, key: &str) -> Option<ParameterValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.values.iter()
    }

    /// 合并另一份参数（同名覆盖）
    pub fn merge(&mut self, other: &Parameters) {
        for (key, value) in other.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// 整体替换为另一份参数
    pub fn replace(&mut self, other: Parameters) {
        self.values = other.values;
    }

    /// 清空所有参数
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// 返回剔除保留前缀参数后的拷贝
    ///
    /// 保留参数是构建器内部指令，不属于构建出的对象
    pub fn filtered(&self) -> Parameters {
        Parameters {
            values: self
                .values
                .iter()
                .filter(|(key, _)| !is_reserved_parameter(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
