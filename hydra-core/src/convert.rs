/// 列表分隔符处理 trait
///
/// 决定字符串属性值如何被拆分成多个列表元素。
/// 具体策略作为不透明对象放进参数映射，随声明传递给配置对象
pub trait ListDelimiterHandler: Send + Sync {
    /// 按分隔符拆分原始字符串
    ///
    /// `trim` 为 true 时去掉每个元素两端的空白并丢弃空元素
    fn split(&self, value: &str, trim: bool) -> Vec<String>;
}

/// 默认实现：单字符分隔符
pub struct DefaultListDelimiterHandler {
    delimiter: char,
}

impl DefaultListDelimiterHandler {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl ListDelimiterHandler for DefaultListDelimiterHandler {
    fn split(&self, value: &str, trim: bool) -> Vec<String> {
        if trim {
            value
                .split(self.delimiter)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            value.split(self.delimiter).map(String::from).collect()
        }
    }
}

/// 禁用列表拆分的实现（配置对象的默认策略）
pub struct DisabledListDelimiterHandler;

impl ListDelimiterHandler for DisabledListDelimiterHandler {
    fn split(&self, value: &str, _trim: bool) -> Vec<String> {
        vec![value.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_handler_split() {
        let handler = DefaultListDelimiterHandler::new(';');
        assert_eq!(
            handler.split("a; b ;c", true),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            handler.split("a; b", false),
            vec!["a".to_string(), " b".to_string()]
        );
    }

    #[test]
    fn test_default_handler_drops_empty_elements() {
        let handler = DefaultListDelimiterHandler::new(',');
        assert_eq!(handler.split("a,,b,", true), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_disabled_handler_keeps_value_intact() {
        let handler = DisabledListDelimiterHandler;
        assert_eq!(handler.split("a,b,c", true), vec!["a,b,c".to_string()]);
    }
}
