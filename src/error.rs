use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum OcaError {
    /// 下载相关错误
    #[error("下载错误: {0}")]
    Fetch(#[from] FetchError),
    /// XML 解析错误
    #[error("XML错误: {0}")]
    Xml(#[from] XmlError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 图表/报告渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 下载相关错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed { url: String, source: BoxedSource },
    /// 服务器返回非成功状态码
    #[error("服务器返回状态码 {status} ({url})")]
    BadStatus { url: String, status: u16 },
    /// 资源不存在（内存/本地数据源）
    #[error("资源不存在: {url}")]
    NotFound { url: String },
}

/// XML 解析错误
#[derive(Debug, Error)]
pub enum XmlError {
    /// XML 格式错误
    #[error("{document} 格式错误 (位置 {position}): {source}")]
    Malformed {
        document: &'static str,
        position: usize,
        source: BoxedSource,
    },
    /// 文档提前结束
    #[error("{document} 文档不完整: 还有 {open} 个元素未闭合")]
    Truncated { document: &'static str, open: usize },
    /// METS 中没有 USE="FULLTEXT" 的文件组
    #[error("METS 中没有 FULLTEXT 文件组")]
    MissingFulltext,
    /// 根元素不是 ALTO
    #[error("不是 ALTO 文档 (根元素: {root})")]
    NotAlto { root: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxedSource },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxedSource },
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed { path: String, source: BoxedSource },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed { path: String, source: BoxedSource },
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 图片编码/保存失败
    #[error("保存图片失败 ({path}): {source}")]
    ImageSaveFailed { path: String, source: BoxedSource },
    /// 图片解码失败
    #[error("无法解码图片 ({url}): {source}")]
    ImageDecodeFailed { url: String, source: BoxedSource },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 记录ID不合法
    #[error("记录ID不合法: '{record_id}'")]
    InvalidRecordId { record_id: String },
    /// 未知的图书馆预设
    #[error("未知的图书馆: '{name}' (可选: {known})")]
    UnknownLibrary { name: String, known: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl OcaError {
    /// 创建请求失败错误
    pub fn request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::Fetch(FetchError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建 XML 格式错误
    pub fn malformed(
        document: &'static str,
        position: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::Xml(XmlError::Malformed {
            document,
            position,
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建目录失败错误
    pub fn create_dir_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::File(FileError::CreateDirFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片保存错误
    pub fn image_save_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OcaError::Render(RenderError::ImageSaveFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, OcaError>;
