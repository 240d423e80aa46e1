use std::path::PathBuf;
use std::time::Duration;

/// Categories a paper may be filed under.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "文本生成",
    "音频生成",
    "图像生成",
    "视频生成",
    "多模态生成",
    "3D生成",
    "游戏与策略生成",
    "科学计算与数据生成",
    "代码生成与数据增强",
    "跨模态生成",
];

/// Category used whenever the model is unsure, unavailable or off-taxonomy.
pub const DEFAULT_CATEGORY: &str = "多模态生成";

/// Closed set of category labels plus the fallback label.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<String>,
    default_category: String,
}

impl Taxonomy {
    /// The default category is always a member, even if `categories` omits it.
    pub fn new(categories: Vec<String>, default_category: impl Into<String>) -> Self {
        let default_category = default_category.into();
        let mut categories = categories;
        if !categories.contains(&default_category) {
            categories.push(default_category.clone());
        }
        Self {
            categories,
            default_category,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn contains(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            DEFAULT_CATEGORY,
        )
    }
}

/// Classification parameters, passed into every component at construction.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Root of the `<date>/<category>/<safe_title>.md` tree.
    pub output_dir: PathBuf,
    /// Taxonomy/criteria document embedded in every prompt.
    pub knowledge_file: PathBuf,
    /// When false, every paper gets the static fallback classification.
    pub use_ai: bool,
    /// Pause after each paper that reached the generation service.
    pub delay_between_requests: Duration,
    /// Generation attempts per prompt, first call included.
    pub max_attempts: u32,
    /// Base delay between generation attempts; attempt `n` waits `n * retry_delay`.
    pub retry_delay: Duration,
    pub ai_confidence: f64,
    pub resumed_confidence: f64,
    pub fallback_confidence: f64,
    pub taxonomy: Taxonomy,
    /// Aggregate report, written inside the date directory.
    pub summary_filename: String,
    /// Draw a spinner on stderr while waiting for the model.
    pub show_progress: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/analysis_results"),
            knowledge_file: PathBuf::from("模型分类.md"),
            use_ai: true,
            delay_between_requests: Duration::from_secs(1),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            ai_confidence: 0.8,
            resumed_confidence: 1.0,
            fallback_confidence: 0.5,
            taxonomy: Taxonomy::default(),
            summary_filename: "模型分类汇总.md".to_string(),
            show_progress: true,
        }
    }
}

impl ClassifierConfig {
    /// Defaults overridden by `PAPER_*` environment variables (after `.env` is loaded).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = dotenv::var("PAPER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(file) = dotenv::var("PAPER_KNOWLEDGE_FILE") {
            config.knowledge_file = PathBuf::from(file);
        }
        if let Some(use_ai) = dotenv::var("PAPER_USE_AI").ok().and_then(|v| parse_flag(&v)) {
            config.use_ai = use_ai;
        }
        if let Some(ms) = dotenv::var("PAPER_REQUEST_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.delay_between_requests = Duration::from_millis(ms);
        }
        if let Some(attempts) = dotenv::var("PAPER_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
        {
            config.max_attempts = attempts;
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
