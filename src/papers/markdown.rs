//! Markdown renderings shared by the stub pass, the fallback path, the
//! response parser and the aggregate report.
//!
//! Field labels and their order are read back by downstream tooling, so they
//! must stay stable even where the prose around them changes.

use std::fmt::Write;

use super::types::{ClassificationResult, PaperRecord};
use crate::report::CategoryLedger;

const NOT_PROVIDED: &str = "未提供";

/// Unclassified stub; also the paper block embedded in the prompt.
pub fn paper_stub(paper: &PaperRecord) -> String {
    format!(
        "# {translation}\n\
         \n\
         **论文标题**：{title}\n\
         **中文标题**：{translation}\n\
         **论文地址**：{url}\n\
         \n\
         **作者团队**：{authors}\n\
         **发表日期**：{date}\n\
         **模型功能**：{function}\n",
        translation = paper.translation,
        title = paper.title,
        url = paper.paper_url,
        authors = paper.authors,
        date = paper.publish_date,
        function = paper.model_function,
    )
}

/// Document written when the AI path is disabled.
pub fn default_document(paper: &PaperRecord, category: &str) -> String {
    format!(
        "# {translation}\n\
         \n\
         **分类**：{category}\n\
         \n\
         **arXiv 文章链接**：{url}\n\
         \n\
         **作者/团队**：{authors}\n\
         \n\
         **发表日期**：{date}\n\
         \n\
         **模型功能**：{function}\n\
         \n\
         **技术特点**：基于论文内容的技术创新\n\
         \n\
         **应用场景**：多种实际应用场景",
        translation = paper.translation,
        url = paper.paper_url,
        authors = or_not_provided(&paper.authors),
        date = or_not_provided(&paper.publish_date),
        function = or_not_provided(&paper.model_function),
    )
}

/// Body used when the model named a category but wrote nothing else.
pub fn placeholder_body(category: &str) -> String {
    format!("# 模型分析\n\n**分类**：{}\n\n**说明**：AI分析生成的内容", category)
}

/// Body used when there was no usable model output at all.
pub fn failure_body() -> String {
    "# 分析失败\n\n无法解析AI响应".to_string()
}

pub fn summary_report(date: &str, ledger: &CategoryLedger) -> String {
    let mut out = String::new();
    out.push_str("# 论文分类汇总报告\n\n");
    let _ = write!(out, "生成时间：{}\n\n", date);
    out.push_str("## 分类统计\n\n");
    let _ = writeln!(out, "- **总论文数**：{} 篇", ledger.total());
    let _ = write!(out, "- **分类数量**：{} 个\n\n", ledger.entries().len());
    out.push_str("## 各分类详情\n\n");

    for entry in ledger.entries() {
        let _ = writeln!(out, "### {}", entry.category);
        let _ = writeln!(out, "- 论文数量：{} 篇", entry.count);
        let _ = write!(out, "- 占比：{:.1}%\n\n", entry.percentage);
    }

    out
}

/// All fresh documents of one category, numbered in input order.
pub fn category_digest(category: &str, results: &[&ClassificationResult], date: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", category);
    let _ = writeln!(out, "生成日期：{}", date);
    let _ = write!(out, "论文数量：{} 篇\n\n", results.len());

    for (i, result) in results.iter().enumerate() {
        let _ = write!(out, "## 论文 {}\n\n", i + 1);
        out.push_str(&result.md_content);
        out.push_str("\n\n---\n\n");
    }

    out
}

fn or_not_provided(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papers::types::ClassificationStatus;

    fn paper() -> PaperRecord {
        PaperRecord {
            paper_id: "2401.00001".into(),
            title: "Sound Stage".into(),
            translation: "声场生成".into(),
            paper_url: "https://arxiv.org/abs/2401.00001".into(),
            authors: "Lab A".into(),
            publish_date: "2024-01-02".into(),
            model_function: "生成空间音频".into(),
        }
    }

    #[test]
    fn test_stub_keeps_label_order() {
        let stub = paper_stub(&paper());
        let labels = ["**论文标题**", "**中文标题**", "**论文地址**", "**作者团队**", "**发表日期**", "**模型功能**"];
        let positions: Vec<usize> = labels.iter().map(|l| stub.find(l).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(stub.starts_with("# 声场生成\n"));
    }

    #[test]
    fn test_stub_renders_empty_fields() {
        let stub = paper_stub(&PaperRecord {
            paper_id: "x".into(),
            ..Default::default()
        });
        assert!(stub.contains("**论文地址**：\n"));
        assert!(stub.contains("**模型功能**：\n"));
    }

    #[test]
    fn test_default_document_fills_missing_fields() {
        let mut p = paper();
        p.authors.clear();
        let doc = default_document(&p, "音频生成");
        assert!(doc.contains("**分类**：音频生成"));
        assert!(doc.contains("**作者/团队**：未提供"));
        assert!(doc.contains("https://arxiv.org/abs/2401.00001"));
    }

    #[test]
    fn test_category_digest_numbers_documents() {
        let result = |id: &str, body: &str| ClassificationResult {
            paper_id: id.into(),
            category: "图像生成".into(),
            confidence: 0.8,
            md_content: body.into(),
            status: ClassificationStatus::Classified,
            classified_at: None,
        };
        let first = result("1", "# 甲\n正文一");
        let second = result("2", "# 乙\n正文二");

        let digest = category_digest("图像生成", &[&first, &second], "2024-05-01");
        assert!(digest.starts_with("# 图像生成\n\n生成日期：2024-05-01\n论文数量：2 篇\n\n"));
        assert!(digest.contains("## 论文 1\n\n# 甲\n正文一\n\n---\n\n## 论文 2\n\n# 乙"));
        assert!(digest.ends_with("正文二\n\n---\n\n"));
    }

    #[test]
    fn test_category_digest_without_documents() {
        assert_eq!(
            category_digest("文本生成", &[], "d"),
            "# 文本生成\n\n生成日期：d\n论文数量：0 篇\n\n"
        );
    }

    #[test]
    fn test_summary_report_lists_in_ledger_order() {
        let ledger = CategoryLedger::from_counts(vec![
            ("文本生成".to_string(), 1),
            ("图像生成".to_string(), 4),
        ]);
        let report = summary_report("2024-05-01", &ledger);
        assert!(report.contains("生成时间：2024-05-01"));
        assert!(report.contains("- **总论文数**：5 篇"));
        assert!(report.contains("- **分类数量**：2 个"));
        let image = report.find("### 图像生成").unwrap();
        let text = report.find("### 文本生成").unwrap();
        assert!(image < text);
        assert!(report.contains("- 占比：80.0%"));
        assert!(report.contains("- 占比：20.0%"));
    }
}
