use crate::knowledge::KnowledgeBase;
use crate::papers::markdown::paper_stub;
use crate::papers::types::PaperRecord;
use crate::state::Taxonomy;

/// Instructions and the expected answer layout. The first answer line must be
/// the bare category name; everything after it becomes the stored document.
const CLASSIFY_INSTRUCTIONS: &str = r#"你是一名AI模型分类与总结专家。请依据下方的"模型分类知识库"，判断论文描述的模型属于哪个分类，并严格按输出格式作答。

信息获取策略：
1. 优先使用论文信息中已给出的字段
2. 字段缺失或内容过少时，可访问论文地址补全
3. 所有字段都必须填写完整

输出格式（第一行只写分类名称）：
# [分类名称]

# [模型名称] - [论文标题]

**arXiv 文章链接**：[论文链接，格式：https://arxiv.org/abs/XXXX.XXXXX]

**作者/团队**：[作者姓名或机构名称]

**发表日期**：[YYYY-MM-DD]

**模型功能**：[用1-2句话描述模型的核心功能]

**技术特点**：[用2-3句话总结主要技术创新点，50字以内]

**应用场景**：[列举2-3个具体应用场景]"#;

/// Render the single classification prompt for one paper.
///
/// Every paper field is emitted even when empty, so the layout never shifts.
pub fn build_classification_prompt(
    paper: &PaperRecord,
    knowledge: &KnowledgeBase,
    taxonomy: &Taxonomy,
) -> String {
    format!(
        "{instructions}\n\
         \n\
         分类规则：\n\
         - 必须从以下分类中选择：{categories}\n\
         - 如果不确定，选择\"{default}\"\n\
         - 如果模型涉及多个领域，选择最主要的功能分类\n\
         - 分类名称必须与上述列表完全一致\n\
         \n\
         模型分类知识库：\n\
         {knowledge}\n\
         \n\
         论文信息：\n\
         {paper}",
        instructions = CLASSIFY_INSTRUCTIONS,
        categories = taxonomy.categories().join("、"),
        default = taxonomy.default_category(),
        knowledge = knowledge.as_str(),
        paper = paper_stub(paper),
    )
}
