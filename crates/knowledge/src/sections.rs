use guide_core::KnowledgeSection;

/// Splits markdown into `## ` sections. Text before the first such heading is ignored.
pub fn split_sections(body: &str) -> Vec<KnowledgeSection> {
    let mut sections = Vec::new();
    let mut current: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            if let Some(previous) = current.take() {
                sections.push(KnowledgeSection {
                    title: previous,
                    body: lines.join("\n").trim().to_string(),
                });
            }
            current = Some(title.trim().to_string());
            lines.clear();
        } else {
            lines.push(line);
        }
    }

    if let Some(previous) = current {
        sections.push(KnowledgeSection {
            title: previous,
            body: lines.join("\n").trim().to_string(),
        });
    }

    sections
}
