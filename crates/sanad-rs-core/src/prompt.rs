//! Generation prompt assembly.

/// Separator joining collected answers for prompts and stored records.
pub const ANSWER_SEPARATOR: &str = " | ";

/// Default operator persona for the drafting prompt.
pub const DEFAULT_PERSONA: &str = "أنت مساعد قانوني متخصص في صياغة المستندات التجارية \
لشركة تأجير سقالات ومقاولات، تكتب بالعربية الفصحى بصيغة رسمية.";

/// Compose the single generation prompt from persona, document type,
/// request description, and all collected answers.
pub fn compose_prompt(
    persona: &str,
    doc_type: &str,
    description: &str,
    answers: &[String],
) -> String {
    let mut sections = vec![
        persona.to_string(),
        format!("نوع المستند المطلوب: {doc_type}"),
        format!("وصف الطلب: {description}"),
    ];
    if !answers.is_empty() {
        sections.push(format!(
            "تفاصيل العميل: {}",
            answers.join(ANSWER_SEPARATOR)
        ));
    }
    sections.push(
        "اكتب المستند كاملاً باللغة العربية بصيغة رسمية جاهزة للطباعة، دون أي تعليقات إضافية."
            .to_string(),
    );
    sections.join("\n\n")
}
