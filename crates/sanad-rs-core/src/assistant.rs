//! Conversation assistant: the stage machine driving clarification,
//! generation, and memory write-back.

use crate::catalogue::{REUSE_QUESTION, questions_for};
use crate::error::AssistantError;
use crate::generate::DocumentGenerator;
use crate::prompt::{ANSWER_SEPARATOR, DEFAULT_PERSONA, compose_prompt};
use crate::tags::extract_tags;
use crate::types::{Message, Role, Stage};
use log::{debug, info, warn};
use sanad_rs_memory::{ConversationDraft, ConversationMemory};
use std::sync::Arc;

/// How many similar records the greeting lookup asks for.
const GREETING_SIMILAR_LIMIT: usize = 2;

/// How many similar records the question-derivation lookup asks for.
const QUESTION_SIMILAR_LIMIT: usize = 3;

/// Interactive document-drafting assistant for one user session.
///
/// Collaborators are injected: one [`ConversationMemory`] instance per
/// session and one [`DocumentGenerator`]. All failures are rendered as
/// transcript messages; no method returns an error to the caller.
pub struct Assistant {
    /// Current stage of the conversation.
    stage: Stage,
    /// Active document-type label.
    doc_type: String,
    /// Operator persona line for the generation prompt.
    persona: String,
    /// Full transcript, oldest first.
    messages: Vec<Message>,
    /// Initial request description from the user.
    description: String,
    /// Clarification questions for the active conversation.
    questions: Vec<String>,
    /// Collected answers, indexed by arrival order.
    answers: Vec<String>,
    /// Drafted document, present after a successful generation.
    generated: Option<String>,
    /// Conversation memory collaborator.
    memory: Arc<dyn ConversationMemory>,
    /// Generation collaborator.
    generator: Arc<dyn DocumentGenerator>,
}

impl Assistant {
    /// Create an assistant over the given collaborators.
    pub fn new(memory: Arc<dyn ConversationMemory>, generator: Arc<dyn DocumentGenerator>) -> Self {
        Self {
            stage: Stage::Initial,
            doc_type: String::new(),
            persona: DEFAULT_PERSONA.to_string(),
            messages: Vec::new(),
            description: String::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            generated: None,
            memory,
            generator,
        }
    }

    /// Replace the operator persona used in generation prompts.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Active document-type label.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Full transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Clarification questions for the active conversation.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Drafted document, if generation succeeded.
    pub fn generated_content(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    /// Reset unconditionally and greet the user for a new conversation.
    ///
    /// The greeting mentions prior work when the memory holds similar
    /// records for the document type.
    pub async fn start_new_conversation(&mut self, doc_type: &str) {
        self.stage = Stage::Initial;
        self.doc_type = doc_type.to_string();
        self.messages.clear();
        self.description.clear();
        self.questions.clear();
        self.answers.clear();
        self.generated = None;

        let similar = self
            .memory
            .get_similar(doc_type, "", GREETING_SIMILAR_LIMIT)
            .await;
        info!(
            "new conversation (doc_type={doc_type}, similar={})",
            similar.len()
        );
        let greeting = if similar.is_empty() {
            format!(
                "مرحباً بك في مساعد المستندات! سأساعدك في إعداد {doc_type}. صف لي ما تحتاجه بإيجاز."
            )
        } else {
            format!(
                "مرحباً بك من جديد! لاحظت أنك أنشأت مستندات مشابهة من قبل وسأستفيد من تفاصيلها. صف لي ما تحتاجه لإعداد {doc_type}."
            )
        };
        self.emit(greeting);
    }

    /// Feed one user message into the stage machine.
    pub async fn handle_user_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.emit("الرجاء كتابة رسالة أولاً.");
            return;
        }
        self.messages.push(Message::now(Role::User, text));

        match self.stage {
            Stage::Initial => self.begin_clarification(text).await,
            Stage::Clarifying => self.collect_answer(text).await,
            Stage::Generating => {
                self.emit("جاري إعداد المستند، لحظة من فضلك...");
            }
            Stage::Completed => {
                self.emit("اكتمل المستند الحالي. ابدأ محادثة جديدة لإعداد مستند آخر.");
            }
        }
    }

    /// Derive and emit clarification questions for the initial request.
    async fn begin_clarification(&mut self, text: &str) {
        self.description = text.to_string();
        match self.derive_questions(text).await {
            Ok(questions) => {
                for question in &questions {
                    self.messages
                        .push(Message::now(Role::Assistant, question.clone()));
                }
                self.questions = questions;
                self.emit("أجب عن الأسئلة بالترتيب، لنبدأ بالسؤال الأول.");
                self.stage = Stage::Clarifying;
            }
            Err(err) => {
                warn!("clarification derivation failed: {err}");
                self.emit("عذراً، تعذر تجهيز أسئلة التوضيح. حاول وصف طلبك مرة أخرى.");
                self.stage = Stage::Initial;
            }
        }
    }

    /// Catalogue questions plus the reuse offer when similar records exist.
    async fn derive_questions(&self, text: &str) -> Result<Vec<String>, AssistantError> {
        let mut questions: Vec<String> = questions_for(&self.doc_type)
            .iter()
            .map(|question| question.to_string())
            .collect();
        if questions.is_empty() {
            return Err(AssistantError::NoQuestions(self.doc_type.clone()));
        }
        let similar = self
            .memory
            .get_similar(&self.doc_type, text, QUESTION_SIMILAR_LIMIT)
            .await;
        if !similar.is_empty() {
            questions.push(REUSE_QUESTION.to_string());
        }
        Ok(questions)
    }

    /// Record one answer; hand over to generation after the last one.
    ///
    /// Answers are keyed by arrival order, not by question identity: an
    /// out-of-order or combined reply shifts the remaining alignment.
    async fn collect_answer(&mut self, text: &str) {
        self.answers.push(text.to_string());
        if self.answers.len() >= self.questions.len() {
            self.run_generation().await;
        } else {
            let next = self.answers.len() + 1;
            self.emit(format!(
                "شكراً. السؤال التالي ({next}/{}).",
                self.questions.len()
            ));
        }
    }

    /// Compose the prompt, invoke the generator, and record the outcome.
    async fn run_generation(&mut self) {
        self.stage = Stage::Generating;
        self.emit("جاري إعداد المستند، لحظة من فضلك...");

        let prompt = compose_prompt(&self.persona, &self.doc_type, &self.description, &self.answers);
        match self.generator.generate(&self.doc_type, &prompt).await {
            Ok(document) if !document.trim().is_empty() => {
                self.generated = Some(document.clone());
                self.emit("تم إعداد المستند بنجاح، هذه هي المسودة:");
                self.emit(document.clone());
                self.stage = Stage::Completed;

                let user_input = self.answers.join(ANSWER_SEPARATOR);
                let draft = ConversationDraft {
                    doc_type: self.doc_type.clone(),
                    tags: extract_tags(&user_input),
                    user_input,
                    generated_content: Some(document),
                };
                let id = self.memory.save(draft).await;
                if id.is_empty() {
                    warn!("conversation was not persisted (doc_type={})", self.doc_type);
                } else {
                    debug!("conversation persisted (id={id})");
                }
            }
            Ok(_) => {
                warn!("generator returned an empty document");
                self.emit("عذراً، تعذر إعداد المستند: استجابة فارغة. لنبدأ من جديد، صف لي ما تحتاجه مرة أخرى.");
                self.stage = Stage::Initial;
            }
            Err(err) => {
                warn!("generation failed: {err}");
                self.emit(format!(
                    "عذراً، تعذر إعداد المستند: {err}. لنبدأ من جديد، صف لي ما تحتاجه مرة أخرى."
                ));
                self.stage = Stage::Initial;
            }
        }
    }

    /// Append an assistant message to the transcript.
    fn emit(&mut self, content: impl Into<String>) {
        self.messages.push(Message::now(Role::Assistant, content));
    }
}
