// Language-specific prompt assembly for retrieved context
use crate::generation::Prompt;
use crate::rag::types::Language;

const INSTRUCTIONS_EN: &str = "You are a helpful AI assistant. Answer the user's question only based on the provided context.\n\
If the answer cannot be found in the context, state that you don't have enough information.\n\
Ensure the answer is in English.";

const INSTRUCTIONS_AR: &str = "أنت مساعد ذكاء اصطناعي مفيد. أجب على سؤال المستخدم بناءً على السياق المقدم فقط.\n\
إذا لم يتم العثور على الإجابة في السياق، فاذكر أنه ليس لديك معلومات كافية.\n\
تأكد من أن الإجابة باللغة العربية.";

/// Section labels in the order context, question, answer
fn labels(language: Language) -> (&'static str, &'static str, &'static str) {
    match language {
        Language::En => ("Context:", "Question:", "Answer:"),
        Language::Ar => ("السياق:", "السؤال:", "الإجابة:"),
    }
}

/// Builds the instruction prompt handed to a generation backend
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render the template for `language` around `context` and `query`
    pub fn build(&self, query: &str, context: &[String], language: Language) -> Prompt {
        let instructions = match language {
            Language::En => INSTRUCTIONS_EN,
            Language::Ar => INSTRUCTIONS_AR,
        };
        let (context_label, question_label, answer_label) = labels(language);

        let text = format!(
            "{}\n\n{}\n{}\n\n{} {}\n{}\n",
            instructions,
            context_label,
            context.join("\n"),
            question_label,
            query,
            answer_label
        );

        Prompt {
            text,
            query: query.to_string(),
            context: context.to_vec(),
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_template() {
        let prompt = ContextBuilder::new().build(
            "What is a fox?",
            &["Fox is an animal.".to_string(), "Dogs bark.".to_string()],
            Language::En,
        );
        assert!(prompt.text.contains("Ensure the answer is in English."));
        assert!(prompt.text.contains("Context:\nFox is an animal.\nDogs bark."));
        assert!(prompt.text.contains("Question: What is a fox?"));
        assert!(prompt.text.trim_end().ends_with("Answer:"));
        assert_eq!(prompt.joined_context(), "Fox is an animal.\nDogs bark.");
    }

    #[test]
    fn test_arabic_template() {
        let prompt = ContextBuilder::new().build(
            "ما هو الكلب؟",
            &["الكلب حيوان.".to_string()],
            Language::Ar,
        );
        assert!(prompt.text.contains("باللغة العربية"));
        assert!(prompt.text.contains("السؤال: ما هو الكلب؟"));
        assert_eq!(prompt.language, Language::Ar);
    }
}
