//! Instruction prompt for grounded question answering

use super::ContextKind;

/// Answer expected when the rows cannot support one
pub const DATASET_FALLBACK: &str =
    "The provided dataset rows do not contain enough information to answer this question.";

/// Answer expected when a single post cannot support one
pub const POST_FALLBACK: &str =
    "The provided dataset row does not contain enough information to answer this question.";

/// Wrap dataset context and a user question in the answering instructions
pub fn build_prompt(kind: ContextKind, context_csv: &str, question: &str) -> String {
    let (subject, noun, lack, fallback, synthesize) = match kind {
        ContextKind::Rows => (
            "a dataset of Reddit posts",
            "rows",
            "lack",
            DATASET_FALLBACK,
            "- When several rows are relevant, combine them into one coherent answer.\n",
        ),
        ContextKind::SingleRow => ("a single Reddit post", "row", "lacks", POST_FALLBACK, ""),
    };

    format!(
        "You are a data assistant answering questions about {subject}. \
         Respond accurately and concisely, using only the dataset {noun} given below. \
         Each row carries fields such as title, body text, author and creation date.\n\
         \n\
         Consider only columns holding plain text or numbers. Ignore columns whose values \
         are dictionaries or lists and columns describing images.\n\
         \n\
         Rules:\n\
         - Use only the dataset {noun} below as your source of information.\n\
         {synthesize}\
         - If the {noun} {lack} the information to answer fully, reply exactly: \"{fallback}\"\n\
         - Never invent or assume facts that are not present in the {noun}.\n\
         - Keep the answer clear, professional and focused on the question.\n\
         \n\
         Dataset {noun}:\n\
         {context_csv}\n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_prompt_contains_context_and_question() {
        let prompt = build_prompt(ContextKind::Rows, "id,title\na1,Budget\n", "What passed?");

        assert!(prompt.contains("id,title\na1,Budget\n"));
        assert!(prompt.contains("Question:\nWhat passed?"));
        assert!(prompt.contains(DATASET_FALLBACK));
        assert!(prompt.contains("combine them"));
        assert!(prompt.contains("dictionaries or lists"));
    }

    #[test]
    fn test_post_prompt_uses_single_row_fallback() {
        let prompt = build_prompt(ContextKind::SingleRow, "id\na1\n", "Who wrote it?");

        assert!(prompt.contains(POST_FALLBACK));
        assert!(!prompt.contains(DATASET_FALLBACK));
        assert!(!prompt.contains("combine them"));
        assert!(prompt.contains("a single Reddit post"));
    }
}
